//! Resuming the top frame with the value in the scratch register.

use super::{wrong_node, Evaluator, Step};
use crate::errors::{user_error, EvalError, RuntimeErrorKind};
use crate::frame::{Frame, FrameKind};
use crate::heap::{ClosureBody, HeapEntity, Object, SimpleField};
use crate::number::{from_i64, truncate};
use crate::value::Value;
use jsonnet_ir::core::{Expr, ExprKind};
use jsonnet_ir::{BinaryOp, LocationRange, UnaryOp};
use std::cmp::Ordering;

impl Evaluator<'_> {
    pub(super) fn unwind(&mut self, initial: usize) -> Result<Step, EvalError> {
        match self.stack.top().kind {
            FrameKind::ApplyTarget => self.apply_target(),
            FrameKind::BinaryLeft => Ok(self.binary_left()),
            FrameKind::BinaryRight => self.binary_right(),
            FrameKind::BuiltinForceThunks => self.builtin_force_thunks(),
            FrameKind::BuiltinFilter => self.builtin_filter_next(),
            FrameKind::Call => self.call_return(),
            FrameKind::Error => Err(self.error_frame()),
            FrameKind::If => self.if_condition(),
            FrameKind::IndexTarget => self.index_target(),
            FrameKind::IndexIndex => self.index_index(),
            FrameKind::InSuperElement => self.in_super_element(),
            FrameKind::Invariants => self.invariants_next(initial),
            FrameKind::Local => {
                self.stack.pop();
                Ok(Step::Unwind)
            }
            FrameKind::Object => self.object_field_name(),
            FrameKind::ObjectCompArray => self.object_comp_array(),
            FrameKind::ObjectCompElement => self.object_comp_element(),
            FrameKind::StringConcat => self.string_concat(),
            FrameKind::SuperIndex => self.super_index(),
            FrameKind::Unary => self.unary(),
        }
    }

    /// Node of the top frame.
    pub(super) fn frame_ast(&self) -> Expr {
        let frame = self.stack.top();
        match &frame.ast {
            Some(ast) => ast.clone(),
            None => wrong_node(frame.kind),
        }
    }

    /// Pop the top frame, leaving `value` as its result.
    pub(super) fn pop_with(&mut self, value: Value) -> Step {
        self.scratch = value;
        self.stack.pop();
        Step::Unwind
    }

    fn binary_left(&mut self) -> Step {
        let ast = self.frame_ast();
        let ExprKind::Binary { op, right, .. } = &ast.kind else {
            wrong_node(FrameKind::BinaryLeft)
        };
        let lhs = self.scratch;
        match (op, lhs) {
            (BinaryOp::And, Value::Boolean(false)) | (BinaryOp::Or, Value::Boolean(true)) => {
                return self.pop_with(lhs);
            }
            _ => {}
        }
        let frame = self.stack.top_mut();
        frame.kind = FrameKind::BinaryRight;
        frame.val = lhs;
        Step::Eval(right.clone())
    }

    fn binary_right(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::Binary { op, .. } = &ast.kind else {
            wrong_node(FrameKind::BinaryRight)
        };
        let op = *op;
        let lhs = self.stack.top().val;
        let rhs = self.scratch;

        if op == BinaryOp::Plus && (matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_))) {
            let frame = self.stack.top_mut();
            frame.kind = FrameKind::StringConcat;
            frame.val2 = rhs;
            return Ok(Step::Unwind);
        }

        if op == BinaryOp::In {
            let Value::String(field) = lhs else {
                return Err(self.error(ast.loc, RuntimeErrorKind::InLeftNotString { got: lhs.type_name() }));
            };
            let Value::Object(object) = rhs else {
                return Err(self.error(ast.loc, RuntimeErrorKind::InRightNotObject { got: rhs.type_name() }));
            };
            let name = self.intern_string(field);
            let found = self.find_field(object, name, 0).is_some();
            return Ok(self.pop_with(Value::Boolean(found)));
        }

        if lhs.type_name() != rhs.type_name() {
            return Err(self.error(
                ast.loc,
                RuntimeErrorKind::BinaryTypeMismatch {
                    op,
                    left: lhs.type_name(),
                    right: rhs.type_name(),
                },
            ));
        }

        let unsupported = RuntimeErrorKind::BinaryUnsupported {
            op,
            operands: lhs.plural_name(),
        };
        let result = match (lhs, rhs) {
            (Value::Array(left), Value::Array(right)) if op == BinaryOp::Plus => {
                let mut elements = self.heap.array(left).to_vec();
                elements.extend_from_slice(self.heap.array(right));
                self.heap.alloc_array(elements)
            }
            (Value::Boolean(left), Value::Boolean(right)) => match op {
                BinaryOp::And => Value::Boolean(left && right),
                BinaryOp::Or => Value::Boolean(left || right),
                _ => return Err(self.error(ast.loc, unsupported)),
            },
            (Value::Number(left), Value::Number(right)) => {
                self.arithmetic(ast.loc, op, left, right)?
            }
            (Value::Object(left), Value::Object(right)) if op == BinaryOp::Plus => {
                self.heap.alloc_object(Object::Extended { left, right })
            }
            (Value::String(left), Value::String(right)) => {
                let ordering = self.heap.string(left).cmp(self.heap.string(right));
                match op {
                    BinaryOp::Less => Value::Boolean(ordering == Ordering::Less),
                    BinaryOp::LessEq => Value::Boolean(ordering != Ordering::Greater),
                    BinaryOp::Greater => Value::Boolean(ordering == Ordering::Greater),
                    BinaryOp::GreaterEq => Value::Boolean(ordering != Ordering::Less),
                    _ => return Err(self.error(ast.loc, unsupported)),
                }
            }
            _ => return Err(self.error(ast.loc, unsupported)),
        };
        Ok(self.pop_with(result))
    }

    fn arithmetic(&self, loc: LocationRange, op: BinaryOp, left: f64, right: f64) -> Result<Value, EvalError> {
        let shift = |n: f64| u32::try_from(truncate(n).rem_euclid(64)).unwrap_or(0);
        let n = match op {
            BinaryOp::Plus => left + right,
            BinaryOp::Minus => left - right,
            BinaryOp::Mult => left * right,
            BinaryOp::Div => {
                if right == 0.0 {
                    return Err(self.error(loc, RuntimeErrorKind::DivisionByZero));
                }
                left / right
            }
            BinaryOp::ShiftL => from_i64(truncate(left).wrapping_shl(shift(right))),
            BinaryOp::ShiftR => from_i64(truncate(left).wrapping_shr(shift(right))),
            BinaryOp::BitwiseAnd => from_i64(truncate(left) & truncate(right)),
            BinaryOp::BitwiseXor => from_i64(truncate(left) ^ truncate(right)),
            BinaryOp::BitwiseOr => from_i64(truncate(left) | truncate(right)),
            BinaryOp::Less => return Ok(Value::Boolean(left < right)),
            BinaryOp::LessEq => return Ok(Value::Boolean(left <= right)),
            BinaryOp::Greater => return Ok(Value::Boolean(left > right)),
            BinaryOp::GreaterEq => return Ok(Value::Boolean(left >= right)),
            _ => {
                return Err(self.error(
                    loc,
                    RuntimeErrorKind::BinaryUnsupported {
                        op,
                        operands: "numbers",
                    },
                ))
            }
        };
        self.checked_number(loc, n)
    }

    /// Reject results that are not finite.
    pub(super) fn checked_number(&self, loc: LocationRange, n: f64) -> Result<Value, EvalError> {
        if n.is_nan() {
            Err(self.error(loc, RuntimeErrorKind::NotANumber))
        } else if n.is_infinite() {
            Err(self.error(loc, RuntimeErrorKind::Overflow))
        } else {
            Ok(Value::Number(n))
        }
    }

    fn string_concat(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::Binary { left, right, .. } = &ast.kind else {
            wrong_node(FrameKind::StringConcat)
        };
        let frame = self.stack.top();
        let (lhs, rhs) = (frame.val, frame.val2);
        let mut out = Vec::new();
        self.append_as_string(lhs, left.loc, &mut out)?;
        self.append_as_string(rhs, right.loc, &mut out)?;
        let result = self.heap.alloc_chars(out);
        Ok(self.pop_with(result))
    }

    fn append_as_string(&mut self, value: Value, loc: LocationRange, out: &mut Vec<char>) -> Result<(), EvalError> {
        if let Value::String(id) = value {
            out.extend_from_slice(self.heap.string(id));
        } else {
            self.scratch = value;
            out.extend(self.to_json_string(loc)?.chars());
        }
        Ok(())
    }

    fn call_return(&mut self) -> Result<Step, EvalError> {
        let frame = self.stack.top();
        let (context, loc) = (frame.context, frame.loc);
        let forcing = !frame.thunks.is_empty();
        let next = frame.thunks.get(frame.element_id).copied();
        let Some(context) = context else {
            return Ok(self.pop_with(self.scratch));
        };
        match self.heap.get(context) {
            HeapEntity::Thunk(_) => {
                let value = self.scratch;
                self.heap.thunk_mut(context).fill(value);
            }
            // tailstrict: every argument is forced before the body runs.
            HeapEntity::Closure(_) if forcing => {
                if let Some(thunk) = next {
                    self.stack.top_mut().element_id += 1;
                    let loc = self.heap.thunk(thunk).body().map_or(loc, |body| body.loc);
                    return self.enter_thunk(loc, thunk);
                }
                let ClosureBody::Expr(body) = &self.heap.closure(context).body else {
                    wrong_node(FrameKind::Call)
                };
                let body = body.clone();
                let frame = self.stack.top_mut();
                frame.thunks.clear();
                frame.element_id = 0;
                return Ok(Step::Eval(body));
            }
            _ => {}
        }
        Ok(self.pop_with(self.scratch))
    }

    #[cold]
    fn error_frame(&mut self) -> EvalError {
        let ast = self.frame_ast();
        let message = match self.scratch {
            Value::String(id) => self.string_text(id),
            _ => match self.to_json_string(ast.loc) {
                Ok(text) => text,
                Err(err) => return err,
            },
        };
        self.error(ast.loc, user_error(message))
    }

    fn if_condition(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::Conditional { then, otherwise, .. } = &ast.kind else {
            wrong_node(FrameKind::If)
        };
        let Value::Boolean(cond) = self.scratch else {
            return Err(self.error(
                ast.loc,
                RuntimeErrorKind::ConditionNotBoolean {
                    got: self.scratch.type_name(),
                },
            ));
        };
        self.stack.pop();
        Ok(match (cond, otherwise) {
            (true, _) => Step::Eval(then.clone()),
            (false, Some(otherwise)) => Step::Eval(otherwise.clone()),
            (false, None) => {
                self.scratch = Value::Null;
                Step::Unwind
            }
        })
    }

    fn index_target(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::Index { index, .. } = &ast.kind else {
            wrong_node(FrameKind::IndexTarget)
        };
        let target = self.scratch;
        if !matches!(target, Value::Array(_) | Value::Object(_) | Value::String(_)) {
            return Err(self.error(ast.loc, RuntimeErrorKind::NotIndexable { got: target.type_name() }));
        }
        let frame = self.stack.top_mut();
        frame.kind = FrameKind::IndexIndex;
        frame.val = target;

        if let Value::Object(object) = target {
            if !self.stack.already_running_invariants(object) {
                let thunks = self.object_invariants(object);
                if let Some(&first) = thunks.first() {
                    let mut frame = Frame::at(FrameKind::Invariants, ast.loc);
                    frame.self_ = Some(object);
                    frame.thunks = thunks;
                    frame.element_id = 1;
                    self.stack.push(frame);
                    return self.enter_thunk(ast.loc, first);
                }
            }
        }
        Ok(Step::Eval(index.clone()))
    }

    fn invariants_next(&mut self, initial: usize) -> Result<Step, EvalError> {
        let frame = self.stack.top();
        let (cursor, loc) = (frame.element_id, frame.loc);
        if let Some(&thunk) = frame.thunks.get(cursor) {
            self.stack.top_mut().element_id += 1;
            return self.enter_thunk(loc, thunk);
        }
        self.stack.pop();
        if self.stack.len() == initial {
            // Run on behalf of manifestation; nothing to resume.
            return Ok(Step::Unwind);
        }
        let ast = self.frame_ast();
        let ExprKind::Index { index, .. } = &ast.kind else {
            wrong_node(FrameKind::Invariants)
        };
        Ok(Step::Eval(index.clone()))
    }

    fn index_index(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let target = self.stack.top().val;
        let index = self.scratch;
        match target {
            Value::Array(array) => {
                let Value::Number(n) = index else {
                    return Err(self.error(ast.loc, RuntimeErrorKind::ArrayIndexNotNumber { got: index.type_name() }));
                };
                let elements = self.heap.array(array);
                let i = truncate(n);
                let Some(thunk) = usize::try_from(i).ok().and_then(|i| elements.get(i).copied()) else {
                    let len = elements.len();
                    return Err(self.error(ast.loc, RuntimeErrorKind::ArrayBounds { index: i, len }));
                };
                self.stack.pop();
                self.enter_thunk(ast.loc, thunk)
            }
            Value::Object(object) => {
                let Value::String(field) = index else {
                    return Err(self.error(ast.loc, RuntimeErrorKind::ObjectIndexNotString { got: index.type_name() }));
                };
                let name = self.intern_string(field);
                self.stack.pop();
                let body = self.object_index(ast.loc, object, name, 0)?;
                Ok(Step::Eval(body))
            }
            Value::String(string) => {
                let Value::Number(n) = index else {
                    return Err(self.error(ast.loc, RuntimeErrorKind::StringIndexNotNumber { got: index.type_name() }));
                };
                let chars = self.heap.string(string);
                let i = truncate(n);
                let Some(&c) = usize::try_from(i).ok().and_then(|i| chars.get(i)) else {
                    let len = chars.len();
                    return Err(self.error(ast.loc, RuntimeErrorKind::StringBounds { index: i, len }));
                };
                let result = self.heap.alloc_chars(vec![c]);
                Ok(self.pop_with(result))
            }
            _ => wrong_node(FrameKind::IndexIndex),
        }
    }

    fn in_super_element(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let (self_, offset) = self.stack.self_binding();
        let Value::String(field) = self.scratch else {
            return Err(self.error(
                ast.loc,
                RuntimeErrorKind::InSuperNotString {
                    got: self.scratch.type_name(),
                },
            ));
        };
        let Some(object) = self_ else {
            wrong_node(FrameKind::InSuperElement)
        };
        let offset = offset + 1;
        let found = offset < self.count_leaves(object) && {
            let name = self.intern_string(field);
            self.find_field(object, name, offset).is_some()
        };
        Ok(self.pop_with(Value::Boolean(found)))
    }

    fn super_index(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let (self_, offset) = self.stack.self_binding();
        let Some(object) = self_ else {
            wrong_node(FrameKind::SuperIndex)
        };
        let offset = offset + 1;
        if offset >= self.count_leaves(object) {
            return Err(self.error(ast.loc, RuntimeErrorKind::NoSuperClass));
        }
        let Value::String(field) = self.scratch else {
            return Err(self.error(
                ast.loc,
                RuntimeErrorKind::SuperIndexNotString {
                    got: self.scratch.type_name(),
                },
            ));
        };
        let name = self.intern_string(field);
        self.stack.pop();
        let body = self.object_index(ast.loc, object, name, offset)?;
        Ok(Step::Eval(body))
    }

    fn object_field_name(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::Object { asserts, fields } = &ast.kind else {
            wrong_node(FrameKind::Object)
        };
        let cursor = self.stack.top().element_id;
        match self.scratch {
            Value::Null => {}
            Value::String(id) => {
                let text = self.string_text(id);
                let name = self.interner.intern(&text);
                if self.stack.top().object_fields.contains_key(&name) {
                    return Err(self.error(ast.loc, RuntimeErrorKind::DuplicateField { name: text }));
                }
                let field = &fields[cursor];
                self.stack.top_mut().object_fields.insert(
                    name,
                    SimpleField {
                        visibility: field.visibility,
                        body: field.body.clone(),
                    },
                );
            }
            _ => return Err(self.error(ast.loc, RuntimeErrorKind::FieldNameNotString)),
        }

        let next = cursor + 1;
        if let Some(field) = fields.get(next) {
            self.stack.top_mut().element_id = next;
            return Ok(Step::Eval(field.name.clone()));
        }
        let fields = std::mem::take(&mut self.stack.top_mut().object_fields);
        let upvalues = self.capture(ast.free_vars());
        let object = self.heap.alloc_object(Object::Simple {
            upvalues,
            fields,
            asserts: asserts.clone(),
        });
        Ok(self.pop_with(object))
    }

    fn object_comp_array(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::ObjectComp { field, value, id, .. } = &ast.kind else {
            wrong_node(FrameKind::ObjectCompArray)
        };
        let Value::Array(array) = self.scratch else {
            return Err(self.error(
                ast.loc,
                RuntimeErrorKind::ComprehensionNeedsArray {
                    got: self.scratch.type_name(),
                },
            ));
        };
        let Some(&first) = self.heap.array(array).first() else {
            let object = self.heap.alloc_object(Object::Comprehension {
                upvalues: Default::default(),
                value: value.clone(),
                id: *id,
                comp_values: Default::default(),
            });
            return Ok(self.pop_with(object));
        };
        let frame = self.stack.top_mut();
        frame.kind = FrameKind::ObjectCompElement;
        frame.val = Value::Array(array);
        frame.bindings.insert(*id, first);
        frame.element_id = 0;
        Ok(Step::Eval(field.clone()))
    }

    fn object_comp_element(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::ObjectComp { field, value, id, .. } = &ast.kind else {
            wrong_node(FrameKind::ObjectCompElement)
        };
        let frame = self.stack.top();
        let Value::Array(array) = frame.val else {
            wrong_node(FrameKind::ObjectCompElement)
        };
        let cursor = frame.element_id;
        match self.scratch {
            Value::Null => {}
            Value::String(key) => {
                let text = self.string_text(key);
                let name = self.interner.intern(&text);
                if self.stack.top().elements.contains_key(&name) {
                    return Err(self.error(ast.loc, RuntimeErrorKind::DuplicateField { name: text }));
                }
                let element = self.heap.array(array)[cursor];
                self.stack.top_mut().elements.insert(name, element);
            }
            other => {
                return Err(self.error(
                    ast.loc,
                    RuntimeErrorKind::ComprehensionFieldNotString { got: other.type_name() },
                ))
            }
        }

        let next = cursor + 1;
        if let Some(&element) = self.heap.array(array).get(next) {
            let frame = self.stack.top_mut();
            frame.element_id = next;
            frame.bindings.insert(*id, element);
            return Ok(Step::Eval(field.clone()));
        }
        let comp_values = std::mem::take(&mut self.stack.top_mut().elements);
        let upvalues = self.capture(ast.free_vars());
        let object = self.heap.alloc_object(Object::Comprehension {
            upvalues,
            value: value.clone(),
            id: *id,
            comp_values,
        });
        Ok(self.pop_with(object))
    }

    fn unary(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::Unary { op, .. } = &ast.kind else {
            wrong_node(FrameKind::Unary)
        };
        let op = *op;
        let result = match (self.scratch, op) {
            (Value::Boolean(b), UnaryOp::Not) => Value::Boolean(!b),
            (Value::Number(n), UnaryOp::Plus) => Value::Number(n),
            (Value::Number(n), UnaryOp::Minus) => Value::Number(-n),
            (Value::Number(n), UnaryOp::BitwiseNot) => Value::Number(from_i64(!truncate(n))),
            (operand @ (Value::Boolean(_) | Value::Number(_)), _) => {
                return Err(self.error(
                    ast.loc,
                    RuntimeErrorKind::UnaryUnsupported {
                        op,
                        operands: operand.plural_name(),
                    },
                ))
            }
            (other, _) => {
                return Err(self.error(ast.loc, RuntimeErrorKind::UnaryBadType { op, got: other.type_name() }))
            }
        };
        Ok(self.pop_with(result))
    }
}
