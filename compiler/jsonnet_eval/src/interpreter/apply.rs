//! Function application: binding arguments, entering closures, and the
//! bridge to native callbacks.

use super::{wrong_node, Evaluator, Step};
use crate::errors::{user_error, EvalError, RuntimeErrorKind};
use crate::frame::{Frame, FrameKind};
use crate::heap::{ClosureBody, HeapId, Object, Thunk};
use crate::natives::JsonValue;
use crate::number::from_usize;
use crate::value::{BindingFrame, Value};
use jsonnet_ir::core::ExprKind;
use jsonnet_ir::{LocationRange, Name};
use rustc_hash::FxHashMap;

/// An argument thunk and, for named arguments, the parameter it names.
type ArgThunk = (Option<Name>, HeapId);

impl Evaluator<'_> {
    /// The target of a call has been evaluated into the scratch register.
    pub(super) fn apply_target(&mut self) -> Result<Step, EvalError> {
        let ast = self.frame_ast();
        let ExprKind::Apply { args, tailstrict, .. } = &ast.kind else {
            wrong_node(FrameKind::ApplyTarget)
        };
        let Value::Function(func) = self.scratch else {
            return Err(self.error(
                ast.loc,
                RuntimeErrorKind::NotCallable {
                    got: self.scratch.type_name(),
                },
            ));
        };

        let closure = self.heap.closure(func);
        let params = closure.params.clone();
        let named_thunks = matches!(closure.body, ClosureBody::Expr(_));
        let (self_, offset) = self.stack.self_binding();
        let mut bound: Vec<ArgThunk> = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let name = if named_thunks {
                arg.name.or_else(|| params.get(i).map(|param| param.name))
            } else {
                None
            };
            let upvalues = self.capture(arg.expr.free_vars());
            let thunk = Thunk::pending(name, self_, offset, arg.expr.clone()).with_upvalues(upvalues);
            bound.push((arg.name, self.heap.alloc_thunk(thunk)));
        }

        self.stack.pop();
        self.call_function(ast.loc, func, &bound, *tailstrict)
    }

    /// Bind `args` to the parameters of `func` and start running it.
    ///
    /// User functions get a tail-call eligible Call frame. Builtins and
    /// natives get a Call frame for the trace plus a frame that forces every
    /// argument before dispatching.
    pub(super) fn call_function(
        &mut self,
        loc: LocationRange,
        func: HeapId,
        args: &[ArgThunk],
        tailstrict: bool,
    ) -> Result<Step, EvalError> {
        let closure = self.heap.closure(func);
        let params = closure.params.clone();
        let body = closure.body.clone();
        let (self_, offset) = (closure.self_, closure.offset);

        let mut bindings = BindingFrame::new();
        let mut seen_named = false;
        for (index, &(name, thunk)) in args.iter().enumerate() {
            let param = match name {
                None if seen_named => {
                    return Err(self.error(loc, RuntimeErrorKind::PositionalAfterNamed { index }));
                }
                None => match params.get(index) {
                    Some(param) => param.name,
                    None => {
                        return Err(self.error(
                            loc,
                            RuntimeErrorKind::TooManyArgs {
                                params: params.len(),
                            },
                        ))
                    }
                },
                Some(name) => {
                    seen_named = true;
                    if !params.iter().any(|param| param.name == name) {
                        return Err(self.error(
                            loc,
                            RuntimeErrorKind::NoSuchParam {
                                name: self.interner.lookup(name).to_owned(),
                            },
                        ));
                    }
                    name
                }
            };
            if bindings.insert(param, thunk).is_some() {
                return Err(self.error(
                    loc,
                    RuntimeErrorKind::ParamBoundTwice {
                        name: self.interner.lookup(param).to_owned(),
                    },
                ));
            }
        }

        let mut defaults = Vec::new();
        for param in params.iter() {
            if bindings.contains_key(&param.name) {
                continue;
            }
            let Some(default) = &param.default else {
                return Err(self.error(
                    loc,
                    RuntimeErrorKind::ParamNotBound {
                        name: self.interner.lookup(param.name).to_owned(),
                    },
                ));
            };
            let thunk = self
                .heap
                .alloc_thunk(Thunk::pending(Some(param.name), self_, offset, default.clone()));
            bindings.insert(param.name, thunk);
            defaults.push(thunk);
        }

        match body {
            ClosureBody::Expr(body) => {
                let mut env = self.heap.closure(func).upvalues.clone();
                env.extend(bindings.iter().map(|(&name, &thunk)| (name, thunk)));
                // Defaults may refer to any parameter, including each other.
                for thunk in defaults {
                    self.heap.thunk_mut(thunk).set_upvalues(env.clone());
                }
                self.push_call(loc, func, self_, offset, env)?;
                let frame = self.stack.top_mut();
                frame.tail_call = true;
                if tailstrict && !args.is_empty() {
                    frame.thunks = args.iter().map(|&(_, thunk)| thunk).collect();
                    return Ok(Step::Unwind);
                }
                Ok(Step::Eval(body))
            }
            ClosureBody::Builtin(_) | ClosureBody::Native(_) => {
                let thunks = params.iter().map(|param| bindings[&param.name]).collect();
                self.push_call(loc, func, None, 0, BindingFrame::new())?;
                let mut frame = Frame::at(FrameKind::BuiltinForceThunks, loc);
                frame.val = Value::Function(func);
                frame.thunks = thunks;
                self.stack.push(frame);
                Ok(Step::Unwind)
            }
        }
    }

    /// Force the next argument of a builtin, or dispatch once all are values.
    pub(super) fn builtin_force_thunks(&mut self) -> Result<Step, EvalError> {
        let frame = self.stack.top();
        let loc = frame.loc;
        if let Some(&thunk) = frame.thunks.get(frame.element_id) {
            self.stack.top_mut().element_id += 1;
            return self.enter_thunk(loc, thunk);
        }
        let Value::Function(func) = frame.val else {
            wrong_node(FrameKind::BuiltinForceThunks)
        };
        let args: Vec<Value> = frame.thunks.iter().map(|&thunk| self.forced(thunk)).collect();
        match self.heap.closure(func).body.clone() {
            ClosureBody::Builtin(builtin) => self.call_builtin(loc, builtin, &args),
            ClosureBody::Native(name) => self.call_native(loc, &name, &args),
            ClosureBody::Expr(_) => wrong_node(FrameKind::BuiltinForceThunks),
        }
    }

    fn call_native(&mut self, loc: LocationRange, name: &str, args: &[Value]) -> Result<Step, EvalError> {
        let mut json_args = Vec::with_capacity(args.len());
        for &arg in args {
            json_args.push(match arg {
                Value::Null => JsonValue::Null,
                Value::Boolean(b) => JsonValue::Bool(b),
                Value::Number(n) => JsonValue::Number(n),
                Value::String(id) => JsonValue::String(self.string_text(id)),
                Value::Array(_) | Value::Function(_) | Value::Object(_) => {
                    return Err(self.error(loc, RuntimeErrorKind::NativeNonPrimitiveArg));
                }
            });
        }
        let Some(callback) = self.natives.get(name) else {
            return Err(self.error(loc, RuntimeErrorKind::UnknownNative { name: name.to_owned() }));
        };
        tracing::trace!(name, args = json_args.len(), "calling native");
        match (callback.func)(&json_args) {
            Ok(result) => {
                let value = self.json_to_heap(&result);
                Ok(self.pop_with(value))
            }
            Err(message) => Err(self.error(loc, user_error(message))),
        }
    }

    /// Build the heap representation of a native callback's result.
    fn json_to_heap(&mut self, json: &JsonValue) -> Value {
        jsonnet_stack::ensure_sufficient_stack(|| match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => Value::Number(*n),
            JsonValue::String(s) => self.heap.alloc_string(s),
            JsonValue::Array(elements) => {
                let thunks = elements
                    .iter()
                    .map(|element| {
                        let value = self.json_to_heap(element);
                        self.heap
                            .alloc_thunk(Thunk::filled(Some(self.names.json_var), value))
                    })
                    .collect();
                self.heap.alloc_array(thunks)
            }
            JsonValue::Object(fields) => {
                let mut comp_values = FxHashMap::default();
                for (key, field) in fields {
                    let value = self.json_to_heap(field);
                    let thunk = self
                        .heap
                        .alloc_thunk(Thunk::filled(Some(self.names.json_var), value));
                    comp_values.insert(self.interner.intern(key), thunk);
                }
                self.heap.alloc_object(Object::Comprehension {
                    upvalues: BindingFrame::new(),
                    value: self.synthetic.json_var.clone(),
                    id: self.names.json_var,
                    comp_values,
                })
            }
        })
    }

    /// Thunk bound to the integer `i`, as made for `std.makeArray` indices.
    pub(super) fn index_thunk(&mut self, name: Name, i: usize) -> HeapId {
        self.heap
            .alloc_thunk(Thunk::filled(Some(name), Value::Number(from_usize(i))))
    }
}
