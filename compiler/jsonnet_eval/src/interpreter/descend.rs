//! Descending into a node.

use super::{Evaluator, Step};
use crate::errors::{EvalError, RuntimeErrorKind};
use crate::frame::{Frame, FrameKind};
use crate::heap::{Closure, ClosureBody, HeapId, Object, Thunk};
use crate::value::{BindingFrame, Value};
use jsonnet_ir::builtins::Builtin;
use jsonnet_ir::core::{Expr, ExprKind};
use rustc_hash::FxHashMap;

impl Evaluator<'_> {
    pub(super) fn descend(&mut self, ast: &Expr) -> Result<Step, EvalError> {
        match &ast.kind {
            ExprKind::Apply { target, .. } => Ok(self.push_frame(FrameKind::ApplyTarget, ast, target)),
            ExprKind::Array(elements) => {
                let (self_, offset) = self.stack.self_binding();
                let mut thunks = Vec::with_capacity(elements.len());
                for element in elements {
                    let upvalues = self.capture(element.free_vars());
                    let thunk = Thunk::pending(Some(self.names.array_element), self_, offset, element.clone())
                        .with_upvalues(upvalues);
                    thunks.push(self.heap.alloc_thunk(thunk));
                }
                self.scratch = self.heap.alloc_array(thunks);
                Ok(Step::Unwind)
            }
            ExprKind::Binary { left, .. } => Ok(self.push_frame(FrameKind::BinaryLeft, ast, left)),
            ExprKind::BuiltinFunction { name, params } => {
                let text = self.interner.lookup(*name);
                let Some(builtin) = Builtin::from_name(text) else {
                    return Err(self.error(
                        ast.loc,
                        RuntimeErrorKind::UnknownBuiltin {
                            name: text.to_owned(),
                        },
                    ));
                };
                self.scratch = self.heap.alloc_closure(Closure {
                    upvalues: BindingFrame::new(),
                    self_: None,
                    offset: 0,
                    params: params.clone(),
                    body: ClosureBody::Builtin(builtin),
                });
                Ok(Step::Unwind)
            }
            ExprKind::Conditional { cond, .. } => Ok(self.push_frame(FrameKind::If, ast, cond)),
            ExprKind::Error(expr) => Ok(self.push_frame(FrameKind::Error, ast, expr)),
            ExprKind::Function { params, body } => {
                let (self_, offset) = self.stack.self_binding();
                let upvalues = self.capture(ast.free_vars());
                self.scratch = self.heap.alloc_closure(Closure {
                    upvalues,
                    self_,
                    offset,
                    params: params.clone(),
                    body: ClosureBody::Expr(body.clone()),
                });
                Ok(Step::Unwind)
            }
            ExprKind::Import(path) => {
                let thunk = self.import_code(ast.loc, path)?;
                self.enter_thunk(ast.loc, thunk)
            }
            ExprKind::Importstr(path) => {
                let content = self.import_string(ast.loc, path)?;
                self.scratch = self.heap.alloc_string(&content);
                Ok(Step::Unwind)
            }
            ExprKind::Index { target, .. } => Ok(self.push_frame(FrameKind::IndexTarget, ast, target)),
            ExprKind::InSuper(element) => Ok(self.push_frame(FrameKind::InSuperElement, ast, element)),
            ExprKind::Local { binds, body } => {
                let (self_, offset) = self.stack.self_binding();
                let mut frame = Frame::new(FrameKind::Local, ast);
                let mut thunks: Vec<HeapId> = Vec::with_capacity(binds.len());
                for bind in binds {
                    let thunk = self.heap.alloc_thunk(Thunk::pending(
                        Some(bind.name),
                        self_,
                        offset,
                        bind.body.clone(),
                    ));
                    frame.bindings.insert(bind.name, thunk);
                    thunks.push(thunk);
                }
                self.stack.push(frame);
                // Capture only once every binding is in scope, so bindings
                // can refer to each other.
                for (bind, thunk) in binds.iter().zip(thunks) {
                    let upvalues = self.capture(bind.body.free_vars());
                    self.heap.thunk_mut(thunk).set_upvalues(upvalues);
                }
                Ok(Step::Eval(body.clone()))
            }
            ExprKind::Null => Ok(self.literal(Value::Null)),
            ExprKind::True => Ok(self.literal(Value::Boolean(true))),
            ExprKind::False => Ok(self.literal(Value::Boolean(false))),
            ExprKind::Number(n) => Ok(self.literal(Value::Number(*n))),
            ExprKind::Str(s) => {
                self.scratch = self.heap.alloc_string(s);
                Ok(Step::Unwind)
            }
            ExprKind::Object { asserts, fields } => match fields.first() {
                None => {
                    let upvalues = self.capture(ast.free_vars());
                    self.scratch = self.heap.alloc_object(Object::Simple {
                        upvalues,
                        fields: FxHashMap::default(),
                        asserts: asserts.clone(),
                    });
                    Ok(Step::Unwind)
                }
                Some(first) => Ok(self.push_frame(FrameKind::Object, ast, &first.name)),
            },
            ExprKind::ObjectComp { array, .. } => {
                Ok(self.push_frame(FrameKind::ObjectCompArray, ast, array))
            }
            ExprKind::SelfRef => match self.stack.self_binding() {
                (Some(object), _) => Ok(self.literal(Value::Object(object))),
                (None, _) => no_self(),
            },
            ExprKind::SuperIndex(index) => Ok(self.push_frame(FrameKind::SuperIndex, ast, index)),
            ExprKind::Unary { expr, .. } => Ok(self.push_frame(FrameKind::Unary, ast, expr)),
            ExprKind::Var(name) => {
                let thunk = self.lookup(*name);
                self.enter_thunk(ast.loc, thunk)
            }
        }
    }

    fn push_frame(&mut self, kind: FrameKind, ast: &Expr, child: &Expr) -> Step {
        self.stack.push(Frame::new(kind, ast));
        Step::Eval(child.clone())
    }

    fn literal(&mut self, value: Value) -> Step {
        self.scratch = value;
        Step::Unwind
    }
}

#[cold]
#[inline(never)]
fn no_self() -> ! {
    panic!("self evaluated with no enclosing object after static analysis")
}
