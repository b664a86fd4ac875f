//! Natively implemented `std` functions.
//!
//! Every argument has been forced by the time a builtin runs. A builtin
//! either leaves its result in the scratch register and pops its argument
//! frame, or (`filter`, code `extVar`) hands evaluation back to the
//! trampoline.

use super::{wrong_node, Evaluator, Step};
use crate::config::ExtVar;
use crate::errors::{builtin_failed, EvalError, RuntimeErrorKind};
use crate::frame::FrameKind;
use crate::heap::{Closure, ClosureBody, Thunk};
use crate::number::{frexp, from_usize, truncate};
use crate::value::{BindingFrame, Value};
use jsonnet_ir::builtins::Builtin;
use jsonnet_ir::core::Param;
use jsonnet_ir::LocationRange;
use md5::{Digest, Md5};

/// Largest code point plus one.
const CODEPOINT_LIMIT: i64 = 0x11_0000;

impl Evaluator<'_> {
    pub(super) fn call_builtin(
        &mut self,
        loc: LocationRange,
        builtin: Builtin,
        args: &[Value],
    ) -> Result<Step, EvalError> {
        tracing::trace!(builtin = builtin.name(), "calling builtin");
        let value = match builtin {
            Builtin::Pow
            | Builtin::Floor
            | Builtin::Ceil
            | Builtin::Sqrt
            | Builtin::Sin
            | Builtin::Cos
            | Builtin::Tan
            | Builtin::Asin
            | Builtin::Acos
            | Builtin::Atan
            | Builtin::Log
            | Builtin::Exp
            | Builtin::Modulo => self.math(loc, builtin, args)?,
            Builtin::Mantissa | Builtin::Exponent => {
                let &[Value::Number(n)] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["number"]));
                };
                let (mantissa, exponent) = frexp(n);
                if builtin == Builtin::Mantissa {
                    Value::Number(mantissa)
                } else {
                    Value::Number(f64::from(exponent))
                }
            }
            Builtin::Type => {
                let &[value] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["any"]));
                };
                self.heap.alloc_string(value.type_name())
            }
            Builtin::Length => self.length(loc, args)?,
            Builtin::MakeArray => self.make_array(loc, args)?,
            Builtin::Filter => return self.filter(loc, args),
            Builtin::ObjectHasEx => {
                let &[Value::Object(object), Value::String(field), Value::Boolean(include_hidden)] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["object", "string", "boolean"]));
                };
                let name = self.intern_string(field);
                Value::Boolean(self.object_fields(object, include_hidden).contains(&name))
            }
            Builtin::ObjectFieldsEx => {
                let &[Value::Object(object), Value::Boolean(include_hidden)] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["object", "boolean"]));
                };
                let mut names: Vec<&'static str> = self
                    .object_fields(object, include_hidden)
                    .into_iter()
                    .map(|name| self.interner.lookup(name))
                    .collect();
                names.sort_unstable();
                let elements = names
                    .into_iter()
                    .map(|name| {
                        let value = self.heap.alloc_string(name);
                        self.heap
                            .alloc_thunk(Thunk::filled(Some(self.names.array_element), value))
                    })
                    .collect();
                self.heap.alloc_array(elements)
            }
            Builtin::Codepoint => {
                let &[Value::String(string)] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["string"]));
                };
                match *self.heap.string(string) {
                    [c] => Value::Number(f64::from(u32::from(c))),
                    ref chars => {
                        let message = format!("codepoint takes a string of length 1, got length {}", chars.len());
                        return Err(self.error(loc, builtin_failed(message)));
                    }
                }
            }
            Builtin::Char => {
                let &[Value::Number(n)] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["number"]));
                };
                let code = truncate(n);
                if code < 0 {
                    return Err(self.error(loc, builtin_failed(format!("Codepoints must be >= 0, got {code}"))));
                }
                let Some(c) = u32::try_from(code)
                    .ok()
                    .filter(|_| code < CODEPOINT_LIMIT)
                    .and_then(char::from_u32)
                else {
                    return Err(self.error(loc, builtin_failed(format!("Invalid unicode codepoint, got {code}"))));
                };
                self.heap.alloc_chars(vec![c])
            }
            Builtin::Md5 => {
                let &[Value::String(string)] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["string"]));
                };
                let digest = Md5::digest(self.string_text(string).as_bytes());
                self.heap.alloc_string(&format!("{digest:x}"))
            }
            Builtin::ExtVar => return self.ext_var(loc, args),
            Builtin::PrimitiveEquals => self.primitive_equals(loc, args)?,
            Builtin::Native => {
                let &[Value::String(name)] = args else {
                    return Err(self.bad_args(loc, builtin, args, &["string"]));
                };
                let name = self.string_text(name);
                let Some(callback) = self.natives.get(&name) else {
                    return Err(self.error(loc, RuntimeErrorKind::UnknownNative { name }));
                };
                let params = callback
                    .params
                    .iter()
                    .map(|param| Param {
                        name: self.interner.intern(param),
                        default: None,
                    })
                    .collect();
                self.heap.alloc_closure(Closure {
                    upvalues: BindingFrame::new(),
                    self_: None,
                    offset: 0,
                    params,
                    body: ClosureBody::Native(name.into()),
                })
            }
        };
        Ok(self.pop_with(value))
    }

    #[cold]
    fn bad_args(&self, loc: LocationRange, builtin: Builtin, args: &[Value], expected: &[&'static str]) -> EvalError {
        self.error(
            loc,
            RuntimeErrorKind::BuiltinArgs {
                name: builtin.name(),
                expected: expected.to_vec(),
                got: args.iter().map(|arg| arg.type_name()).collect(),
            },
        )
    }

    fn math(&self, loc: LocationRange, builtin: Builtin, args: &[Value]) -> Result<Value, EvalError> {
        if let Builtin::Pow | Builtin::Modulo = builtin {
            let &[Value::Number(a), Value::Number(b)] = args else {
                return Err(self.bad_args(loc, builtin, args, &["number", "number"]));
            };
            if builtin == Builtin::Modulo && b == 0.0 {
                return Err(self.error(loc, RuntimeErrorKind::DivisionByZero));
            }
            let n = if builtin == Builtin::Pow { a.powf(b) } else { a % b };
            return self.checked_number(loc, n);
        }
        let &[Value::Number(x)] = args else {
            return Err(self.bad_args(loc, builtin, args, &["number"]));
        };
        let n = match builtin {
            Builtin::Floor => x.floor(),
            Builtin::Ceil => x.ceil(),
            Builtin::Sqrt => x.sqrt(),
            Builtin::Sin => x.sin(),
            Builtin::Cos => x.cos(),
            Builtin::Tan => x.tan(),
            Builtin::Asin => x.asin(),
            Builtin::Acos => x.acos(),
            Builtin::Atan => x.atan(),
            Builtin::Log => x.ln(),
            Builtin::Exp => x.exp(),
            _ => not_unary_math(builtin),
        };
        self.checked_number(loc, n)
    }

    fn length(&self, loc: LocationRange, args: &[Value]) -> Result<Value, EvalError> {
        let len = match *args {
            [Value::Array(array)] => self.heap.array(array).len(),
            [Value::String(string)] => self.heap.string(string).len(),
            [Value::Object(object)] => self.object_fields(object, false).len(),
            [Value::Function(func)] => self.heap.closure(func).params.len(),
            [other] => {
                let message = format!("length operates on strings, objects, functions and arrays, got {}", other.type_name());
                return Err(self.error(loc, builtin_failed(message)));
            }
            _ => return Err(self.bad_args(loc, Builtin::Length, args, &["any"])),
        };
        Ok(Value::Number(from_usize(len)))
    }

    /// `std.makeArray(sz, func)`: element `i` is a pending thunk for
    /// `func(i)`, so unused elements are never computed.
    fn make_array(&mut self, loc: LocationRange, args: &[Value]) -> Result<Value, EvalError> {
        let &[Value::Number(size), Value::Function(func)] = args else {
            return Err(self.bad_args(loc, Builtin::MakeArray, args, &["number", "function"]));
        };
        let size = truncate(size);
        let Ok(size) = usize::try_from(size) else {
            return Err(self.error(loc, builtin_failed(format!("makeArray requires size >= 0, got {size}"))));
        };
        let closure = self.heap.closure(func);
        let (self_, offset, upvalues) = (closure.self_, closure.offset, closure.upvalues.clone());
        let param = match (&closure.body, &*closure.params) {
            (ClosureBody::Expr(body), [param]) => Some((param.name, body.clone())),
            (ClosureBody::Expr(_), params) => {
                let message = format!("makeArray function must take 1 param, got: {}", params.len());
                return Err(self.error(loc, builtin_failed(message)));
            }
            (ClosureBody::Builtin(_) | ClosureBody::Native(_), _) => None,
        };

        let mut elements = Vec::with_capacity(size);
        for i in 0..size {
            let thunk = match &param {
                Some((name, body)) => {
                    let mut env = upvalues.clone();
                    env.insert(*name, self.index_thunk(*name, i));
                    Thunk::pending(Some(self.names.array_element), self_, offset, body.clone()).with_upvalues(env)
                }
                None => {
                    let target = self
                        .heap
                        .alloc_thunk(Thunk::filled(Some(self.names.apply_fn), Value::Function(func)));
                    let index = self.index_thunk(self.names.apply_arg, i);
                    let env = BindingFrame::from([(self.names.apply_fn, target), (self.names.apply_arg, index)]);
                    Thunk::pending(Some(self.names.array_element), None, 0, self.synthetic.apply.clone())
                        .with_upvalues(env)
                }
            };
            elements.push(self.heap.alloc_thunk(thunk));
        }
        Ok(self.heap.alloc_array(elements))
    }

    /// `std.filter(func, arr)`: call `func` on each element in turn from a
    /// BuiltinFilter frame, collecting the elements it accepts.
    fn filter(&mut self, loc: LocationRange, args: &[Value]) -> Result<Step, EvalError> {
        let &[Value::Function(func), Value::Array(array)] = args else {
            return Err(self.bad_args(loc, Builtin::Filter, args, &["function", "array"]));
        };
        if let ClosureBody::Expr(_) = self.heap.closure(func).body {
            if self.heap.closure(func).params.len() != 1 {
                return Err(self.error(loc, builtin_failed("filter function takes 1 parameter.")));
            }
        }
        let Some(&first) = self.heap.array(array).first() else {
            let empty = self.heap.alloc_array(Vec::new());
            return Ok(self.pop_with(empty));
        };
        let frame = self.stack.top_mut();
        frame.kind = FrameKind::BuiltinFilter;
        frame.val = Value::Function(func);
        frame.val2 = Value::Array(array);
        frame.thunks.clear();
        frame.element_id = 0;
        self.call_function(loc, func, &[(None, first)], false)
    }

    pub(super) fn builtin_filter_next(&mut self) -> Result<Step, EvalError> {
        let frame = self.stack.top();
        let (loc, cursor) = (frame.loc, frame.element_id);
        let (Value::Function(func), Value::Array(array)) = (frame.val, frame.val2) else {
            wrong_node(FrameKind::BuiltinFilter)
        };
        let Value::Boolean(keep) = self.scratch else {
            let message = format!("filter function must return boolean, got: {}", self.scratch.type_name());
            return Err(self.error(loc, builtin_failed(message)));
        };
        let elements = self.heap.array(array);
        let (current, next) = (elements[cursor], elements.get(cursor + 1).copied());
        let frame = self.stack.top_mut();
        if keep {
            frame.thunks.push(current);
        }
        if let Some(next) = next {
            frame.element_id = cursor + 1;
            return self.call_function(loc, func, &[(None, next)], false);
        }
        let kept = std::mem::take(&mut frame.thunks);
        let result = self.heap.alloc_array(kept);
        Ok(self.pop_with(result))
    }

    /// `std.extVar(x)`: a string variable is returned as is; a code variable
    /// is compiled and evaluated in place of the builtin's result.
    fn ext_var(&mut self, loc: LocationRange, args: &[Value]) -> Result<Step, EvalError> {
        let &[Value::String(name)] = args else {
            return Err(self.bad_args(loc, Builtin::ExtVar, args, &["string"]));
        };
        let name = self.string_text(name);
        match self.ext_vars.get(&name).cloned() {
            None => Err(self.error(loc, RuntimeErrorKind::UndefinedExtVar { name })),
            Some(ExtVar::Str(value)) => {
                let value = self.heap.alloc_string(&value);
                Ok(self.pop_with(value))
            }
            Some(ExtVar::Code(code)) => {
                let program = self.compiler.compile(&format!("<extvar:{name}>"), &code)?;
                self.stack.pop();
                Ok(Step::Eval(program))
            }
        }
    }

    fn primitive_equals(&self, loc: LocationRange, args: &[Value]) -> Result<Value, EvalError> {
        let &[a, b] = args else {
            return Err(self.bad_args(loc, Builtin::PrimitiveEquals, args, &["any", "any"]));
        };
        let equal = match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => self.heap.string(a) == self.heap.string(b),
            (Value::Function(_), Value::Function(_)) => {
                return Err(self.error(loc, builtin_failed("Cannot test equality of functions")));
            }
            (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
                let message = format!("primitiveEquals operates on primitive types, got {}", a.type_name());
                return Err(self.error(loc, builtin_failed(message)));
            }
            _ => false,
        };
        Ok(Value::Boolean(equal))
    }
}

#[cold]
#[inline(never)]
fn not_unary_math(builtin: Builtin) -> ! {
    panic!("{builtin:?} is not a unary math builtin")
}
