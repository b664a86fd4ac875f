//! Rendering values as JSON.
//!
//! Manifestation is the one place that walks a value recursively on the
//! host stack; each array element and object field it visits is evaluated
//! to completion on a nested trampoline under its own Call frame, so errors
//! inside it get a trace. The container being walked is parked in that
//! frame's `val` so the collector can see it.

use super::Evaluator;
use crate::errors::{EvalError, RuntimeErrorKind};
use crate::heap::HeapId;
use crate::number::unparse;
use crate::value::{BindingFrame, Value};
use jsonnet_ir::{LocationRange, Name};
use std::collections::BTreeMap;

/// Added per nesting level in multi-line output.
const INDENT: &str = "   ";

impl Evaluator<'_> {
    /// Append the scratch register as JSON to `out`.
    pub(super) fn manifest_json(
        &mut self,
        loc: LocationRange,
        multiline: bool,
        indent: &str,
        out: &mut String,
    ) -> Result<(), EvalError> {
        jsonnet_stack::ensure_sufficient_stack(|| self.manifest_value(loc, multiline, indent, out))
    }

    fn manifest_value(
        &mut self,
        loc: LocationRange,
        multiline: bool,
        indent: &str,
        out: &mut String,
    ) -> Result<(), EvalError> {
        match self.scratch {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if b { "true" } else { "false" }),
            Value::Number(n) => unparse(n, out),
            Value::String(id) => escape_json_quoted(self.heap.string(id).iter().copied(), out),
            Value::Function(_) => return Err(self.error(loc, RuntimeErrorKind::ManifestFunction)),
            Value::Array(array) => {
                let elements = self.heap.array(array).to_vec();
                if elements.is_empty() {
                    out.push_str("[ ]");
                    return Ok(());
                }
                let inner = nested_indent(multiline, indent);
                let mut prefix = if multiline { "[\n" } else { "[" };
                for thunk in elements {
                    let element_loc = self.enter_element(loc, Value::Array(array), thunk)?;
                    out.push_str(prefix);
                    out.push_str(&inner);
                    self.manifest_json(element_loc, multiline, &inner, out)?;
                    self.stack.pop();
                    prefix = if multiline { ",\n" } else { ", " };
                }
                close(out, multiline, indent, ']');
            }
            Value::Object(object) => {
                self.run_invariants(loc, object)?;
                let fields = self.sorted_fields(object);
                if fields.is_empty() {
                    out.push_str("{ }");
                    return Ok(());
                }
                let inner = nested_indent(multiline, indent);
                let mut prefix = if multiline { "{\n" } else { "{" };
                for (key, name) in fields {
                    let body = self.object_index(loc, object, name, 0)?;
                    self.stack.top_mut().val = Value::Object(object);
                    self.evaluate(body.clone(), self.stack.len())?;
                    out.push_str(prefix);
                    out.push_str(&inner);
                    escape_json_quoted(key.chars(), out);
                    out.push_str(": ");
                    self.manifest_json(body.loc, multiline, &inner, out)?;
                    self.stack.pop();
                    prefix = if multiline { ",\n" } else { ", " };
                }
                close(out, multiline, indent, '}');
            }
        }
        Ok(())
    }

    /// Visible fields of `object` ordered by name.
    fn sorted_fields(&self, object: HeapId) -> Vec<(&'static str, Name)> {
        let mut fields: Vec<_> = self
            .object_fields(object, false)
            .into_iter()
            .map(|name| (self.interner.lookup(name), name))
            .collect();
        fields.sort_unstable_by_key(|&(key, _)| key);
        fields
    }

    /// Push a Call frame for the element `thunk` of `container` and leave the
    /// element's value in the scratch register, filling the thunk. Returns
    /// the location to report errors in the element at. The caller pops the
    /// frame.
    fn enter_element(
        &mut self,
        loc: LocationRange,
        container: Value,
        thunk: HeapId,
    ) -> Result<LocationRange, EvalError> {
        let pending = self.heap.thunk(thunk).pending_state().cloned();
        match pending {
            None => {
                self.push_call(loc, thunk, None, 0, BindingFrame::new())?;
                self.stack.top_mut().val = container;
                self.scratch = self.forced(thunk);
                Ok(loc)
            }
            Some(pending) => {
                let element_loc = pending.body.loc;
                self.push_call(element_loc, thunk, pending.self_, pending.offset, pending.upvalues)?;
                self.stack.top_mut().val = container;
                self.evaluate(pending.body, self.stack.len())?;
                let value = self.scratch;
                self.heap.thunk_mut(thunk).fill(value);
                Ok(element_loc)
            }
        }
    }

    /// Compact JSON of the scratch register, as used by string conversion.
    pub(super) fn to_json_string(&mut self, loc: LocationRange) -> Result<String, EvalError> {
        let mut out = String::new();
        self.manifest_json(loc, false, "", &mut out)?;
        Ok(out)
    }

    /// The scratch register, which must be a string, verbatim.
    pub(super) fn manifest_string(&self, loc: LocationRange) -> Result<String, EvalError> {
        match self.scratch {
            Value::String(id) => Ok(self.string_text(id)),
            other => Err(self.error(loc, RuntimeErrorKind::ExpectedString { got: other.type_name() })),
        }
    }

    /// One document per visible field of the top-level object.
    pub(super) fn manifest_multi(&mut self) -> Result<BTreeMap<String, String>, EvalError> {
        let loc = self.manifestation_loc();
        let Value::Object(object) = self.scratch else {
            return Err(self.error(
                loc,
                RuntimeErrorKind::MultiNotObject {
                    got: self.scratch.type_name(),
                },
            ));
        };
        self.run_invariants(loc, object)?;
        let mut documents = BTreeMap::new();
        for (key, name) in self.sorted_fields(object) {
            let body = self.object_index(loc, object, name, 0)?;
            self.stack.top_mut().val = Value::Object(object);
            self.evaluate(body.clone(), self.stack.len())?;
            let document = if self.config.string_output {
                self.manifest_string(body.loc)?
            } else {
                let mut out = String::new();
                self.manifest_json(body.loc, true, "", &mut out)?;
                out
            };
            self.stack.pop();
            documents.insert(key.to_owned(), document);
        }
        Ok(documents)
    }

    /// One document per element of the top-level array.
    pub(super) fn manifest_stream(&mut self) -> Result<Vec<String>, EvalError> {
        let loc = self.manifestation_loc();
        let Value::Array(array) = self.scratch else {
            return Err(self.error(
                loc,
                RuntimeErrorKind::StreamNotArray {
                    got: self.scratch.type_name(),
                },
            ));
        };
        let elements = self.heap.array(array).to_vec();
        let mut documents = Vec::with_capacity(elements.len());
        for thunk in elements {
            let element_loc = self.enter_element(loc, Value::Array(array), thunk)?;
            let mut out = String::new();
            self.manifest_json(element_loc, true, "", &mut out)?;
            self.stack.pop();
            documents.push(out);
        }
        Ok(documents)
    }
}

fn nested_indent(multiline: bool, indent: &str) -> String {
    if multiline {
        format!("{indent}{INDENT}")
    } else {
        indent.to_owned()
    }
}

fn close(out: &mut String, multiline: bool, indent: &str, bracket: char) {
    if multiline {
        out.push('\n');
    }
    out.push_str(indent);
    out.push(bracket);
}

/// Escape `chars` for the inside of a JSON string literal.
pub(crate) fn escape_json_into(chars: impl Iterator<Item = char>, out: &mut String) {
    use std::fmt::Write;
    for c in chars {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\u0000"),
            '\u{1}'..='\u{1f}' | '\u{7f}'..='\u{9f}' => {
                // Writing to a String cannot fail.
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
}

/// [`escape_json_into`] with surrounding double quotes.
pub(crate) fn escape_json_quoted(chars: impl Iterator<Item = char>, out: &mut String) {
    out.push('"');
    escape_json_into(chars, out);
    out.push('"');
}
