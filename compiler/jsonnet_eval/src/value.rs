//! Runtime values and binding frames.

use crate::heap::HeapId;
use jsonnet_ir::Name;
use std::collections::BTreeMap;

/// A runtime value. Scalars are inline; everything else is a heap handle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(HeapId),
    Array(HeapId),
    Function(HeapId),
    Object(HeapId),
}

impl Value {
    /// Name reported by `std.type` and in error messages.
    pub const fn type_name(self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
        }
    }

    /// Plural form used by "does not operate on ..." messages.
    pub const fn plural_name(self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "booleans",
            Value::Number(_) => "numbers",
            Value::String(_) => "strings",
            Value::Array(_) => "arrays",
            Value::Function(_) => "functions",
            Value::Object(_) => "objects",
        }
    }

    pub const fn heap_id(self) -> Option<HeapId> {
        match self {
            Value::String(id) | Value::Array(id) | Value::Function(id) | Value::Object(id) => Some(id),
            Value::Null | Value::Boolean(_) | Value::Number(_) => None,
        }
    }
}

/// Identifier to thunk bindings, ordered by name.
pub type BindingFrame = BTreeMap<Name, HeapId>;
