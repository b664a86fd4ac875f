//! Host functions exposed through `std.native`.

use std::collections::BTreeMap;
use std::fmt;

/// A JSON document exchanged with native callbacks.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(BTreeMap<String, JsonValue>),
}

/// Signature of a native callback. An `Err` becomes a runtime error with
/// that message.
pub type NativeFn = dyn Fn(&[JsonValue]) -> Result<JsonValue, String>;

/// A named host function with its declared parameters.
pub struct NativeCallback {
    pub params: Vec<String>,
    pub func: Box<NativeFn>,
}

impl NativeCallback {
    pub fn new<F>(params: &[&str], func: F) -> Self
    where
        F: Fn(&[JsonValue]) -> Result<JsonValue, String> + 'static,
    {
        NativeCallback {
            params: params.iter().map(|p| (*p).to_owned()).collect(),
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for NativeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallback")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
