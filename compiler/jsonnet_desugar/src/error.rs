//! Static errors: everything that fails before evaluation starts.

use jsonnet_ir::{LocationRange, StringInterner};
use jsonnet_lexer::LexError;
use jsonnet_parse::ParseError;
use std::fmt;

/// A lexing, parsing or analysis failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticError {
    pub loc: LocationRange,
    pub message: String,
}

impl StaticError {
    pub fn new(loc: LocationRange, message: impl Into<String>) -> Self {
        StaticError {
            loc,
            message: message.into(),
        }
    }

    /// Render as `STATIC ERROR: file:line:col: message`.
    pub fn render(&self, interner: &StringInterner) -> String {
        format!("STATIC ERROR: {}: {}", self.loc.display(interner), self.message)
    }
}

impl fmt::Display for StaticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StaticError {}

impl From<LexError> for StaticError {
    fn from(err: LexError) -> Self {
        StaticError::new(err.loc, err.kind.to_string())
    }
}

impl From<ParseError> for StaticError {
    fn from(err: ParseError) -> Self {
        StaticError::new(err.loc, err.kind.to_string())
    }
}

// Analysis error factories.

pub(crate) fn unknown_variable(loc: LocationRange, name: &str) -> StaticError {
    StaticError::new(loc, format!("Unknown variable: {name}"))
}

pub(crate) fn no_top_level_object(loc: LocationRange) -> StaticError {
    StaticError::new(loc, "No top-level object found.")
}

pub(crate) fn self_outside_object(loc: LocationRange) -> StaticError {
    StaticError::new(loc, "Can't use self outside of an object.")
}

pub(crate) fn super_outside_object(loc: LocationRange) -> StaticError {
    StaticError::new(loc, "Can't use super outside of an object.")
}

pub(crate) fn duplicate_local(loc: LocationRange, name: &str) -> StaticError {
    StaticError::new(loc, format!("Duplicate local var: {name}"))
}

pub(crate) fn duplicate_param(loc: LocationRange, name: &str) -> StaticError {
    StaticError::new(loc, format!("Duplicate function parameter: {name}"))
}
