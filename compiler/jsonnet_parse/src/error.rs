//! Parse error types.

use jsonnet_ir::{LocationRange, StringInterner};
use std::fmt;

/// A parse failure at a source location.
///
/// Token descriptions are rendered when the error is created so the error
/// does not need the interner to display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub loc: LocationRange,
    pub kind: ParseErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was required.
    ExpectedToken { expected: String, got: String },
    /// A token that cannot start or continue the construct.
    Unexpected { got: String, context: &'static str },
    UnexpectedEof,
    /// Input continues after a complete expression.
    TrailingInput { got: String },
    NotUnaryOperator { op: String },
    NotBinaryOperator { op: String },
    ExpectedFieldSeparator { got: String },
    ExpectedComma { context: &'static str },
    ExpectedCompSpec { end: &'static str, got: String },
    SuperWithoutIndex,
    MethodWithPlus { field: String },
    ComputedImport,
    ComprehensionWithAsserts,
    ComprehensionFieldCount,
    ComprehensionHiddenField,
    ComprehensionNamedField,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedToken { expected, got } => {
                write!(f, "Expected token {expected} but got {got}")
            }
            Self::Unexpected { got, context } => {
                write!(f, "Unexpected: {got} while parsing {context}")
            }
            Self::UnexpectedEof => write!(f, "Unexpected end of file."),
            Self::TrailingInput { got } => write!(f, "Did not expect: {got}"),
            Self::NotUnaryOperator { op } => write!(f, "Not a unary operator: {op}"),
            Self::NotBinaryOperator { op } => write!(f, "Not a binary operator: {op}"),
            Self::ExpectedFieldSeparator { got } => {
                write!(f, "Expected one of :, ::, :::, +:, +::, +:::, got: {got}")
            }
            Self::ExpectedComma { context } => write!(f, "Expected a comma before next {context}."),
            Self::ExpectedCompSpec { end, got } => {
                write!(f, "Expected for, if or \"{end}\" after for clause, got: {got}")
            }
            Self::SuperWithoutIndex => write!(f, "Expected . or [ after super."),
            Self::MethodWithPlus { field } => {
                write!(f, "Cannot use +: syntax sugar in a method: {field}")
            }
            Self::ComputedImport => write!(f, "Computed imports are not allowed."),
            Self::ComprehensionWithAsserts => {
                write!(f, "Object comprehension cannot have asserts.")
            }
            Self::ComprehensionFieldCount => {
                write!(f, "Object comprehension can only have one field.")
            }
            Self::ComprehensionHiddenField => {
                write!(f, "Object comprehensions cannot have hidden fields.")
            }
            Self::ComprehensionNamedField => {
                write!(f, "Object comprehensions can only have [e] fields.")
            }
        }
    }
}

impl ParseError {
    pub fn new(loc: LocationRange, kind: ParseErrorKind) -> Self {
        ParseError { loc, kind }
    }

    /// Render as `file:line:col: message`.
    pub fn render(&self, interner: &StringInterner) -> String {
        format!("{}: {}", self.loc.display(interner), self.kind)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}
