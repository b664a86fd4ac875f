//! Runtime errors and stack traces.
//!
//! # Structured Error Categories
//!
//! [`RuntimeErrorKind`] names every failure the evaluator can report; its
//! `Display` impl is the user-facing message. [`RuntimeError`] pairs the
//! message with the trace captured from the evaluation stack at the point of
//! failure.

use jsonnet_desugar::StaticError;
use jsonnet_ir::{BinaryOp, StringInterner, UnaryOp};
use std::fmt;

/// Typed error category.
///
/// Type names are the ones `std.type` reports (`"number"`, `"object"`, ...)
/// or, for the "does not operate on" family, their plural forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    // Arithmetic
    NotANumber,
    Overflow,
    DivisionByZero,

    // Operators
    InLeftNotString {
        got: &'static str,
    },
    InRightNotObject {
        got: &'static str,
    },
    InSuperNotString {
        got: &'static str,
    },
    BinaryTypeMismatch {
        op: BinaryOp,
        left: &'static str,
        right: &'static str,
    },
    BinaryUnsupported {
        op: BinaryOp,
        operands: &'static str,
    },
    UnaryUnsupported {
        op: UnaryOp,
        operands: &'static str,
    },
    UnaryBadType {
        op: UnaryOp,
        got: &'static str,
    },
    ConditionNotBoolean {
        got: &'static str,
    },

    // Indexing
    NotIndexable {
        got: &'static str,
    },
    ArrayIndexNotNumber {
        got: &'static str,
    },
    ArrayBounds {
        index: i64,
        len: usize,
    },
    ObjectIndexNotString {
        got: &'static str,
    },
    StringIndexNotNumber {
        got: &'static str,
    },
    StringBounds {
        index: i64,
        len: usize,
    },
    FieldNotFound {
        field: String,
    },
    NoSuperClass,
    SuperIndexNotString {
        got: &'static str,
    },

    // Calls
    NotCallable {
        got: &'static str,
    },
    PositionalAfterNamed {
        index: usize,
    },
    TooManyArgs {
        params: usize,
    },
    ParamBoundTwice {
        name: String,
    },
    NoSuchParam {
        name: String,
    },
    ParamNotBound {
        name: String,
    },
    StackOverflow,

    // Objects
    FieldNameNotString,
    DuplicateField {
        name: String,
    },
    ComprehensionNeedsArray {
        got: &'static str,
    },
    ComprehensionFieldNotString {
        got: &'static str,
    },

    // Builtins
    BuiltinArgs {
        name: &'static str,
        expected: Vec<&'static str>,
        got: Vec<&'static str>,
    },
    /// A builtin precondition that is not a type check.
    BuiltinFailed {
        message: String,
    },
    UndefinedExtVar {
        name: String,
    },
    UnknownNative {
        name: String,
    },
    UnknownBuiltin {
        name: String,
    },
    NativeNonPrimitiveArg,
    ImportFailed {
        path: String,
        reason: String,
    },

    // Manifestation
    ManifestFunction,
    ExpectedString {
        got: &'static str,
    },
    MultiNotObject {
        got: &'static str,
    },
    StreamNotArray {
        got: &'static str,
    },

    /// `error e`, a failed assert, or a native callback's error string.
    User {
        message: String,
    },
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "Not a number"),
            Self::Overflow => write!(f, "Overflow"),
            Self::DivisionByZero => write!(f, "Division by zero."),
            Self::InLeftNotString { got } => write!(
                f,
                "The left hand side of the 'in' operator should be a string,  got {got}"
            ),
            Self::InRightNotObject { got } => write!(
                f,
                "The right hand side of the 'in' operator should be an object, got {got}"
            ),
            Self::InSuperNotString { got } => {
                write!(f, "Left hand side of e in super must be string, got {got}.")
            }
            Self::BinaryTypeMismatch { op, left, right } => write!(
                f,
                "Binary operator {op} requires matching types, got {left} and {right}."
            ),
            Self::BinaryUnsupported { op, operands } => {
                write!(f, "Binary operator {op} does not operate on {operands}.")
            }
            Self::UnaryUnsupported { op, operands } => {
                write!(f, "Unary operator {op} does not operate on {operands}.")
            }
            Self::UnaryBadType { op, got } => {
                write!(f, "Unary operator {op} does not operate on type {got}")
            }
            Self::ConditionNotBoolean { got } => {
                write!(f, "Condition must be boolean, got {got}.")
            }
            Self::NotIndexable { got } => {
                write!(f, "Can only index objects, strings, and arrays, got {got}.")
            }
            Self::ArrayIndexNotNumber { got } => {
                write!(f, "Array index must be number, got {got}.")
            }
            Self::ArrayBounds { index, len } => {
                write!(f, "Array bounds error: {index} not within [0, {len})")
            }
            Self::ObjectIndexNotString { got } => {
                write!(f, "Object index must be string, got {got}.")
            }
            Self::StringIndexNotNumber { got } => {
                write!(f, "String index must be a number, got {got}.")
            }
            Self::StringBounds { index, len } => {
                write!(f, "String bounds error: {index} not within [0, {len})")
            }
            Self::FieldNotFound { field } => write!(f, "Field does not exist: {field}"),
            Self::NoSuperClass => {
                write!(f, "Attempt to use super when there is no super class.")
            }
            Self::SuperIndexNotString { got } => {
                write!(f, "Super index must be string, got {got}.")
            }
            Self::NotCallable { got } => write!(f, "Only functions can be called, got {got}"),
            Self::PositionalAfterNamed { index } => write!(
                f,
                "Internal error: got positional param after named at index {index}"
            ),
            Self::TooManyArgs { params } => {
                write!(f, "Too many args, function has {params} parameter(s)")
            }
            Self::ParamBoundTwice { name } => {
                write!(f, "Binding parameter a second time: {name}")
            }
            Self::NoSuchParam { name } => write!(f, "Function has no parameter {name}"),
            Self::ParamNotBound { name } => {
                write!(f, "Function parameter {name} not bound in call.")
            }
            Self::StackOverflow => write!(f, "Max stack frames exceeded."),
            Self::FieldNameNotString => write!(f, "Field name was not a string."),
            Self::DuplicateField { name } => write!(f, "Duplicate field name: \"{name}\""),
            Self::ComprehensionNeedsArray { got } => {
                write!(f, "Object comprehension needs array, got {got}")
            }
            Self::ComprehensionFieldNotString { got } => {
                write!(f, "field must be string, got: {got}")
            }
            Self::BuiltinArgs {
                name,
                expected,
                got,
            } => write!(
                f,
                "Builtin function {name} expected ({}) but got ({})",
                expected.join(", "),
                got.join(", ")
            ),
            Self::BuiltinFailed { message } | Self::User { message } => f.write_str(message),
            Self::UndefinedExtVar { name } => write!(f, "Undefined external variable: {name}"),
            Self::UnknownNative { name } => write!(f, "Unrecognized native function name: {name}"),
            Self::UnknownBuiltin { name } => write!(f, "Unrecognized builtin name: {name}"),
            Self::NativeNonPrimitiveArg => {
                write!(f, "Native extensions can only take primitives.")
            }
            Self::ImportFailed { path, reason } => {
                write!(f, "Couldn't open import \"{path}\": {reason}")
            }
            Self::ManifestFunction => write!(f, "Couldn't manifest function in JSON output."),
            Self::ExpectedString { got } => write!(f, "Expected string result, got: {got}"),
            Self::MultiNotObject { got } => write!(
                f,
                "Multi mode: Top-level object was a {got}, should be an object whose keys are \
                 filenames and values hold the JSON for that file."
            ),
            Self::StreamNotArray { got } => write!(
                f,
                "Stream mode: Top-level object was a {got}, should be an array whose elements \
                 hold the JSON for each document in the stream."
            ),
        }
    }
}

/// One line of a stack trace: a rendered location and the name of what was
/// running there (possibly empty).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub location: String,
    pub name: String,
}

/// A runtime failure with its stack trace, innermost frame first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub trace: Vec<TraceFrame>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, trace: Vec<TraceFrame>) -> Self {
        RuntimeError {
            message: kind.to_string(),
            kind,
            trace,
        }
    }

    /// Render as `RUNTIME ERROR: msg` followed by one `\tlocation\tname`
    /// line per trace frame.
    pub fn render(&self) -> String {
        let mut out = format!("RUNTIME ERROR: {}\n", self.message);
        for frame in &self.trace {
            out.push('\t');
            out.push_str(&frame.location);
            out.push('\t');
            out.push_str(&frame.name);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Anything evaluation can fail with. Static errors surface here when an
/// imported file or code external variable fails to compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalError {
    Static(StaticError),
    Runtime(RuntimeError),
}

impl EvalError {
    /// Render the way the command line reports it.
    pub fn render(&self, interner: &StringInterner) -> String {
        match self {
            EvalError::Static(err) => format!("{}\n", err.render(interner)),
            EvalError::Runtime(err) => err.render(),
        }
    }

    /// The runtime error, if this is one.
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            EvalError::Runtime(err) => Some(err),
            EvalError::Static(_) => None,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Static(err) => err.fmt(f),
            EvalError::Runtime(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<RuntimeError> for EvalError {
    fn from(err: RuntimeError) -> Self {
        EvalError::Runtime(err)
    }
}

impl From<StaticError> for EvalError {
    fn from(err: StaticError) -> Self {
        EvalError::Static(err)
    }
}

// Factories for messages built from runtime data.

#[cold]
pub(crate) fn builtin_failed(message: impl Into<String>) -> RuntimeErrorKind {
    RuntimeErrorKind::BuiltinFailed {
        message: message.into(),
    }
}

#[cold]
pub(crate) fn user_error(message: impl Into<String>) -> RuntimeErrorKind {
    RuntimeErrorKind::User {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests;
