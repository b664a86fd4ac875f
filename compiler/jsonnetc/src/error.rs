//! Errors surfaced by the driver.

use jsonnet_eval::EvalError;
use jsonnet_ir::StringInterner;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that stops a `jsonnet` invocation.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Bad command line; the message is shown above the usage text.
    #[error("ERROR: {0}")]
    Usage(String),

    #[error("ERROR: opening input file: {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ERROR: writing to output file: {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Evaluation failed; `rendered` is the report with its trace.
    #[error("{rendered}")]
    Eval { error: EvalError, rendered: String },
}

impl DriverError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub(crate) fn eval(error: EvalError, interner: &StringInterner) -> Self {
        let rendered = error.render(interner).trim_end().to_owned();
        Self::Eval { error, rendered }
    }

    /// The evaluation error, if evaluation is what failed.
    pub fn as_eval(&self) -> Option<&EvalError> {
        match self {
            Self::Eval { error, .. } => Some(error),
            _ => None,
        }
    }
}
