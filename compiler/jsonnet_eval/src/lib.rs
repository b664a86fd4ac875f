//! Jsonnet Eval - the evaluation core of the Jsonnet toolchain.
//!
//! Takes a program compiled by [`jsonnet_desugar::Compiler`] and produces
//! its JSON manifestation.
//!
//! # Architecture
//!
//! - [`Evaluator`]: a trampoline over an explicit frame stack, so Jsonnet
//!   recursion depth is bounded by [`EvalConfig::max_stack`] rather than the
//!   host stack
//! - `heap`: an arena of strings, arrays, closures, objects and thunks with
//!   mark-sweep collection
//! - `stack`: Call frame accounting, tail-call trimming and stack traces
//! - [`ImportCallback`] / [`NativeCallback`]: the host hooks for `import`
//!   and `std.native`
//!
//! # Output modes
//!
//! [`Evaluator::evaluate_json`] renders one document;
//! [`Evaluator::evaluate_multi`] renders each field of a top-level object
//! and [`Evaluator::evaluate_stream`] each element of a top-level array.

mod config;
mod errors;
mod frame;
mod heap;
mod import;
mod interpreter;
mod natives;
mod number;
mod stack;
mod value;

pub use config::{EvalConfig, ExtVar};
pub use errors::{EvalError, RuntimeError, RuntimeErrorKind, TraceFrame};
pub use import::{ImportCallback, ImportedFile};
pub use interpreter::{Evaluator, HeapStats};
pub use natives::{JsonValue, NativeCallback, NativeFn};
pub use value::Value;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
