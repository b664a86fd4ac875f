//! Jsonnet driver: the embedding [`Session`], the filesystem importer and
//! the `jsonnet` command line.
//!
//! # Pipeline
//!
//! ```text
//! source ──► jsonnet_desugar::Compiler ──► core AST
//!                                             │
//!                                             ▼
//!                     jsonnet_eval::Evaluator (heap, frames, GC)
//!                                             │
//!                                             ▼
//!                          JSON document / multi / stream
//! ```

pub mod cli;
mod error;
mod importer;
mod logging;
mod session;

pub use error::DriverError;
pub use importer::FileImporter;
pub use logging::init_tracing;
pub use session::Session;

// The evaluator's public surface, for embedders depending on this crate only.
pub use jsonnet_eval::{
    EvalConfig, EvalError, ExtVar, ImportCallback, ImportedFile, JsonValue, RuntimeError, RuntimeErrorKind,
};
