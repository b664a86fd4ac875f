//! Jsonnet IR - shared data types for the Jsonnet toolchain.
//!
//! - [`Name`] / [`StringInterner`]: interned identifiers and field names
//! - [`LocationRange`]: line/column source ranges used in diagnostics
//! - [`ast`]: the surface syntax tree produced by the parser
//! - [`core`]: the desugared tree consumed by the evaluator
//! - [`builtins`]: declarations of the natively implemented `std` functions
//!
//! # Design
//!
//! - **Intern identifiers**: variables, parameters and field names are
//!   `Name(u32)`, so binding lookup and duplicate detection compare integers.
//! - **Two trees**: sugar lives only in [`ast`]; [`core`] is the closed set of
//!   node kinds the evaluator has to handle, so its dispatch is an exhaustive
//!   `match`.
//! - **Shared core nodes**: core expressions are reference counted because
//!   closures, thunks and object fields all keep pointers into the tree.

pub mod ast;
pub mod builtins;
pub mod core;
mod interner;
mod location;
mod name;
mod operators;

pub use interner::{InternError, StringInterner};
pub use location::{Location, LocationRange};
pub use name::Name;
pub use operators::{BinaryOp, UnaryOp, Visibility};
