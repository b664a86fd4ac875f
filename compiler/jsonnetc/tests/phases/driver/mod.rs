//! Driver phase tests.
//!
//! Tests for the `jsonnetc` crate, validating:
//! - `Session` evaluation in each output mode
//! - Filesystem import resolution and library paths
//! - Command-line parsing and execution
//!
//! # Test Organization
//!
//! - `session` - Embedding API
//! - `importer` - `FileImporter` search order and errors
//! - `cli` - Flag parsing and end-to-end runs

mod cli;
mod importer;
mod session;
