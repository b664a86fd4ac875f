//! Host stack growth for recursive walks.
//!
//! The evaluator itself never recurses on the host stack in proportion to
//! Jsonnet call depth; it runs on an explicit frame stack. A few walks are
//! still naturally recursive over the *shape* of their input:
//!
//! - the parser descending into nested expressions,
//! - the desugarer and static analyzer walking the AST,
//! - manifestation walking nested arrays and objects,
//! - conversion of native-callback JSON results into heap values.
//!
//! Those walks wrap each level in [`ensure_sufficient_stack`], which grows
//! the host stack on demand through `stacker`.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the host stack if fewer than [`RED_ZONE`] bytes
/// remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
