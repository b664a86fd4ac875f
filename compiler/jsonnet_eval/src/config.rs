//! Evaluator configuration.

/// Knobs for one evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalConfig {
    /// Maximum number of live call frames.
    pub max_stack: usize,
    /// The collector does not run while fewer entities are live.
    pub gc_min_objects: usize,
    /// Growth since the last cycle that triggers a new one.
    pub gc_growth_trigger: f64,
    /// Expect a string result and emit it verbatim instead of as JSON.
    pub string_output: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_stack: 500,
            gc_min_objects: 1000,
            gc_growth_trigger: 2.0,
            string_output: false,
        }
    }
}

/// Value of an external variable read by `std.extVar`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtVar {
    /// Bound as a string.
    Str(String),
    /// Jsonnet source, compiled and evaluated on each read.
    Code(String),
}
