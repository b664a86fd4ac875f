//! End-to-end evaluator tests: source text in, manifested JSON or a runtime
//! error out.

mod error_tests;
mod eval_tests;
mod gc_tests;
mod object_tests;

use crate::{EvalConfig, EvalError, Evaluator, ImportCallback, ImportedFile, RuntimeError};
use jsonnet_desugar::Compiler;
use jsonnet_ir::StringInterner;
use std::collections::BTreeMap;

/// Compile `source` as `test.jsonnet`, let `setup` configure the evaluator,
/// and manifest the result.
pub(super) fn run_with(
    config: EvalConfig,
    source: &str,
    setup: impl FnOnce(&mut Evaluator<'_>),
) -> Result<String, EvalError> {
    let interner = StringInterner::new();
    let compiler = Compiler::new(&interner);
    let program = compiler.compile("test.jsonnet", source)?;
    let mut evaluator = Evaluator::new(&compiler, config);
    setup(&mut evaluator);
    evaluator.evaluate_json(&program)
}

pub(super) fn run(source: &str) -> Result<String, EvalError> {
    run_with(EvalConfig::default(), source, |_| {})
}

/// Manifest `source`, failing the test on any error.
pub(super) fn eval(source: &str) -> String {
    match run(source) {
        Ok(json) => json,
        Err(err) => panic!("evaluation of {source:?} failed: {err}"),
    }
}

/// The runtime error `source` fails with.
pub(super) fn runtime_error(source: &str) -> RuntimeError {
    match run(source) {
        Ok(json) => panic!("expected {source:?} to fail, got {json}"),
        Err(EvalError::Runtime(err)) => err,
        Err(EvalError::Static(err)) => panic!("expected a runtime error, got static error {err}"),
    }
}

/// Serves files from memory, keyed by the joined base directory and path.
pub(super) struct MapImporter {
    pub files: BTreeMap<String, String>,
}

impl MapImporter {
    pub(super) fn new(files: &[(&str, &str)]) -> Self {
        MapImporter {
            files: files
                .iter()
                .map(|(path, content)| ((*path).to_owned(), (*content).to_owned()))
                .collect(),
        }
    }
}

impl ImportCallback for MapImporter {
    fn import(&self, base_dir: &str, path: &str) -> Result<ImportedFile, String> {
        let full = format!("{base_dir}{path}");
        match self.files.get(&full) {
            Some(content) => Ok(ImportedFile {
                found_here: full,
                content: content.clone(),
            }),
            None => Err("No such file".to_owned()),
        }
    }
}
