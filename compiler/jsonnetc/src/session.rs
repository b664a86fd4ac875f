//! One configured interpreter: interner, limits, external variables, native
//! functions and library paths, reused across evaluations.

use crate::error::DriverError;
use crate::importer::FileImporter;
use jsonnet_desugar::Compiler;
use jsonnet_eval::{EvalConfig, EvalError, Evaluator, ExtVar, JsonValue, NativeCallback, NativeFn};
use jsonnet_ir::core::Expr;
use jsonnet_ir::StringInterner;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

struct SharedNative {
    params: Vec<String>,
    func: Rc<NativeFn>,
}

impl SharedNative {
    fn callback(&self) -> NativeCallback {
        let params: Vec<&str> = self.params.iter().map(String::as_str).collect();
        let func = Rc::clone(&self.func);
        NativeCallback::new(&params, move |args| func(args))
    }
}

pub struct Session {
    interner: StringInterner,
    config: EvalConfig,
    ext_vars: BTreeMap<String, ExtVar>,
    natives: BTreeMap<String, SharedNative>,
    jpaths: Vec<PathBuf>,
}

impl Session {
    pub fn new(config: EvalConfig) -> Self {
        Session {
            interner: StringInterner::new(),
            config,
            ext_vars: BTreeMap::new(),
            natives: BTreeMap::new(),
            jpaths: Vec::new(),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EvalConfig {
        &mut self.config
    }

    /// Append a library directory searched by imports.
    pub fn add_jpath(&mut self, dir: impl Into<PathBuf>) {
        self.jpaths.push(dir.into());
    }

    pub fn set_ext_var(&mut self, name: impl Into<String>, value: ExtVar) {
        self.ext_vars.insert(name.into(), value);
    }

    /// Expose `func` to programs as `std.native(name)`.
    pub fn register_native<F>(&mut self, name: impl Into<String>, params: &[&str], func: F)
    where
        F: Fn(&[JsonValue]) -> Result<JsonValue, String> + 'static,
    {
        self.natives.insert(
            name.into(),
            SharedNative {
                params: params.iter().map(|p| (*p).to_owned()).collect(),
                func: Rc::new(func),
            },
        );
    }

    /// Read and evaluate `path` to a single document.
    pub fn evaluate_file(&self, path: &Path) -> Result<String, DriverError> {
        let source = fs::read_to_string(path).map_err(|source| DriverError::Read {
            path: path.to_owned(),
            source,
        })?;
        self.evaluate_snippet(&path.to_string_lossy(), &source)
    }

    /// Evaluate `source`, named `file` in locations, to a single document.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn evaluate_snippet(&self, file: &str, source: &str) -> Result<String, DriverError> {
        self.run(file, source, |evaluator, program| evaluator.evaluate_json(program))
    }

    /// Evaluate to one document per field of the top-level object.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn evaluate_multi(&self, file: &str, source: &str) -> Result<BTreeMap<String, String>, DriverError> {
        self.run(file, source, |evaluator, program| evaluator.evaluate_multi(program))
    }

    /// Evaluate to one document per element of the top-level array.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn evaluate_stream(&self, file: &str, source: &str) -> Result<Vec<String>, DriverError> {
        self.run(file, source, |evaluator, program| evaluator.evaluate_stream(program))
    }

    fn run<T>(
        &self,
        file: &str,
        source: &str,
        manifest: impl FnOnce(&mut Evaluator<'_>, &Expr) -> Result<T, EvalError>,
    ) -> Result<T, DriverError> {
        let compiler = Compiler::new(&self.interner);
        let result = compiler.compile(file, source).map_err(EvalError::from).and_then(|program| {
            let mut evaluator = Evaluator::new(&compiler, self.config.clone());
            for (name, value) in &self.ext_vars {
                evaluator.set_ext_var(name.clone(), value.clone());
            }
            for (name, native) in &self.natives {
                evaluator.register_native(name.clone(), native.callback());
            }
            evaluator.set_importer(FileImporter::new(self.jpaths.clone()));
            let output = manifest(&mut evaluator, &program);
            tracing::debug!(
                live = evaluator.heap_stats().live,
                cycles = evaluator.heap_stats().cycles,
                "evaluation finished"
            );
            output
        });
        result.map_err(|err| DriverError::eval(err, &self.interner))
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(EvalConfig::default())
    }
}
