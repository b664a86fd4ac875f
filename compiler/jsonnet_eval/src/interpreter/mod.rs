//! The trampoline evaluator.
//!
//! Evaluation alternates between two moves, encoded as [`Step`]:
//!
//! - **descend** into a node: either compute its value directly into the
//!   scratch register, or push a [`Frame`](crate::frame::Frame) recording
//!   what to do with a child's value and continue with the child;
//! - **unwind**: hand the scratch register to the top frame, which pops
//!   itself or continues with another child.
//!
//! The loop ends when the stack is back to the depth it started at. Host
//! recursion happens only for manifestation, string conversion and object
//! invariants, each of which re-enters [`Evaluator::run`] with a deeper
//! starting depth.

mod apply;
mod builtins;
mod descend;
mod manifest;
mod object;
mod unwind;

use crate::config::{EvalConfig, ExtVar};
use crate::errors::{EvalError, RuntimeErrorKind};
use crate::heap::{Heap, HeapId, Thunk, ThunkState};
use crate::import::{dir_name, CachedImport, ImportCallback};
use crate::natives::NativeCallback;
use crate::stack::Stack;
use crate::value::{BindingFrame, Value};
use jsonnet_desugar::Compiler;
use jsonnet_ir::core::{Arg, Expr, ExprKind, Node};
use jsonnet_ir::{LocationRange, Name, StringInterner};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::rc::Rc;

/// What the trampoline does next.
pub(crate) enum Step {
    /// Evaluate this node.
    Eval(Expr),
    /// Resume the top frame with the scratch register.
    Unwind,
}

/// Names the evaluator binds or reports itself.
struct Names {
    array_element: Name,
    object_assert: Name,
    import: Name,
    json_var: Name,
    apply_fn: Name,
    apply_arg: Name,
    manifestation: Name,
}

/// Nodes the evaluator runs that come from no source file.
struct Synthetic {
    /// `$json`: the value of a field of an object returned by a native.
    json_var: Expr,
    /// `$f($i)`: an element of `std.makeArray` over a builtin.
    apply: Expr,
}

/// Usage counters, for tests and diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeapStats {
    pub live: usize,
    pub cycles: u64,
}

/// Evaluates compiled programs and manifests their results.
///
/// One evaluator owns one heap. Imports are cached for its lifetime, so the
/// same file imported twice yields the same value.
pub struct Evaluator<'a> {
    compiler: &'a Compiler<'a>,
    interner: &'a StringInterner,
    config: EvalConfig,
    heap: Heap,
    stack: Stack,
    scratch: Value,
    names: Names,
    synthetic: Synthetic,
    ext_vars: FxHashMap<String, ExtVar>,
    natives: FxHashMap<String, NativeCallback>,
    importer: Option<Box<dyn ImportCallback + 'a>>,
    imports: FxHashMap<(String, String), CachedImport>,
}

impl<'a> Evaluator<'a> {
    pub fn new(compiler: &'a Compiler<'a>, config: EvalConfig) -> Self {
        let interner = compiler.interner();
        let names = Names {
            array_element: interner.intern("array_element"),
            object_assert: interner.intern("object_assert"),
            import: interner.intern("import"),
            json_var: interner.intern("$json"),
            apply_fn: interner.intern("$f"),
            apply_arg: interner.intern("$i"),
            manifestation: interner.intern("During manifestation"),
        };
        let synthetic = Synthetic::new(&names);
        Evaluator {
            compiler,
            interner,
            heap: Heap::new(config.gc_min_objects, config.gc_growth_trigger),
            stack: Stack::new(config.max_stack),
            config,
            scratch: Value::Null,
            names,
            synthetic,
            ext_vars: FxHashMap::default(),
            natives: FxHashMap::default(),
            importer: None,
            imports: FxHashMap::default(),
        }
    }

    pub fn set_ext_var(&mut self, name: impl Into<String>, value: ExtVar) {
        self.ext_vars.insert(name.into(), value);
    }

    pub fn register_native(&mut self, name: impl Into<String>, callback: NativeCallback) {
        self.natives.insert(name.into(), callback);
    }

    pub fn set_importer(&mut self, importer: impl ImportCallback + 'a) {
        self.importer = Some(Box::new(importer));
    }

    pub fn heap_stats(&self) -> HeapStats {
        HeapStats {
            live: self.heap.live(),
            cycles: self.heap.cycles(),
        }
    }

    /// Evaluate `program` and render the result as JSON, or as a raw string
    /// when [`EvalConfig::string_output`] is set.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_json(&mut self, program: &Expr) -> Result<String, EvalError> {
        self.evaluate_root(program)?;
        let loc = self.manifestation_loc();
        if self.config.string_output {
            self.manifest_string(loc)
        } else {
            let mut out = String::new();
            self.manifest_json(loc, true, "", &mut out)?;
            Ok(out)
        }
    }

    /// Evaluate `program` to an object and render each visible field as a
    /// separate document, keyed by field name.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_multi(&mut self, program: &Expr) -> Result<BTreeMap<String, String>, EvalError> {
        self.evaluate_root(program)?;
        self.manifest_multi()
    }

    /// Evaluate `program` to an array and render each element as a separate
    /// document.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_stream(&mut self, program: &Expr) -> Result<Vec<String>, EvalError> {
        self.evaluate_root(program)?;
        self.manifest_stream()
    }

    fn evaluate_root(&mut self, program: &Expr) -> Result<(), EvalError> {
        self.stack.clear();
        self.scratch = Value::Null;
        self.evaluate(program.clone(), 0)
    }

    fn manifestation_loc(&self) -> LocationRange {
        LocationRange::label(self.names.manifestation)
    }

    /// Evaluate `ast` until the stack is back to `initial` frames; the result
    /// is left in the scratch register.
    fn evaluate(&mut self, ast: Expr, initial: usize) -> Result<(), EvalError> {
        self.run(Step::Eval(ast), initial)
    }

    fn run(&mut self, mut step: Step, initial: usize) -> Result<(), EvalError> {
        loop {
            step = match step {
                Step::Eval(ast) => {
                    self.maybe_collect();
                    self.descend(&ast)?
                }
                Step::Unwind => {
                    if self.stack.len() <= initial {
                        return Ok(());
                    }
                    self.unwind(initial)?
                }
            };
        }
    }

    /// Run a collection cycle if the heap has grown enough. Only called
    /// before descending, when every live handle is held by the scratch
    /// register, a frame, or the import cache.
    fn maybe_collect(&mut self) {
        if !self.heap.should_collect() {
            return;
        }
        let mut roots = Vec::new();
        roots.extend(self.scratch.heap_id());
        self.stack.roots(&mut roots);
        roots.extend(self.imports.values().filter_map(|import| import.thunk));
        let before = self.heap.live();
        let freed = self.heap.collect(&roots);
        tracing::debug!(
            before,
            freed,
            live = self.heap.live(),
            calls = self.stack.calls(),
            "collected garbage"
        );
    }

    /// Build a runtime error at `loc` with the current stack trace.
    #[cold]
    fn error(&self, loc: LocationRange, kind: RuntimeErrorKind) -> EvalError {
        EvalError::Runtime(self.stack.make_error(loc, kind, &self.heap, self.interner))
    }

    fn push_call(
        &mut self,
        loc: LocationRange,
        context: HeapId,
        self_: Option<HeapId>,
        offset: u32,
        bindings: BindingFrame,
    ) -> Result<(), EvalError> {
        self.stack
            .new_call(loc, context, self_, offset, bindings)
            .map_err(|kind| self.error(loc, kind))
    }

    /// Load a filled thunk's value, or push a Call frame to compute it.
    fn enter_thunk(&mut self, loc: LocationRange, thunk: HeapId) -> Result<Step, EvalError> {
        let pending = match self.heap.thunk(thunk).state() {
            ThunkState::Filled(value) => {
                self.scratch = *value;
                return Ok(Step::Unwind);
            }
            ThunkState::Pending(pending) => pending.clone(),
        };
        self.push_call(loc, thunk, pending.self_, pending.offset, pending.upvalues)?;
        Ok(Step::Eval(pending.body))
    }

    /// # Panics
    /// Panics if `thunk` has not been filled yet.
    fn forced(&self, thunk: HeapId) -> Value {
        match self.heap.thunk(thunk).value() {
            Some(value) => value,
            None => unforced(),
        }
    }

    /// Bind each of `free_vars` to the thunk currently in scope for it.
    fn capture(&self, free_vars: &[Name]) -> BindingFrame {
        free_vars.iter().map(|&name| (name, self.lookup(name))).collect()
    }

    /// # Panics
    /// Panics if `name` is unbound, which static analysis rules out.
    fn lookup(&self, name: Name) -> HeapId {
        match self.stack.lookup_var(name) {
            Some(thunk) => thunk,
            None => unbound(self.interner.lookup(name)),
        }
    }

    fn string_text(&self, id: HeapId) -> String {
        self.heap.string(id).iter().collect()
    }

    fn intern_string(&self, id: HeapId) -> Name {
        self.interner.intern(&self.string_text(id))
    }

    /// Fetch `path` relative to the file of `loc`, caching by directory and
    /// path. Returns the cache key.
    fn resolve_import(&mut self, loc: LocationRange, path: &str) -> Result<(String, String), EvalError> {
        let base = dir_name(self.interner.lookup(loc.file)).to_owned();
        let key = (base, path.to_owned());
        if self.imports.contains_key(&key) {
            return Ok(key);
        }
        tracing::trace!(base = %key.0, path, "resolving import");
        let result = match &self.importer {
            Some(importer) => importer.import(&key.0, path),
            None => Err("no import callback is configured".to_owned()),
        };
        match result {
            Ok(file) => {
                self.imports.insert(
                    key.clone(),
                    CachedImport {
                        found_here: Rc::from(file.found_here),
                        content: Rc::from(file.content),
                        thunk: None,
                    },
                );
                Ok(key)
            }
            Err(reason) => {
                let mut escaped = String::new();
                manifest::escape_json_into(path.chars(), &mut escaped);
                Err(self.error(
                    loc,
                    RuntimeErrorKind::ImportFailed {
                        path: escaped,
                        reason,
                    },
                ))
            }
        }
    }

    fn import_string(&mut self, loc: LocationRange, path: &str) -> Result<Rc<str>, EvalError> {
        let key = self.resolve_import(loc, path)?;
        Ok(self.imports[&key].content.clone())
    }

    /// Thunk evaluating the imported file, compiled on first import.
    fn import_code(&mut self, loc: LocationRange, path: &str) -> Result<HeapId, EvalError> {
        let key = self.resolve_import(loc, path)?;
        let cached = &self.imports[&key];
        if let Some(thunk) = cached.thunk {
            return Ok(thunk);
        }
        let (found_here, content) = (cached.found_here.clone(), cached.content.clone());
        let program = self.compiler.compile(&found_here, &content)?;
        let thunk = self
            .heap
            .alloc_thunk(Thunk::pending(Some(self.names.import), None, 0, program));
        if let Some(cached) = self.imports.get_mut(&key) {
            cached.thunk = Some(thunk);
        }
        Ok(thunk)
    }
}

impl Synthetic {
    fn new(names: &Names) -> Self {
        let loc = LocationRange::default();
        let var = |name: Name| {
            let node = Node::new(loc, ExprKind::Var(name));
            node.set_free_vars(vec![name]);
            node
        };
        let apply = Node::new(
            loc,
            ExprKind::Apply {
                target: var(names.apply_fn),
                args: vec![Arg {
                    name: None,
                    expr: var(names.apply_arg),
                }],
                tailstrict: false,
            },
        );
        apply.set_free_vars(vec![names.apply_fn, names.apply_arg]);
        Synthetic {
            json_var: var(names.json_var),
            apply,
        }
    }
}

#[cold]
#[inline(never)]
fn unforced() -> ! {
    panic!("thunk read before it was forced")
}

#[cold]
#[inline(never)]
fn unbound(name: &str) -> ! {
    panic!("variable {name} is unbound after static analysis")
}

/// # Panics
/// Panics when a frame's node does not match its kind.
#[cold]
#[inline(never)]
fn wrong_node(kind: crate::frame::FrameKind) -> ! {
    panic!("{kind:?} frame holds a node of the wrong kind")
}
