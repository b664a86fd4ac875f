//! Collection under load and bounded stack use for tail calls.

use super::{run_with, runtime_error};
use crate::{EvalConfig, Evaluator};
use jsonnet_desugar::Compiler;
use jsonnet_ir::StringInterner;

fn eager_gc() -> EvalConfig {
    EvalConfig {
        gc_min_objects: 50,
        gc_growth_trigger: 1.5,
        ..EvalConfig::default()
    }
}

/// Evaluate with an eagerly collecting heap, returning the output and the
/// number of completed cycles.
fn eval_collecting(source: &str) -> (String, u64) {
    let interner = StringInterner::new();
    let compiler = Compiler::new(&interner);
    let program = compiler.compile("gc.jsonnet", source).unwrap();
    let mut evaluator = Evaluator::new(&compiler, eager_gc());
    let json = evaluator.evaluate_json(&program).unwrap();
    (json, evaluator.heap_stats().cycles)
}

mod collection {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn results_survive_collection() {
        let (json, cycles) = eval_collecting("std.length(std.foldl(function(acc, x) acc + [x], std.range(1, 300), []))");
        assert_eq!(json, "300");
        assert!(cycles > 0, "expected at least one cycle");
    }

    #[test]
    fn late_bound_objects_survive_collection() {
        let source = "
            local objs = [{ v: i, double():: self.v * 2 } for i in std.range(1, 300)];
            std.foldl(function(acc, o) acc + o.double(), objs, 0)
        ";
        let (json, cycles) = eval_collecting(source);
        assert_eq!(json, "90300");
        assert!(cycles > 0);
    }

    #[test]
    fn manifested_containers_stay_rooted() {
        let (json, _) = eval_collecting("[{ k: std.toString(i) } for i in std.range(1, 100)][99]");
        assert_eq!(json, "{\n   \"k\": \"100\"\n}");
    }

    #[test]
    fn live_count_drops_after_collection() {
        let interner = StringInterner::new();
        let compiler = Compiler::new(&interner);
        let program = compiler
            .compile("gc.jsonnet", "std.length([std.range(1, 20) for i in std.range(1, 100)])")
            .unwrap();
        let mut evaluator = Evaluator::new(&compiler, eager_gc());
        assert_eq!(evaluator.evaluate_json(&program).unwrap(), "100");
        let stats = evaluator.heap_stats();
        assert!(stats.cycles > 0);
        assert!(stats.live > 0);
    }
}

mod tail_calls {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn self_recursion_runs_in_constant_stack() {
        let config = EvalConfig {
            max_stack: 500,
            ..EvalConfig::default()
        };
        let source = "local f(x) = if x == 0 then 0 else f(x - 1); f(100000)";
        assert_eq!(run_with(config, source, |_| {}).unwrap(), "0");
    }

    #[test]
    fn tailstrict_accumulator() {
        let source = "local sum(n, acc) = if n == 0 then acc else sum(n - 1, acc + n) tailstrict; sum(10000, 0)";
        assert_eq!(run_with(EvalConfig::default(), source, |_| {}).unwrap(), "50005000");
    }

    #[test]
    fn non_tail_recursion_is_bounded() {
        let err = runtime_error("local f(x) = 1 + f(x + 1); f(0)");
        assert_eq!(err.message, "Max stack frames exceeded.");
    }
}
