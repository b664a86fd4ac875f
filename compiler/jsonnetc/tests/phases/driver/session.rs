//! Embedding API tests.

use jsonnetc::{EvalError, ExtVar, JsonValue, RuntimeErrorKind, Session};
use pretty_assertions::assert_eq;

use crate::common::source_tree;

#[test]
fn snippet_evaluates_to_json() {
    let session = Session::default();
    assert_eq!(session.evaluate_snippet("s.jsonnet", "{a: 1} + {a: 2}").unwrap(), "{\n   \"a\": 2\n}");
}

#[test]
fn file_imports_resolve_next_to_the_file() {
    let tree = source_tree(&[
        ("main.jsonnet", "local lib = import 'lib/util.libsonnet'; lib.twice(21)"),
        ("lib/util.libsonnet", "{ twice(x):: x * 2 }"),
    ]);
    let session = Session::default();
    assert_eq!(session.evaluate_file(&tree.path().join("main.jsonnet")).unwrap(), "42");
}

#[test]
fn library_paths_are_searched() {
    let tree = source_tree(&[("vendor/k.libsonnet", "{ name: 'k' }")]);
    let mut session = Session::default();
    session.add_jpath(tree.path().join("vendor"));
    assert_eq!(session.evaluate_snippet("s.jsonnet", "(import 'k.libsonnet').name").unwrap(), "\"k\"");
}

#[test]
fn ext_vars_and_natives() {
    let mut session = Session::default();
    session.set_ext_var("env", ExtVar::Str("prod".into()));
    session.register_native("upper", &["s"], |args| match args {
        [JsonValue::String(s)] => Ok(JsonValue::String(s.to_uppercase())),
        _ => Err("upper takes a string".into()),
    });
    let json = session.evaluate_snippet("s.jsonnet", "std.native('upper')(std.extVar('env'))").unwrap();
    assert_eq!(json, "\"PROD\"");
    // Registered state is reused by later evaluations.
    let json = session.evaluate_snippet("t.jsonnet", "std.native('upper')('x')").unwrap();
    assert_eq!(json, "\"X\"");
}

#[test]
fn multi_and_stream() {
    let session = Session::default();
    let docs = session.evaluate_multi("m.jsonnet", "{ 'a.json': 1, 'b.json': [] }").unwrap();
    assert_eq!(docs.keys().cloned().collect::<Vec<_>>(), vec!["a.json", "b.json"]);
    assert_eq!(docs["b.json"], "[ ]");
    let docs = session.evaluate_stream("s.jsonnet", "[1, 'x']").unwrap();
    assert_eq!(docs, vec!["1", "\"x\""]);
}

#[test]
fn runtime_errors_keep_structure_and_rendering() {
    let session = Session::default();
    let err = session.evaluate_snippet("bad.jsonnet", "[1, 2, 3][5]").unwrap_err();
    let Some(EvalError::Runtime(runtime)) = err.as_eval() else {
        panic!("expected a runtime error, got {err:?}");
    };
    assert_eq!(runtime.kind, RuntimeErrorKind::ArrayBounds { index: 5, len: 3 });
    let rendered = err.to_string();
    assert!(rendered.starts_with("RUNTIME ERROR: Array bounds error: 5 not within [0, 3)\n\tbad.jsonnet:1:"), "{rendered}");
}

#[test]
fn static_errors_are_rendered() {
    let session = Session::default();
    let err = session.evaluate_snippet("bad.jsonnet", "local x = 1; y").unwrap_err();
    assert!(matches!(err.as_eval(), Some(EvalError::Static(_))));
    assert!(err.to_string().starts_with("STATIC ERROR: bad.jsonnet:1:"), "{err}");
    assert!(err.to_string().ends_with("Unknown variable: y"), "{err}");
}

#[test]
fn missing_input_file() {
    let tree = source_tree(&[]);
    let err = Session::default().evaluate_file(&tree.path().join("nope.jsonnet")).unwrap_err();
    assert!(err.to_string().starts_with("ERROR: opening input file:"), "{err}");
}
