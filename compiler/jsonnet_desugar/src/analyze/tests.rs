use crate::{Compiler, StaticError};
use jsonnet_ir::core::ExprKind;
use jsonnet_ir::StringInterner;
use pretty_assertions::assert_eq;

fn compile_err(src: &str) -> String {
    let interner = StringInterner::new();
    let compiler = Compiler::new(&interner);
    let err: StaticError = compiler.compile("test.jsonnet", src).unwrap_err();
    err.message
}

#[test]
fn test_unknown_variable() {
    assert_eq!(compile_err("x"), "Unknown variable: x");
    assert_eq!(compile_err("local y = x; y"), "Unknown variable: x");
    assert_eq!(compile_err("local f(a) = a; a"), "Unknown variable: a");
}

#[test]
fn test_self_and_super_outside_object() {
    assert_eq!(compile_err("self"), "Can't use self outside of an object.");
    assert_eq!(compile_err("super.x"), "Can't use super outside of an object.");
    assert_eq!(compile_err("'x' in super"), "Can't use super outside of an object.");
}

#[test]
fn test_dollar_outside_object() {
    assert_eq!(compile_err("$"), "No top-level object found.");
}

#[test]
fn test_computed_field_name_is_outside_object_scope() {
    assert_eq!(compile_err("{ [self.a]: 1 }"), "Can't use self outside of an object.");
    assert_eq!(compile_err("{ local k = 'a', [k]: 1 }"), "Unknown variable: k");
}

#[test]
fn test_duplicates() {
    assert_eq!(compile_err("local a = 1, a = 2; a"), "Duplicate local var: a");
    assert_eq!(compile_err("function(a, a) a"), "Duplicate function parameter: a");
}

#[test]
fn test_recursive_locals_and_defaults_are_bound() {
    let interner = StringInterner::new();
    let compiler = Compiler::new(&interner);
    assert!(compiler
        .compile("test.jsonnet", "local f(n) = if n == 0 then 0 else f(n - 1); f(3)")
        .is_ok());
    assert!(compiler
        .compile("test.jsonnet", "local g(a, b = a + 1) = b; g(1)")
        .is_ok());
    assert!(compiler.compile("test.jsonnet", "{ a: 1, b: self.a + $.a }").is_ok());
}

#[test]
fn test_free_variables_recorded() {
    let interner = StringInterner::new();
    let compiler = Compiler::new(&interner);
    let program = compiler
        .compile("test.jsonnet", "local a = 1, b = 2; function(x) x + a + b")
        .unwrap();
    let ExprKind::Local { body, .. } = &program.kind else {
        panic!("expected std local");
    };
    let ExprKind::Local { body: func, .. } = &body.kind else {
        panic!("expected user local");
    };
    let names: Vec<_> = func.free_vars().iter().map(|n| interner.lookup(*n)).collect();
    let mut expected = vec!["a", "b"];
    expected.sort_by_key(|s| interner.get(s));
    assert_eq!(names, expected);
    assert!(program.free_vars().is_empty());
}
