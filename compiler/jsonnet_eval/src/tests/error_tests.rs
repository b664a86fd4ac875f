//! Runtime failures: messages, kinds and traces.

use super::{run, run_with, runtime_error};
use crate::{EvalConfig, EvalError, RuntimeErrorKind};

mod messages {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn user_error() {
        let err = runtime_error("error 'boom'");
        assert_eq!(err.message, "boom");
        assert!(matches!(err.kind, RuntimeErrorKind::User { .. }));
    }

    #[test]
    fn non_string_error_value_is_rendered_as_json() {
        let err = runtime_error("error {a: 1}");
        assert_eq!(err.message, "{\"a\": 1}");
    }

    #[test]
    fn failed_assert_uses_default_message() {
        let err = runtime_error("assert 1 > 2; 3");
        assert_eq!(err.message, "Assertion failed.");
        let err = runtime_error("assert false : 'custom'; 3");
        assert_eq!(err.message, "custom");
    }

    #[test]
    fn array_bounds() {
        let err = runtime_error("[1, 2, 3][5]");
        assert_eq!(err.message, "Array bounds error: 5 not within [0, 3)");
        assert_eq!(err.kind, RuntimeErrorKind::ArrayBounds { index: 5, len: 3 });
    }

    #[test]
    fn missing_field() {
        let err = runtime_error("({a: self.b} + {}).a");
        assert_eq!(err.message, "Field does not exist: b");
    }

    #[test]
    fn type_mismatch() {
        let err = runtime_error("1 + true");
        assert_eq!(err.message, "Binary operator + requires matching types, got number and boolean.");
    }

    #[test]
    fn division_by_zero() {
        let err = runtime_error("1 / 0");
        assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
        assert_eq!(err.message, "Division by zero.");
    }

    #[test]
    fn condition_must_be_boolean() {
        let err = runtime_error("if 1 then 2 else 3");
        assert!(matches!(err.kind, RuntimeErrorKind::ConditionNotBoolean { got: "number" }));
    }

    #[test]
    fn functions_do_not_manifest() {
        let err = runtime_error("function(x) x");
        assert_eq!(err.kind, RuntimeErrorKind::ManifestFunction);
    }

    #[test]
    fn calling_a_non_function() {
        let err = runtime_error("local x = 1; x(2)");
        assert!(matches!(err.kind, RuntimeErrorKind::NotCallable { got: "number" }));
    }
}

mod arguments {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn too_many() {
        let err = runtime_error("local f(a) = a; f(1, 2)");
        assert_eq!(err.kind, RuntimeErrorKind::TooManyArgs { params: 1 });
    }

    #[test]
    fn unknown_name() {
        let err = runtime_error("local f(a) = a; f(b=1)");
        assert_eq!(err.message, "Function has no parameter b");
    }

    #[test]
    fn bound_twice() {
        let err = runtime_error("local f(a) = a; f(1, a=2)");
        assert_eq!(err.message, "Binding parameter a second time: a");
    }

    #[test]
    fn positional_after_named() {
        let err = runtime_error("local f(a, b) = a; f(a=1, 2)");
        assert_eq!(err.message, "Internal error: got positional param after named at index 1");
    }

    #[test]
    fn not_bound() {
        let err = runtime_error("local f(a, b) = a; f(1)");
        assert_eq!(err.message, "Function parameter b not bound in call.");
    }

    #[test]
    fn builtin_argument_types() {
        let err = runtime_error("std.codepoint(1)");
        assert!(matches!(err.kind, RuntimeErrorKind::BuiltinArgs { name: "codepoint", .. }));
    }
}

mod traces {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn innermost_frame_is_the_failing_expression() {
        let err = runtime_error("local f(x) = error 'in f'; f(1)");
        assert!(err.trace[0].location.starts_with("test.jsonnet:1:14"), "{:?}", err.trace);
        assert_eq!(err.trace[0].name, "function <f>");
        assert!(err.trace.len() >= 2);
    }

    #[test]
    fn object_fields_are_named_after_their_binding() {
        let err = runtime_error("local o = {a: error 'x'}; o.a");
        assert_eq!(err.trace[0].name, "object <o>");
    }

    #[test]
    fn render_starts_with_the_message() {
        let err = runtime_error("error 'boom'");
        let rendered = err.render();
        assert!(rendered.starts_with("RUNTIME ERROR: boom\n\ttest.jsonnet:1:1"), "{rendered}");
    }
}

mod limits {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deep_recursion_overflows_the_stack() {
        let err = runtime_error("local f(x) = if x == 0 then 0 else 1 + f(x - 1); f(1000)");
        assert_eq!(err.kind, RuntimeErrorKind::StackOverflow);
        assert_eq!(err.message, "Max stack frames exceeded.");
    }

    #[test]
    fn limit_is_configurable() {
        let config = EvalConfig {
            max_stack: 2000,
            ..EvalConfig::default()
        };
        let source = "local f(x) = if x == 0 then 0 else 1 + f(x - 1); f(1000)";
        assert_eq!(run_with(config, source, |_| {}).unwrap(), "1000");
    }

    #[test]
    fn static_errors_are_reported_as_such() {
        assert!(matches!(run("1 +"), Err(EvalError::Static(_))));
    }
}
