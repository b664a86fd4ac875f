//! Core expression semantics.

use super::{eval, runtime_error};

mod literals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalars() {
        assert_eq!(eval("null"), "null");
        assert_eq!(eval("true"), "true");
        assert_eq!(eval("false"), "false");
        assert_eq!(eval("42"), "42");
        assert_eq!(eval("0.5"), "0.5");
        assert_eq!(eval("-3"), "-3");
        assert_eq!(eval("'hi'"), "\"hi\"");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(eval(r#""a\nb\"c""#), r#""a\nb\"c""#);
        assert_eq!(eval(r#""é""#), "\"é\"");
    }

    #[test]
    fn empty_containers() {
        assert_eq!(eval("[]"), "[ ]");
        assert_eq!(eval("{}"), "{ }");
    }

    #[test]
    fn nested_containers_indent_three_spaces() {
        assert_eq!(eval("[1, [2], {a: []}]"), "[\n   1,\n   [\n      2\n   ],\n   {\n      \"a\": [ ]\n   }\n]");
    }
}

mod arithmetic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_plus_one() {
        assert_eq!(eval("1 + 1"), "2");
    }

    #[test]
    fn precedence_and_division() {
        assert_eq!(eval("1 + 2 * 3 - 4 / 2"), "5");
        assert_eq!(eval("7 / 2"), "3.5");
        assert_eq!(eval("7 % 3"), "1");
        assert_eq!(eval("-7 % 3"), "-1");
    }

    #[test]
    fn bitwise_and_shifts() {
        assert_eq!(eval("5 & 3"), "1");
        assert_eq!(eval("5 | 3"), "7");
        assert_eq!(eval("5 ^ 3"), "6");
        assert_eq!(eval("1 << 4"), "16");
        assert_eq!(eval("-16 >> 2"), "-4");
        assert_eq!(eval("~5"), "-6");
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("[1 < 2, 2 <= 2, 3 > 4, 4 >= 5]"), "[\n   true,\n   true,\n   false,\n   false\n]");
        assert_eq!(eval("['a' < 'b', 'b' <= 'a', 'abc' > 'ab']"), "[\n   true,\n   false,\n   true\n]");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(eval("!true"), "false");
        assert_eq!(eval("-(1 + 2)"), "-3");
        assert_eq!(eval("+4"), "4");
    }
}

mod logic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_circuit_skips_right_operand() {
        assert_eq!(eval("false && error 'never'"), "false");
        assert_eq!(eval("true || error 'never'"), "true");
        assert_eq!(eval("true && false"), "false");
        assert_eq!(eval("false || true"), "true");
    }

    #[test]
    fn conditionals() {
        assert_eq!(eval("if 1 < 2 then 'yes' else 'no'"), "\"yes\"");
        assert_eq!(eval("if false then 1"), "null");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(eval("[1, {a: [2]}] == [1, {a: [2]}]"), "true");
        assert_eq!(eval("{a: 1} != {a: 1, b:: 2}"), "false");
        assert_eq!(eval("'1' == 1"), "false");
    }
}

mod strings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn concatenation_converts_other_side() {
        assert_eq!(eval("'a' + 1"), "\"a1\"");
        assert_eq!(eval("1 + 'a'"), "\"1a\"");
        assert_eq!(eval("'x' + [1, 2]"), "\"x[1, 2]\"");
        assert_eq!(eval("'' + {a: 1, b: 'c'}"), r#""{\"a\": 1, \"b\": \"c\"}""#);
        assert_eq!(eval("'n' + null"), "\"nnull\"");
    }

    #[test]
    fn indexing_is_by_code_point() {
        assert_eq!(eval("'héllo'[1]"), "\"é\"");
        assert_eq!(eval("std.length('héllo')"), "5");
    }
}

mod bindings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn locals_are_mutually_recursive() {
        assert_eq!(
            eval("local even(n) = if n == 0 then true else odd(n - 1), odd(n) = if n == 0 then false else even(n - 1); even(10)"),
            "true"
        );
    }

    #[test]
    fn unused_bindings_are_never_evaluated() {
        assert_eq!(eval("local x = error 'boom'; 1"), "1");
        assert_eq!(eval("[error 'a', 2][1]"), "2");
        assert_eq!(eval("local f(a, b) = b; f(error 'a', 3)"), "3");
    }

    #[test]
    fn closures_capture_their_environment() {
        assert_eq!(eval("local adder(n) = function(x) x + n; local add2 = adder(2); add2(40)"), "42");
    }
}

mod functions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_and_default_arguments() {
        assert_eq!(eval("local f(a, b=10) = a + b; f(1)"), "11");
        assert_eq!(eval("local f(a, b=10) = a + b; f(b=1, a=2)"), "3");
        assert_eq!(eval("local f(a, b=a * 2) = a + b; f(3)"), "9");
    }

    #[test]
    fn tailstrict_forces_arguments() {
        assert_eq!(eval("local f(x) = 1; f(2) tailstrict"), "1");
        let err = runtime_error("local f(x) = 1; f(error 'forced') tailstrict");
        assert_eq!(err.message, "forced");
    }

    #[test]
    fn array_comprehension() {
        assert_eq!(eval("[x * x for x in [1, 2, 3] if x != 2]"), "[\n   1,\n   9\n]");
    }

    #[test]
    fn slices() {
        assert_eq!(eval("[1, 2, 3, 4, 5][1:4:2]"), "[\n   2,\n   4\n]");
        assert_eq!(eval("'abcdef'[2:]"), "\"cdef\"");
    }
}
