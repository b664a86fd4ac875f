//! Object extension, `self`/`super`, visibility and invariants.

use super::{eval, runtime_error};

mod extension {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn right_side_wins() {
        assert_eq!(eval("{a: 1} + {a: 2}"), "{\n   \"a\": 2\n}");
    }

    #[test]
    fn self_is_late_bound() {
        assert_eq!(eval("({a: self.b, b: 1} + {b: 2}).a"), "2");
    }

    #[test]
    fn super_reaches_one_level_left() {
        assert_eq!(eval("({a: 1} + {a: super.a + 10} + {a: super.a * 2}).a"), "22");
    }

    #[test]
    fn plus_colon_merges_with_super() {
        assert_eq!(eval("({a: [1]} + {a+: [2]}).a"), "[\n   1,\n   2\n]");
        assert_eq!(eval("({} + {a+: [2]}).a"), "[\n   2\n]");
    }

    #[test]
    fn in_and_in_super() {
        assert_eq!(eval("'a' in {a: 1}"), "true");
        assert_eq!(eval("'b' in {a: 1}"), "false");
        assert_eq!(eval("'h' in {h:: 1}"), "true");
        assert_eq!(eval("({a: 1} + {b: 'a' in super}).b"), "true");
        assert_eq!(eval("{b: 'a' in super}.b"), "false");
    }

    #[test]
    fn dollar_is_the_outermost_object() {
        assert_eq!(eval("{x: 1, inner: {y: $.x}}.inner.y"), "1");
    }

    #[test]
    fn computed_field_names() {
        assert_eq!(eval("local k = 'key'; {[k]: 1, [null]: 2}"), "{\n   \"key\": 1\n}");
    }
}

mod visibility {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hidden_fields_are_not_manifested() {
        assert_eq!(eval("{a: 1, b:: 2}"), "{\n   \"a\": 1\n}");
        assert_eq!(eval("{b:: 2}.b"), "2");
    }

    #[test]
    fn inherit_keeps_the_left_visibility() {
        assert_eq!(eval("{a:: 1} + {a: 2}"), "{ }");
        assert_eq!(eval("({a:: 1} + {a: 2}).a"), "2");
    }

    #[test]
    fn forced_visible_overrides_hidden() {
        assert_eq!(eval("{a:: 1} + {a::: 2}"), "{\n   \"a\": 2\n}");
    }

    #[test]
    fn hidden_overrides_visible() {
        assert_eq!(eval("{a: 1} + {a:: 2}"), "{ }");
    }

    #[test]
    fn object_fields_respects_visibility() {
        assert_eq!(
            eval("local o = {b: 1, a:: 2, c: 3}; [std.objectFields(o), std.objectFieldsAll(o)]"),
            "[\n   [\n      \"b\",\n      \"c\"\n   ],\n   [\n      \"a\",\n      \"b\",\n      \"c\"\n   ]\n]"
        );
    }
}

mod comprehensions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn object_comprehension() {
        assert_eq!(
            eval("{[k]: std.length(k) for k in ['a', 'bb']}"),
            "{\n   \"a\": 1,\n   \"bb\": 2\n}"
        );
    }

    #[test]
    fn object_comprehension_over_empty_array() {
        assert_eq!(eval("{[k]: 1 for k in []}"), "{ }");
    }

    #[test]
    fn object_comprehension_with_two_variables() {
        assert_eq!(
            eval("{[a + b]: a for a in ['x', 'y'] for b in ['1']}"),
            "{\n   \"x1\": \"x\",\n   \"y1\": \"y\"\n}"
        );
    }

    #[test]
    fn duplicate_comprehension_key() {
        let err = runtime_error("{[k]: 1 for k in ['a', 'a']}");
        assert_eq!(err.message, "Duplicate field name: \"a\"");
    }
}

mod invariants {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failing_assert_fails_manifestation() {
        let err = runtime_error("{ assert self.a > 0 : 'bad', a: -1 }");
        assert_eq!(err.message, "bad");
    }

    #[test]
    fn failing_assert_fails_field_access() {
        let err = runtime_error("{ assert false, a: 1 }.a");
        assert_eq!(err.message, "Object assertion failed.");
    }

    #[test]
    fn passing_assert() {
        assert_eq!(eval("{ assert self.a > 0, a: 1 }.a"), "1");
    }

    #[test]
    fn asserts_see_the_extended_self() {
        let err = runtime_error("{ assert self.a > 0 : 'bad', a: 1 } + { a: -1 }");
        assert_eq!(err.message, "bad");
    }

    #[test]
    fn assert_reading_its_own_object_does_not_loop() {
        assert_eq!(eval("{ assert self.a == 1, a: 1, b: self.a }.b"), "1");
    }
}
