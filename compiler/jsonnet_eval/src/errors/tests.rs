use super::*;
use pretty_assertions::assert_eq;

#[test]
fn messages_match_reported_text() {
    assert_eq!(
        RuntimeErrorKind::BinaryTypeMismatch {
            op: BinaryOp::Plus,
            left: "number",
            right: "boolean",
        }
        .to_string(),
        "Binary operator + requires matching types, got number and boolean."
    );
    assert_eq!(
        RuntimeErrorKind::ArrayBounds { index: 3, len: 2 }.to_string(),
        "Array bounds error: 3 not within [0, 2)"
    );
    assert_eq!(
        RuntimeErrorKind::BuiltinArgs {
            name: "pow",
            expected: vec!["number", "number"],
            got: vec!["string"],
        }
        .to_string(),
        "Builtin function pow expected (number, number) but got (string)"
    );
    assert_eq!(
        RuntimeErrorKind::DuplicateField { name: "a".into() }.to_string(),
        "Duplicate field name: \"a\""
    );
}

#[test]
fn render_lists_trace_frames() {
    let err = RuntimeError::new(
        user_error("boom"),
        vec![
            TraceFrame {
                location: "a.jsonnet:1:1-6".into(),
                name: "function <f>".into(),
            },
            TraceFrame {
                location: "a.jsonnet:2:1-5".into(),
                name: String::new(),
            },
        ],
    );
    assert_eq!(
        err.render(),
        "RUNTIME ERROR: boom\n\ta.jsonnet:1:1-6\tfunction <f>\n\ta.jsonnet:2:1-5\t\n"
    );
    assert_eq!(err.to_string(), "boom");
}
