use super::{kinds, lex_err};
use crate::{LexErrorKind, TokenKind};
use jsonnet_ir::StringInterner;
use proptest::prelude::*;

#[test]
fn test_integer_and_float_forms() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds(&interner, "0 42 1.5 2e3 3.25E-2 7e+1"),
        vec![
            TokenKind::Number(0.0),
            TokenKind::Number(42.0),
            TokenKind::Number(1.5),
            TokenKind::Number(2000.0),
            TokenKind::Number(0.0325),
            TokenKind::Number(70.0),
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn test_leading_zero_splits() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds(&interner, "01"),
        vec![
            TokenKind::Number(0.0),
            TokenKind::Number(1.0),
            TokenKind::EndOfFile
        ]
    );
}

#[test]
fn test_junk_after_decimal_point() {
    assert_eq!(
        lex_err("1.x").kind,
        LexErrorKind::JunkAfterDecimalPoint { found: Some('x') }
    );
}

#[test]
fn test_junk_after_exponent() {
    assert_eq!(
        lex_err("1e").kind,
        LexErrorKind::JunkAfterExponent { found: None }
    );
    assert_eq!(
        lex_err("1e-q").kind,
        LexErrorKind::JunkAfterExponentSign { found: Some('q') }
    );
}

proptest! {
    #[test]
    fn integers_lex_to_their_value(n in 0u32..1_000_000) {
        let interner = StringInterner::new();
        let toks = kinds(&interner, &n.to_string());
        prop_assert_eq!(toks, vec![TokenKind::Number(f64::from(n)), TokenKind::EndOfFile]);
    }

    #[test]
    fn identifiers_survive_interning(s in "[a-z_][a-z0-9_]{0,12}") {
        prop_assume!(TokenKind::keyword(&s).is_none());
        let interner = StringInterner::new();
        let toks = kinds(&interner, &s);
        prop_assert_eq!(toks.len(), 2);
        match &toks[0] {
            TokenKind::Identifier(name) => prop_assert_eq!(interner.lookup(*name), s.as_str()),
            other => prop_assert!(false, "expected identifier, got {:?}", other),
        }
    }
}
