//! Lexer tests.

mod number_tests;
mod string_tests;

use crate::{lex, LexError, LexErrorKind, TokenKind};
use jsonnet_ir::{Location, StringInterner};
use pretty_assertions::assert_eq;

pub(super) fn kinds(interner: &StringInterner, src: &str) -> Vec<TokenKind> {
    lex(interner, "test.jsonnet", src)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

pub(super) fn lex_err(src: &str) -> LexError {
    let interner = StringInterner::new();
    lex(&interner, "test.jsonnet", src).unwrap_err()
}

fn op(s: &str) -> TokenKind {
    TokenKind::Operator(s.to_owned())
}

#[test]
fn test_empty_source() {
    let interner = StringInterner::new();
    assert_eq!(kinds(&interner, ""), vec![TokenKind::EndOfFile]);
    assert_eq!(kinds(&interner, "  \n\t "), vec![TokenKind::EndOfFile]);
}

#[test]
fn test_punctuation_and_keywords() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds(&interner, "{ local x = self; }"),
        vec![
            TokenKind::BraceL,
            TokenKind::Local,
            TokenKind::Identifier(interner.intern("x")),
            op("="),
            TokenKind::SelfKw,
            TokenKind::Semicolon,
            TokenKind::BraceR,
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn test_identifier_with_keyword_prefix() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds(&interner, "iff local_x"),
        vec![
            TokenKind::Identifier(interner.intern("iff")),
            TokenKind::Identifier(interner.intern("local_x")),
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    let interner = StringInterner::new();
    let src = "# hash\n1 // line\n/* block\n spanning */ 2";
    assert_eq!(
        kinds(&interner, src),
        vec![
            TokenKind::Number(1.0),
            TokenKind::Number(2.0),
            TokenKind::EndOfFile
        ]
    );
}

#[test]
fn test_unterminated_comment() {
    assert_eq!(lex_err("1 /* oops").kind, LexErrorKind::UnterminatedComment);
}

#[test]
fn test_operator_maximal_munch() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds(&interner, "a+::b"),
        vec![
            TokenKind::Identifier(interner.intern("a")),
            op("+::"),
            TokenKind::Identifier(interner.intern("b")),
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn test_operator_backs_off_trailing_unary() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds(&interner, "1*-2 {a:-1} x<=!y"),
        vec![
            TokenKind::Number(1.0),
            op("*"),
            op("-"),
            TokenKind::Number(2.0),
            TokenKind::BraceL,
            TokenKind::Identifier(interner.intern("a")),
            op(":"),
            op("-"),
            TokenKind::Number(1.0),
            TokenKind::BraceR,
            TokenKind::Identifier(interner.intern("x")),
            op("<="),
            op("!"),
            TokenKind::Identifier(interner.intern("y")),
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn test_operator_stops_at_comment() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds(&interner, "1 +// trailing\n2"),
        vec![
            TokenKind::Number(1.0),
            op("+"),
            TokenKind::Number(2.0),
            TokenKind::EndOfFile
        ]
    );
}

#[test]
fn test_locations() {
    let interner = StringInterner::new();
    let tokens = lex(&interner, "f.jsonnet", "a\n  bcd").unwrap();
    assert_eq!(tokens[1].loc.begin, Location::new(2, 3));
    assert_eq!(tokens[1].loc.end, Location::new(2, 6));
    assert_eq!(interner.lookup(tokens[1].loc.file), "f.jsonnet");
}

#[test]
fn test_unexpected_character() {
    let err = lex_err("1 ? 2");
    assert_eq!(err.kind, LexErrorKind::UnexpectedChar { found: '?' });
    assert_eq!(err.loc.begin, Location::new(1, 3));
}
