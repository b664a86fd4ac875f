use super::{kinds, lex_err};
use crate::{LexErrorKind, TokenKind};
use jsonnet_ir::StringInterner;
use pretty_assertions::assert_eq;

fn single_string(src: &str) -> String {
    let interner = StringInterner::new();
    match kinds(&interner, src).remove(0) {
        TokenKind::Str(s) => s,
        other => panic!("expected string token, got {other:?}"),
    }
}

#[test]
fn test_quoted_escapes() {
    assert_eq!(single_string(r#""a\"b\\c\n\t\/""#), "a\"b\\c\n\t/");
    assert_eq!(single_string(r"'it\'s'"), "it's");
    assert_eq!(single_string(r#""\u00e9\u0041""#), "éA");
}

#[test]
fn test_surrogate_pair_escape() {
    assert_eq!(single_string(r#""\ud83d\ude00""#), "😀");
}

#[test]
fn test_unknown_escape() {
    assert_eq!(
        lex_err(r#""a\qb""#).kind,
        LexErrorKind::UnknownEscape { escape: 'q' }
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(lex_err("\"abc").kind, LexErrorKind::UnterminatedString);
}

#[test]
fn test_verbatim_strings() {
    assert_eq!(single_string(r#"@"c:\path""#), r"c:\path");
    assert_eq!(single_string(r#"@"say ""hi""""#), r#"say "hi""#);
    assert_eq!(single_string("@'it''s'"), "it's");
}

#[test]
fn test_text_block() {
    let src = "|||\n  line one\n    indented\n\n  last\n|||";
    assert_eq!(single_string(src), "line one\n  indented\n\nlast\n");
}

#[test]
fn test_text_block_requires_newline() {
    assert_eq!(
        lex_err("||| x\n  a\n|||").kind,
        LexErrorKind::TextBlockNeedsNewline
    );
}

#[test]
fn test_text_block_requires_indent() {
    assert_eq!(
        lex_err("|||\nno indent\n|||").kind,
        LexErrorKind::TextBlockNeedsIndent
    );
}

#[test]
fn test_text_block_requires_terminator() {
    assert_eq!(
        lex_err("|||\n  a\nb").kind,
        LexErrorKind::TextBlockUnterminated
    );
}
