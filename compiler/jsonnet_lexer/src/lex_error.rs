//! Lexer errors.

use jsonnet_ir::{LocationRange, StringInterner};
use std::fmt;

/// A lexing failure at a source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub loc: LocationRange,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexErrorKind {
    // Strings
    UnterminatedString,
    UnknownEscape { escape: char },
    TruncatedUnicodeEscape,
    InvalidUnicodeEscape { code: u32 },

    // Text blocks
    TextBlockNeedsNewline,
    TextBlockNeedsIndent,
    TextBlockUnterminated,

    // Numbers
    JunkAfterDecimalPoint { found: Option<char> },
    JunkAfterExponent { found: Option<char> },
    JunkAfterExponentSign { found: Option<char> },

    // Other
    UnterminatedComment,
    UnexpectedChar { found: char },
}

fn describe_char(c: Option<char>) -> String {
    match c {
        Some(c) => c.to_string(),
        None => "end of file".to_owned(),
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "Unterminated string"),
            Self::UnknownEscape { escape } => {
                write!(f, "Unknown escape sequence in string literal: '{escape}'")
            }
            Self::TruncatedUnicodeEscape => {
                write!(f, "Truncated unicode escape sequence in string literal.")
            }
            Self::InvalidUnicodeEscape { code } => {
                write!(f, "Invalid unicode escape sequence: \\u{code:04x}")
            }
            Self::TextBlockNeedsNewline => {
                write!(f, "Text block syntax requires new line after |||.")
            }
            Self::TextBlockNeedsIndent => {
                write!(f, "Text block's first line must start with whitespace.")
            }
            Self::TextBlockUnterminated => write!(f, "Text block not terminated with |||"),
            Self::JunkAfterDecimalPoint { found } => write!(
                f,
                "Couldn't lex number, junk after decimal point: '{}'",
                describe_char(*found)
            ),
            Self::JunkAfterExponent { found } => write!(
                f,
                "Couldn't lex number, junk after 'E': '{}'",
                describe_char(*found)
            ),
            Self::JunkAfterExponentSign { found } => write!(
                f,
                "Couldn't lex number, junk after exponent sign: '{}'",
                describe_char(*found)
            ),
            Self::UnterminatedComment => {
                write!(f, "Multi-line comment has no terminating */.")
            }
            Self::UnexpectedChar { found } => {
                write!(f, "Could not lex the character '{}'", found.escape_default())
            }
        }
    }
}

impl LexError {
    pub fn new(loc: LocationRange, kind: LexErrorKind) -> Self {
        LexError { loc, kind }
    }

    /// Render as `file:line:col: message`.
    pub fn render(&self, interner: &StringInterner) -> String {
        format!("{}: {}", self.loc.display(interner), self.kind)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}
