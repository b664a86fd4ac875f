//! Token types.

use jsonnet_ir::{LocationRange, Name, StringInterner};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: LocationRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Punctuation
    BraceL,
    BraceR,
    BracketL,
    BracketR,
    Comma,
    Dollar,
    Dot,
    ParenL,
    ParenR,
    Semicolon,

    // Atoms
    Identifier(Name),
    Number(f64),
    /// Any string form, escapes already processed.
    Str(String),
    /// A run of operator characters, e.g. `+`, `::`, `+:::`, `<=`.
    Operator(String),

    // Keywords
    Assert,
    Else,
    Error,
    False,
    For,
    Function,
    If,
    Import,
    Importstr,
    In,
    Local,
    Null,
    Tailstrict,
    Then,
    SelfKw,
    Super,
    True,

    EndOfFile,
}

impl TokenKind {
    pub fn keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "assert" => TokenKind::Assert,
            "else" => TokenKind::Else,
            "error" => TokenKind::Error,
            "false" => TokenKind::False,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "importstr" => TokenKind::Importstr,
            "in" => TokenKind::In,
            "local" => TokenKind::Local,
            "null" => TokenKind::Null,
            "tailstrict" => TokenKind::Tailstrict,
            "then" => TokenKind::Then,
            "self" => TokenKind::SelfKw,
            "super" => TokenKind::Super,
            "true" => TokenKind::True,
            _ => return None,
        })
    }

    /// Fixed spelling of punctuation and keywords.
    pub const fn spelling(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::BraceL => "{",
            TokenKind::BraceR => "}",
            TokenKind::BracketL => "[",
            TokenKind::BracketR => "]",
            TokenKind::Comma => ",",
            TokenKind::Dollar => "$",
            TokenKind::Dot => ".",
            TokenKind::ParenL => "(",
            TokenKind::ParenR => ")",
            TokenKind::Semicolon => ";",
            TokenKind::Assert => "assert",
            TokenKind::Else => "else",
            TokenKind::Error => "error",
            TokenKind::False => "false",
            TokenKind::For => "for",
            TokenKind::Function => "function",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::Importstr => "importstr",
            TokenKind::In => "in",
            TokenKind::Local => "local",
            TokenKind::Null => "null",
            TokenKind::Tailstrict => "tailstrict",
            TokenKind::Then => "then",
            TokenKind::SelfKw => "self",
            TokenKind::Super => "super",
            TokenKind::True => "true",
            TokenKind::EndOfFile => "end of file",
            TokenKind::Identifier(_)
            | TokenKind::Number(_)
            | TokenKind::Str(_)
            | TokenKind::Operator(_) => return None,
        })
    }

    /// Human-readable rendering for parse errors.
    pub fn describe<'a>(&'a self, interner: &'a StringInterner) -> TokenDisplay<'a> {
        TokenDisplay {
            kind: self,
            interner,
        }
    }
}

pub struct TokenDisplay<'a> {
    kind: &'a TokenKind,
    interner: &'a StringInterner,
}

impl fmt::Display for TokenDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier(name) => {
                write!(f, "(IDENTIFIER, \"{}\")", self.interner.lookup(*name))
            }
            TokenKind::Number(n) => write!(f, "(NUMBER, \"{n}\")"),
            TokenKind::Str(s) => write!(f, "(STRING, {s:?})"),
            TokenKind::Operator(op) => write!(f, "(OPERATOR, \"{op}\")"),
            TokenKind::EndOfFile => f.write_str("end of file"),
            other => match other.spelling() {
                Some(s) => write!(f, "\"{s}\""),
                None => write!(f, "{other:?}"),
            },
        }
    }
}
