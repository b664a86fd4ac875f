//! Lexer for Jsonnet source text.
//!
//! A hand-written scanner producing a flat token list. String literals are
//! unescaped here, so the parser only ever sees their final contents.
//! Comments and whitespace are dropped.

mod cursor;
mod lex_error;
mod token;

pub use lex_error::{LexError, LexErrorKind};
pub use token::{Token, TokenDisplay, TokenKind};

use cursor::Cursor;
use jsonnet_ir::{Location, LocationRange, Name, StringInterner};

/// Lex `source`, attributing locations to `file`.
pub fn lex(interner: &StringInterner, file: &str, source: &str) -> Result<Vec<Token>, LexError> {
    let file = interner.intern(file);
    Lexer {
        cursor: Cursor::new(source),
        file,
        interner,
    }
    .run()
}

/// Characters that may form operators.
fn is_symbol(c: char) -> bool {
    matches!(
        c,
        '!' | ':' | '~' | '+' | '-' | '&' | '|' | '^' | '=' | '<' | '>' | '*' | '/' | '%'
    )
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    file: Name,
    interner: &'a StringInterner,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let begin = self.cursor.location();
            let Some(c) = self.cursor.peek() else {
                tokens.push(Token {
                    kind: TokenKind::EndOfFile,
                    loc: self.range(begin),
                });
                return Ok(tokens);
            };
            let kind = match c {
                '{' => self.punct(TokenKind::BraceL),
                '}' => self.punct(TokenKind::BraceR),
                '[' => self.punct(TokenKind::BracketL),
                ']' => self.punct(TokenKind::BracketR),
                ',' => self.punct(TokenKind::Comma),
                '$' => self.punct(TokenKind::Dollar),
                '.' => self.punct(TokenKind::Dot),
                '(' => self.punct(TokenKind::ParenL),
                ')' => self.punct(TokenKind::ParenR),
                ';' => self.punct(TokenKind::Semicolon),
                '0'..='9' => self.number(begin)?,
                '"' | '\'' => self.quoted(begin, c)?,
                '@' => self.verbatim(begin)?,
                '|' if self.cursor.starts_with("|||") => self.text_block(begin)?,
                c if is_ident_start(c) => self.identifier(),
                c if is_symbol(c) => self.operator(),
                found => return Err(self.error(begin, LexErrorKind::UnexpectedChar { found })),
            };
            tokens.push(Token {
                kind,
                loc: self.range(begin),
            });
        }
    }

    fn range(&self, begin: Location) -> LocationRange {
        LocationRange::new(self.file, begin, self.cursor.location())
    }

    fn error(&self, begin: Location, kind: LexErrorKind) -> LexError {
        LexError::new(self.range(begin), kind)
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.bump_ascii(1);
        kind
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.cursor.bump();
                }
                Some('#') => self.cursor.skip_line(),
                Some('/') if self.cursor.starts_with("//") => self.cursor.skip_line(),
                Some('/') if self.cursor.starts_with("/*") => {
                    let begin = self.cursor.location();
                    self.cursor.bump_ascii(2);
                    if !self.cursor.skip_block_comment_body() {
                        return Err(self.error(begin, LexErrorKind::UnterminatedComment));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let text = self.cursor.eat_while(is_ident_continue);
        TokenKind::keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(self.interner.intern(text)))
    }

    /// Operators are the longest run of symbol characters, except that a
    /// comment start or `|||` ends the run, and a multi-character operator
    /// may not end in `+ - ~ !` (so `a*-b` lexes as `*` `-`).
    fn operator(&mut self) -> TokenKind {
        let rest = self.cursor.rest();
        let mut len = 0;
        for (i, c) in rest.char_indices() {
            if !is_symbol(c) {
                break;
            }
            if i > 0 {
                let tail = &rest[i..];
                if tail.starts_with("//") || tail.starts_with("/*") || tail.starts_with("|||") {
                    break;
                }
            }
            len = i + c.len_utf8();
        }
        while len > 1 && rest[..len].ends_with(['+', '-', '~', '!']) {
            len -= 1;
        }
        let op = rest[..len].to_owned();
        self.cursor.bump_ascii(len);
        TokenKind::Operator(op)
    }

    /// `0`, `12`, `1.5`, `2e10`, `3.25E-2`. A leading `0` ends the integer part.
    fn number(&mut self, begin: Location) -> Result<TokenKind, LexError> {
        let start = self.cursor.rest();
        let digits = |s: &str| s.bytes().take_while(u8::is_ascii_digit).count();
        let mut len = if start.starts_with('0') { 1 } else { digits(start) };

        if start[len..].starts_with('.') {
            len += 1;
            let frac = digits(&start[len..]);
            if frac == 0 {
                self.cursor.bump_ascii(len);
                let found = self.cursor.peek();
                return Err(self.error(begin, LexErrorKind::JunkAfterDecimalPoint { found }));
            }
            len += frac;
        }

        if start[len..].starts_with(['e', 'E']) {
            len += 1;
            let signed = start[len..].starts_with(['+', '-']);
            if signed {
                len += 1;
            }
            let exp = digits(&start[len..]);
            if exp == 0 {
                self.cursor.bump_ascii(len);
                let found = self.cursor.peek();
                let kind = if signed {
                    LexErrorKind::JunkAfterExponentSign { found }
                } else {
                    LexErrorKind::JunkAfterExponent { found }
                };
                return Err(self.error(begin, kind));
            }
            len += exp;
        }

        let text = &start[..len];
        self.cursor.bump_ascii(len);
        // The grammar above only admits valid float syntax.
        let value = text.parse::<f64>().unwrap_or(f64::NAN);
        Ok(TokenKind::Number(value))
    }

    fn quoted(&mut self, begin: Location, quote: char) -> Result<TokenKind, LexError> {
        self.cursor.bump();
        let mut out = String::new();
        loop {
            match self.cursor.bump() {
                None => return Err(self.error(begin, LexErrorKind::UnterminatedString)),
                Some(c) if c == quote => return Ok(TokenKind::Str(out)),
                Some('\\') => {
                    let c = match self.cursor.bump() {
                        None => return Err(self.error(begin, LexErrorKind::UnterminatedString)),
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => self.unicode_escape(begin)?,
                        Some(escape) => {
                            return Err(self.error(begin, LexErrorKind::UnknownEscape { escape }))
                        }
                    };
                    out.push(c);
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn hex4(&mut self, begin: Location) -> Result<u32, LexError> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self
                .cursor
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(begin, LexErrorKind::TruncatedUnicodeEscape))?;
            self.cursor.bump();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// `\uXXXX`, combining a UTF-16 surrogate pair when one follows.
    fn unicode_escape(&mut self, begin: Location) -> Result<char, LexError> {
        let code = self.hex4(begin)?;
        if (0xD800..0xDC00).contains(&code) && self.cursor.starts_with("\\u") {
            let saved = self.cursor.clone();
            self.cursor.bump_ascii(2);
            let low = self.hex4(begin)?;
            if (0xDC00..0xE000).contains(&low) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    return Ok(c);
                }
            }
            self.cursor = saved;
        }
        char::from_u32(code)
            .ok_or_else(|| self.error(begin, LexErrorKind::InvalidUnicodeEscape { code }))
    }

    /// `@"..."` / `@'...'`: no escapes, a doubled quote stands for itself.
    fn verbatim(&mut self, begin: Location) -> Result<TokenKind, LexError> {
        let quote = match self.cursor.peek_second() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error(begin, LexErrorKind::UnexpectedChar { found: '@' })),
        };
        self.cursor.bump_ascii(2);
        let mut out = String::new();
        loop {
            match self.cursor.bump() {
                None => return Err(self.error(begin, LexErrorKind::UnterminatedString)),
                Some(c) if c == quote => {
                    if self.cursor.peek() == Some(quote) {
                        self.cursor.bump();
                        out.push(quote);
                    } else {
                        return Ok(TokenKind::Str(out));
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// `|||` text block. The first line's leading whitespace is the indent
    /// stripped from every line; the block ends at the first line not
    /// carrying that indent, which must be `|||`.
    fn text_block(&mut self, begin: Location) -> Result<TokenKind, LexError> {
        self.cursor.bump_ascii(3);
        self.cursor.eat_while(|c| c == ' ' || c == '\t');
        if self.cursor.bump() != Some('\n') {
            return Err(self.error(begin, LexErrorKind::TextBlockNeedsNewline));
        }

        let mut out = String::new();
        while self.cursor.peek() == Some('\n') {
            self.cursor.bump();
            out.push('\n');
        }

        let indent = {
            let rest = self.cursor.rest();
            let n = rest.bytes().take_while(|b| *b == b' ' || *b == b'\t').count();
            &rest[..n]
        };
        if indent.is_empty() {
            return Err(self.error(begin, LexErrorKind::TextBlockNeedsIndent));
        }

        loop {
            if self.cursor.starts_with(indent) {
                self.cursor.bump_ascii(indent.len());
                loop {
                    match self.cursor.bump() {
                        None => return Err(self.error(begin, LexErrorKind::TextBlockUnterminated)),
                        Some('\n') => break,
                        Some(c) => out.push(c),
                    }
                }
                out.push('\n');
            } else if self.cursor.peek() == Some('\n') {
                self.cursor.bump();
                out.push('\n');
            } else {
                self.cursor.eat_while(|c| c == ' ' || c == '\t');
                if !self.cursor.starts_with("|||") {
                    return Err(self.error(begin, LexErrorKind::TextBlockUnterminated));
                }
                self.cursor.bump_ascii(3);
                return Ok(TokenKind::Str(out));
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
