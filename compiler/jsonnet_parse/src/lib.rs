//! Recursive descent parser for Jsonnet.
//!
//! Consumes the token list produced by `jsonnet_lexer` and builds the surface
//! [`ast`](jsonnet_ir::ast) tree. Binary operators are parsed by precedence
//! level; `local`, `if`, `function`, `assert` and `error` extend as far right
//! as possible and may appear at any level.

mod cursor;
mod error;
mod grammar;

pub use error::{ParseError, ParseErrorKind};

use cursor::Cursor;
use jsonnet_ir::ast::Expr;
use jsonnet_ir::{LocationRange, Name, StringInterner};
use jsonnet_lexer::{Token, TokenKind};

/// Parse a complete token list into a single expression.
///
/// `tokens` must end with `EndOfFile`, as returned by `jsonnet_lexer::lex`.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse(interner: &StringInterner, tokens: &[Token]) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(tokens, interner);
    let expr = parser.parse_expr()?;
    if !parser.check(&TokenKind::EndOfFile) {
        return Err(ParseError::new(
            parser.current_loc(),
            ParseErrorKind::TrailingInput {
                got: parser.describe_current(),
            },
        ));
    }
    Ok(expr)
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    interner: &'a StringInterner,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
        }
    }

    #[inline]
    fn current_kind(&self) -> &'a TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_loc(&self) -> LocationRange {
        self.cursor.current_loc()
    }

    #[inline]
    fn previous_loc(&self) -> LocationRange {
        self.cursor.previous_loc()
    }

    #[inline]
    fn peek_kind(&self) -> &'a TokenKind {
        self.cursor.peek_kind()
    }

    #[inline]
    fn advance(&mut self) -> &'a Token {
        self.cursor.advance()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn check_operator(&self, op: &str) -> bool {
        self.cursor.check_operator(op)
    }

    /// Render the current token for an error message.
    fn describe_current(&self) -> String {
        self.current_kind().describe(self.interner).to_string()
    }

    /// Consume a token of the given kind or fail with `Expected token`.
    fn expect(&mut self, kind: &TokenKind) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let expected = match kind.spelling() {
            Some(s) => format!("\"{s}\""),
            None => kind.describe(self.interner).to_string(),
        };
        Err(ParseError::new(
            self.current_loc(),
            ParseErrorKind::ExpectedToken {
                expected,
                got: self.describe_current(),
            },
        ))
    }

    fn expect_operator(&mut self, op: &str) -> Result<(), ParseError> {
        if self.check_operator(op) {
            self.advance();
            return Ok(());
        }
        Err(ParseError::new(
            self.current_loc(),
            ParseErrorKind::ExpectedToken {
                expected: format!("(OPERATOR, \"{op}\")"),
                got: self.describe_current(),
            },
        ))
    }

    fn expect_identifier(&mut self) -> Result<Name, ParseError> {
        if let TokenKind::Identifier(name) = self.current_kind() {
            self.advance();
            return Ok(*name);
        }
        Err(ParseError::new(
            self.current_loc(),
            ParseErrorKind::ExpectedToken {
                expected: "IDENTIFIER".to_string(),
                got: self.describe_current(),
            },
        ))
    }

    /// `Unexpected: <token> while parsing <context>`, or the end-of-file
    /// message when input ran out.
    fn unexpected(&self, context: &'static str) -> ParseError {
        let kind = if self.check(&TokenKind::EndOfFile) {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::Unexpected {
                got: self.describe_current(),
                context,
            }
        };
        ParseError::new(self.current_loc(), kind)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
