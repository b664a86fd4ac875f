//! Token cursor.

use jsonnet_ir::LocationRange;
use jsonnet_lexer::{Token, TokenKind};

/// Cursor over a lexed token list. The last token is always `EndOfFile`.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::EndOfFile)
        ));
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub(crate) fn current(&self) -> &'a Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub(crate) fn current_loc(&self) -> LocationRange {
        self.current().loc
    }

    /// Kind of the token after the current one.
    #[inline]
    pub(crate) fn peek_kind(&self) -> &'a TokenKind {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].kind
    }

    /// Location of the most recently consumed token.
    #[inline]
    pub(crate) fn previous_loc(&self) -> LocationRange {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].loc,
            None => self.current_loc(),
        }
    }

    /// Consume and return the current token. `EndOfFile` is never consumed.
    pub(crate) fn advance(&mut self) -> &'a Token {
        let tok = self.current();
        if !matches!(tok.kind, TokenKind::EndOfFile) {
            self.pos += 1;
        }
        tok
    }

    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    #[inline]
    pub(crate) fn check_operator(&self, op: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Operator(o) if o == op)
    }
}
