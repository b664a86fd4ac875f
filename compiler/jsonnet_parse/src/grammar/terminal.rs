//! Terminals: literals, variables, arrays, `super`, parentheses.

use crate::{ParseError, ParseErrorKind, Parser};
use jsonnet_ir::ast::{Expr, ExprKind};
use jsonnet_ir::LocationRange;
use jsonnet_lexer::TokenKind;

impl Parser<'_> {
    pub(super) fn parse_terminal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_loc();
        let kind = match self.current_kind() {
            TokenKind::Number(n) => ExprKind::Number(*n),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::Identifier(name) => ExprKind::Var(*name),
            TokenKind::True => ExprKind::True,
            TokenKind::False => ExprKind::False,
            TokenKind::Null => ExprKind::Null,
            TokenKind::SelfKw => ExprKind::SelfRef,
            TokenKind::Dollar => ExprKind::Dollar,
            TokenKind::BraceL => {
                self.advance();
                return self.parse_object_remainder(start);
            }
            TokenKind::BracketL => {
                self.advance();
                return self.parse_array_remainder(start);
            }
            TokenKind::ParenL => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::ParenR)?;
                return Ok(inner);
            }
            TokenKind::Super => {
                self.advance();
                return self.parse_super(start);
            }
            _ => return Err(self.unexpected("terminal")),
        };
        self.advance();
        Ok(Expr::new(start, kind))
    }

    /// After `super`: `.f` or `[e]`.
    fn parse_super(&mut self, start: LocationRange) -> Result<Expr, ParseError> {
        let index = match self.current_kind() {
            TokenKind::Dot => {
                self.advance();
                let field_loc = self.current_loc();
                let name = self.expect_identifier()?;
                Expr::new(field_loc, ExprKind::Str(self.interner.lookup(name).to_string()))
            }
            TokenKind::BracketL => {
                self.advance();
                let index = self.parse_expr()?;
                self.expect(&TokenKind::BracketR)?;
                index
            }
            _ => {
                return Err(ParseError::new(
                    self.current_loc(),
                    ParseErrorKind::SuperWithoutIndex,
                ))
            }
        };
        Ok(self.finish(start, ExprKind::SuperIndex(Box::new(index))))
    }

    /// After `[`: an array literal or an array comprehension.
    fn parse_array_remainder(&mut self, start: LocationRange) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::BracketR) {
            self.advance();
            return Ok(self.finish(start, ExprKind::Array(Vec::new())));
        }

        let first = self.parse_expr()?;
        // `[e, for x in a]` is accepted.
        if self.check(&TokenKind::Comma) && matches!(self.peek_kind(), TokenKind::For) {
            self.advance();
        }
        if self.check(&TokenKind::For) {
            let specs = self.parse_comp_specs(&TokenKind::BracketR)?;
            return Ok(self.finish(
                start,
                ExprKind::ArrayComp {
                    body: Box::new(first),
                    specs,
                },
            ));
        }

        let mut elements = vec![first];
        loop {
            match self.current_kind() {
                TokenKind::BracketR => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    self.advance();
                    if self.check(&TokenKind::BracketR) {
                        self.advance();
                        break;
                    }
                    elements.push(self.parse_expr()?);
                }
                _ => {
                    return Err(ParseError::new(
                        self.current_loc(),
                        ParseErrorKind::ExpectedComma {
                            context: "array element",
                        },
                    ))
                }
            }
        }
        Ok(self.finish(start, ExprKind::Array(elements)))
    }
}
