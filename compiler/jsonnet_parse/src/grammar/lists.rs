//! Comma-separated lists: parameters, arguments, binds, comprehension clauses.

use crate::{ParseError, ParseErrorKind, Parser};
use jsonnet_ir::ast::{Arg, Bind, CompSpec, Param};
use jsonnet_lexer::TokenKind;

impl Parser<'_> {
    /// After `(`: `a, b = 1, ...)`. Consumes the closing paren.
    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        while !self.check(&TokenKind::ParenR) {
            let start = self.current_loc();
            let name = self.expect_identifier()?;
            let default = if self.check_operator("=") {
                self.advance();
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                default,
                loc: start.to(self.previous_loc()),
            });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&TokenKind::ParenR)?;
        Ok(params)
    }

    /// After `(`: positional and `name = e` arguments. Consumes the closing
    /// paren.
    pub(super) fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args = Vec::new();
        while !self.check(&TokenKind::ParenR) {
            let name = match (self.current_kind(), self.peek_kind()) {
                (TokenKind::Identifier(name), TokenKind::Operator(op)) if op == "=" => {
                    self.advance();
                    self.advance();
                    Some(*name)
                }
                _ => None,
            };
            let expr = self.parse_expr()?;
            args.push(Arg { name, expr });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&TokenKind::ParenR)?;
        Ok(args)
    }

    /// After `local`: one or more binds up to and including `;`.
    pub(super) fn parse_binds(&mut self) -> Result<Vec<Bind>, ParseError> {
        let mut binds = vec![self.parse_bind()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            binds.push(self.parse_bind()?);
        }
        self.expect(&TokenKind::Semicolon)?;
        Ok(binds)
    }

    /// `x = e` or `f(params) = e`.
    pub(super) fn parse_bind(&mut self) -> Result<Bind, ParseError> {
        let start = self.current_loc();
        let name = self.expect_identifier()?;
        let params = if self.check(&TokenKind::ParenL) {
            self.advance();
            Some(self.parse_params()?)
        } else {
            None
        };
        self.expect_operator("=")?;
        let body = self.parse_expr()?;
        Ok(Bind {
            name,
            params,
            body,
            loc: start.to(self.previous_loc()),
        })
    }

    /// `for x in e` followed by any mix of `for` and `if` clauses, then
    /// `end`, which is consumed.
    pub(super) fn parse_comp_specs(&mut self, end: &TokenKind) -> Result<Vec<CompSpec>, ParseError> {
        let mut specs = Vec::new();
        self.expect(&TokenKind::For)?;
        specs.push(self.parse_for_clause()?);
        loop {
            match self.current_kind() {
                TokenKind::For => {
                    self.advance();
                    specs.push(self.parse_for_clause()?);
                }
                TokenKind::If => {
                    self.advance();
                    specs.push(CompSpec::If(self.parse_expr()?));
                }
                kind if kind == end => {
                    self.advance();
                    return Ok(specs);
                }
                _ => {
                    return Err(ParseError::new(
                        self.current_loc(),
                        ParseErrorKind::ExpectedCompSpec {
                            end: end.spelling().unwrap_or_default(),
                            got: self.describe_current(),
                        },
                    ))
                }
            }
        }
    }

    /// After `for`: `x in e`.
    fn parse_for_clause(&mut self) -> Result<CompSpec, ParseError> {
        let var = self.expect_identifier()?;
        self.expect(&TokenKind::In)?;
        let array = self.parse_expr()?;
        Ok(CompSpec::For { var, array })
    }
}
