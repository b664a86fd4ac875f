//! Expression grammar.
//!
//! - `mod.rs`: entry point and the precedence loop
//! - `terminal.rs`: literals, variables, arrays, `super`, parentheses
//! - `object.rs`: object literals and object comprehensions
//! - `lists.rs`: parameters, arguments, `local` binds, comprehension clauses
//!
//! Precedence levels run from 0 (terminals) to [`MAX_LEVEL`]; a lower level
//! binds tighter. Postfix application and indexing sit at [`APPLY_LEVEL`],
//! prefix operators at [`UNARY_LEVEL`], and binary operators above that.

mod lists;
mod object;
mod terminal;

use crate::{ParseError, ParseErrorKind, Parser};
use jsonnet_ir::ast::{Expr, ExprKind};
use jsonnet_ir::{BinaryOp, LocationRange, UnaryOp};
use jsonnet_lexer::TokenKind;
use jsonnet_stack::ensure_sufficient_stack;

const APPLY_LEVEL: u8 = 2;
const UNARY_LEVEL: u8 = 4;
const MAX_LEVEL: u8 = 15;

/// Level at which `op` is parsed: `*` is 5, `||` is 14.
fn binary_level(op: BinaryOp) -> u8 {
    17 - op.precedence()
}

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_level(MAX_LEVEL)
    }

    fn parse_level(&mut self, level: u8) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_level_inner(level))
    }

    fn parse_level_inner(&mut self, level: u8) -> Result<Expr, ParseError> {
        let start = self.current_loc();
        match self.current_kind() {
            TokenKind::Assert => {
                self.advance();
                let cond = self.parse_expr()?;
                let message = if self.check_operator(":") {
                    self.advance();
                    Some(Box::new(self.parse_expr()?))
                } else {
                    None
                };
                self.expect(&TokenKind::Semicolon)?;
                let rest = self.parse_expr()?;
                return Ok(self.finish(
                    start,
                    ExprKind::Assert {
                        cond: Box::new(cond),
                        message,
                        rest: Box::new(rest),
                    },
                ));
            }
            TokenKind::Error => {
                self.advance();
                let expr = self.parse_expr()?;
                return Ok(self.finish(start, ExprKind::Error(Box::new(expr))));
            }
            TokenKind::If => {
                self.advance();
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::Then)?;
                let then = self.parse_expr()?;
                let otherwise = if self.check(&TokenKind::Else) {
                    self.advance();
                    Some(Box::new(self.parse_expr()?))
                } else {
                    None
                };
                return Ok(self.finish(
                    start,
                    ExprKind::Conditional {
                        cond: Box::new(cond),
                        then: Box::new(then),
                        otherwise,
                    },
                ));
            }
            TokenKind::Function => {
                self.advance();
                self.expect(&TokenKind::ParenL)?;
                let params = self.parse_params()?;
                let body = self.parse_expr()?;
                return Ok(self.finish(
                    start,
                    ExprKind::Function {
                        params,
                        body: Box::new(body),
                    },
                ));
            }
            TokenKind::Import | TokenKind::Importstr => {
                let is_str = self.check(&TokenKind::Importstr);
                self.advance();
                let TokenKind::Str(path) = self.current_kind() else {
                    return Err(ParseError::new(
                        self.current_loc(),
                        ParseErrorKind::ComputedImport,
                    ));
                };
                self.advance();
                let kind = if is_str {
                    ExprKind::Importstr(path.clone())
                } else {
                    ExprKind::Import(path.clone())
                };
                return Ok(self.finish(start, kind));
            }
            TokenKind::Local => {
                self.advance();
                let binds = self.parse_binds()?;
                let body = self.parse_expr()?;
                return Ok(self.finish(
                    start,
                    ExprKind::Local {
                        binds,
                        body: Box::new(body),
                    },
                ));
            }
            TokenKind::Operator(sym) => {
                let Some(op) = UnaryOp::from_symbol(sym) else {
                    return Err(ParseError::new(
                        start,
                        ParseErrorKind::NotUnaryOperator { op: sym.clone() },
                    ));
                };
                if level == UNARY_LEVEL {
                    self.advance();
                    let expr = self.parse_level(UNARY_LEVEL)?;
                    return Ok(self.finish(
                        start,
                        ExprKind::Unary {
                            op,
                            expr: Box::new(expr),
                        },
                    ));
                }
            }
            _ => {}
        }

        if level == 0 {
            return self.parse_terminal();
        }

        let mut lhs = self.parse_level(level - 1)?;
        loop {
            let op = match self.current_kind() {
                // Slice and field separators end the expression.
                TokenKind::Operator(sym) if sym.starts_with(':') => return Ok(lhs),
                TokenKind::Operator(sym) => {
                    let Some(op) = BinaryOp::from_symbol(sym) else {
                        return Err(ParseError::new(
                            self.current_loc(),
                            ParseErrorKind::NotBinaryOperator { op: sym.clone() },
                        ));
                    };
                    op
                }
                TokenKind::In => BinaryOp::In,
                TokenKind::Dot | TokenKind::BracketL | TokenKind::ParenL | TokenKind::BraceL => {
                    if level != APPLY_LEVEL {
                        return Ok(lhs);
                    }
                    lhs = self.parse_postfix(lhs)?;
                    continue;
                }
                _ => return Ok(lhs),
            };
            if binary_level(op) != level {
                return Ok(lhs);
            }
            self.advance();
            if op == BinaryOp::In && self.check(&TokenKind::Super) {
                self.advance();
                let loc = lhs.loc.to(self.previous_loc());
                lhs = Expr::new(loc, ExprKind::InSuper(Box::new(lhs)));
                continue;
            }
            let rhs = self.parse_level(level - 1)?;
            let loc = lhs.loc.to(rhs.loc);
            lhs = Expr::new(
                loc,
                ExprKind::Binary {
                    left: Box::new(lhs),
                    op,
                    right: Box::new(rhs),
                },
            );
        }
    }

    /// Build a node spanning from `start` through the last consumed token.
    fn finish(&self, start: LocationRange, kind: ExprKind) -> Expr {
        Expr::new(start.to(self.previous_loc()), kind)
    }

    /// `.f`, `[e]`, `[a:b:c]`, `(args)` or `{ ... }` applied to `lhs`.
    fn parse_postfix(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let start = lhs.loc;
        let tok = self.advance();
        let kind = match &tok.kind {
            TokenKind::Dot => {
                let field_loc = self.current_loc();
                let name = self.expect_identifier()?;
                let index = Expr::new(field_loc, ExprKind::Str(self.interner.lookup(name).to_string()));
                ExprKind::Index {
                    target: Box::new(lhs),
                    index: Box::new(index),
                }
            }
            TokenKind::BracketL => return self.parse_index_remainder(lhs),
            TokenKind::ParenL => {
                let args = self.parse_args()?;
                let tailstrict = self.check(&TokenKind::Tailstrict);
                if tailstrict {
                    self.advance();
                }
                ExprKind::Apply {
                    target: Box::new(lhs),
                    args,
                    tailstrict,
                }
            }
            // `e { ... }` is `e + { ... }`.
            _ => {
                let object = self.parse_object_remainder(tok.loc)?;
                ExprKind::Binary {
                    left: Box::new(lhs),
                    op: BinaryOp::Plus,
                    right: Box::new(object),
                }
            }
        };
        Ok(self.finish(start, kind))
    }

    /// After `target[`: either an index or a slice.
    fn parse_index_remainder(&mut self, target: Expr) -> Result<Expr, ParseError> {
        let start = target.loc;
        let begin = if self.check_operator(":") || self.check_operator("::") {
            None
        } else {
            Some(self.parse_expr()?)
        };

        if let Some(index) = begin {
            if !self.check_operator(":") && !self.check_operator("::") {
                self.expect(&TokenKind::BracketR)?;
                return Ok(self.finish(
                    start,
                    ExprKind::Index {
                        target: Box::new(target),
                        index: Box::new(index),
                    },
                ));
            }
            return self.parse_slice_remainder(start, target, Some(index));
        }
        self.parse_slice_remainder(start, target, None)
    }

    /// After `target[begin`, positioned on `:` or `::`.
    fn parse_slice_remainder(
        &mut self,
        start: LocationRange,
        target: Expr,
        begin: Option<Expr>,
    ) -> Result<Expr, ParseError> {
        let mut end = None;
        let mut step = None;
        if self.check_operator("::") {
            self.advance();
            if !self.check(&TokenKind::BracketR) {
                step = Some(Box::new(self.parse_expr()?));
            }
        } else {
            self.expect_operator(":")?;
            if !self.check(&TokenKind::BracketR) && !self.check_operator(":") {
                end = Some(Box::new(self.parse_expr()?));
            }
            if self.check_operator(":") {
                self.advance();
                if !self.check(&TokenKind::BracketR) {
                    step = Some(Box::new(self.parse_expr()?));
                }
            }
        }
        self.expect(&TokenKind::BracketR)?;
        Ok(self.finish(
            start,
            ExprKind::Slice {
                target: Box::new(target),
                begin: begin.map(Box::new),
                end,
                step,
            },
        ))
    }
}
