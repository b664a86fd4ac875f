//! Object literals and object comprehensions.

use crate::{ParseError, ParseErrorKind, Parser};
use jsonnet_ir::ast::{Expr, ExprKind, Field, FieldName, Member};
use jsonnet_ir::{LocationRange, Visibility};
use jsonnet_lexer::TokenKind;

/// `:`, `::`, `:::` and their `+` forms.
fn field_separator(op: &str) -> Option<(bool, Visibility)> {
    Some(match op {
        ":" => (false, Visibility::Inherit),
        "::" => (false, Visibility::Hidden),
        ":::" => (false, Visibility::Visible),
        "+:" => (true, Visibility::Inherit),
        "+::" => (true, Visibility::Hidden),
        "+:::" => (true, Visibility::Visible),
        _ => return None,
    })
}

impl Parser<'_> {
    /// After `{`: members up to and including `}`, or an object
    /// comprehension.
    pub(super) fn parse_object_remainder(&mut self, start: LocationRange) -> Result<Expr, ParseError> {
        let mut members = Vec::new();
        loop {
            if self.check(&TokenKind::BraceR) {
                self.advance();
                return Ok(self.finish(start, ExprKind::Object(members)));
            }
            members.push(self.parse_member()?);
            match self.current_kind() {
                TokenKind::For => return self.parse_object_comp(start, members),
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::BraceR => {}
                _ => {
                    return Err(ParseError::new(
                        self.current_loc(),
                        ParseErrorKind::ExpectedComma { context: "field" },
                    ))
                }
            }
        }
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let start = self.current_loc();
        let name = match self.current_kind() {
            TokenKind::Local => {
                self.advance();
                return Ok(Member::Local(self.parse_bind()?));
            }
            TokenKind::Assert => {
                self.advance();
                let cond = self.parse_expr()?;
                let message = if self.check_operator(":") {
                    self.advance();
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                return Ok(Member::Assert {
                    cond,
                    message,
                    loc: start.to(self.previous_loc()),
                });
            }
            TokenKind::Identifier(name) => {
                self.advance();
                FieldName::Id(*name)
            }
            TokenKind::Str(s) => {
                self.advance();
                FieldName::Str(s.clone())
            }
            TokenKind::BracketL => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::BracketR)?;
                FieldName::Computed(expr)
            }
            _ => return Err(self.unexpected("field definition")),
        };

        let params = if self.check(&TokenKind::ParenL) {
            self.advance();
            Some(self.parse_params()?)
        } else {
            None
        };

        let separator = match self.current_kind() {
            TokenKind::Operator(op) => field_separator(op),
            _ => None,
        };
        let Some((plus, visibility)) = separator else {
            return Err(ParseError::new(
                self.current_loc(),
                ParseErrorKind::ExpectedFieldSeparator {
                    got: self.describe_current(),
                },
            ));
        };
        if plus && params.is_some() {
            let field = match &name {
                FieldName::Id(n) => self.interner.lookup(*n).to_string(),
                FieldName::Str(s) => s.clone(),
                FieldName::Computed(_) => "<computed>".to_string(),
            };
            return Err(ParseError::new(start, ParseErrorKind::MethodWithPlus { field }));
        }
        self.advance();

        let body = self.parse_expr()?;
        Ok(Member::Field(Field {
            name,
            plus,
            visibility,
            params,
            body,
            loc: start.to(self.previous_loc()),
        }))
    }

    /// Positioned on `for` after the single field of `{ [k]: v for ... }`.
    fn parse_object_comp(&mut self, start: LocationRange, members: Vec<Member>) -> Result<Expr, ParseError> {
        let mut binds = Vec::new();
        let mut fields = Vec::new();
        for member in members {
            match member {
                Member::Local(bind) => binds.push(bind),
                Member::Assert { loc, .. } => {
                    return Err(ParseError::new(loc, ParseErrorKind::ComprehensionWithAsserts));
                }
                Member::Field(field) => fields.push(field),
            }
        }
        let Some(field) = fields.pop().filter(|_| fields.is_empty()) else {
            return Err(ParseError::new(start, ParseErrorKind::ComprehensionFieldCount));
        };
        if field.visibility != Visibility::Inherit {
            return Err(ParseError::new(field.loc, ParseErrorKind::ComprehensionHiddenField));
        }
        let FieldName::Computed(key) = field.name else {
            return Err(ParseError::new(field.loc, ParseErrorKind::ComprehensionNamedField));
        };
        let value = match field.params {
            Some(params) => Expr::new(
                field.body.loc,
                ExprKind::Function {
                    params,
                    body: Box::new(field.body),
                },
            ),
            None => field.body,
        };
        let specs = self.parse_comp_specs(&TokenKind::BraceR)?;
        Ok(self.finish(
            start,
            ExprKind::ObjectComp {
                binds,
                key: Box::new(key),
                value: Box::new(value),
                specs,
            },
        ))
    }
}
