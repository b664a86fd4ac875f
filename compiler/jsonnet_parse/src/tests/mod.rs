//! Parser tests.
//!
//! Trees are compared through a compact s-expression rendering so that
//! tests do not depend on source locations.


use crate::{parse, ParseError, ParseErrorKind};
use jsonnet_ir::ast::{Arg, Bind, CompSpec, Expr, ExprKind, FieldName, Member, Param};
use jsonnet_ir::StringInterner;
use std::fmt::Write;

pub(super) fn parse_src(interner: &StringInterner, src: &str) -> Result<Expr, ParseError> {
    let tokens = jsonnet_lexer::lex(interner, "test.jsonnet", src).unwrap();
    parse(interner, &tokens)
}

/// Parse and render as an s-expression.
pub(super) fn sexp(src: &str) -> String {
    let interner = StringInterner::new();
    let expr = parse_src(&interner, src).unwrap();
    let mut out = String::new();
    render(&interner, &expr, &mut out);
    out
}

pub(super) fn parse_err(src: &str) -> ParseErrorKind {
    let interner = StringInterner::new();
    parse_src(&interner, src).unwrap_err().kind
}

fn render_opt(interner: &StringInterner, e: Option<&Expr>, out: &mut String) {
    match e {
        Some(e) => render(interner, e, out),
        None => out.push('_'),
    }
}

fn render_params(interner: &StringInterner, params: &[Param], out: &mut String) {
    out.push('(');
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(interner.lookup(p.name));
        if let Some(d) = &p.default {
            out.push('=');
            render(interner, d, out);
        }
    }
    out.push(')');
}

fn render_bind(interner: &StringInterner, b: &Bind, out: &mut String) {
    out.push_str(interner.lookup(b.name));
    if let Some(params) = &b.params {
        render_params(interner, params, out);
    }
    out.push('=');
    render(interner, &b.body, out);
}

fn render_specs(interner: &StringInterner, specs: &[CompSpec], out: &mut String) {
    for spec in specs {
        match spec {
            CompSpec::For { var, array } => {
                let _ = write!(out, " (for {} ", interner.lookup(*var));
                render(interner, array, out);
                out.push(')');
            }
            CompSpec::If(cond) => {
                out.push_str(" (if ");
                render(interner, cond, out);
                out.push(')');
            }
        }
    }
}

fn render(interner: &StringInterner, e: &Expr, out: &mut String) {
    match &e.kind {
        ExprKind::Apply {
            target,
            args,
            tailstrict,
        } => {
            out.push_str(if *tailstrict { "(call! " } else { "(call " });
            render(interner, target, out);
            for Arg { name, expr } in args {
                out.push(' ');
                if let Some(n) = name {
                    let _ = write!(out, "{}=", interner.lookup(*n));
                }
                render(interner, expr, out);
            }
            out.push(')');
        }
        ExprKind::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render(interner, item, out);
            }
            out.push(']');
        }
        ExprKind::ArrayComp { body, specs } => {
            out.push_str("[comp ");
            render(interner, body, out);
            render_specs(interner, specs, out);
            out.push(']');
        }
        ExprKind::Assert { cond, message, rest } => {
            out.push_str("(assert ");
            render(interner, cond, out);
            out.push(' ');
            render_opt(interner, message.as_deref(), out);
            out.push(' ');
            render(interner, rest, out);
            out.push(')');
        }
        ExprKind::Binary { left, op, right } => {
            let _ = write!(out, "({op} ");
            render(interner, left, out);
            out.push(' ');
            render(interner, right, out);
            out.push(')');
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            out.push_str("(if ");
            render(interner, cond, out);
            out.push(' ');
            render(interner, then, out);
            out.push(' ');
            render_opt(interner, otherwise.as_deref(), out);
            out.push(')');
        }
        ExprKind::Dollar => out.push('$'),
        ExprKind::Error(e) => {
            out.push_str("(error ");
            render(interner, e, out);
            out.push(')');
        }
        ExprKind::Function { params, body } => {
            out.push_str("(fn ");
            render_params(interner, params, out);
            out.push(' ');
            render(interner, body, out);
            out.push(')');
        }
        ExprKind::Import(p) => {
            let _ = write!(out, "(import {p:?})");
        }
        ExprKind::Importstr(p) => {
            let _ = write!(out, "(importstr {p:?})");
        }
        ExprKind::Index { target, index } => {
            out.push_str("(idx ");
            render(interner, target, out);
            out.push(' ');
            render(interner, index, out);
            out.push(')');
        }
        ExprKind::Slice {
            target,
            begin,
            end,
            step,
        } => {
            out.push_str("(slice ");
            render(interner, target, out);
            for part in [begin, end, step] {
                out.push(' ');
                render_opt(interner, part.as_deref(), out);
            }
            out.push(')');
        }
        ExprKind::InSuper(e) => {
            out.push_str("(in-super ");
            render(interner, e, out);
            out.push(')');
        }
        ExprKind::Local { binds, body } => {
            out.push_str("(local");
            for b in binds {
                out.push(' ');
                render_bind(interner, b, out);
            }
            out.push(' ');
            render(interner, body, out);
            out.push(')');
        }
        ExprKind::Null => out.push_str("null"),
        ExprKind::True => out.push_str("true"),
        ExprKind::False => out.push_str("false"),
        ExprKind::Number(n) => {
            let _ = write!(out, "{n}");
        }
        ExprKind::Str(s) => {
            let _ = write!(out, "{s:?}");
        }
        ExprKind::Object(members) => {
            out.push('{');
            for (i, m) in members.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                match m {
                    Member::Local(b) => {
                        out.push_str("local ");
                        render_bind(interner, b, out);
                    }
                    Member::Assert { cond, message, .. } => {
                        out.push_str("assert ");
                        render(interner, cond, out);
                        out.push(' ');
                        render_opt(interner, message.as_ref(), out);
                    }
                    Member::Field(f) => {
                        match &f.name {
                            FieldName::Id(n) => out.push_str(interner.lookup(*n)),
                            FieldName::Str(s) => {
                                let _ = write!(out, "{s:?}");
                            }
                            FieldName::Computed(e) => {
                                out.push('[');
                                render(interner, e, out);
                                out.push(']');
                            }
                        }
                        if let Some(params) = &f.params {
                            render_params(interner, params, out);
                        }
                        if f.plus {
                            out.push('+');
                        }
                        out.push_str(f.visibility.as_symbol());
                        out.push(' ');
                        render(interner, &f.body, out);
                    }
                }
            }
            out.push('}');
        }
        ExprKind::ObjectComp {
            binds,
            key,
            value,
            specs,
        } => {
            out.push_str("{comp");
            for b in binds {
                out.push_str(" local ");
                render_bind(interner, b, out);
            }
            out.push_str(" [");
            render(interner, key, out);
            out.push_str("]: ");
            render(interner, value, out);
            render_specs(interner, specs, out);
            out.push('}');
        }
        ExprKind::SelfRef => out.push_str("self"),
        ExprKind::SuperIndex(e) => {
            out.push_str("(super ");
            render(interner, e, out);
            out.push(')');
        }
        ExprKind::Unary { op, expr } => {
            let _ = write!(out, "({op} ");
            render(interner, expr, out);
            out.push(')');
        }
        ExprKind::Var(n) => out.push_str(interner.lookup(*n)),
    }
}
