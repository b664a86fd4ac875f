//! Static analysis over the core AST.
//!
//! Checks that every variable is bound and that `self`/`super` only appear
//! inside objects, and records the free variables of every node. A node that
//! already carries free variables was analyzed by an earlier compilation (the
//! shared std prelude) and is skipped.

use crate::error::{
    duplicate_local, duplicate_param, no_top_level_object, self_outside_object,
    super_outside_object, unknown_variable, StaticError,
};
use jsonnet_ir::core::{Expr, ExprKind};
use jsonnet_ir::{LocationRange, Name, StringInterner};
use jsonnet_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) struct Analyzer<'a> {
    interner: &'a StringInterner,
    dollar: Name,
    /// Bound variables with their shadowing depth.
    scope: FxHashMap<Name, u32>,
}

impl<'a> Analyzer<'a> {
    pub(crate) fn new(interner: &'a StringInterner) -> Self {
        Analyzer {
            interner,
            dollar: interner.intern("$"),
            scope: FxHashMap::default(),
        }
    }

    pub(crate) fn analyze(&mut self, expr: &Expr) -> Result<(), StaticError> {
        self.visit(expr, false)
    }

    fn bind(&mut self, names: &[Name]) {
        for &name in names {
            *self.scope.entry(name).or_insert(0) += 1;
        }
    }

    fn unbind(&mut self, names: &[Name]) {
        for name in names {
            if let Some(count) = self.scope.get_mut(name) {
                *count -= 1;
                if *count == 0 {
                    self.scope.remove(name);
                }
            }
        }
    }

    fn check_unique(
        &self,
        names: &[Name],
        loc: LocationRange,
        error: fn(LocationRange, &str) -> StaticError,
    ) -> Result<(), StaticError> {
        let mut seen = FxHashSet::default();
        for &name in names {
            if !seen.insert(name) {
                return Err(error(loc, self.interner.lookup(name)));
            }
        }
        Ok(())
    }

    fn visit(&mut self, expr: &Expr, in_object: bool) -> Result<(), StaticError> {
        ensure_sufficient_stack(|| self.visit_inner(expr, in_object))
    }

    /// Visit `expr` and append its free variables to `free`.
    fn visit_into(&mut self, expr: &Expr, in_object: bool, free: &mut Vec<Name>) -> Result<(), StaticError> {
        self.visit(expr, in_object)?;
        free.extend_from_slice(expr.free_vars());
        Ok(())
    }

    /// Visit `children` with `names` bound; names are removed from the
    /// resulting free set.
    fn visit_scoped(
        &mut self,
        names: &[Name],
        children: &[(&Expr, bool)],
        free: &mut Vec<Name>,
    ) -> Result<(), StaticError> {
        self.bind(names);
        let mut inner = Vec::new();
        let result = children
            .iter()
            .try_for_each(|&(child, in_object)| self.visit_into(child, in_object, &mut inner));
        self.unbind(names);
        result?;
        inner.retain(|n| !names.contains(n));
        free.append(&mut inner);
        Ok(())
    }

    fn visit_inner(&mut self, expr: &Expr, in_object: bool) -> Result<(), StaticError> {
        if expr.has_free_vars() {
            return Ok(());
        }
        let mut free = Vec::new();
        match &expr.kind {
            ExprKind::Apply { target, args, .. } => {
                self.visit_into(target, in_object, &mut free)?;
                for arg in args {
                    self.visit_into(&arg.expr, in_object, &mut free)?;
                }
            }
            ExprKind::Array(items) => {
                for item in items {
                    self.visit_into(item, in_object, &mut free)?;
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.visit_into(left, in_object, &mut free)?;
                self.visit_into(right, in_object, &mut free)?;
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.visit_into(cond, in_object, &mut free)?;
                self.visit_into(then, in_object, &mut free)?;
                if let Some(otherwise) = otherwise {
                    self.visit_into(otherwise, in_object, &mut free)?;
                }
            }
            ExprKind::Error(e) | ExprKind::Unary { expr: e, .. } => {
                self.visit_into(e, in_object, &mut free)?;
            }
            ExprKind::Function { params, body } => {
                let names: Vec<Name> = params.iter().map(|p| p.name).collect();
                self.check_unique(&names, expr.loc, duplicate_param)?;
                let mut children: Vec<(&Expr, bool)> = params
                    .iter()
                    .filter_map(|p| p.default.as_ref())
                    .map(|d| (d, in_object))
                    .collect();
                children.push((body, in_object));
                self.visit_scoped(&names, &children, &mut free)?;
            }
            ExprKind::Index { target, index } => {
                self.visit_into(target, in_object, &mut free)?;
                self.visit_into(index, in_object, &mut free)?;
            }
            ExprKind::InSuper(e) | ExprKind::SuperIndex(e) => {
                if !in_object {
                    return Err(super_outside_object(expr.loc));
                }
                self.visit_into(e, in_object, &mut free)?;
            }
            ExprKind::Local { binds, body } => {
                let names: Vec<Name> = binds.iter().map(|b| b.name).collect();
                self.check_unique(&names, expr.loc, duplicate_local)?;
                let mut children: Vec<(&Expr, bool)> =
                    binds.iter().map(|b| (&b.body, in_object)).collect();
                children.push((body, in_object));
                self.visit_scoped(&names, &children, &mut free)?;
            }
            ExprKind::Object { asserts, fields } => {
                for field in fields {
                    self.visit_into(&field.name, in_object, &mut free)?;
                    self.visit_into(&field.body, true, &mut free)?;
                }
                for assert in asserts {
                    self.visit_into(assert, true, &mut free)?;
                }
            }
            ExprKind::ObjectComp {
                field,
                value,
                id,
                array,
            } => {
                self.visit_into(array, in_object, &mut free)?;
                self.visit_scoped(&[*id], &[(field, in_object), (value, true)], &mut free)?;
            }
            ExprKind::SelfRef => {
                if !in_object {
                    return Err(self_outside_object(expr.loc));
                }
            }
            ExprKind::Var(name) => {
                if !self.scope.contains_key(name) {
                    return Err(if *name == self.dollar {
                        no_top_level_object(expr.loc)
                    } else {
                        unknown_variable(expr.loc, self.interner.lookup(*name))
                    });
                }
                free.push(*name);
            }
            ExprKind::BuiltinFunction { .. }
            | ExprKind::Import(_)
            | ExprKind::Importstr(_)
            | ExprKind::Null
            | ExprKind::True
            | ExprKind::False
            | ExprKind::Number(_)
            | ExprKind::Str(_) => {}
        }
        expr.set_free_vars(free);
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
