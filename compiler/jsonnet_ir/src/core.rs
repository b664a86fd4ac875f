//! Desugared syntax tree consumed by the evaluator.
//!
//! Nodes are immutable and reference counted: closures, thunks and object
//! fields hold [`Expr`] handles into the tree for as long as they live.
//! Each node carries the free variables of its subtree, filled in once by the
//! static analyzer; the evaluator captures exactly those bindings when it
//! builds a closure, thunk or object.

use crate::{BinaryOp, LocationRange, Name, UnaryOp, Visibility};
use std::cell::OnceCell;
use std::rc::Rc;

/// Shared handle to a core node.
pub type Expr = Rc<Node>;

#[derive(Debug)]
pub struct Node {
    pub loc: LocationRange,
    pub kind: ExprKind,
    free_vars: OnceCell<Box<[Name]>>,
}

impl Node {
    pub fn new(loc: LocationRange, kind: ExprKind) -> Expr {
        Rc::new(Node {
            loc,
            kind,
            free_vars: OnceCell::new(),
        })
    }

    /// Free variables of this subtree, sorted and deduplicated.
    ///
    /// Empty until the analyzer has run.
    pub fn free_vars(&self) -> &[Name] {
        self.free_vars.get().map_or(&[], |v| v)
    }

    /// Record the free variables. A node reached twice through a shared
    /// subtree keeps its first (identical) set.
    pub fn set_free_vars(&self, mut vars: Vec<Name>) {
        vars.sort_unstable();
        vars.dedup();
        let _ = self.free_vars.set(vars.into_boxed_slice());
    }

    pub fn has_free_vars(&self) -> bool {
        self.free_vars.get().is_some()
    }
}

#[derive(Debug)]
pub enum ExprKind {
    Apply {
        target: Expr,
        args: Vec<Arg>,
        tailstrict: bool,
    },
    Array(Vec<Expr>),
    Binary {
        left: Expr,
        op: BinaryOp,
        right: Expr,
    },
    /// A natively implemented function, e.g. `std.length`.
    BuiltinFunction { name: Name, params: Rc<[Param]> },
    Conditional {
        cond: Expr,
        then: Expr,
        otherwise: Option<Expr>,
    },
    Error(Expr),
    Function { params: Rc<[Param]>, body: Expr },
    Import(Rc<str>),
    Importstr(Rc<str>),
    Index { target: Expr, index: Expr },
    InSuper(Expr),
    Local { binds: Vec<Bind>, body: Expr },
    Null,
    True,
    False,
    Number(f64),
    Str(Rc<str>),
    /// Object with computed field names and no locals (they are folded into
    /// every field body and assert).
    Object {
        asserts: Vec<Expr>,
        fields: Vec<ObjectField>,
    },
    /// `{[field]: value for id in array}`, one variable only.
    ObjectComp {
        field: Expr,
        value: Expr,
        id: Name,
        array: Expr,
    },
    SelfRef,
    SuperIndex(Expr),
    Unary { op: UnaryOp, expr: Expr },
    Var(Name),
}

#[derive(Debug)]
pub struct Arg {
    pub name: Option<Name>,
    pub expr: Expr,
}

#[derive(Debug)]
pub struct Param {
    pub name: Name,
    pub default: Option<Expr>,
}

#[derive(Debug)]
pub struct Bind {
    pub name: Name,
    pub body: Expr,
}

#[derive(Debug)]
pub struct ObjectField {
    pub visibility: Visibility,
    pub name: Expr,
    pub body: Expr,
}

#[cfg(test)]
mod tests;
