//! Surface syntax tree.
//!
//! Produced by `jsonnet_parse`, consumed only by `jsonnet_desugar`. Every
//! piece of sugar the language has is represented here; the evaluator never
//! sees these types.

use crate::{BinaryOp, LocationRange, Name, UnaryOp, Visibility};

/// A surface expression with its source range.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub loc: LocationRange,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(loc: LocationRange, kind: ExprKind) -> Self {
        Expr { loc, kind }
    }

    pub fn boxed(loc: LocationRange, kind: ExprKind) -> Box<Self> {
        Box::new(Expr { loc, kind })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// `target(args)` or `target(args) tailstrict`.
    Apply {
        target: Box<Expr>,
        args: Vec<Arg>,
        tailstrict: bool,
    },
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `[body for x in arr if cond]`
    ArrayComp { body: Box<Expr>, specs: Vec<CompSpec> },
    /// `assert cond : message; rest`
    Assert {
        cond: Box<Expr>,
        message: Option<Box<Expr>>,
        rest: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// `if cond then a else b`; `else` optional.
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    /// `$`
    Dollar,
    /// `error e`
    Error(Box<Expr>),
    /// `function(params) body`
    Function { params: Vec<Param>, body: Box<Expr> },
    /// `import "path"`
    Import(String),
    /// `importstr "path"`
    Importstr(String),
    /// `target[index]` and `target.field`.
    Index { target: Box<Expr>, index: Box<Expr> },
    /// `target[begin:end:step]`
    Slice {
        target: Box<Expr>,
        begin: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    /// `e in super`
    InSuper(Box<Expr>),
    /// `local a = 1, f(x) = x; body`
    Local { binds: Vec<Bind>, body: Box<Expr> },
    Null,
    True,
    False,
    Number(f64),
    Str(String),
    /// `{ members }`
    Object(Vec<Member>),
    /// `{ local a = 1, [key]: value for x in arr }`
    ObjectComp {
        binds: Vec<Bind>,
        key: Box<Expr>,
        value: Box<Expr>,
        specs: Vec<CompSpec>,
    },
    /// `self`
    SelfRef,
    /// `super.f` / `super[e]`
    SuperIndex(Box<Expr>),
    Unary { op: UnaryOp, expr: Box<Expr> },
    Var(Name),
}

/// A call argument; `name` is set for `f(x=1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    pub name: Option<Name>,
    pub expr: Expr,
}

/// A function parameter with optional default.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub default: Option<Expr>,
    pub loc: LocationRange,
}

/// `name = body` or `name(params) = body` in a `local`.
#[derive(Clone, Debug, PartialEq)]
pub struct Bind {
    pub name: Name,
    pub params: Option<Vec<Param>>,
    pub body: Expr,
    pub loc: LocationRange,
}

/// One `for` or `if` clause of a comprehension.
#[derive(Clone, Debug, PartialEq)]
pub enum CompSpec {
    For { var: Name, array: Expr },
    If(Expr),
}

/// Object body member.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Field(Field),
    Local(Bind),
    Assert {
        cond: Expr,
        message: Option<Expr>,
        loc: LocationRange,
    },
}

/// `name: body`, `name+:: body`, `name(params): body`, ...
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: FieldName,
    /// `+:` sugar.
    pub plus: bool,
    pub visibility: Visibility,
    /// Method sugar `f(x): e`.
    pub params: Option<Vec<Param>>,
    pub body: Expr,
    pub loc: LocationRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldName {
    /// `f: e`
    Id(Name),
    /// `"f": e`
    Str(String),
    /// `[e]: e`
    Computed(Expr),
}
