//! Surface AST to core AST lowering.
//!
//! Every piece of sugar is rewritten in terms of the core node kinds and calls
//! into the `std` object:
//!
//! - `a == b`, `a != b`, `a % b` call `std.equals` and `std.mod`
//! - `assert c : m; e` becomes `if c then e else error m`
//! - slices call `std.slice`; a missing `else` is `null`
//! - method and local-function sugar become `function` values
//! - array comprehensions become nested `std.makeArray` / `std.flattenArrays`
//! - object locals are repeated inside every field body and assert, and the
//!   outermost object binds `$` to `self`
//! - `f+: e` becomes `if "f" in super then super.f + e else e`
//! - object comprehensions iterate one tuple variable over the array of all
//!   combinations of the `for` variables

use jsonnet_ir::ast::{self, CompSpec, FieldName, Member};
use jsonnet_ir::builtins::Builtin;
use jsonnet_ir::core::{Arg, Bind, Expr, ExprKind, Node, ObjectField, Param};
use jsonnet_ir::{BinaryOp, LocationRange, Name, StringInterner, UnaryOp, Visibility};
use jsonnet_stack::ensure_sufficient_stack;
use std::rc::Rc;

/// Desugaring state for one file.
pub(crate) struct Desugarer<'a> {
    interner: &'a StringInterner,
    std_name: Name,
    dollar: Name,
    next_fresh: u32,
}

impl<'a> Desugarer<'a> {
    pub(crate) fn new(interner: &'a StringInterner) -> Self {
        Desugarer {
            interner,
            std_name: interner.intern("std"),
            dollar: interner.intern("$"),
            next_fresh: 0,
        }
    }

    /// A variable name no user identifier can collide with.
    fn fresh(&mut self, prefix: &str) -> Name {
        let n = self.next_fresh;
        self.next_fresh += 1;
        self.interner.intern(&format!("${prefix}{n}"))
    }

    fn var(loc: LocationRange, name: Name) -> Expr {
        Node::new(loc, ExprKind::Var(name))
    }

    fn string(loc: LocationRange, s: &str) -> Expr {
        Node::new(loc, ExprKind::Str(Rc::from(s)))
    }

    /// `std.<field>(args...)`
    fn std_call(&self, loc: LocationRange, field: &str, args: Vec<Expr>) -> Expr {
        let target = Node::new(
            loc,
            ExprKind::Index {
                target: Self::var(loc, self.std_name),
                index: Self::string(loc, field),
            },
        );
        let args = args.into_iter().map(|expr| Arg { name: None, expr }).collect();
        Node::new(
            loc,
            ExprKind::Apply {
                target,
                args,
                tailstrict: false,
            },
        )
    }

    /// `obj_level` counts enclosing objects; `$` is bound at level 0.
    pub(crate) fn desugar(&mut self, expr: ast::Expr, obj_level: u32) -> Expr {
        ensure_sufficient_stack(|| self.desugar_inner(expr, obj_level))
    }

    fn desugar_opt(&mut self, expr: Option<Box<ast::Expr>>, loc: LocationRange, obj_level: u32) -> Expr {
        match expr {
            Some(e) => self.desugar(*e, obj_level),
            None => Node::new(loc, ExprKind::Null),
        }
    }

    fn desugar_inner(&mut self, expr: ast::Expr, obj_level: u32) -> Expr {
        let loc = expr.loc;
        let kind = match expr.kind {
            ast::ExprKind::Apply {
                target,
                args,
                tailstrict,
            } => ExprKind::Apply {
                target: self.desugar(*target, obj_level),
                args: args
                    .into_iter()
                    .map(|arg| Arg {
                        name: arg.name,
                        expr: self.desugar(arg.expr, obj_level),
                    })
                    .collect(),
                tailstrict,
            },
            ast::ExprKind::Array(items) => ExprKind::Array(
                items
                    .into_iter()
                    .map(|item| self.desugar(item, obj_level))
                    .collect(),
            ),
            ast::ExprKind::ArrayComp { body, specs } => {
                let body = self.desugar(*body, obj_level);
                let singleton = Node::new(loc, ExprKind::Array(vec![body]));
                return self.comprehension(loc, singleton, specs, obj_level);
            }
            ast::ExprKind::Assert {
                cond,
                message,
                rest,
            } => {
                let message = match message {
                    Some(m) => self.desugar(*m, obj_level),
                    None => Self::string(loc, "Assertion failed."),
                };
                ExprKind::Conditional {
                    cond: self.desugar(*cond, obj_level),
                    then: self.desugar(*rest, obj_level),
                    otherwise: Some(Node::new(loc, ExprKind::Error(message))),
                }
            }
            ast::ExprKind::Binary { left, op, right } => {
                let left = self.desugar(*left, obj_level);
                let right = self.desugar(*right, obj_level);
                match op {
                    BinaryOp::ManifestEqual => return self.std_call(loc, "equals", vec![left, right]),
                    BinaryOp::ManifestUnequal => ExprKind::Unary {
                        op: UnaryOp::Not,
                        expr: self.std_call(loc, "equals", vec![left, right]),
                    },
                    BinaryOp::Percent => return self.std_call(loc, "mod", vec![left, right]),
                    _ => ExprKind::Binary { left, op, right },
                }
            }
            ast::ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => ExprKind::Conditional {
                cond: self.desugar(*cond, obj_level),
                then: self.desugar(*then, obj_level),
                otherwise: Some(self.desugar_opt(otherwise, loc, obj_level)),
            },
            ast::ExprKind::Dollar => ExprKind::Var(self.dollar),
            ast::ExprKind::Error(e) => ExprKind::Error(self.desugar(*e, obj_level)),
            ast::ExprKind::Function { params, body } => ExprKind::Function {
                params: self.desugar_params(params, obj_level),
                body: self.desugar(*body, obj_level),
            },
            ast::ExprKind::Import(path) => ExprKind::Import(Rc::from(path)),
            ast::ExprKind::Importstr(path) => ExprKind::Importstr(Rc::from(path)),
            ast::ExprKind::Index { target, index } => ExprKind::Index {
                target: self.desugar(*target, obj_level),
                index: self.desugar(*index, obj_level),
            },
            ast::ExprKind::Slice {
                target,
                begin,
                end,
                step,
            } => {
                let args = vec![
                    self.desugar(*target, obj_level),
                    self.desugar_opt(begin, loc, obj_level),
                    self.desugar_opt(end, loc, obj_level),
                    self.desugar_opt(step, loc, obj_level),
                ];
                return self.std_call(loc, "slice", args);
            }
            ast::ExprKind::InSuper(e) => ExprKind::InSuper(self.desugar(*e, obj_level)),
            ast::ExprKind::Local { binds, body } => ExprKind::Local {
                binds: binds
                    .into_iter()
                    .map(|b| self.desugar_bind(b, obj_level))
                    .collect(),
                body: self.desugar(*body, obj_level),
            },
            ast::ExprKind::Null => ExprKind::Null,
            ast::ExprKind::True => ExprKind::True,
            ast::ExprKind::False => ExprKind::False,
            ast::ExprKind::Number(n) => ExprKind::Number(n),
            ast::ExprKind::Str(s) => ExprKind::Str(Rc::from(s)),
            ast::ExprKind::Object(members) => {
                return self.desugar_object(loc, members, obj_level, Vec::new());
            }
            ast::ExprKind::ObjectComp {
                binds,
                key,
                value,
                specs,
            } => return self.desugar_object_comp(loc, binds, *key, *value, specs, obj_level),
            ast::ExprKind::SelfRef => ExprKind::SelfRef,
            ast::ExprKind::SuperIndex(e) => ExprKind::SuperIndex(self.desugar(*e, obj_level)),
            ast::ExprKind::Unary { op, expr } => ExprKind::Unary {
                op,
                expr: self.desugar(*expr, obj_level),
            },
            ast::ExprKind::Var(name) => ExprKind::Var(name),
        };
        Node::new(loc, kind)
    }

    fn desugar_params(&mut self, params: Vec<ast::Param>, obj_level: u32) -> Rc<[Param]> {
        params
            .into_iter()
            .map(|p| Param {
                name: p.name,
                default: p.default.map(|d| self.desugar(d, obj_level)),
            })
            .collect()
    }

    fn desugar_bind(&mut self, bind: ast::Bind, obj_level: u32) -> Bind {
        let body = match bind.params {
            Some(params) => Node::new(
                bind.loc,
                ExprKind::Function {
                    params: self.desugar_params(params, obj_level),
                    body: self.desugar(bind.body, obj_level),
                },
            ),
            None => self.desugar(bind.body, obj_level),
        };
        Bind {
            name: bind.name,
            body,
        }
    }

    /// Wrap `inner` (an array expression) in the loops and filters of
    /// `specs`, outermost first. The result is the concatenation of every
    /// `inner` produced.
    fn comprehension(
        &mut self,
        loc: LocationRange,
        inner: Expr,
        specs: Vec<CompSpec>,
        obj_level: u32,
    ) -> Expr {
        let mut result = inner;
        for spec in specs.into_iter().rev() {
            result = match spec {
                CompSpec::If(cond) => Node::new(
                    loc,
                    ExprKind::Conditional {
                        cond: self.desugar(cond, obj_level),
                        then: result,
                        otherwise: Some(Node::new(loc, ExprKind::Array(Vec::new()))),
                    },
                ),
                CompSpec::For { var, array } => {
                    let array = self.desugar(array, obj_level);
                    self.comprehension_loop(loc, var, array, result)
                }
            };
        }
        result
    }

    /// ```text
    /// local $arr = array;
    /// if std.primitiveEquals(std.type($arr), "array") then
    ///     std.flattenArrays(std.makeArray(std.length($arr),
    ///         function($i) local var = $arr[$i]; body))
    /// else error "..."
    /// ```
    fn comprehension_loop(&mut self, loc: LocationRange, var: Name, array: Expr, body: Expr) -> Expr {
        let arr = self.fresh("arr");
        let index = self.fresh("i");
        let element = Node::new(
            loc,
            ExprKind::Index {
                target: Self::var(loc, arr),
                index: Self::var(loc, index),
            },
        );
        let per_element = Node::new(
            loc,
            ExprKind::Function {
                params: Rc::from([Param {
                    name: index,
                    default: None,
                }]),
                body: Node::new(
                    loc,
                    ExprKind::Local {
                        binds: vec![Bind {
                            name: var,
                            body: element,
                        }],
                        body,
                    },
                ),
            },
        );
        let length = self.std_call(loc, "length", vec![Self::var(loc, arr)]);
        let made = self.std_call(loc, "makeArray", vec![length, per_element]);
        let flattened = self.std_call(loc, "flattenArrays", vec![made]);
        let type_of = self.std_call(loc, "type", vec![Self::var(loc, arr)]);
        let is_array = self.std_call(loc, "primitiveEquals", vec![type_of, Self::string(loc, "array")]);
        let checked = Node::new(
            loc,
            ExprKind::Conditional {
                cond: is_array,
                then: flattened,
                otherwise: Some(Node::new(
                    loc,
                    ExprKind::Error(Self::string(
                        loc,
                        "In comprehension, can only iterate over array.",
                    )),
                )),
            },
        );
        Node::new(
            loc,
            ExprKind::Local {
                binds: vec![Bind {
                    name: arr,
                    body: array,
                }],
                body: checked,
            },
        )
    }

    /// Object locals for a body at `obj_level`, `$` first when outermost.
    fn object_locals(&mut self, loc: LocationRange, binds: Vec<ast::Bind>, obj_level: u32) -> Vec<Bind> {
        let mut locals = Vec::with_capacity(binds.len() + 1);
        if obj_level == 0 {
            locals.push(Bind {
                name: self.dollar,
                body: Node::new(loc, ExprKind::SelfRef),
            });
        }
        for bind in binds {
            locals.push(self.desugar_bind(bind, obj_level + 1));
        }
        locals
    }

    fn wrap_locals(locals: &[Bind], body: Expr) -> Expr {
        if locals.is_empty() {
            return body;
        }
        let binds = locals
            .iter()
            .map(|b| Bind {
                name: b.name,
                body: b.body.clone(),
            })
            .collect();
        Node::new(body.loc, ExprKind::Local { binds, body })
    }

    fn field_name(&mut self, name: FieldName, loc: LocationRange, obj_level: u32) -> Expr {
        match name {
            FieldName::Id(id) => Self::string(loc, self.interner.lookup(id)),
            FieldName::Str(s) => Self::string(loc, &s),
            FieldName::Computed(e) => self.desugar(e, obj_level),
        }
    }

    /// Lower an object literal. `extra` fields are appended unchanged.
    fn desugar_object(
        &mut self,
        loc: LocationRange,
        members: Vec<Member>,
        obj_level: u32,
        extra: Vec<ObjectField>,
    ) -> Expr {
        let mut binds = Vec::new();
        let mut fields = Vec::new();
        let mut asserts = Vec::new();
        for member in members {
            match member {
                Member::Local(bind) => binds.push(bind),
                Member::Field(field) => fields.push(field),
                Member::Assert { cond, message, loc } => asserts.push((cond, message, loc)),
            }
        }
        let locals = self.object_locals(loc, binds, obj_level);

        let asserts = asserts
            .into_iter()
            .map(|(cond, message, assert_loc)| {
                let cond = self.desugar(cond, obj_level + 1);
                let message = match message {
                    Some(m) => self.desugar(m, obj_level + 1),
                    None => Self::string(assert_loc, "Object assertion failed."),
                };
                let check = Node::new(
                    assert_loc,
                    ExprKind::Conditional {
                        cond,
                        then: Node::new(assert_loc, ExprKind::Null),
                        otherwise: Some(Node::new(assert_loc, ExprKind::Error(message))),
                    },
                );
                Self::wrap_locals(&locals, check)
            })
            .collect();

        let mut lowered = Vec::with_capacity(fields.len() + extra.len());
        for field in fields {
            let field_loc = field.loc;
            let name = self.field_name(field.name, field_loc, obj_level);
            let mut body = match field.params {
                Some(params) => Node::new(
                    field_loc,
                    ExprKind::Function {
                        params: self.desugar_params(params, obj_level + 1),
                        body: self.desugar(field.body, obj_level + 1),
                    },
                ),
                None => self.desugar(field.body, obj_level + 1),
            };
            if field.plus {
                let inherited = Node::new(
                    field_loc,
                    ExprKind::Binary {
                        left: Node::new(field_loc, ExprKind::SuperIndex(name.clone())),
                        op: BinaryOp::Plus,
                        right: body.clone(),
                    },
                );
                body = Node::new(
                    field_loc,
                    ExprKind::Conditional {
                        cond: Node::new(field_loc, ExprKind::InSuper(name.clone())),
                        then: inherited,
                        otherwise: Some(body),
                    },
                );
            }
            lowered.push(ObjectField {
                visibility: field.visibility,
                name,
                body: Self::wrap_locals(&locals, body),
            });
        }
        lowered.extend(extra);

        Node::new(
            loc,
            ExprKind::Object {
                asserts,
                fields: lowered,
            },
        )
    }

    fn desugar_object_comp(
        &mut self,
        loc: LocationRange,
        binds: Vec<ast::Bind>,
        key: ast::Expr,
        value: ast::Expr,
        specs: Vec<CompSpec>,
        obj_level: u32,
    ) -> Expr {
        // The last `for` of a repeated variable shadows earlier ones.
        let mut vars: Vec<(Name, usize)> = Vec::new();
        for (index, var) in specs
            .iter()
            .filter_map(|spec| match spec {
                CompSpec::For { var, .. } => Some(*var),
                CompSpec::If(_) => None,
            })
            .enumerate()
        {
            vars.retain(|(v, _)| *v != var);
            vars.push((var, index));
        }
        let arity = specs
            .iter()
            .filter(|spec| matches!(spec, CompSpec::For { .. }))
            .count();

        let tuple_items = (0..arity)
            .map(|i| match vars.iter().find(|(_, idx)| *idx == i) {
                Some((var, _)) => Self::var(loc, *var),
                None => Node::new(loc, ExprKind::Null),
            })
            .collect();
        let tuple = Node::new(loc, ExprKind::Array(vec![Node::new(loc, ExprKind::Array(tuple_items))]));
        let array = self.comprehension(loc, tuple, specs, obj_level);

        let tuple_var = self.fresh("tuple");
        let unpack = |body: Expr| -> Expr {
            let binds = vars
                .iter()
                .map(|&(var, index)| {
                    #[expect(clippy::cast_precision_loss, reason = "tuple arity is tiny")]
                    let index = index as f64;
                    Bind {
                        name: var,
                        body: Node::new(
                            loc,
                            ExprKind::Index {
                                target: Self::var(loc, tuple_var),
                                index: Node::new(loc, ExprKind::Number(index)),
                            },
                        ),
                    }
                })
                .collect();
            Node::new(loc, ExprKind::Local { binds, body })
        };

        let field = unpack(self.desugar(key, obj_level));
        let locals = self.object_locals(loc, binds, obj_level);
        let value = Self::wrap_locals(&locals, self.desugar(value, obj_level + 1));
        let value = unpack(value);

        Node::new(
            loc,
            ExprKind::ObjectComp {
                field,
                value,
                id: tuple_var,
                array,
            },
        )
    }

    /// Lower the std prelude object and attach one hidden field per builtin.
    pub(crate) fn desugar_std(&mut self, prelude: ast::Expr) -> Option<Expr> {
        let loc = prelude.loc;
        let ast::ExprKind::Object(members) = prelude.kind else {
            return None;
        };
        let builtins = Builtin::ALL
            .iter()
            .map(|builtin| {
                let params = builtin
                    .params()
                    .iter()
                    .map(|p| Param {
                        name: self.interner.intern(p),
                        default: None,
                    })
                    .collect();
                ObjectField {
                    visibility: Visibility::Hidden,
                    name: Self::string(loc, builtin.name()),
                    body: Node::new(
                        loc,
                        ExprKind::BuiltinFunction {
                            name: self.interner.intern(builtin.name()),
                            params,
                        },
                    ),
                }
            })
            .collect();
        Some(self.desugar_object(loc, members, 0, builtins))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
