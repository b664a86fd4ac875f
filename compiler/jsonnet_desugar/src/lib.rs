//! Front half of the Jsonnet pipeline: source text to analyzed core AST.
//!
//! [`Compiler::compile`] lexes, parses, desugars and statically checks one
//! file. Every program is wrapped as `local std = <prelude>; program`; the
//! prelude (`std.jsonnet`, embedded) is compiled once per [`Compiler`] and
//! shared by every file it compiles afterwards.

mod analyze;
mod desugar;
mod error;

pub use error::StaticError;

use analyze::Analyzer;
use desugar::Desugarer;
use jsonnet_ir::core::{Bind, Expr, ExprKind, Node};
use jsonnet_ir::{LocationRange, StringInterner};
use std::cell::OnceCell;

/// Source of the std prelude.
pub const STD_SOURCE: &str = include_str!("std.jsonnet");

/// File name used for locations inside the prelude.
pub const STD_FILE: &str = "<std>";

/// Compiles source files against a shared interner and prelude.
pub struct Compiler<'a> {
    interner: &'a StringInterner,
    std_lib: OnceCell<Expr>,
}

impl<'a> Compiler<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        Compiler {
            interner,
            std_lib: OnceCell::new(),
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    /// Compile `source`, named `file` in locations and error messages.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn compile(&self, file: &str, source: &str) -> Result<Expr, StaticError> {
        let std_lib = self.std_lib()?;
        let tokens = jsonnet_lexer::lex(self.interner, file, source)?;
        let ast = jsonnet_parse::parse(self.interner, &tokens)?;
        let body = Desugarer::new(self.interner).desugar(ast, 0);
        let program = Node::new(
            body.loc,
            ExprKind::Local {
                binds: vec![Bind {
                    name: self.interner.intern("std"),
                    body: std_lib,
                }],
                body,
            },
        );
        Analyzer::new(self.interner).analyze(&program)?;
        Ok(program)
    }

    /// The desugared prelude object, compiled on first use.
    fn std_lib(&self) -> Result<Expr, StaticError> {
        if let Some(std_lib) = self.std_lib.get() {
            return Ok(std_lib.clone());
        }
        tracing::debug!("compiling std prelude");
        let tokens = jsonnet_lexer::lex(self.interner, STD_FILE, STD_SOURCE)?;
        let ast = jsonnet_parse::parse(self.interner, &tokens)?;
        let file = self.interner.intern(STD_FILE);
        let std_lib = Desugarer::new(self.interner)
            .desugar_std(ast)
            .ok_or_else(|| StaticError::new(LocationRange::label(file), "std prelude must be an object"))?;
        Ok(self.std_lib.get_or_init(|| std_lib).clone())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
