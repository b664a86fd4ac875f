//! Operators and field visibility.

use std::fmt;

/// Binary operators.
///
/// `ManifestEqual`, `ManifestUnequal` and `Percent` never reach the
/// evaluator: they are rewritten to `std.equals` / `std.mod` calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Multiplicative
    Mult,
    Div,
    Percent,

    // Additive
    Plus,
    Minus,

    // Shifts
    ShiftL,
    ShiftR,

    // Relational
    Greater,
    GreaterEq,
    Less,
    LessEq,
    In,

    // Equality
    ManifestEqual,
    ManifestUnequal,

    // Bitwise
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Source-level symbol, as shown in error messages.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Mult => "*",
            Self::Div => "/",
            Self::Percent => "%",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::ShiftL => "<<",
            Self::ShiftR => ">>",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::In => "in",
            Self::ManifestEqual => "==",
            Self::ManifestUnequal => "!=",
            Self::BitwiseAnd => "&",
            Self::BitwiseXor => "^",
            Self::BitwiseOr => "|",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Binding power; higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Mult | Self::Div | Self::Percent => 12,
            Self::Plus | Self::Minus => 11,
            Self::ShiftL | Self::ShiftR => 10,
            Self::Greater | Self::GreaterEq | Self::Less | Self::LessEq | Self::In => 9,
            Self::ManifestEqual | Self::ManifestUnequal => 8,
            Self::BitwiseAnd => 7,
            Self::BitwiseXor => 6,
            Self::BitwiseOr => 5,
            Self::And => 4,
            Self::Or => 3,
        }
    }

    /// Parse an operator token.
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "*" => Self::Mult,
            "/" => Self::Div,
            "%" => Self::Percent,
            "+" => Self::Plus,
            "-" => Self::Minus,
            "<<" => Self::ShiftL,
            ">>" => Self::ShiftR,
            ">" => Self::Greater,
            ">=" => Self::GreaterEq,
            "<" => Self::Less,
            "<=" => Self::LessEq,
            "==" => Self::ManifestEqual,
            "!=" => Self::ManifestUnequal,
            "&" => Self::BitwiseAnd,
            "^" => Self::BitwiseXor,
            "|" => Self::BitwiseOr,
            "&&" => Self::And,
            "||" => Self::Or,
            _ => return None,
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Prefix operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    BitwiseNot,
    Plus,
    Minus,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::BitwiseNot => "~",
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "!" => Self::Not,
            "~" => Self::BitwiseNot,
            "+" => Self::Plus,
            "-" => Self::Minus,
            _ => return None,
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Field visibility: `f: e`, `f:: e`, `f::: e`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `:`; takes the visibility of the definition it overrides.
    Inherit,
    /// `::`
    Hidden,
    /// `:::`
    Visible,
}

impl Visibility {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Inherit => ":",
            Self::Hidden => "::",
            Self::Visible => ":::",
        }
    }
}
