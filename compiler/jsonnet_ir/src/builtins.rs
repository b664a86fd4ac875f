//! Natively implemented `std` functions.
//!
//! The desugarer adds one hidden field `name:: <builtin>` per entry to the
//! `std` object; the evaluator dispatches on [`Builtin`] when such a closure
//! is applied.

use smallvec::SmallVec;

/// A natively implemented function.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    MakeArray,
    Pow,
    Floor,
    Ceil,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Type,
    Filter,
    ObjectHasEx,
    Length,
    ObjectFieldsEx,
    Codepoint,
    Char,
    Log,
    Exp,
    Mantissa,
    Exponent,
    Modulo,
    ExtVar,
    PrimitiveEquals,
    Native,
    Md5,
}

impl Builtin {
    /// Every builtin, in declaration order.
    pub const ALL: [Builtin; 27] = [
        Self::MakeArray,
        Self::Pow,
        Self::Floor,
        Self::Ceil,
        Self::Sqrt,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Type,
        Self::Filter,
        Self::ObjectHasEx,
        Self::Length,
        Self::ObjectFieldsEx,
        Self::Codepoint,
        Self::Char,
        Self::Log,
        Self::Exp,
        Self::Mantissa,
        Self::Exponent,
        Self::Modulo,
        Self::ExtVar,
        Self::PrimitiveEquals,
        Self::Native,
        Self::Md5,
    ];

    /// Name of the `std` field.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MakeArray => "makeArray",
            Self::Pow => "pow",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Type => "type",
            Self::Filter => "filter",
            Self::ObjectHasEx => "objectHasEx",
            Self::Length => "length",
            Self::ObjectFieldsEx => "objectFieldsEx",
            Self::Codepoint => "codepoint",
            Self::Char => "char",
            Self::Log => "log",
            Self::Exp => "exp",
            Self::Mantissa => "mantissa",
            Self::Exponent => "exponent",
            Self::Modulo => "modulo",
            Self::ExtVar => "extVar",
            Self::PrimitiveEquals => "primitiveEquals",
            Self::Native => "native",
            Self::Md5 => "md5",
        }
    }

    /// Declared parameter names.
    pub fn params(self) -> SmallVec<[&'static str; 3]> {
        let params: &[&'static str] = match self {
            Self::MakeArray => &["sz", "func"],
            Self::Pow => &["x", "n"],
            Self::Floor
            | Self::Ceil
            | Self::Sqrt
            | Self::Sin
            | Self::Cos
            | Self::Tan
            | Self::Asin
            | Self::Acos
            | Self::Atan
            | Self::Type
            | Self::Length
            | Self::ExtVar => &["x"],
            Self::Filter => &["func", "arr"],
            Self::ObjectHasEx => &["obj", "f", "inc_hidden"],
            Self::ObjectFieldsEx => &["obj", "inc_hidden"],
            Self::Codepoint | Self::Md5 => &["str"],
            Self::Char | Self::Log | Self::Exp | Self::Mantissa | Self::Exponent => &["n"],
            Self::Modulo | Self::PrimitiveEquals => &["a", "b"],
            Self::Native => &["name"],
        };
        SmallVec::from_slice(params)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }
}

#[cfg(test)]
mod tests;
