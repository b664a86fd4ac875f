//! Source locations.
//!
//! Diagnostics and stack traces report line/column ranges, so the lexer
//! resolves byte offsets to [`Location`]s as it scans instead of keeping a
//! separate line table.

use crate::{Name, StringInterner};
use std::fmt;

/// A 1-based line/column position. Line 0 means "unset".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }

    #[inline]
    pub const fn is_set(self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A range in a named file. The end column is exclusive.
///
/// `file` is interned so ranges stay `Copy`. A range with unset positions is
/// used for pseudo-locations such as `During manifestation`, where `file`
/// holds the label.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocationRange {
    pub file: Name,
    pub begin: Location,
    pub end: Location,
}

impl LocationRange {
    #[inline]
    pub const fn new(file: Name, begin: Location, end: Location) -> Self {
        LocationRange { file, begin, end }
    }

    /// A label with no position, e.g. `During manifestation`.
    #[inline]
    pub const fn label(file: Name) -> Self {
        LocationRange {
            file,
            begin: Location::new(0, 0),
            end: Location::new(0, 0),
        }
    }

    #[inline]
    pub const fn is_set(&self) -> bool {
        self.begin.is_set()
    }

    /// Range covering `self` through `other` (same file).
    #[inline]
    #[must_use]
    pub fn to(self, other: LocationRange) -> LocationRange {
        LocationRange {
            file: self.file,
            begin: self.begin,
            end: other.end,
        }
    }

    /// Render with the file name resolved through `interner`.
    pub fn display<'a>(&self, interner: &'a StringInterner) -> LocationDisplay<'a> {
        LocationDisplay {
            range: *self,
            interner,
        }
    }
}

/// Displays a [`LocationRange`] as `file:line:col-col` or
/// `file:(line:col)-(line:col)`.
pub struct LocationDisplay<'a> {
    range: LocationRange,
    interner: &'a StringInterner,
}

impl fmt::Display for LocationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let LocationRange { file, begin, end } = self.range;
        let file = self.interner.lookup(file);
        f.write_str(file)?;
        if !begin.is_set() {
            return Ok(());
        }
        if !file.is_empty() {
            f.write_str(":")?;
        }
        if begin.line == end.line {
            if begin.column + 1 >= end.column {
                write!(f, "{begin}")
            } else {
                write!(f, "{begin}-{}", end.column)
            }
        } else {
            write!(f, "({begin})-({end})")
        }
    }
}

#[cfg(test)]
mod tests;
