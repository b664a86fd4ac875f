//! String interner for identifiers and field names.
//!
//! Names are interned once per process-wide table and never freed, so the
//! lookup side can hand out `&'static str`.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Index to string content.
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// Lexing, desugaring and evaluation all intern through a shared `&StringInterner`;
/// field names computed at runtime are interned on first use.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create an interner holding only the empty string.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            table: RwLock::new(InternTable {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its `Name` or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&idx) = self.table.read().map.get(s) {
            return Ok(Name::from_raw(idx));
        }

        let mut guard = self.table.write();
        // Another writer may have won the race between the two locks.
        if let Some(&idx) = guard.map.get(s) {
            return Ok(Name::from_raw(idx));
        }

        let idx = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Ok(Name::from_raw(idx))
    }

    /// Intern a string.
    ///
    /// # Panics
    /// Panics past `u32::MAX` distinct strings; use `try_intern` to handle that.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up a string that has already been interned, without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied().map(Name::from_raw)
    }

    /// Text of an interned name.
    ///
    /// # Panics
    /// Panics if `name` did not come from this interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.table.read();
        match guard.strings.get(name.raw() as usize) {
            Some(&s) => s,
            None => panic!("{name:?} was not produced by this interner"),
        }
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
