//! Resolution of `import` and `importstr`.

use crate::heap::HeapId;
use std::rc::Rc;

/// Content of a resolved import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedFile {
    /// Path the file was found at; used as the file name in locations and
    /// as the base directory for its own imports.
    pub found_here: String,
    pub content: String,
}

/// Resolves import paths. `base_dir` is the directory of the importing file
/// with a trailing `/`, or empty.
pub trait ImportCallback {
    /// Return the file, or a message explaining why it could not be read.
    fn import(&self, base_dir: &str, path: &str) -> Result<ImportedFile, String>;
}

/// Cache entry keyed by `(base_dir, path)`.
#[derive(Debug)]
pub(crate) struct CachedImport {
    pub found_here: Rc<str>,
    pub content: Rc<str>,
    /// Thunk of the compiled file, once imported as code.
    pub thunk: Option<HeapId>,
}

/// Directory part of `file`, including the trailing `/`.
pub(crate) fn dir_name(file: &str) -> &str {
    match file.rfind('/') {
        Some(pos) => &file[..=pos],
        None => "",
    }
}

#[cfg(test)]
mod tests;
