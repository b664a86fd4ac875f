//! Shared test utilities for phase tests.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A temporary directory populated with `files`, given as relative path and
/// content pairs. Parent directories are created as needed.
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(full, content).expect("write source file");
    }
    dir
}

/// Owned argument list from string slices.
pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|arg| (*arg).to_owned()).collect()
}

/// `path` as a `String`, for building command lines.
pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
