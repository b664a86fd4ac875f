//! Filesystem import resolution.

use jsonnet_eval::{ImportCallback, ImportedFile};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Resolves imports against the importing file's directory first, then each
/// library path in the order given.
#[derive(Clone, Debug, Default)]
pub struct FileImporter {
    jpaths: Vec<PathBuf>,
}

impl FileImporter {
    pub fn new(jpaths: Vec<PathBuf>) -> Self {
        FileImporter { jpaths }
    }

    fn candidates(&self, base_dir: &str, path: &str) -> Vec<PathBuf> {
        if Path::new(path).is_absolute() {
            return vec![PathBuf::from(path)];
        }
        let mut candidates = Vec::with_capacity(self.jpaths.len() + 1);
        candidates.push(PathBuf::from(format!("{base_dir}{path}")));
        candidates.extend(self.jpaths.iter().map(|dir| dir.join(path)));
        candidates
    }
}

impl ImportCallback for FileImporter {
    fn import(&self, base_dir: &str, path: &str) -> Result<ImportedFile, String> {
        for candidate in self.candidates(base_dir, path) {
            match fs::read_to_string(&candidate) {
                Ok(content) => {
                    tracing::trace!(found = %candidate.display(), "import resolved");
                    return Ok(ImportedFile {
                        found_here: candidate.to_string_lossy().into_owned(),
                        content,
                    });
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.to_string()),
            }
        }
        Err("No match locally or in the Jsonnet library paths.".to_owned())
    }
}
