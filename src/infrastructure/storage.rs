//! Filesystem storage for generated test sources.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::TestsPersistentStorage;

/// Writes each file to `result_path/<package as dirs>/filename`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTestsStorage;

impl FileTestsStorage {
    pub fn new() -> Self {
        Self
    }

    /// Directory a source file of `package_name` belongs in.
    pub fn package_dir(result_path: &Path, package_name: &str) -> PathBuf {
        package_name
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(result_path.to_path_buf(), |dir, segment| dir.join(segment))
    }
}

impl TestsPersistentStorage for FileTestsStorage {
    fn save_generated_test(
        &self,
        package_name: &str,
        code: &str,
        result_path: &Path,
        filename: &str,
    ) -> DomainResult<PathBuf> {
        let dir = Self::package_dir(result_path, package_name);
        fs::create_dir_all(&dir).map_err(|err| DomainError::Io {
            path: dir.clone(),
            message: err.to_string(),
        })?;

        let filepath = dir.join(filename);
        fs::write(&filepath, code).map_err(|err| DomainError::Io {
            path: filepath.clone(),
            message: err.to_string(),
        })?;

        debug!(path = %filepath.display(), "Saved generated test");
        Ok(filepath)
    }
}
