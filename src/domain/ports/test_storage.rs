use std::path::{Path, PathBuf};

use crate::domain::errors::DomainResult;

/// Persists generated test sources to disk.
pub trait TestsPersistentStorage: Send + Sync {
    /// Write `code` as `filename` for `package_name` below `result_path`.
    ///
    /// Returns the path that was written.
    fn save_generated_test(
        &self,
        package_name: &str,
        code: &str,
        result_path: &Path,
        filename: &str,
    ) -> DomainResult<PathBuf>;
}
