//! `javac`-backed compilation verifier.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::errors::CompilerError;
use crate::domain::models::{CompilerConfig, ExecutionResult};
use crate::domain::ports::TestCompiler;
use crate::infrastructure::process::CommandLineRunner;

#[cfg(windows)]
pub const JAVAC_BINARY: &str = "javac.exe";
#[cfg(not(windows))]
pub const JAVAC_BINARY: &str = "javac";

#[cfg(windows)]
const CLASSPATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const CLASSPATH_SEPARATOR: &str = ":";

/// Search `java_home` recursively for the compiler executable.
pub fn find_javac(java_home: &Path) -> Result<PathBuf, CompilerError> {
    WalkDir::new(java_home)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == JAVAC_BINARY)
        .map(walkdir::DirEntry::into_path)
        .ok_or_else(|| CompilerError::CompilerNotFound {
            binary: JAVAC_BINARY,
            root: java_home.to_path_buf(),
        })
}

/// Lexically normalize one classpath entry.
///
/// `.` segments and repeated separators are dropped, `..` cancels the
/// preceding named segment. The filesystem is not consulted.
fn normalize_entry(entry: &str) -> String {
    let mut normalized = PathBuf::new();
    let mut named_segments = 0usize;

    for component in Path::new(entry).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if named_segments > 0 => {
                normalized.pop();
                named_segments -= 1;
            }
            Component::ParentDir if normalized.has_root() => {}
            Component::Normal(_) => {
                normalized.push(component);
                named_segments += 1;
            }
            other => normalized.push(other),
        }
    }

    if normalized.as_os_str().is_empty() {
        ".".to_string()
    } else {
        normalized.to_string_lossy().into_owned()
    }
}

/// Compiles generated tests with the JDK's `javac`.
#[derive(Debug, Clone)]
pub struct JavacTestCompiler {
    javac: PathBuf,
    library_paths: Vec<String>,
    junit_library_paths: Vec<String>,
    runner: CommandLineRunner,
}

impl JavacTestCompiler {
    /// Locate `javac` below `java_home`; a missing compiler is fatal.
    pub fn new(
        java_home: &Path,
        library_paths: Vec<String>,
        junit_library_paths: Vec<String>,
    ) -> Result<Self, CompilerError> {
        let javac = find_javac(java_home)?;
        info!(javac = %javac.display(), "Using java compiler");
        Ok(Self::with_javac(javac, library_paths, junit_library_paths))
    }

    pub fn with_javac(
        javac: PathBuf,
        library_paths: Vec<String>,
        junit_library_paths: Vec<String>,
    ) -> Self {
        Self {
            javac,
            library_paths,
            junit_library_paths,
            runner: CommandLineRunner::new(),
        }
    }

    pub fn from_config(config: &CompilerConfig) -> Result<Self, CompilerError> {
        Self::new(
            &config.java_home,
            config.library_paths.clone(),
            config.junit_library_paths.clone(),
        )
    }

    pub fn javac(&self) -> &Path {
        &self.javac
    }

    /// Test libraries, project libraries, then the project build output,
    /// each entry normalized.
    pub fn classpath(&self, project_build_path: &str) -> String {
        self.junit_library_paths
            .iter()
            .chain(&self.library_paths)
            .map(String::as_str)
            .chain(std::iter::once(project_build_path))
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(normalize_entry)
            .collect::<Vec<_>>()
            .join(CLASSPATH_SEPARATOR)
    }
}

#[async_trait]
impl TestCompiler for JavacTestCompiler {
    async fn compile_code(
        &self,
        path: &Path,
        project_build_path: &str,
    ) -> Result<ExecutionResult, CompilerError> {
        debug!(file = %path.display(), "Compiling");

        let args = vec![
            self.javac.to_string_lossy().into_owned(),
            "-cp".to_string(),
            self.classpath(project_build_path),
            path.to_string_lossy().into_owned(),
        ];

        self.runner.run(&args).await
    }
}
