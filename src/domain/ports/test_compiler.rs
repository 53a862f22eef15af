use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::errors::CompilerError;
use crate::domain::models::{
    CompilableTestCases, ExecutionResult, TestCaseGeneratedByLlm, TestCasesCompilationResult,
};

/// Compiles generated source files against the project under test.
#[async_trait]
pub trait TestCompiler: Send + Sync {
    /// Compile one file; a non-zero exit is a normal `Ok` result.
    async fn compile_code(
        &self,
        path: &Path,
        project_build_path: &str,
    ) -> Result<ExecutionResult, CompilerError>;

    /// Compile each test case file on its own.
    ///
    /// `paths[i]` holds `test_cases[i]`. A failing file never stops the
    /// remaining ones from being compiled, even when its compiler process
    /// could not be started; only a missing compiler aborts the batch.
    async fn compile_test_cases(
        &self,
        paths: &[PathBuf],
        project_build_path: &str,
        test_cases: &[TestCaseGeneratedByLlm],
    ) -> Result<TestCasesCompilationResult, CompilerError> {
        let mut all_test_cases_compilable = true;
        let mut compilable_test_cases = CompilableTestCases::new();

        for (path, test_case) in paths.iter().zip(test_cases) {
            let compilable = match self.compile_code(path, project_build_path).await {
                Ok(result) => result.is_successful(),
                Err(err @ CompilerError::CompilerNotFound { .. }) => return Err(err),
                Err(err) => {
                    tracing::warn!(file = %path.display(), error = %err, "Couldn't compile test case");
                    false
                }
            };
            all_test_cases_compilable &= compilable;
            if compilable {
                compilable_test_cases.insert(test_case.clone());
            }
        }

        Ok(TestCasesCompilationResult {
            all_test_cases_compilable,
            compilable_test_cases,
        })
    }
}
