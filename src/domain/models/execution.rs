use serde::{Deserialize, Serialize};

use super::test_suite::CompilableTestCases;

/// Exit code and combined output of a subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub execution_message: String,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, execution_message: impl Into<String>) -> Self {
        Self {
            exit_code,
            execution_message: execution_message.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.exit_code == 0
    }
}

/// Outcome of compiling every test case file of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCasesCompilationResult {
    pub all_test_cases_compilable: bool,
    pub compilable_test_cases: CompilableTestCases,
}
