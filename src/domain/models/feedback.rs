//! Terminal output of the feedback cycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::test_suite::{CompilableTestCases, TestSuiteGeneratedByLlm};

/// How a feedback cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackCycleExecutionResult {
    Ok,
    NoCompilableTestCasesGenerated,
    Canceled,
    ProvidedPromptTooLong,
    SavingTestFilesIssue,
}

impl fmt::Display for FeedbackCycleExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::NoCompilableTestCasesGenerated => "NO_COMPILABLE_TEST_CASES_GENERATED",
            Self::Canceled => "CANCELED",
            Self::ProvidedPromptTooLong => "PROVIDED_PROMPT_TOO_LONG",
            Self::SavingTestFilesIssue => "SAVING_TEST_FILES_ISSUE",
        };
        f.write_str(s)
    }
}

/// Every non-`Ok` way a cycle can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackCycleTermination {
    NoCompilableTestCasesGenerated,
    Canceled,
    ProvidedPromptTooLong,
    SavingTestFilesIssue,
}

impl From<FeedbackCycleTermination> for FeedbackCycleExecutionResult {
    fn from(value: FeedbackCycleTermination) -> Self {
        match value {
            FeedbackCycleTermination::NoCompilableTestCasesGenerated => {
                Self::NoCompilableTestCasesGenerated
            }
            FeedbackCycleTermination::Canceled => Self::Canceled,
            FeedbackCycleTermination::ProvidedPromptTooLong => Self::ProvidedPromptTooLong,
            FeedbackCycleTermination::SavingTestFilesIssue => Self::SavingTestFilesIssue,
        }
    }
}

/// Result of a feedback cycle.
///
/// A suite is carried if and only if the cycle ended `Ok`. The constructors
/// are the only way to build one, so the pairing cannot be violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackResponse {
    execution_result: FeedbackCycleExecutionResult,
    generated_test_suite: Option<TestSuiteGeneratedByLlm>,
    compilable_test_cases: CompilableTestCases,
}

impl FeedbackResponse {
    pub fn ok(suite: TestSuiteGeneratedByLlm, compilable_test_cases: CompilableTestCases) -> Self {
        Self {
            execution_result: FeedbackCycleExecutionResult::Ok,
            generated_test_suite: Some(suite),
            compilable_test_cases,
        }
    }

    pub fn terminated(
        reason: FeedbackCycleTermination,
        compilable_test_cases: CompilableTestCases,
    ) -> Self {
        Self {
            execution_result: reason.into(),
            generated_test_suite: None,
            compilable_test_cases,
        }
    }

    pub fn execution_result(&self) -> FeedbackCycleExecutionResult {
        self.execution_result
    }

    pub fn is_ok(&self) -> bool {
        self.execution_result == FeedbackCycleExecutionResult::Ok
    }

    pub fn generated_test_suite(&self) -> Option<&TestSuiteGeneratedByLlm> {
        self.generated_test_suite.as_ref()
    }

    pub fn compilable_test_cases(&self) -> &CompilableTestCases {
        &self.compilable_test_cases
    }

    pub fn into_parts(
        self,
    ) -> (
        FeedbackCycleExecutionResult,
        Option<TestSuiteGeneratedByLlm>,
        CompilableTestCases,
    ) {
        (
            self.execution_result,
            self.generated_test_suite,
            self.compilable_test_cases,
        )
    }
}

/// Soft failures surfaced to the caller while the cycle keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningType {
    TestSuiteParsingFailed,
    NoTestCasesGenerated,
    CompilationErrorOccurred,
}

/// Entry of the final report for one accepted test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedTestCase {
    pub id: usize,
    pub test_name: String,
    pub test_code: String,
}

/// Final report of an accepted suite, keyed by 0-based case position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub test_case_list: BTreeMap<usize, ReportedTestCase>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.test_case_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_case_list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminated_never_carries_suite() {
        for reason in [
            FeedbackCycleTermination::NoCompilableTestCasesGenerated,
            FeedbackCycleTermination::Canceled,
            FeedbackCycleTermination::ProvidedPromptTooLong,
            FeedbackCycleTermination::SavingTestFilesIssue,
        ] {
            let response = FeedbackResponse::terminated(reason, CompilableTestCases::new());
            assert!(!response.is_ok());
            assert!(response.generated_test_suite().is_none());
        }
    }

    #[test]
    fn test_ok_carries_suite() {
        let response =
            FeedbackResponse::ok(TestSuiteGeneratedByLlm::default(), CompilableTestCases::new());
        assert_eq!(response.execution_result(), FeedbackCycleExecutionResult::Ok);
        assert!(response.generated_test_suite().is_some());
    }

    #[test]
    fn test_execution_result_display() {
        assert_eq!(
            FeedbackCycleExecutionResult::ProvidedPromptTooLong.to_string(),
            "PROVIDED_PROMPT_TOO_LONG"
        );
        let json = serde_json::to_string(&FeedbackCycleExecutionResult::Canceled).unwrap();
        assert_eq!(json, "\"CANCELED\"");
    }
}
