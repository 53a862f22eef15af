//! Records persisted by the artifact recorder.
//!
//! Field names are camelCase on disk so existing tooling that reads
//! `iterations.json` and `compilations.json` keeps working.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A JSON document holding an ordered list of records.
pub trait RecordContainer: Serialize + DeserializeOwned + Default {
    type Record;

    fn push(&mut self, record: Self::Record);

    fn records(&self) -> &[Self::Record];
}

/// Prompt and response of one feedback-cycle pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCycleIteration {
    pub iteration: usize,
    pub prompt: String,
    pub prompt_length: usize,
    pub response: String,
    pub response_length: usize,
}

impl FeedbackCycleIteration {
    /// Build a record, deriving lengths from the texts (in characters).
    pub fn new(iteration: usize, prompt: impl Into<String>, response: impl Into<String>) -> Self {
        let prompt = prompt.into();
        let response = response.into();
        Self {
            iteration,
            prompt_length: prompt.chars().count(),
            response_length: response.chars().count(),
            prompt,
            response,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationsContainer {
    #[serde(default)]
    pub iterations: Vec<FeedbackCycleIteration>,
}

impl RecordContainer for IterationsContainer {
    type Record = FeedbackCycleIteration;

    fn push(&mut self, record: Self::Record) {
        self.iterations.push(record);
    }

    fn records(&self) -> &[Self::Record] {
        &self.iterations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteCompilationResult {
    pub exit_code: i32,
    pub compilation_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCasesCompilationSummary {
    pub total: usize,
    pub compilable: usize,
}

/// Compilation outcome of one feedback-cycle pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub iteration: usize,
    pub test_suite: TestSuiteCompilationResult,
    pub test_cases: TestCasesCompilationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationResultsContainer {
    #[serde(default)]
    pub iterations: Vec<CompilationResult>,
}

impl RecordContainer for CompilationResultsContainer {
    type Record = CompilationResult;

    fn push(&mut self, record: Self::Record) {
        self.iterations.push(record);
    }

    fn records(&self) -> &[Self::Record] {
        &self.iterations
    }
}
