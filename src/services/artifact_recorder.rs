//! Durable record of every prompt, response and compilation of a run.
//!
//! All files live under `<output_dir>/generated-artifacts/`. JSON containers
//! are rewritten whole on every append, so the file on disk is always a
//! complete document even if the process dies right after a write.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::domain::errors::RecorderError;
use crate::domain::models::{
    CompilationResult, CompilationResultsContainer, FeedbackCycleIteration, IterationsContainer,
    RecordContainer,
};

pub const ARTIFACTS_DIR: &str = "generated-artifacts";
pub const LOG_FILE: &str = "test-generation.log";
pub const LLM_RESPONSE_FILE: &str = "llm-response.txt";
pub const SENT_PROMPTS_FILE: &str = "sent-prompts.txt";
pub const ITERATIONS_FILE: &str = "iterations.json";
pub const COMPILATIONS_FILE: &str = "compilations.json";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> RecorderError + '_ {
    move |source| RecorderError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes run artifacts below one output directory.
///
/// One recorder per run; two cycles sharing an output directory would
/// interleave writes to the same files.
#[derive(Debug, Clone)]
pub struct ArtifactRecorder {
    output_dir: PathBuf,
}

impl ArtifactRecorder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.output_dir.join(ARTIFACTS_DIR)
    }

    /// Path of `filename` in the artifacts directory, without touching disk.
    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.artifacts_dir().join(filename)
    }

    /// Return the artifact file, creating it and its parents if missing.
    pub fn get_or_create_file(&self, filename: &str) -> Result<PathBuf, RecorderError> {
        let filepath = self.artifact_path(filename);

        if !filepath.exists() {
            if let Some(parent) = filepath.parent() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&filepath)
                .map_err(io_error(&filepath))?;
        }

        Ok(filepath)
    }

    pub fn append_to_file(&self, content: &str, filepath: &Path) -> Result<(), RecorderError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(filepath)
            .map_err(io_error(filepath))?;
        file.write_all(content.as_bytes())
            .map_err(io_error(filepath))
    }

    /// Append a timestamped line to `test-generation.log` and trace it.
    pub fn log(&self, content: &str) -> Result<(), RecorderError> {
        info!(target: "testsmith::artifacts", "{content}");
        let log_filepath = self.get_or_create_file(LOG_FILE)?;
        let line = format!("[{}] {content}\n", Utc::now().to_rfc3339());
        self.append_to_file(&line, &log_filepath)
    }

    /// Create (or reset) `filename` holding an empty container.
    pub fn initialize_json_file<C: RecordContainer>(
        &self,
        filename: &str,
    ) -> Result<PathBuf, RecorderError> {
        let filepath = self.get_or_create_file(filename)?;
        self.write_container(&filepath, &C::default())?;
        Ok(filepath)
    }

    pub fn initialize_iterations_file(&self) -> Result<PathBuf, RecorderError> {
        self.initialize_json_file::<IterationsContainer>(ITERATIONS_FILE)
    }

    pub fn initialize_compilations_file(&self) -> Result<PathBuf, RecorderError> {
        self.initialize_json_file::<CompilationResultsContainer>(COMPILATIONS_FILE)
    }

    /// Read the container at `filepath`, or an empty one if it does not exist.
    pub fn read_container<C: RecordContainer>(&self, filepath: &Path) -> Result<C, RecorderError> {
        if !filepath.exists() {
            return Ok(C::default());
        }
        let content = fs::read_to_string(filepath).map_err(io_error(filepath))?;
        if content.trim().is_empty() {
            return Ok(C::default());
        }
        serde_json::from_str(&content).map_err(|source| RecorderError::Json {
            path: filepath.to_path_buf(),
            source,
        })
    }

    /// Read-modify-write append of one record.
    pub fn append_record<C: RecordContainer>(
        &self,
        filepath: &Path,
        record: C::Record,
    ) -> Result<(), RecorderError> {
        let mut container: C = self.read_container(filepath)?;
        container.push(record);
        self.write_container(filepath, &container)
    }

    pub fn append_iteration(
        &self,
        filepath: &Path,
        iteration: FeedbackCycleIteration,
    ) -> Result<(), RecorderError> {
        self.append_record::<IterationsContainer>(filepath, iteration)
    }

    pub fn append_compilation_result(
        &self,
        filepath: &Path,
        result: CompilationResult,
    ) -> Result<(), RecorderError> {
        self.append_record::<CompilationResultsContainer>(filepath, result)
    }

    fn write_container<C: RecordContainer>(
        &self,
        filepath: &Path,
        container: &C,
    ) -> Result<(), RecorderError> {
        let json = serde_json::to_string_pretty(container).map_err(|source| {
            RecorderError::Json {
                path: filepath.to_path_buf(),
                source,
            }
        })?;
        fs::write(filepath, json).map_err(io_error(filepath))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{TestCasesCompilationSummary, TestSuiteCompilationResult};
    use tempfile::TempDir;

    #[test]
    fn test_get_or_create_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path().join("nested"));

        let path = recorder.get_or_create_file("llm-response.txt").unwrap();

        assert!(path.exists());
        assert_eq!(
            path,
            dir.path().join("nested").join(ARTIFACTS_DIR).join("llm-response.txt")
        );
    }

    #[test]
    fn test_get_or_create_file_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = recorder.get_or_create_file("a.txt").unwrap();
        recorder.append_to_file("hello", &path).unwrap();

        let again = recorder.get_or_create_file("a.txt").unwrap();
        assert_eq!(fs::read_to_string(again).unwrap(), "hello");
    }

    #[test]
    fn test_append_to_file_appends() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = recorder.get_or_create_file("sent-prompts.txt").unwrap();

        recorder.append_to_file("one\n", &path).unwrap();
        recorder.append_to_file("two\n", &path).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_log_writes_log_file() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());

        recorder.log("Max feedback cycle iterations: 3").unwrap();

        let content = fs::read_to_string(recorder.artifact_path(LOG_FILE)).unwrap();
        assert!(content.ends_with("Max feedback cycle iterations: 3\n"));
    }

    #[test]
    fn test_initialize_resets_container() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = recorder.initialize_iterations_file().unwrap();
        recorder
            .append_iteration(&path, FeedbackCycleIteration::new(1, "p", "r"))
            .unwrap();

        let path = recorder.initialize_iterations_file().unwrap();
        let container: IterationsContainer = recorder.read_container(&path).unwrap();
        assert!(container.iterations.is_empty());
    }

    #[test]
    fn test_appended_records_read_back_in_call_order() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = recorder.initialize_iterations_file().unwrap();

        let records: Vec<FeedbackCycleIteration> = (1..=5)
            .map(|iteration| {
                FeedbackCycleIteration::new(
                    iteration,
                    format!("prompt #{iteration}\nwith \"quotes\" and ünïcode"),
                    format!("```java\nclass T{iteration} {{}}\n```"),
                )
            })
            .collect();
        for record in &records {
            recorder.append_iteration(&path, record.clone()).unwrap();
        }

        let container: IterationsContainer = recorder.read_container(&path).unwrap();
        assert_eq!(container.records(), records.as_slice());
        for (read, written) in container.records().iter().zip(&records) {
            assert_eq!(
                serde_json::to_string(read).unwrap(),
                serde_json::to_string(written).unwrap()
            );
        }
    }

    #[test]
    fn test_append_compilation_result_is_pretty_json() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = recorder.initialize_compilations_file().unwrap();

        recorder
            .append_compilation_result(
                &path,
                CompilationResult {
                    iteration: 1,
                    test_suite: TestSuiteCompilationResult {
                        exit_code: 0,
                        compilation_message: String::new(),
                    },
                    test_cases: TestCasesCompilationSummary {
                        total: 2,
                        compilable: 2,
                    },
                },
            )
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["iterations"][0]["testCases"]["compilable"], 2);
    }

    #[test]
    fn test_append_to_missing_container_starts_empty() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = dir.path().join("fresh.json");

        recorder
            .append_iteration(&path, FeedbackCycleIteration::new(1, "p", "r"))
            .unwrap();

        let container: IterationsContainer = recorder.read_container(&path).unwrap();
        assert_eq!(container.iterations.len(), 1);
    }

    #[test]
    fn test_malformed_container_is_reported() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = recorder
            .append_iteration(&path, FeedbackCycleIteration::new(1, "p", "r"))
            .unwrap_err();
        assert!(matches!(err, RecorderError::Json { .. }));
    }
}
