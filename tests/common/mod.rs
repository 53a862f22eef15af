//! Common test utilities for integration tests
//!
//! Scripted collaborators for driving the feedback cycle without a model
//! or a JDK.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use testsmith::domain::errors::{
    CompilerError, DomainError, DomainResult, FeedbackCycleError, PromptError,
};
use testsmith::domain::models::{
    CompilationResultsContainer, ExecutionResult, FeedbackResponse, IterationsContainer,
    LlmResponse, Report, ResponseErrorCode, TestCaseGeneratedByLlm, TestSuiteGeneratedByLlm,
    WarningType,
};
use testsmith::domain::ports::{
    CancellationFlag, ProgressIndicator, PromptSizeReductionStrategy, RequestManager,
    TestCompiler, TestsAssembler, TestsPersistentStorage,
};
use testsmith::infrastructure::junit::{JUnitTestsAssembler, JavaTestsPresenter};
use testsmith::infrastructure::FileTestsStorage;
use testsmith::services::artifact_recorder::{COMPILATIONS_FILE, ITERATIONS_FILE};
use testsmith::services::{
    ArtifactRecorder, FeedbackCycleCollaborators, FeedbackCycleSettings, LlmWithFeedbackCycle,
};

pub const PACKAGE: &str = "com.example";
pub const SUITE_CLASS: &str = "CalcTest";
pub const INITIAL_PROMPT: &str = "Generate unit tests in Java for Calc";

/// Marker the fake compiler rejects.
pub const BROKEN_MARKER: &str = "BROKEN";

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn good_case(name: &str) -> TestCaseGeneratedByLlm {
    TestCaseGeneratedByLlm::new(
        name,
        format!("@Test\npublic void {name}() {{\n    assertEquals(3, calc.add(1, 2));\n}}"),
    )
}

pub fn broken_case(name: &str) -> TestCaseGeneratedByLlm {
    TestCaseGeneratedByLlm::new(
        name,
        format!("@Test\npublic void {name}() {{\n    {BROKEN_MARKER}();\n}}"),
    )
}

pub fn suite(test_cases: Vec<TestCaseGeneratedByLlm>) -> TestSuiteGeneratedByLlm {
    TestSuiteGeneratedByLlm {
        package_string: PACKAGE.to_string(),
        imports: vec![
            "import org.junit.Test;".to_string(),
            "import static org.junit.Assert.*;".to_string(),
        ],
        run_with: String::new(),
        other_info: "private final Calc calc = new Calc();".to_string(),
        test_cases,
    }
}

/// One scripted model answer.
#[derive(Debug, Clone)]
pub enum Scripted {
    Suite(TestSuiteGeneratedByLlm),
    Error(ResponseErrorCode),
}

/// Request manager replaying a fixed list of answers.
#[derive(Default)]
pub struct ScriptedRequestManager {
    script: Vec<Scripted>,
    pub prompts: Vec<String>,
    /// Flipped while a request is in flight, when set.
    pub cancel_during_request: Option<CancellationFlag>,
}

impl ScriptedRequestManager {
    pub fn new(mut script: Vec<Scripted>) -> Self {
        script.reverse();
        Self {
            script,
            prompts: vec![],
            cancel_during_request: None,
        }
    }
}

#[async_trait]
impl RequestManager for ScriptedRequestManager {
    async fn request(
        &mut self,
        prompt: &str,
        _indicator: &dyn ProgressIndicator,
        _package_name: &str,
        assembler: &mut dyn TestsAssembler,
    ) -> LlmResponse {
        self.prompts.push(prompt.to_string());
        if let Some(flag) = &self.cancel_during_request {
            flag.cancel();
        }

        match self.script.pop().expect("script exhausted") {
            Scripted::Suite(suite) => {
                assembler.consume(&format!("```java\n{suite}\n```"));
                LlmResponse::ok(suite)
            }
            Scripted::Error(code) => {
                if code == ResponseErrorCode::TestSuiteParsingFailure {
                    assembler.consume("I cannot write tests for this class.");
                }
                LlmResponse::error(code)
            }
        }
    }
}

/// Compiler that fails any file containing [`BROKEN_MARKER`].
#[derive(Default)]
pub struct MarkerCompiler {
    pub compiled: Mutex<Vec<PathBuf>>,
}

impl MarkerCompiler {
    pub fn compiled_count(&self) -> usize {
        self.compiled.lock().unwrap().len()
    }
}

#[async_trait]
impl TestCompiler for MarkerCompiler {
    async fn compile_code(
        &self,
        path: &Path,
        _project_build_path: &str,
    ) -> Result<ExecutionResult, CompilerError> {
        self.compiled.lock().unwrap().push(path.to_path_buf());
        let source = std::fs::read_to_string(path).map_err(|err| CompilerError::Io {
            command: format!("read {}", path.display()),
            message: err.to_string(),
        })?;

        if source.contains(BROKEN_MARKER) {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            Ok(ExecutionResult::new(
                1,
                format!("{name}:5: error: cannot find symbol {BROKEN_MARKER}"),
            ))
        } else {
            Ok(ExecutionResult::new(0, ""))
        }
    }
}

/// Compiler whose toolchain is missing.
pub struct MissingCompiler;

#[async_trait]
impl TestCompiler for MissingCompiler {
    async fn compile_code(
        &self,
        _path: &Path,
        _project_build_path: &str,
    ) -> Result<ExecutionResult, CompilerError> {
        Err(CompilerError::CompilerNotFound {
            binary: "javac",
            root: PathBuf::from("/nonexistent/jdk"),
        })
    }
}

/// Reduction strategy allowing a fixed number of reductions.
pub struct CountingReduction {
    pub remaining: usize,
    pub calls: usize,
}

impl CountingReduction {
    pub fn new(remaining: usize) -> Self {
        Self {
            remaining,
            calls: 0,
        }
    }
}

impl PromptSizeReductionStrategy for CountingReduction {
    fn is_reduction_possible(&self) -> bool {
        self.remaining > 0
    }

    fn reduce_size_and_generate_prompt(&mut self) -> Result<String, PromptError> {
        self.remaining = self.remaining.saturating_sub(1);
        self.calls += 1;
        Ok(format!("reduced prompt #{}", self.calls))
    }
}

/// Storage that refuses every write.
pub struct FailingStorage;

impl TestsPersistentStorage for FailingStorage {
    fn save_generated_test(
        &self,
        _package_name: &str,
        _code: &str,
        result_path: &Path,
        filename: &str,
    ) -> DomainResult<PathBuf> {
        Err(DomainError::Io {
            path: result_path.join(filename),
            message: "read-only file system".to_string(),
        })
    }
}

/// What a harness run produced.
pub struct RunOutcome {
    pub response: Result<FeedbackResponse, FeedbackCycleError>,
    pub warnings: Vec<WarningType>,
    pub requests_count: usize,
    pub report: Report,
}

impl RunOutcome {
    pub fn unwrap(&self) -> &FeedbackResponse {
        self.response.as_ref().expect("feedback cycle failed")
    }
}

/// Owns every collaborator of one feedback cycle run.
pub struct Harness {
    pub dir: TempDir,
    pub request_manager: ScriptedRequestManager,
    pub assembler: JUnitTestsAssembler,
    pub reduction: CountingReduction,
    pub compiler: Box<dyn TestCompiler>,
    pub storage: Box<dyn TestsPersistentStorage>,
    pub presenter: JavaTestsPresenter,
    pub cancellation: CancellationFlag,
    pub recorder: ArtifactRecorder,
}

impl Harness {
    pub fn new(script: Vec<Scripted>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let recorder = ArtifactRecorder::new(dir.path().join("output"));
        Self {
            dir,
            request_manager: ScriptedRequestManager::new(script),
            assembler: JUnitTestsAssembler::new(),
            reduction: CountingReduction::new(0),
            compiler: Box::new(MarkerCompiler::default()),
            storage: Box::new(FileTestsStorage::new()),
            presenter: JavaTestsPresenter::new(SUITE_CLASS),
            cancellation: CancellationFlag::new(),
            recorder,
        }
    }

    pub fn result_path(&self) -> PathBuf {
        self.dir.path().join("generated")
    }

    pub fn suite_file(&self) -> PathBuf {
        FileTestsStorage::package_dir(&self.result_path(), PACKAGE)
            .join(self.presenter.test_suite_filename())
    }

    pub fn settings(&self, max_iterations: usize) -> FeedbackCycleSettings {
        FeedbackCycleSettings {
            test_suite_filename: self.presenter.test_suite_filename(),
            package_name: PACKAGE.to_string(),
            result_path: self.result_path(),
            build_path: "target/classes".to_string(),
            requests_count_threshold: max_iterations,
        }
    }

    pub async fn run(&mut self, max_iterations: usize) -> RunOutcome {
        let settings = self.settings(max_iterations);
        let mut warnings = Vec::new();

        let (response, requests_count, report) = {
            let collected = &mut warnings;
            let mut cycle = LlmWithFeedbackCycle::new(
                INITIAL_PROMPT,
                settings,
                FeedbackCycleCollaborators {
                    request_manager: &mut self.request_manager,
                    tests_assembler: &mut self.assembler,
                    prompt_size_reduction_strategy: &mut self.reduction,
                    test_compiler: self.compiler.as_ref(),
                    test_storage: self.storage.as_ref(),
                    tests_presenter: &self.presenter,
                    indicator: &self.cancellation,
                    recorder: &self.recorder,
                },
            )
            .expect("valid setup")
            .with_warning_callback(move |warning| collected.push(warning));

            let response = cycle.run().await;
            (response, cycle.requests_count(), cycle.report().clone())
        };

        RunOutcome {
            response,
            warnings,
            requests_count,
            report,
        }
    }

    pub fn iterations(&self) -> IterationsContainer {
        self.recorder
            .read_container(&self.recorder.artifact_path(ITERATIONS_FILE))
            .expect("iterations.json readable")
    }

    pub fn compilations(&self) -> CompilationResultsContainer {
        self.recorder
            .read_container(&self.recorder.artifact_path(COMPILATIONS_FILE))
            .expect("compilations.json readable")
    }

    pub fn artifact_text(&self, filename: &str) -> String {
        std::fs::read_to_string(self.recorder.artifact_path(filename)).unwrap_or_default()
    }
}
