//! Feedback cycle: prompt the model, compile what it wrote, re-prompt with
//! the compiler's complaints, until the tests compile or the budget runs out.
//!
//! One pass of the loop is one counted attempt. A pass that ends in
//! `PROMPT_TOO_LONG` with a successful prompt reduction is refunded and
//! does not count against the budget.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::FeedbackCycleError;
use crate::domain::models::{
    CompilableTestCases, CompilationResult, ExecutionResult, FeedbackCycleIteration,
    FeedbackCycleTermination, FeedbackResponse, Report, ReportedTestCase, ResponseErrorCode,
    TestCasesCompilationSummary, TestSuiteCompilationResult, TestSuiteGeneratedByLlm, WarningType,
};
use crate::domain::ports::{
    ProgressIndicator, PromptSizeReductionStrategy, RequestManager, TestCompiler,
    TestsAssembler, TestsPersistentStorage, TestsPresenter,
};
use crate::services::artifact_recorder::{
    ArtifactRecorder, LLM_RESPONSE_FILE, SENT_PROMPTS_FILE,
};

const EMPTY_ANSWER_PROMPT: &str =
    "You have provided an empty answer! Please answer my previous question with the same formats.";

const NOT_PARSABLE_PROMPT: &str =
    "The provided code is not parsable. Please, generate the correct code";

const ITERATION_SEPARATOR: &str = "\n===================================================\n\n";

fn iteration_banner(iteration: usize) -> String {
    format!("\n====================== Iteration #{iteration} ======================\n")
}

/// Prompt asking the model to fix a compilation error.
pub fn compilation_error_prompt(compiler_message: &str) -> String {
    format!(
        "I cannot compile the tests that you provided. The error is:\n\n\
         ```\n{compiler_message}\n```\n\n\
         Fix this issue in the provided tests. Generate public classes and public methods.\n\
         Response only a code with tests between ```, DO NOT provide any other text."
    )
}

/// Where candidate files go and how many passes are allowed.
#[derive(Debug, Clone)]
pub struct FeedbackCycleSettings {
    /// File name of the assembled suite inside `result_path`.
    pub test_suite_filename: String,
    pub package_name: String,
    /// Directory candidate test files are written to.
    pub result_path: PathBuf,
    /// Compiled classes of the project under test, added to the classpath.
    pub build_path: String,
    /// Budget `N`: counted passes before the cycle is forced to stop.
    pub requests_count_threshold: usize,
}

/// Everything the cycle talks to.
pub struct FeedbackCycleCollaborators<'a> {
    pub request_manager: &'a mut dyn RequestManager,
    pub tests_assembler: &'a mut dyn TestsAssembler,
    pub prompt_size_reduction_strategy: &'a mut dyn PromptSizeReductionStrategy,
    pub test_compiler: &'a dyn TestCompiler,
    pub test_storage: &'a dyn TestsPersistentStorage,
    pub tests_presenter: &'a dyn TestsPresenter,
    pub indicator: &'a dyn ProgressIndicator,
    pub recorder: &'a ArtifactRecorder,
}

struct SavedFiles {
    test_case_paths: Vec<PathBuf>,
    test_suite_path: PathBuf,
}

struct ArtifactFiles {
    llm_response: PathBuf,
    sent_prompts: PathBuf,
    iterations: PathBuf,
    compilations: PathBuf,
}

/// Single-use driver of one feedback cycle.
pub struct LlmWithFeedbackCycle<'a> {
    initial_prompt: String,
    settings: FeedbackCycleSettings,
    deps: FeedbackCycleCollaborators<'a>,
    on_warning: Option<Box<dyn FnMut(WarningType) + Send + 'a>>,
    report: Report,
    requests_count: usize,
}

impl<'a> LlmWithFeedbackCycle<'a> {
    pub fn new(
        initial_prompt: impl Into<String>,
        settings: FeedbackCycleSettings,
        deps: FeedbackCycleCollaborators<'a>,
    ) -> Result<Self, FeedbackCycleError> {
        let initial_prompt = initial_prompt.into();
        if initial_prompt.trim().is_empty() {
            return Err(FeedbackCycleError::InvalidSetup(
                "initial prompt must not be empty".to_string(),
            ));
        }
        if settings.requests_count_threshold == 0 {
            return Err(FeedbackCycleError::InvalidSetup(
                "max iterations must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            initial_prompt,
            settings,
            deps,
            on_warning: None,
            report: Report::new(),
            requests_count: 0,
        })
    }

    /// Callback invoked for every soft failure, before the prompt changes.
    #[must_use]
    pub fn with_warning_callback(mut self, callback: impl FnMut(WarningType) + Send + 'a) -> Self {
        self.on_warning = Some(Box::new(callback));
        self
    }

    /// Report entries of the accepted suite, keyed by case position.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Counted passes performed by the last `run`.
    pub fn requests_count(&self) -> usize {
        self.requests_count
    }

    fn warn(&mut self, warning: WarningType) {
        if let Some(callback) = self.on_warning.as_mut() {
            callback(warning);
        }
    }

    fn is_last_iteration(&self, requests_count: usize) -> bool {
        requests_count == self.settings.requests_count_threshold
    }

    /// Run the cycle to completion.
    ///
    /// Expected endings are returned as a `FeedbackResponse`; only a missing
    /// compiler, artifact I/O failures or a broken reduction template escape
    /// as errors.
    #[instrument(skip_all, fields(max_iterations = self.settings.requests_count_threshold))]
    pub async fn run(&mut self) -> Result<FeedbackResponse, FeedbackCycleError> {
        let threshold = self.settings.requests_count_threshold;
        let recorder = self.deps.recorder;

        let files = ArtifactFiles {
            llm_response: recorder.get_or_create_file(LLM_RESPONSE_FILE)?,
            sent_prompts: recorder.get_or_create_file(SENT_PROMPTS_FILE)?,
            iterations: recorder.initialize_iterations_file()?,
            compilations: recorder.initialize_compilations_file()?,
        };

        let header = format!("[IMPORTANT]: Max feedback cycle iterations: {threshold}");
        recorder.append_to_file(&format!("{header}\n"), &files.llm_response)?;
        recorder.log(&header)?;

        self.report = Report::new();
        self.requests_count = 0;

        let mut requests_count: usize = 0;
        let mut next_prompt = self.initial_prompt.clone();
        let mut compilable_test_cases = CompilableTestCases::new();
        let mut last_parsed_suite: Option<TestSuiteGeneratedByLlm> = None;

        loop {
            requests_count += 1;
            self.requests_count = requests_count.min(threshold);

            let banner = iteration_banner(requests_count);
            recorder.append_to_file(&banner, &files.llm_response)?;
            recorder.append_to_file(&banner, &files.sent_prompts)?;

            info!(iteration = requests_count, "Iteration #{requests_count} of feedback cycle");
            self.deps
                .indicator
                .set_text(&format!("Iteration #{requests_count} of feedback cycle"));

            if self.deps.indicator.is_canceled() {
                return self.terminate(FeedbackCycleTermination::Canceled, compilable_test_cases);
            }

            if requests_count > threshold {
                return match last_parsed_suite {
                    Some(suite) if !compilable_test_cases.is_empty() => {
                        self.finish_with_accumulated(suite, compilable_test_cases)
                    }
                    _ => self.terminate(
                        FeedbackCycleTermination::NoCompilableTestCasesGenerated,
                        compilable_test_cases,
                    ),
                };
            }

            self.deps.tests_assembler.clear();
            let response = self
                .deps
                .request_manager
                .request(
                    &next_prompt,
                    self.deps.indicator,
                    &self.settings.package_name,
                    &mut *self.deps.tests_assembler,
                )
                .await;

            let raw_response = self.deps.tests_assembler.content().to_string();

            recorder.append_to_file(&raw_response, &files.llm_response)?;
            recorder.append_to_file(ITERATION_SEPARATOR, &files.llm_response)?;
            recorder.append_to_file(&next_prompt, &files.sent_prompts)?;
            recorder.append_to_file(ITERATION_SEPARATOR, &files.sent_prompts)?;

            // A size rejection is retried under the same iteration number, so
            // it is not a full iteration record.
            if response.error_code != ResponseErrorCode::PromptTooLong {
                recorder.append_iteration(
                    &files.iterations,
                    FeedbackCycleIteration::new(requests_count, next_prompt.as_str(), raw_response),
                )?;
            }

            let suite = match response.error_code {
                ResponseErrorCode::Ok => match response.test_suite {
                    Some(suite) if !suite.is_empty() => suite,
                    _ => {
                        warn!("Generated test suite is empty. Proceeding to the next iteration...");
                        self.warn(WarningType::NoTestCasesGenerated);
                        next_prompt = EMPTY_ANSWER_PROMPT.to_string();
                        continue;
                    }
                },
                ResponseErrorCode::PromptTooLong => {
                    info!("Provided prompt exceeds context limit");
                    if self.deps.prompt_size_reduction_strategy.is_reduction_possible() {
                        info!("Reduction of the prompt length is possible. Attempting with the reduced prompt...");
                        next_prompt = self
                            .deps
                            .prompt_size_reduction_strategy
                            .reduce_size_and_generate_prompt()?;
                        requests_count -= 1;
                        continue;
                    }
                    return self.terminate(
                        FeedbackCycleTermination::ProvidedPromptTooLong,
                        compilable_test_cases,
                    );
                }
                ResponseErrorCode::EmptyLlmResponse => {
                    warn!("LLM response is empty. Proceeding to the next iteration...");
                    self.warn(WarningType::NoTestCasesGenerated);
                    next_prompt = EMPTY_ANSWER_PROMPT.to_string();
                    continue;
                }
                ResponseErrorCode::TestSuiteParsingFailure => {
                    warn!("Cannot parse a test suite from the LLM response. Proceeding to the next iteration...");
                    self.warn(WarningType::TestSuiteParsingFailed);
                    next_prompt = NOT_PARSABLE_PROMPT.to_string();
                    continue;
                }
            };

            info!(test_cases = suite.test_cases.len(), "Test suite generated successfully: {suite}");

            if self.deps.indicator.is_canceled() {
                return self.terminate(FeedbackCycleTermination::Canceled, compilable_test_cases);
            }

            last_parsed_suite = Some(suite.clone());
            let is_last_iteration = self.is_last_iteration(requests_count);

            let Some(saved) = self.save_candidate_files(&suite, true) else {
                return self.terminate(
                    FeedbackCycleTermination::SavingTestFilesIssue,
                    compilable_test_cases,
                );
            };

            self.deps.indicator.set_text("Compilation tests checking");

            let build_path = self.settings.build_path.clone();
            let test_cases_result = self
                .deps
                .test_compiler
                .compile_test_cases(&saved.test_case_paths, &build_path, &suite.test_cases)
                .await?;
            let test_suite_result = self
                .deps
                .test_compiler
                .compile_code(&saved.test_suite_path, &build_path)
                .await?;

            let summary = TestCasesCompilationSummary {
                total: saved.test_case_paths.len(),
                compilable: test_cases_result.compilable_test_cases.len(),
            };
            compilable_test_cases.extend(test_cases_result.compilable_test_cases.iter().cloned());

            let fully_compilable =
                test_cases_result.all_test_cases_compilable && test_suite_result.is_successful();

            if fully_compilable {
                self.record_compilation(&files.compilations, requests_count, &test_suite_result, summary)?;
                info!("Result is compilable");
                return self.accept(suite, compilable_test_cases);
            }

            if !is_last_iteration {
                self.record_compilation(&files.compilations, requests_count, &test_suite_result, summary)?;
                info!(
                    "Non-compilable test suite (Proceeding to the next iteration...):\n{}",
                    self.deps.tests_presenter.represent_test_suite(&suite)
                );
                self.warn(WarningType::CompilationErrorOccurred);
                next_prompt = compilation_error_prompt(&test_suite_result.execution_message);
                debug!(prompt = %next_prompt, "Corrective prompt");
                continue;
            }

            if compilable_test_cases.is_empty() {
                self.record_compilation(&files.compilations, requests_count, &test_suite_result, summary)?;
                return self.terminate(
                    FeedbackCycleTermination::NoCompilableTestCasesGenerated,
                    compilable_test_cases,
                );
            }

            // Last pass: fall back to cases that already compiled on their own.
            let mut final_suite = suite;
            final_suite.update_test_cases(compilable_test_cases.to_vec());
            info!(
                test_cases = final_suite.test_cases.len(),
                "Last iteration: assembling the suite from compilable test cases"
            );

            let Some(saved) = self.save_candidate_files(&final_suite, false) else {
                return self.terminate(
                    FeedbackCycleTermination::SavingTestFilesIssue,
                    compilable_test_cases,
                );
            };
            let final_suite_result = self
                .deps
                .test_compiler
                .compile_code(&saved.test_suite_path, &build_path)
                .await?;
            self.record_compilation(&files.compilations, requests_count, &final_suite_result, summary)?;

            return self.accept(final_suite, compilable_test_cases);
        }
    }

    /// Save every case (when `with_test_cases`) and the whole suite.
    ///
    /// `None` when a save failed or a written file is missing afterwards.
    fn save_candidate_files(
        &self,
        suite: &TestSuiteGeneratedByLlm,
        with_test_cases: bool,
    ) -> Option<SavedFiles> {
        let presenter = self.deps.tests_presenter;
        let result_path = self.settings.result_path.as_path();
        let mut test_case_paths = Vec::new();

        if with_test_cases {
            for index in 0..suite.test_cases.len() {
                let filename = format!(
                    "{}.{}",
                    presenter.test_case_class_name(suite, index),
                    presenter.file_extension()
                );
                let code = presenter.represent_test_case(suite, index);
                test_case_paths.push(self.save_file(suite, &code, result_path, &filename)?);
            }
        }

        let test_suite_path = self.save_file(
            suite,
            &presenter.represent_test_suite(suite),
            result_path,
            &self.settings.test_suite_filename,
        )?;

        let all_files_created = test_case_paths
            .iter()
            .chain(std::iter::once(&test_suite_path))
            .all(|path| path.exists());
        if !all_files_created {
            warn!(path = %test_suite_path.display(), "Couldn't save a test file");
            return None;
        }

        Some(SavedFiles {
            test_case_paths,
            test_suite_path,
        })
    }

    fn save_file(
        &self,
        suite: &TestSuiteGeneratedByLlm,
        code: &str,
        result_path: &Path,
        filename: &str,
    ) -> Option<PathBuf> {
        match self.deps.test_storage.save_generated_test(
            &suite.package_string,
            code,
            result_path,
            filename,
        ) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(error = %err, filename, "Couldn't save a test file");
                None
            }
        }
    }

    fn record_compilation(
        &self,
        filepath: &Path,
        iteration: usize,
        suite_result: &ExecutionResult,
        test_cases: TestCasesCompilationSummary,
    ) -> Result<(), FeedbackCycleError> {
        self.deps.recorder.append_compilation_result(
            filepath,
            CompilationResult {
                iteration,
                test_suite: TestSuiteCompilationResult {
                    exit_code: suite_result.exit_code,
                    compilation_message: suite_result.execution_message.clone(),
                },
                test_cases,
            },
        )?;
        Ok(())
    }

    /// Budget exhausted with proven cases: emit them without another request.
    fn finish_with_accumulated(
        &mut self,
        mut suite: TestSuiteGeneratedByLlm,
        compilable_test_cases: CompilableTestCases,
    ) -> Result<FeedbackResponse, FeedbackCycleError> {
        suite.update_test_cases(compilable_test_cases.to_vec());
        if self.save_candidate_files(&suite, false).is_none() {
            return self.terminate(
                FeedbackCycleTermination::SavingTestFilesIssue,
                compilable_test_cases,
            );
        }
        self.accept(suite, compilable_test_cases)
    }

    fn accept(
        &mut self,
        suite: TestSuiteGeneratedByLlm,
        compilable_test_cases: CompilableTestCases,
    ) -> Result<FeedbackResponse, FeedbackCycleError> {
        for (index, test_case) in suite.test_cases.iter().enumerate() {
            self.report.test_case_list.insert(
                index,
                ReportedTestCase {
                    id: index,
                    test_name: test_case.name.clone(),
                    test_code: test_case.to_string(),
                },
            );
        }
        self.deps.recorder.log(&format!(
            "Feedback cycle finished: OK with {} test case(s)",
            suite.test_cases.len()
        ))?;
        Ok(FeedbackResponse::ok(suite, compilable_test_cases))
    }

    fn terminate(
        &mut self,
        reason: FeedbackCycleTermination,
        compilable_test_cases: CompilableTestCases,
    ) -> Result<FeedbackResponse, FeedbackCycleError> {
        let response = FeedbackResponse::terminated(reason, compilable_test_cases);
        self.deps.recorder.log(&format!(
            "Feedback cycle finished: {}",
            response.execution_result()
        ))?;
        Ok(response)
    }
}
