//! Implementation of the `testsmith generate` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::commands::init::PROMPT_TEMPLATE_FILE;
use crate::cli::output::{
    create_spinner, output, CommandOutput, ProgressBarExt, SpinnerIndicator, TableFormatter,
};
use crate::domain::models::{
    Config, FeedbackCycleExecutionResult, FeedbackResponse, LlmBackendKind, Report, WarningType,
};
use crate::domain::ports::{CancellationFlag, LlmBackend};
use crate::infrastructure::compiler::JavacTestCompiler;
use crate::infrastructure::config::{ConfigLoader, CONFIG_DIR};
use crate::infrastructure::junit::{JUnitTestsAssembler, JavaTestsPresenter};
use crate::infrastructure::llm::{AnthropicBackend, AnthropicConfig, OllamaBackend, OllamaConfig};
use crate::infrastructure::FileTestsStorage;
use crate::services::{
    ArtifactRecorder, ChatRequestManager, ClassContext, ContextReductionStrategy,
    FeedbackCycleCollaborators, FeedbackCycleSettings, LlmWithFeedbackCycle, PromptContext,
    PromptGenerator, DEFAULT_PROMPT_TEMPLATE,
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JSON file describing the class under test and its context
    #[arg(long, short)]
    pub class: PathBuf,

    /// Prompt template (defaults to .testsmith/prompt.txt, then the built-in one)
    #[arg(long, short)]
    pub template: Option<PathBuf>,

    /// Override the configured feedback cycle budget
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Package of the generated tests (defaults to the package of the class under test)
    #[arg(long)]
    pub package: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub outcome: FeedbackCycleExecutionResult,
    pub iterations: usize,
    pub max_iterations: usize,
    pub test_suite_path: Option<PathBuf>,
    pub compilable_test_cases: usize,
    pub report: Report,
    pub warnings: Vec<WarningType>,
    pub artifacts_dir: PathBuf,
}

impl CommandOutput for GenerateOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut lines = vec![format!(
            "Outcome: {} after {}/{} iteration(s)",
            formatter.format_outcome(self.outcome),
            self.iterations,
            self.max_iterations
        )];

        if let Some(path) = &self.test_suite_path {
            lines.push(format!("Test suite: {}", path.display()));
        }
        if !self.report.is_empty() {
            lines.push(formatter.format_report(&self.report));
        } else if self.compilable_test_cases > 0 {
            lines.push(format!(
                "{} test case(s) compiled on their own",
                self.compilable_test_cases
            ));
        }
        if !self.warnings.is_empty() {
            lines.push(format!("Warnings: {}", self.warnings.len()));
        }
        lines.push(format!("Artifacts: {}", self.artifacts_dir.display()));

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Everything a finished cycle hands back to the command.
struct CycleOutcome {
    response: FeedbackResponse,
    report: Report,
    iterations: usize,
    warnings: Vec<WarningType>,
}

/// Package part of a qualified class name, empty for the default package.
fn package_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map_or("", |(package, _)| package)
}

async fn load_template(explicit: Option<&Path>) -> Result<String> {
    if let Some(path) = explicit {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template {}", path.display()));
    }

    let project_template = Path::new(CONFIG_DIR).join(PROMPT_TEMPLATE_FILE);
    if project_template.exists() {
        return tokio::fs::read_to_string(&project_template)
            .await
            .with_context(|| format!("Failed to read prompt template {}", project_template.display()));
    }

    Ok(DEFAULT_PROMPT_TEMPLATE.to_string())
}

async fn load_class_context(path: &Path) -> Result<ClassContext> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read class context {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse class context {}", path.display()))
}

pub async fn execute(args: GenerateArgs, mut config: Config, json_mode: bool) -> Result<()> {
    if let Some(max_iterations) = args.max_iterations {
        config.generation.max_iterations = max_iterations;
    }
    ConfigLoader::validate(&config)?;

    let class = load_class_context(&args.class).await?;
    let package_name = args.package.clone().unwrap_or_else(|| {
        if config.generation.package_name.is_empty() {
            package_of(&class.class_under_test.qualified_name).to_string()
        } else {
            config.generation.package_name.clone()
        }
    });

    let template = load_template(args.template.as_deref()).await?;
    let generator = PromptGenerator::new(
        template,
        PromptContext {
            language: config.generation.language.clone(),
            testing_platform: config.generation.testing_platform.clone(),
            mocking_framework: config.generation.mocking_framework.clone(),
            include_superclasses: config.generation.include_superclasses,
            class,
        },
    );
    let prompt = generator.generate_prompt()?;

    let compiler = JavacTestCompiler::from_config(&config.compiler)?;

    let cancellation = CancellationFlag::new();
    let indicator = if json_mode {
        SpinnerIndicator::hidden(cancellation.clone())
    } else {
        SpinnerIndicator::new(create_spinner(), cancellation.clone())
    };

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, stopping after the current step");
            cancellation.cancel();
        }
    });

    let outcome = match config.llm.backend {
        LlmBackendKind::Ollama => {
            let backend = OllamaBackend::new(OllamaConfig::from(&config.llm))?;
            run_cycle(backend, prompt, generator, &config, &package_name, &compiler, &indicator).await
        }
        LlmBackendKind::Anthropic => {
            let backend = AnthropicBackend::new(AnthropicConfig::from(&config.llm))?;
            run_cycle(backend, prompt, generator, &config, &package_name, &compiler, &indicator).await
        }
    };
    ctrl_c.abort();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            indicator.spinner().finish_error("Test generation failed");
            return Err(err);
        }
    };

    let result = outcome.response.execution_result();
    match result {
        FeedbackCycleExecutionResult::Ok => indicator.spinner().finish_success("Tests generated"),
        FeedbackCycleExecutionResult::Canceled => indicator.spinner().finish_warning("Canceled"),
        other => indicator.spinner().finish_error(other.to_string()),
    }

    let presenter = JavaTestsPresenter::new(config.generation.test_suite_class.as_str());
    let test_suite_path = outcome.response.generated_test_suite().map(|suite| {
        FileTestsStorage::package_dir(&config.generation.result_path, &suite.package_string)
            .join(presenter.test_suite_filename())
    });

    let output_data = GenerateOutput {
        outcome: result,
        iterations: outcome.iterations,
        max_iterations: config.generation.max_iterations,
        test_suite_path,
        compilable_test_cases: outcome.response.compilable_test_cases().len(),
        report: outcome.report,
        warnings: outcome.warnings,
        artifacts_dir: ArtifactRecorder::new(&config.generation.output_dir).artifacts_dir(),
    };

    output(&output_data, json_mode);
    Ok(())
}

/// Wire the adapters for one backend and drive a single feedback cycle.
async fn run_cycle<B: LlmBackend>(
    backend: B,
    prompt: String,
    generator: PromptGenerator,
    config: &Config,
    package_name: &str,
    compiler: &JavacTestCompiler,
    indicator: &SpinnerIndicator,
) -> Result<CycleOutcome> {
    info!(backend = backend.name(), model = %config.llm.model, "Starting test generation");

    let mut request_manager = ChatRequestManager::new(backend);
    let mut tests_assembler = JUnitTestsAssembler::new();
    let mut reduction = ContextReductionStrategy::new(generator);
    let storage = FileTestsStorage::new();
    let presenter = JavaTestsPresenter::new(config.generation.test_suite_class.as_str());
    let recorder = ArtifactRecorder::new(&config.generation.output_dir);

    let settings = FeedbackCycleSettings {
        test_suite_filename: presenter.test_suite_filename(),
        package_name: package_name.to_string(),
        result_path: config.generation.result_path.clone(),
        build_path: config.compiler.build_path.clone(),
        requests_count_threshold: config.generation.max_iterations,
    };

    let mut warnings = Vec::new();
    let (response, report, iterations) = {
        let spinner = indicator.spinner().clone();
        let collected = &mut warnings;
        let mut cycle = LlmWithFeedbackCycle::new(
            prompt,
            settings,
            FeedbackCycleCollaborators {
                request_manager: &mut request_manager,
                tests_assembler: &mut tests_assembler,
                prompt_size_reduction_strategy: &mut reduction,
                test_compiler: compiler,
                test_storage: &storage,
                tests_presenter: &presenter,
                indicator,
                recorder: &recorder,
            },
        )?
        .with_warning_callback(move |warning| {
            spinner.set_message(format!("Warning: {warning:?}"));
            collected.push(warning);
        });

        let response = cycle.run().await?;
        (response, cycle.report().clone(), cycle.requests_count())
    };

    Ok(CycleOutcome {
        response,
        report,
        iterations,
        warnings,
    })
}
