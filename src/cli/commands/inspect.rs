//! Implementation of the `testsmith inspect` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{
    CompilationResult, CompilationResultsContainer, Config, FeedbackCycleIteration,
    IterationsContainer, RecordContainer,
};
use crate::services::artifact_recorder::{ArtifactRecorder, COMPILATIONS_FILE, ITERATIONS_FILE};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Output directory of the run (defaults to the configured one)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Include the full prompt and response of every iteration
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub artifacts_dir: PathBuf,
    pub iterations: Vec<FeedbackCycleIteration>,
    pub compilations: Vec<CompilationResult>,
    #[serde(skip)]
    pub full: bool,
}

impl CommandOutput for InspectOutput {
    fn to_human(&self) -> String {
        if self.iterations.is_empty() && self.compilations.is_empty() {
            return format!("No recorded run in {}", self.artifacts_dir.display());
        }

        let formatter = TableFormatter::new();
        let mut lines = vec![
            format!("Artifacts: {}", self.artifacts_dir.display()),
            format!("\nIterations ({}):", self.iterations.len()),
            formatter.format_iterations(&self.iterations),
            format!("\nCompilations ({}):", self.compilations.len()),
            formatter.format_compilations(&self.compilations),
        ];

        if self.full {
            for iteration in &self.iterations {
                lines.push(format!(
                    "\n--- Iteration #{} prompt ---\n{}\n--- Iteration #{} response ---\n{}",
                    iteration.iteration, iteration.prompt, iteration.iteration, iteration.response
                ));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InspectArgs, config: Config, json_mode: bool) -> Result<()> {
    let output_dir = args.output_dir.unwrap_or(config.generation.output_dir);
    let recorder = ArtifactRecorder::new(output_dir);

    let iterations: IterationsContainer =
        recorder.read_container(&recorder.artifact_path(ITERATIONS_FILE))?;
    let compilations: CompilationResultsContainer =
        recorder.read_container(&recorder.artifact_path(COMPILATIONS_FILE))?;

    let output_data = InspectOutput {
        artifacts_dir: recorder.artifacts_dir(),
        iterations: iterations.records().to_vec(),
        compilations: compilations.records().to_vec(),
        full: args.full,
    };

    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_run_message() {
        let output = InspectOutput {
            artifacts_dir: PathBuf::from("/tmp/none"),
            iterations: vec![],
            compilations: vec![],
            full: false,
        };
        assert!(output.to_human().starts_with("No recorded run"));
    }

    #[tokio::test]
    async fn test_reads_recorded_iterations() {
        let dir = TempDir::new().unwrap();
        let recorder = ArtifactRecorder::new(dir.path());
        let path = recorder.initialize_iterations_file().unwrap();
        recorder
            .append_iteration(&path, FeedbackCycleIteration::new(1, "prompt", "response"))
            .unwrap();

        let container: IterationsContainer = recorder.read_container(&path).unwrap();
        let output = InspectOutput {
            artifacts_dir: recorder.artifacts_dir(),
            iterations: container.records().to_vec(),
            compilations: vec![],
            full: true,
        };

        let json = output.to_json();
        assert_eq!(json["iterations"][0]["promptLength"], 6);
        assert!(json.get("full").is_none());
        assert!(output.to_human().contains("--- Iteration #1 response ---\nresponse"));

        execute(
            InspectArgs {
                output_dir: Some(dir.path().to_path_buf()),
                full: false,
            },
            Config::default(),
            true,
        )
        .await
        .unwrap();
    }
}
