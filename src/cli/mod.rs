//! Command-line interface for testsmith.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

pub use output::{create_spinner, ProgressBarExt, SpinnerIndicator};

#[derive(Parser, Debug)]
#[command(name = "testsmith")]
#[command(about = "Generate compilable unit tests with an LLM feedback cycle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Load configuration from this YAML file instead of .testsmith/
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .testsmith/ with a default config and prompt template
    Init(commands::init::InitArgs),
    /// Run the feedback cycle for one class under test
    Generate(commands::generate::GenerateArgs),
    /// Show the recorded iterations and compilations of the last run
    Inspect(commands::inspect::InspectArgs),
}

/// Print an error in the requested format and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let payload = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain,
        });
        eprintln!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1);
}
