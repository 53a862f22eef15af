//! Implementation of the `testsmith init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;
use crate::services::DEFAULT_PROMPT_TEMPLATE;

pub const CONFIG_FILE: &str = "config.yaml";
pub const PROMPT_TEMPLATE_FILE: &str = "prompt.txt";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite existing configuration and template files
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub files_written: Vec<String>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.files_written.is_empty() {
            lines.push("\nWrote files:".to_string());
            for file in &self.files_written {
                lines.push(format!("  - {file}"));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let config_dir = target_path.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to overwrite.".to_string(),
            initialized_path: target_path,
            files_written: vec![],
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let config_yaml =
        serde_yaml::to_string(&Config::default()).context("Failed to serialize default config")?;
    let files = [
        (CONFIG_FILE, config_yaml),
        (PROMPT_TEMPLATE_FILE, DEFAULT_PROMPT_TEMPLATE.to_string()),
    ];

    let mut files_written = vec![];
    for (name, content) in files {
        let path = config_dir.join(name);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        files_written.push(format!("{CONFIG_DIR}/{name}"));
    }

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        files_written,
    };

    output(&output_data, json_mode);
    Ok(())
}
