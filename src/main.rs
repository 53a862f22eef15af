//! Testsmith CLI entry point.

use clap::Parser;

use testsmith::cli::{handle_error, Cli, Commands};
use testsmith::infrastructure::logging::{LogConfig, LoggerImpl};
use testsmith::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            let _logger = LoggerImpl::init(&LogConfig::default());
            handle_error(err, cli.json);
        }
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => testsmith::cli::commands::init::execute(args, cli.json).await,
        Commands::Generate(args) => {
            testsmith::cli::commands::generate::execute(args, config, cli.json).await
        }
        Commands::Inspect(args) => {
            testsmith::cli::commands::inspect::execute(args, config, cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
