//! Hoersaal CLI entry point.

use anyhow::Result;
use clap::Parser;
use hoersaal::cli::{commands, Cli, Commands};
use hoersaal::config::Settings;
use hoersaal::logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_deref())?;

    // Initialize logging; the log file lives in the output folder once it exists
    let log_file = cli
        .command
        .log_dir(settings.output_dir())
        .filter(|dir| dir.is_dir())
        .map(|dir| dir.join(&settings.general.log_file));
    logging::init(cli.verbose, log_file.as_deref())?;

    // Execute command
    match &cli.command {
        Commands::Run(args) => {
            commands::run_lectures(args, settings).await?;
        }

        Commands::Transcribe(args) => {
            commands::run_transcribe(args, settings).await?;
        }

        Commands::Pdf(args) => {
            commands::run_pdf(args, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path.as_deref())?;
        }
    }

    Ok(())
}
