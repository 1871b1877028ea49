mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod metadata;
mod output;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli)?;
    logging::init(&settings.log_level, !cli.no_color)?;

    let result = commands::run(&cli, &settings).await?;

    if cli.strict && (result.warning_count > 0 || result.error_count > 0) {
        return Err(CliError::StrictModeViolation {
            warning_count: result.warning_count,
            error_count: result.error_count,
        });
    }

    if result.error_count > 0 {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
