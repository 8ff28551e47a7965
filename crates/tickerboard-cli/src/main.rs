mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::Cli;
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
    init_logging()?;

    let result = commands::run(&cli).await?;
    output::render(&result.output, cli.format, cli.pretty)?;

    match result.failure {
        Some(message) => {
            let error = CliError::FetchFailed(message);
            eprintln!("error: {error}");
            Ok(ExitCode::from(error.exit_code()))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

/// Events go to stderr so table and JSON output stay clean on stdout.
fn init_logging() -> Result<(), CliError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickerboard=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|error| CliError::Logging(error.to_string()))
}
