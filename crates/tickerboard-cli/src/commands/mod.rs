mod chart;
mod quotes;
mod sources;

use std::sync::Arc;

use serde::Serialize;
use tickerboard_core::{
    ChartPanel, DashboardConfig, DashboardController, DashboardView, ReqwestHttpClient,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub use sources::SourceStatus;

/// What a command produced.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Dashboard(DashboardView),
    Chart(ChartPanel),
    Sources(Vec<SourceStatus>),
}

pub struct CommandResult {
    pub output: CommandOutput,
    /// Set when the command rendered but its fetch failed outright.
    pub failure: Option<String>,
}

impl CommandResult {
    pub fn ok(output: CommandOutput) -> Self {
        Self {
            output,
            failure: None,
        }
    }

    pub fn with_failure(mut self, failure: Option<String>) -> Self {
        self.failure = failure;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = resolve_config(cli)?;

    match &cli.command {
        Command::Quotes(args) => quotes::run(args, &controller(&config)?).await,
        Command::Chart(args) => chart::run(args, &controller(&config)?).await,
        Command::Sources => Ok(sources::run(&config)),
    }
}

/// Environment first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<DashboardConfig, CliError> {
    let mut builder = DashboardConfig::builder()
        .with_env()
        .with_profile_enrichment(!cli.no_profile);

    if let Some(provider) = cli.provider {
        builder = builder.with_provider(provider);
    }
    if let Some(symbols) = &cli.symbols {
        builder = builder.with_symbols(symbols.as_str());
    }
    if cli.timeout_ms.is_some() {
        builder = builder.with_timeout_ms(cli.timeout_ms);
    }

    let config = builder.build()?;
    tracing::debug!(
        provider = %config.provider,
        symbols = config.watchlist.len(),
        timeout_ms = ?config.timeout_ms,
        "resolved configuration"
    );
    Ok(config)
}

fn controller(config: &DashboardConfig) -> Result<DashboardController, CliError> {
    Ok(config.controller(Arc::new(ReqwestHttpClient::new()))?)
}
