//! CLI argument definitions for tickerboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quotes` | Fetch the watchlist and print the filtered, sorted table |
//! | `chart` | Fetch the price series for one tracked symbol |
//! | `sources` | List providers, their endpoints, and key status |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--provider` | env or `finnhub` | Upstream provider |
//! | `--symbols` | env or default watchlist | Comma-separated tickers |
//! | `--timeout-ms` | none | Per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! tickerboard quotes --sort change --desc
//! tickerboard quotes --filter apple --format json --pretty
//! tickerboard --provider alphavantage chart MSFT
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use tickerboard_core::{ProviderId, SortKey};

/// Stock-ticker dashboard for the terminal.
///
/// API keys are read from TICKERBOARD_FINNHUB_API_KEY and
/// TICKERBOARD_ALPHAVANTAGE_API_KEY (or FINNHUB_API_KEY / ALPHAVANTAGE_API_KEY).
#[derive(Debug, Parser)]
#[command(
    name = "tickerboard",
    author,
    version,
    about = "Stock-ticker dashboard for the terminal"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Upstream provider (finnhub, alphavantage). Overrides TICKERBOARD_PROVIDER.
    #[arg(long, global = true)]
    pub provider: Option<ProviderId>,

    /// Comma-separated watchlist. Overrides TICKERBOARD_SYMBOLS.
    #[arg(long, global = true)]
    pub symbols: Option<String>,

    /// Per-request timeout in milliseconds. Requests are unbounded by default.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Skip company profile lookups (name and market cap).
    #[arg(long, global = true, default_value_t = false)]
    pub no_profile: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch quotes for the watchlist.
    ///
    ///   tickerboard quotes
    ///   tickerboard quotes --filter ms --sort volume --desc
    Quotes(QuotesArgs),

    /// Fetch the price series for one tracked symbol.
    ///
    ///   tickerboard chart
    ///   tickerboard chart TSLA
    Chart(ChartArgs),

    /// List providers and their capabilities.
    Sources,
}

#[derive(Debug, Args)]
pub struct QuotesArgs {
    /// Case-insensitive substring of symbol or company name.
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Sort column (symbol, price, change, volume).
    #[arg(long, default_value = "symbol")]
    pub sort: SortKey,

    /// Sort descending.
    #[arg(long, default_value_t = false)]
    pub desc: bool,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Tracked symbol to chart; defaults to the first watchlist entry.
    pub symbol: Option<String>,
}
