//! Dashboard configuration.
//!
//! # Environment Variables
//!
//! | Setting | Primary Env Var | Fallback Env Var |
//! |---------|-----------------|------------------|
//! | Finnhub key | `TICKERBOARD_FINNHUB_API_KEY` | `FINNHUB_API_KEY` |
//! | Alpha Vantage key | `TICKERBOARD_ALPHAVANTAGE_API_KEY` | `ALPHAVANTAGE_API_KEY` |
//! | Provider | `TICKERBOARD_PROVIDER` | - |
//! | Watchlist | `TICKERBOARD_SYMBOLS` | - |
//! | Request timeout | `TICKERBOARD_TIMEOUT_MS` | - |
//!
//! Explicit builder setters override the environment. A missing API key is
//! not an error: requests go out with an empty key and fail upstream.

use std::env;
use std::sync::Arc;

use crate::adapters::{AlphaVantageAdapter, AlphaVantageQuoteMode, FinnhubAdapter};
use crate::batch::BatchFetcher;
use crate::dashboard::{Dashboard, DashboardController, FencingMode};
use crate::data_source::DataSource;
use crate::http_client::HttpClient;
use crate::{default_watchlist, ProviderId, Symbol, TrackedSymbol, ValidationError};

pub const ENV_FINNHUB_API_KEY: &str = "TICKERBOARD_FINNHUB_API_KEY";
pub const ENV_ALPHAVANTAGE_API_KEY: &str = "TICKERBOARD_ALPHAVANTAGE_API_KEY";
pub const ENV_PROVIDER: &str = "TICKERBOARD_PROVIDER";
pub const ENV_SYMBOLS: &str = "TICKERBOARD_SYMBOLS";
pub const ENV_TIMEOUT_MS: &str = "TICKERBOARD_TIMEOUT_MS";

/// Resolved dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub provider: ProviderId,
    pub finnhub_api_key: String,
    pub alphavantage_api_key: String,
    pub watchlist: Vec<TrackedSymbol>,
    /// `None` leaves requests unbounded.
    pub timeout_ms: Option<u64>,
    pub fencing: FencingMode,
    /// Fetch Finnhub profiles for company name and market cap.
    pub enrich_profiles: bool,
    pub alphavantage_quote_mode: AlphaVantageQuoteMode,
}

impl DashboardConfig {
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::new()
    }

    /// Adapter for the configured provider over `http_client`.
    pub fn data_source(&self, http_client: Arc<dyn HttpClient>) -> Arc<dyn DataSource> {
        match self.provider {
            ProviderId::Finnhub => Arc::new(
                FinnhubAdapter::with_http_client(http_client, self.finnhub_api_key.clone())
                    .with_timeout_ms(self.timeout_ms),
            ),
            ProviderId::Alphavantage => Arc::new(
                AlphaVantageAdapter::with_http_client(
                    http_client,
                    self.alphavantage_api_key.clone(),
                )
                .with_timeout_ms(self.timeout_ms)
                .with_quote_mode(self.alphavantage_quote_mode),
            ),
        }
    }

    pub fn fetcher(&self, http_client: Arc<dyn HttpClient>) -> BatchFetcher {
        BatchFetcher::new(self.data_source(http_client))
            .with_profile_enrichment(self.enrich_profiles)
    }

    pub fn dashboard(&self) -> Result<Dashboard, ValidationError> {
        Ok(Dashboard::new(&self.watchlist)?.with_fencing(self.fencing))
    }

    pub fn controller(
        &self,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<DashboardController, ValidationError> {
        Ok(DashboardController::new(
            self.dashboard()?,
            self.fetcher(http_client),
        ))
    }
}

/// Builder for [`DashboardConfig`].
///
/// ```rust,ignore
/// use tickerboard_core::DashboardConfig;
///
/// let config = DashboardConfig::builder()
///     .with_env()
///     .with_symbols("AAPL,TSLA")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DashboardConfigBuilder {
    provider: Option<String>,
    finnhub_api_key: Option<String>,
    alphavantage_api_key: Option<String>,
    symbols: Option<String>,
    watchlist: Option<Vec<TrackedSymbol>>,
    timeout_ms: Option<String>,
    fencing: FencingMode,
    enrich_profiles: Option<bool>,
    alphavantage_quote_mode: AlphaVantageQuoteMode,
}

impl DashboardConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`; only values it returns are applied.
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(ENV_FINNHUB_API_KEY).or_else(|| non_empty("FINNHUB_API_KEY")) {
            self.finnhub_api_key = Some(key);
        }
        if let Some(key) =
            non_empty(ENV_ALPHAVANTAGE_API_KEY).or_else(|| non_empty("ALPHAVANTAGE_API_KEY"))
        {
            self.alphavantage_api_key = Some(key);
        }
        if let Some(provider) = non_empty(ENV_PROVIDER) {
            self.provider = Some(provider);
        }
        if let Some(symbols) = non_empty(ENV_SYMBOLS) {
            self.symbols = Some(symbols);
            self.watchlist = None;
        }
        if let Some(timeout) = non_empty(ENV_TIMEOUT_MS) {
            self.timeout_ms = Some(timeout);
        }
        self
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider.as_str().to_owned());
        self
    }

    pub fn with_finnhub_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    pub fn with_alphavantage_key(mut self, key: impl Into<String>) -> Self {
        self.alphavantage_api_key = Some(key.into());
        self
    }

    /// Comma- or whitespace-separated tickers, validated in [`build`](Self::build).
    pub fn with_symbols(mut self, symbols: impl Into<String>) -> Self {
        self.symbols = Some(symbols.into());
        self.watchlist = None;
        self
    }

    pub fn with_watchlist(mut self, watchlist: Vec<TrackedSymbol>) -> Self {
        self.watchlist = Some(watchlist);
        self.symbols = None;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms.map(|value| value.to_string());
        self
    }

    pub fn with_fencing(mut self, fencing: FencingMode) -> Self {
        self.fencing = fencing;
        self
    }

    pub fn with_profile_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_profiles = Some(enabled);
        self
    }

    pub fn with_alphavantage_quote_mode(mut self, quote_mode: AlphaVantageQuoteMode) -> Self {
        self.alphavantage_quote_mode = quote_mode;
        self
    }

    pub fn build(self) -> Result<DashboardConfig, ValidationError> {
        let provider = match self.provider.as_deref() {
            Some(value) => value.parse()?,
            None => ProviderId::Finnhub,
        };

        let watchlist = match (self.watchlist, self.symbols.as_deref()) {
            (Some(watchlist), _) => watchlist,
            (None, Some(symbols)) => named_watchlist(Symbol::parse_list(symbols)?),
            (None, None) => default_watchlist(),
        };
        if watchlist.is_empty() {
            return Err(ValidationError::EmptyWatchlist);
        }

        let timeout_ms = self.timeout_ms.as_deref().map(parse_timeout).transpose()?;

        Ok(DashboardConfig {
            provider,
            finnhub_api_key: self.finnhub_api_key.unwrap_or_default(),
            alphavantage_api_key: self.alphavantage_api_key.unwrap_or_default(),
            watchlist,
            timeout_ms,
            fencing: self.fencing,
            enrich_profiles: self.enrich_profiles.unwrap_or(true),
            alphavantage_quote_mode: self.alphavantage_quote_mode,
        })
    }
}

/// Known tickers keep their default display name; others start bare.
fn named_watchlist(symbols: Vec<Symbol>) -> Vec<TrackedSymbol> {
    let known = default_watchlist();
    symbols
        .into_iter()
        .map(|symbol| {
            known
                .iter()
                .find(|entry| entry.symbol == symbol)
                .cloned()
                .unwrap_or_else(|| TrackedSymbol::bare(symbol))
        })
        .collect()
}

fn parse_timeout(value: &str) -> Result<u64, ValidationError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|timeout| *timeout > 0)
        .ok_or_else(|| ValidationError::InvalidTimeout {
            value: value.to_owned(),
        })
}
