use std::sync::Arc;

use serde_json::Value;

use crate::data_source::{CapabilitySet, DataSource, Endpoint, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::payload::{QuoteShape, RawProfile, RawQuote, RawSeries};
use crate::{ProviderId, Symbol};

use super::fetch_json;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const INTRADAY_INTERVAL: &str = "5min";

/// Which Alpha Vantage function backs the quote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaVantageQuoteMode {
    /// `GLOBAL_QUOTE`: explicit change, percent, and previous close.
    #[default]
    GlobalQuote,
    /// `TIME_SERIES_INTRADAY`: change derived from the two latest bars.
    Intraday,
}

/// Alpha Vantage adapter. No profile endpoint; records keep the watchlist
/// name and an unknown market cap.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: Option<u64>,
    quote_mode: AlphaVantageQuoteMode,
}

impl Default for AlphaVantageAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            api_key: String::new(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: None,
            quote_mode: AlphaVantageQuoteMode::default(),
        }
    }
}

impl AlphaVantageAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_quote_mode(mut self, quote_mode: AlphaVantageQuoteMode) -> Self {
        self.quote_mode = quote_mode;
        self
    }

    pub const fn quote_mode(&self) -> AlphaVantageQuoteMode {
        self.quote_mode
    }

    fn global_quote_request(&self, symbol: &Symbol) -> HttpRequest {
        HttpRequest::get(&self.base_url)
            .with_query("function", "GLOBAL_QUOTE")
            .with_query("symbol", symbol.as_str())
            .with_query("apikey", &self.api_key)
            .with_timeout_ms(self.timeout_ms)
    }

    fn intraday_request(&self, symbol: &Symbol) -> HttpRequest {
        HttpRequest::get(&self.base_url)
            .with_query("function", "TIME_SERIES_INTRADAY")
            .with_query("symbol", symbol.as_str())
            .with_query("interval", INTRADAY_INTERVAL)
            .with_query("apikey", &self.api_key)
            .with_timeout_ms(self.timeout_ms)
    }

    async fn fetch(&self, symbol: &Symbol, request: HttpRequest) -> Result<Value, SourceError> {
        let body = fetch_json(self.http_client.as_ref(), self.id(), request).await?;
        if let Some(notice) = upstream_notice(&body) {
            tracing::debug!(symbol = %symbol, notice, "alphavantage answered with a notice");
        }
        Ok(body)
    }
}

/// Rate-limit and error notices arrive with status 200.
fn upstream_notice(body: &Value) -> Option<&str> {
    ["Note", "Information", "Error Message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
}

impl DataSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(true, true, false)
    }

    fn quote<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawQuote> {
        Box::pin(async move {
            let (shape, request) = match self.quote_mode {
                AlphaVantageQuoteMode::GlobalQuote => (
                    self.id().quote_shape(),
                    self.global_quote_request(symbol),
                ),
                AlphaVantageQuoteMode::Intraday => {
                    (QuoteShape::AlphaVantageIntraday, self.intraday_request(symbol))
                }
            };
            let body = self.fetch(symbol, request).await?;
            Ok(RawQuote::new(shape, body))
        })
    }

    fn series<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawSeries> {
        Box::pin(async move {
            let body = self.fetch(symbol, self.intraday_request(symbol)).await?;
            Ok(RawSeries::new(self.id().series_shape(), body))
        })
    }

    fn profile<'a>(&'a self, _symbol: &'a Symbol) -> SourceFuture<'a, RawProfile> {
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                self.id(),
                Endpoint::Profile,
            ))
        })
    }
}
