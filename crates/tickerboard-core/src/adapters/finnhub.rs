use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::data_source::{CapabilitySet, DataSource, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::payload::{QuoteShape, RawProfile, RawQuote, RawSeries, SeriesShape};
use crate::{ProviderId, Symbol};

use super::fetch_json;

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
const DEFAULT_CANDLE_DAYS: i64 = 30;

/// Finnhub adapter: `/quote`, `/stock/candle` (daily), `/stock/profile2`.
///
/// The API key travels as the `token` query parameter. An empty key is sent
/// as-is; Finnhub rejects it and every symbol drops out of the batch.
#[derive(Clone)]
pub struct FinnhubAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: Option<u64>,
    candle_days: i64,
}

impl Default for FinnhubAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            api_key: String::new(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: None,
            candle_days: DEFAULT_CANDLE_DAYS,
        }
    }
}

impl FinnhubAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Width of the daily candle window used for charts.
    pub fn with_candle_days(mut self, days: u16) -> Self {
        self.candle_days = i64::from(days.max(2));
        self
    }

    fn request(&self, path: &str, symbol: &Symbol) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base_url))
            .with_query("symbol", symbol.as_str())
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms)
    }

    fn candle_request(&self, symbol: &Symbol, now: OffsetDateTime) -> HttpRequest {
        let from = now - Duration::days(self.candle_days);
        self.request("/stock/candle", symbol)
            .with_query("resolution", "D")
            .with_query("from", &from.unix_timestamp().to_string())
            .with_query("to", &now.unix_timestamp().to_string())
            .with_query("token", &self.api_key)
    }
}

impl DataSource for FinnhubAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Finnhub
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(true, true, true)
    }

    fn quote<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawQuote> {
        Box::pin(async move {
            let request = self
                .request("/quote", symbol)
                .with_query("token", &self.api_key);
            let body = fetch_json(self.http_client.as_ref(), self.id(), request).await?;
            Ok(RawQuote::new(QuoteShape::FinnhubQuote, body))
        })
    }

    fn series<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawSeries> {
        Box::pin(async move {
            let request = self.candle_request(symbol, OffsetDateTime::now_utc());
            let body = fetch_json(self.http_client.as_ref(), self.id(), request).await?;
            Ok(RawSeries::new(SeriesShape::FinnhubCandles, body))
        })
    }

    fn profile<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawProfile> {
        Box::pin(async move {
            let request = self
                .request("/stock/profile2", symbol)
                .with_query("token", &self.api_key);
            let body = fetch_json(self.http_client.as_ref(), self.id(), request).await?;
            Ok(RawProfile::new(body))
        })
    }
}
