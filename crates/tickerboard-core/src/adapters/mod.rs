mod alphavantage;
mod finnhub;

pub use alphavantage::{AlphaVantageAdapter, AlphaVantageQuoteMode};
pub use finnhub::FinnhubAdapter;

use serde_json::Value;

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::ProviderId;

/// Execute `request` and decode the body as JSON.
///
/// Transport errors and non-2xx statuses map to `Unavailable`; a body that
/// is not JSON maps to `Decode`. Any JSON value is returned as-is, including
/// provider error objects; the normalizer decides whether it is usable.
async fn fetch_json(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<Value, SourceError> {
    let response = http_client.execute(request).await.map_err(|error| {
        SourceError::unavailable(format!("{provider} transport error: {}", error.message()))
    })?;

    if !response.is_success() {
        return Err(SourceError::unavailable(format!(
            "{provider} returned status {}",
            response.status
        )));
    }

    serde_json::from_str(&response.body).map_err(|error| {
        SourceError::decode(format!("failed to parse {provider} response: {error}"))
    })
}
