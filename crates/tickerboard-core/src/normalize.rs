//! Quote record normalizer.
//!
//! [`normalize`] turns one decoded provider response into a [`QuoteRecord`]
//! or `None` when the payload is unusable. `None` is not an error: the symbol
//! is simply missing from the batch. Each [`QuoteShape`] has its own field
//! extraction; the shape tag is always explicit, payloads are never sniffed.

use serde_json::Value;

use crate::payload::{self, RawProfile, RawQuote, RawSeriesPoint};
use crate::{QuoteRecord, QuoteShape, TrackedSymbol};

/// Finnhub reports market capitalization in millions.
const PROFILE_MARKET_CAP_SCALE: f64 = 1_000_000.0;

/// Fields pulled out of a payload before change resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct QuoteFields {
    price: Option<f64>,
    change: Option<f64>,
    change_percent: Option<f64>,
    previous: Option<f64>,
    volume: Option<u64>,
}

/// Normalize a raw quote response for `tracked`.
///
/// Returns `None` when the current price is missing or not numeric, or when
/// a change has to be derived from a zero or missing previous price.
pub fn normalize(tracked: &TrackedSymbol, raw: &RawQuote) -> Option<QuoteRecord> {
    let fields = match raw.shape {
        QuoteShape::FinnhubQuote => finnhub_quote_fields(&raw.body),
        QuoteShape::AlphaVantageGlobalQuote => global_quote_fields(&raw.body),
        QuoteShape::AlphaVantageIntraday => {
            latest_pair_fields(payload::intraday_points(&raw.body))
        }
        QuoteShape::FinnhubCandles => latest_pair_fields(payload::candle_points(&raw.body)),
    };

    let price = fields.price?;
    let (change, change_percent) = resolve_change(price, &fields)?;

    QuoteRecord::new(
        tracked.symbol.clone(),
        tracked.name.as_str(),
        price,
        change,
        change_percent,
        fields.volume.unwrap_or(0),
    )
    .ok()
}

/// Overlay company name and market capitalization from a profile response.
///
/// Missing or malformed profile fields leave the record untouched.
pub fn apply_profile(mut record: QuoteRecord, profile: &RawProfile) -> QuoteRecord {
    if let Some(name) = profile
        .body
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        record.name = name.to_owned();
    }

    if let Some(market_cap) = profile
        .body
        .get("marketCapitalization")
        .and_then(payload::json_number)
        .map(|millions| millions * PROFILE_MARKET_CAP_SCALE)
        .filter(|value| value.is_finite() && *value >= 0.0)
    {
        record.market_cap = Some(market_cap);
    }

    record
}

fn finnhub_quote_fields(body: &Value) -> QuoteFields {
    let field = |key: &str| body.get(key).and_then(payload::json_number);
    QuoteFields {
        price: field("c"),
        change: field("d"),
        change_percent: field("dp"),
        previous: field("pc"),
        volume: None,
    }
}

fn global_quote_fields(body: &Value) -> QuoteFields {
    let Some(quote) = body.get("Global Quote") else {
        return QuoteFields::default();
    };
    let field = |key: &str| quote.get(key).and_then(payload::numeric);

    QuoteFields {
        price: field("05. price"),
        change: field("09. change"),
        change_percent: field("10. change percent"),
        previous: field("08. previous close"),
        volume: quote.get("06. volume").and_then(payload::volume),
    }
}

fn latest_pair_fields(points: Vec<RawSeriesPoint<'_>>) -> QuoteFields {
    let points = payload::chronological(points);
    let mut newest_first = points.iter().rev();
    let Some(current) = newest_first.next() else {
        return QuoteFields::default();
    };
    let previous = newest_first.next();

    QuoteFields {
        price: payload::numeric(current.close),
        change: None,
        change_percent: None,
        previous: previous.and_then(|point| payload::numeric(point.close)),
        volume: current.volume.and_then(payload::volume),
    }
}

/// Explicit fields win; anything missing is derived from the previous
/// reference price.
fn resolve_change(price: f64, fields: &QuoteFields) -> Option<(f64, f64)> {
    if let (Some(change), Some(change_percent)) = (fields.change, fields.change_percent) {
        return Some((change, change_percent));
    }

    let previous = fields
        .previous
        .or_else(|| fields.change.map(|change| price - change))
        .filter(|previous| previous.is_finite() && *previous != 0.0)?;

    let change = fields.change.unwrap_or(price - previous);
    let change_percent = fields
        .change_percent
        .unwrap_or(change / previous * 100.0);

    (change.is_finite() && change_percent.is_finite()).then_some((change, change_percent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;
    use serde_json::json;

    fn apple() -> TrackedSymbol {
        TrackedSymbol::new(Symbol::parse("AAPL").expect("valid"), "Apple Inc.")
    }

    fn finnhub(body: Value) -> RawQuote {
        RawQuote::new(QuoteShape::FinnhubQuote, body)
    }

    #[test]
    fn finnhub_quote_uses_explicit_change_fields() {
        let raw = finnhub(json!({ "c": 175.43, "d": 2.15, "dp": 1.2408, "pc": 173.28 }));

        let record = normalize(&apple(), &raw).expect("usable payload");
        assert_eq!(record.price, 175.43);
        assert_eq!(record.change, 2.15);
        assert_eq!(record.change_percent, 1.2408);
        assert_eq!(record.volume, 0);
        assert_eq!(record.market_cap, None);
        assert_eq!(record.name, "Apple Inc.");
    }

    #[test]
    fn finnhub_quote_derives_change_from_previous_close() {
        let raw = finnhub(json!({ "c": 110.0, "d": null, "dp": null, "pc": 100.0 }));

        let record = normalize(&apple(), &raw).expect("usable payload");
        assert!((record.change - 10.0).abs() < 1e-9);
        assert!((record.change_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn finnhub_price_given_as_text_is_unusable() {
        let raw = finnhub(json!({ "c": "175.43", "d": 1.0, "dp": 1.0 }));
        assert_eq!(normalize(&apple(), &raw), None);
    }

    #[test]
    fn zero_previous_close_is_unusable() {
        // Finnhub answers unknown tickers with zeros and null deltas.
        let raw = finnhub(json!({ "c": 0, "d": null, "dp": null, "pc": 0 }));
        assert_eq!(normalize(&apple(), &raw), None);
    }

    #[test]
    fn explicit_change_without_percent_derives_percent_from_implied_previous() {
        let raw = finnhub(json!({ "c": 105.0, "d": 5.0 }));

        let record = normalize(&apple(), &raw).expect("usable payload");
        assert_eq!(record.change, 5.0);
        assert!((record.change_percent - 5.0).abs() < 1e-9);
    }

    #[test]
    fn global_quote_parses_text_fields() {
        let raw = RawQuote::new(
            QuoteShape::AlphaVantageGlobalQuote,
            json!({
                "Global Quote": {
                    "01. symbol": "AAPL",
                    "05. price": "175.4300",
                    "06. volume": "52847392",
                    "08. previous close": "173.2800",
                    "09. change": "2.1500",
                    "10. change percent": "1.2408%"
                }
            }),
        );

        let record = normalize(&apple(), &raw).expect("usable payload");
        assert_eq!(record.price, 175.43);
        assert_eq!(record.change, 2.15);
        assert_eq!(record.change_percent, 1.2408);
        assert_eq!(record.volume, 52_847_392);
    }

    #[test]
    fn empty_global_quote_is_unusable() {
        let raw = RawQuote::new(QuoteShape::AlphaVantageGlobalQuote, json!({ "Global Quote": {} }));
        assert_eq!(normalize(&apple(), &raw), None);
    }

    #[test]
    fn intraday_uses_two_most_recent_samples() {
        let raw = RawQuote::new(
            QuoteShape::AlphaVantageIntraday,
            json!({
                "Meta Data": { "2. Symbol": "AAPL" },
                "Time Series (5min)": {
                    "2024-01-05 16:00:00": { "4. close": "181.1800", "5. volume": "1200" },
                    "2024-01-05 15:55:00": { "4. close": "180.0000", "5. volume": "900" },
                    "2024-01-05 15:50:00": { "4. close": "150.0000", "5. volume": "800" }
                }
            }),
        );

        let record = normalize(&apple(), &raw).expect("usable payload");
        assert_eq!(record.price, 181.18);
        assert!((record.change - 1.18).abs() < 1e-9);
        assert!((record.change_percent - 1.18 / 180.0 * 100.0).abs() < 1e-9);
        assert_eq!(record.volume, 1_200);
    }

    #[test]
    fn single_sample_series_has_no_previous_and_is_unusable() {
        let raw = RawQuote::new(
            QuoteShape::AlphaVantageIntraday,
            json!({ "Time Series (5min)": { "2024-01-05 16:00:00": { "4. close": "181.18" } } }),
        );
        assert_eq!(normalize(&apple(), &raw), None);
    }

    #[test]
    fn candles_use_last_two_entries() {
        let raw = RawQuote::new(
            QuoteShape::FinnhubCandles,
            json!({
                "s": "ok",
                "t": [1_704_153_600, 1_704_240_000],
                "c": [200.0, 190.0],
                "v": [1_000, 2_000]
            }),
        );

        let record = normalize(&apple(), &raw).expect("usable payload");
        assert_eq!(record.change, -10.0);
        assert_eq!(record.change_percent, -5.0);
        assert_eq!(record.volume, 2_000);
    }

    #[test]
    fn profile_fills_name_and_scales_market_cap() {
        let record = normalize(
            &TrackedSymbol::bare(Symbol::parse("AAPL").expect("valid")),
            &finnhub(json!({ "c": 175.43, "d": 2.15, "dp": 1.24 })),
        )
        .expect("usable payload");
        assert_eq!(record.name, "AAPL");

        let enriched = apply_profile(
            record,
            &RawProfile::new(json!({ "name": "Apple Inc", "marketCapitalization": 2_750_000.5 })),
        );
        assert_eq!(enriched.name, "Apple Inc");
        assert_eq!(enriched.market_cap, Some(2_750_000.5 * 1_000_000.0));
    }

    #[test]
    fn malformed_profile_leaves_record_alone() {
        let record = normalize(&apple(), &finnhub(json!({ "c": 1.0, "d": 0.0, "dp": 0.0 })))
            .expect("usable payload");

        let enriched = apply_profile(
            record.clone(),
            &RawProfile::new(json!({ "name": "", "marketCapitalization": -3.0 })),
        );
        assert_eq!(enriched, record);
    }
}
