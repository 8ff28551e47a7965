//! Raw provider payloads and the shape tags that select how they are read.
//!
//! Payloads arrive already decoded into [`serde_json::Value`]. Nothing here
//! fails: helpers return `None` or skip entries when a field is missing or
//! malformed, and the caller decides what an absent value means.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Response shapes a quote can be normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteShape {
    /// Finnhub `/quote`: flat numeric `c`, `d`, `dp`, `pc`.
    FinnhubQuote,
    /// Alpha Vantage `GLOBAL_QUOTE`: text fields under `Global Quote`.
    AlphaVantageGlobalQuote,
    /// Alpha Vantage `TIME_SERIES_INTRADAY`: newest two samples are current and previous.
    AlphaVantageIntraday,
    /// Finnhub `/stock/candle`: last two candles are current and previous.
    FinnhubCandles,
}

impl QuoteShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FinnhubQuote => "finnhub_quote",
            Self::AlphaVantageGlobalQuote => "alphavantage_global_quote",
            Self::AlphaVantageIntraday => "alphavantage_intraday",
            Self::FinnhubCandles => "finnhub_candles",
        }
    }
}

impl Display for QuoteShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response shapes a chart series can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesShape {
    /// Object keyed by timestamp label, newest first upstream.
    AlphaVantageIntraday,
    /// Parallel `t` / `c` arrays, already chronological.
    FinnhubCandles,
}

impl SeriesShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlphaVantageIntraday => "alphavantage_intraday",
            Self::FinnhubCandles => "finnhub_candles",
        }
    }
}

impl Display for SeriesShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded quote response tagged with its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub shape: QuoteShape,
    pub body: Value,
}

impl RawQuote {
    pub fn new(shape: QuoteShape, body: Value) -> Self {
        Self { shape, body }
    }
}

/// Decoded chart-series response tagged with its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub shape: SeriesShape,
    pub body: Value,
}

impl RawSeries {
    pub fn new(shape: SeriesShape, body: Value) -> Self {
        Self { shape, body }
    }
}

/// Decoded company profile (Finnhub `/stock/profile2`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfile {
    pub body: Value,
}

impl RawProfile {
    pub fn new(body: Value) -> Self {
        Self { body }
    }
}

/// One sample of a provider series before price parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeriesPoint<'a> {
    pub at: PrimitiveDateTime,
    pub label: String,
    pub close: &'a Value,
    pub volume: Option<&'a Value>,
}

/// A JSON number that is finite. Text is rejected.
pub fn json_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|number| number.is_finite())
}

/// A finite number given either as a JSON number or numeric text.
/// A trailing `%` is ignored so `"1.2300%"` reads as `1.23`.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(_) => json_number(value),
        Value::String(text) => text
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite()),
        _ => None,
    }
}

/// A non-negative share count from a number or numeric text.
pub fn volume(value: &Value) -> Option<u64> {
    if let Some(count) = value.as_u64() {
        return Some(count);
    }
    numeric(value)
        .filter(|count| *count >= 0.0)
        .map(|count| count.trunc() as u64)
}

/// Finds the Alpha Vantage series object regardless of its interval suffix
/// (`Time Series (5min)`, `Time Series (Daily)`, ...).
pub fn alphavantage_series(body: &Value) -> Option<&Map<String, Value>> {
    body.as_object()?
        .iter()
        .find(|(key, _)| key.starts_with("Time Series"))
        .and_then(|(_, value)| value.as_object())
}

/// Alpha Vantage intraday samples in the order the object yields them.
/// Entries whose label is not a timestamp are skipped.
pub fn intraday_points(body: &Value) -> Vec<RawSeriesPoint<'_>> {
    let Some(series) = alphavantage_series(body) else {
        return Vec::new();
    };

    series
        .iter()
        .filter_map(|(label, sample)| {
            let at = parse_series_label(label)?;
            let close = sample.get("4. close")?;
            Some(RawSeriesPoint {
                at,
                label: label.clone(),
                close,
                volume: sample.get("5. volume"),
            })
        })
        .collect()
}

/// Finnhub candle samples paired index-wise (`t[i]` with `c[i]`).
///
/// Returns nothing unless the status field reads `"ok"`.
pub fn candle_points(body: &Value) -> Vec<RawSeriesPoint<'_>> {
    if body.get("s").and_then(Value::as_str) != Some("ok") {
        return Vec::new();
    }

    let (Some(timestamps), Some(closes)) = (
        body.get("t").and_then(Value::as_array),
        body.get("c").and_then(Value::as_array),
    ) else {
        return Vec::new();
    };
    let volumes = body.get("v").and_then(Value::as_array);

    timestamps
        .iter()
        .zip(closes)
        .enumerate()
        .filter_map(|(index, (ts, close))| {
            let at = OffsetDateTime::from_unix_timestamp(ts.as_i64()?).ok()?;
            let at = PrimitiveDateTime::new(at.date(), at.time());
            Some(RawSeriesPoint {
                at,
                label: format_day(at.date())?,
                close,
                volume: volumes.and_then(|volumes| volumes.get(index)),
            })
        })
        .collect()
}

/// Stable sort oldest to newest.
pub fn chronological(mut points: Vec<RawSeriesPoint<'_>>) -> Vec<RawSeriesPoint<'_>> {
    points.sort_by_key(|point| point.at);
    points
}

/// Parses `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM`, or `YYYY-MM-DD`.
pub fn parse_series_label(label: &str) -> Option<PrimitiveDateTime> {
    let label = label.trim();
    let with_seconds = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let with_minutes = format_description!("[year]-[month]-[day] [hour]:[minute]");
    let day_only = format_description!("[year]-[month]-[day]");

    PrimitiveDateTime::parse(label, with_seconds)
        .or_else(|_| PrimitiveDateTime::parse(label, with_minutes))
        .ok()
        .or_else(|| {
            Date::parse(label, day_only)
                .ok()
                .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        })
}

fn format_day(date: Date) -> Option<String> {
    date.format(format_description!("[year]-[month]-[day]")).ok()
}
