use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// Canonical, provider-independent quote row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub symbol: Symbol,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}

impl QuoteRecord {
    /// Builds a record, falling back to the symbol when `name` is blank.
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        price: f64,
        change: f64,
        change_percent: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        validate_finite("change", change)?;
        validate_finite("change_percent", change_percent)?;

        let name = name.into();
        let name = if name.trim().is_empty() {
            symbol.as_str().to_owned()
        } else {
            name
        };

        Ok(Self {
            symbol,
            name,
            price,
            change,
            change_percent,
            volume,
            market_cap: None,
        })
    }

    pub fn with_market_cap(mut self, market_cap: Option<f64>) -> Result<Self, ValidationError> {
        if let Some(value) = market_cap {
            validate_non_negative("market_cap", value)?;
        }
        self.market_cap = market_cap;
        Ok(self)
    }
}

/// One plot-ready sample; series are ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub price: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}

/// Watchlist entry: the symbol to fetch plus the name shown when the
/// provider does not report one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSymbol {
    pub symbol: Symbol,
    pub name: String,
}

impl TrackedSymbol {
    pub fn new(symbol: Symbol, name: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into(),
        }
    }

    /// Entry with no known name; the record name will fall back to the symbol.
    pub fn bare(symbol: Symbol) -> Self {
        Self {
            symbol,
            name: String::new(),
        }
    }
}

const DEFAULT_WATCHLIST: [(&str, &str); 8] = [
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("TSLA", "Tesla Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("META", "Meta Platforms Inc."),
    ("NFLX", "Netflix Inc."),
];

/// The symbols tracked when no watchlist is configured.
pub fn default_watchlist() -> Vec<TrackedSymbol> {
    DEFAULT_WATCHLIST
        .iter()
        .filter_map(|(symbol, name)| {
            Symbol::parse(symbol)
                .ok()
                .map(|symbol| TrackedSymbol::new(symbol, *name))
        })
        .collect()
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
