use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::payload::{QuoteShape, SeriesShape};
use crate::ValidationError;

/// Upstream market-data providers the dashboard can read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Finnhub,
    Alphavantage,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::Finnhub, Self::Alphavantage];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finnhub => "finnhub",
            Self::Alphavantage => "alphavantage",
        }
    }

    /// Shape of this provider's default quote response.
    pub const fn quote_shape(self) -> QuoteShape {
        match self {
            Self::Finnhub => QuoteShape::FinnhubQuote,
            Self::Alphavantage => QuoteShape::AlphaVantageGlobalQuote,
        }
    }

    /// Shape of this provider's chart-series response.
    pub const fn series_shape(self) -> SeriesShape {
        match self {
            Self::Finnhub => SeriesShape::FinnhubCandles,
            Self::Alphavantage => SeriesShape::AlphaVantageIntraday,
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "finnhub" => Ok(Self::Finnhub),
            "alphavantage" | "alpha_vantage" => Ok(Self::Alphavantage),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}
