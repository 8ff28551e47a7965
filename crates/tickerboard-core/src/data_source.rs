//! Provider adapter contract.
//!
//! A [`DataSource`] performs the transport half of a fetch: build the
//! provider URL, execute it, decode the body, and tag the JSON with its
//! response shape. Turning that JSON into records or chart points is left to
//! [`normalize`](crate::normalize) and [`build_series`](crate::build_series).
//!
//! | Endpoint | Method | Returns |
//! |----------|--------|---------|
//! | Quote | [`quote`](DataSource::quote) | [`RawQuote`] |
//! | Series | [`series`](DataSource::series) | [`RawSeries`] |
//! | Profile | [`profile`](DataSource::profile) | [`RawProfile`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::payload::{RawProfile, RawQuote, RawSeries};
use crate::{ProviderId, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Quote,
    Series,
    Profile,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Series => "series",
            Self::Profile => "profile",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoints a provider exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub quote: bool,
    pub series: bool,
    pub profile: bool,
}

impl CapabilitySet {
    pub const fn new(quote: bool, series: bool, profile: bool) -> Self {
        Self {
            quote,
            series,
            profile,
        }
    }

    pub const fn supports(self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Quote => self.quote,
            Endpoint::Series => self.series,
            Endpoint::Profile => self.profile,
        }
    }

    pub fn supported_endpoints(self) -> Vec<&'static str> {
        [Endpoint::Quote, Endpoint::Series, Endpoint::Profile]
            .into_iter()
            .filter(|endpoint| self.supports(*endpoint))
            .map(Endpoint::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    UnsupportedEndpoint,
    /// Transport error or non-success status.
    Unavailable,
    /// Body was not JSON.
    Decode,
}

/// Structured adapter error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unsupported_endpoint(provider: ProviderId, endpoint: Endpoint) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedEndpoint,
            message: format!("endpoint '{endpoint}' is not supported by {provider}"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Decode,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Only transport-level failures can succeed on a later attempt.
    pub const fn retryable(&self) -> bool {
        matches!(self.kind, SourceErrorKind::Unavailable)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedEndpoint => "source.unsupported_endpoint",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Decode => "source.decode",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Provider adapter contract.
///
/// Implementations must be `Send + Sync`; one adapter serves every symbol of
/// a batch concurrently.
pub trait DataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn capabilities(&self) -> CapabilitySet;

    /// Fetch the quote response for one symbol.
    fn quote<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawQuote>;

    /// Fetch the chart-series response for one symbol.
    fn series<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawSeries>;

    /// Fetch the company profile for one symbol.
    ///
    /// Providers without a profile endpoint answer
    /// [`SourceErrorKind::UnsupportedEndpoint`].
    fn profile<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawProfile>;
}
