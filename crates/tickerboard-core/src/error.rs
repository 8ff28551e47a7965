use thiserror::Error;

/// Validation and contract errors exposed by `tickerboard-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid provider '{value}', expected one of finnhub, alphavantage")]
    InvalidProvider { value: String },
    #[error("invalid sort key '{value}', expected one of symbol, price, change, volume")]
    InvalidSortKey { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("watchlist must contain at least one symbol")]
    EmptyWatchlist,
    #[error("symbol '{symbol}' is not on the watchlist")]
    UntrackedSymbol { symbol: String },
    #[error("invalid timeout '{value}', expected a positive number of milliseconds")]
    InvalidTimeout { value: String },
}
