//! # Domain Models
//!
//! Canonical types shared by the normalizer, the view-state engine and the
//! chart builder.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercase ticker |
//! | [`QuoteRecord`] | Provider-independent quote row |
//! | [`ChartPoint`] | One `(label, price)` sample, oldest first in a series |
//! | [`TrackedSymbol`] | Watchlist entry with a display-name hint |
//! | [`UtcDateTime`] | RFC3339 UTC instant (batch fetch time) |
//!
//! `QuoteRecord::market_cap` is `None` when the provider does not report it.
//! Aggregates treat `None` as unknown, never as zero.

mod record;
mod symbol;
mod timestamp;

pub use record::{default_watchlist, ChartPoint, QuoteRecord, TrackedSymbol};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
