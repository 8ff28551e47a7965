//! # Tickerboard Core
//!
//! Quote normalization and view-state derivation for a stock-ticker
//! dashboard.
//!
//! ## Overview
//!
//! Two providers answer in different shapes: Finnhub with flat numeric
//! snapshots and daily candles, Alpha Vantage with text-encoded global quotes
//! and timestamp-keyed intraday series. This crate reconciles them into one
//! [`QuoteRecord`] and computes everything the table and chart render from.
//!
//! - **Normalizer**: one raw response in, a [`QuoteRecord`] or nothing out
//! - **Batch orchestrator**: one concurrent fetch per symbol, failures isolated
//! - **View-state engine**: filter, stable sort, and market summary
//! - **Chart builder**: `(label, price)` points, oldest first
//! - **Dashboard**: explicit state object with fenced refresh and chart cycles
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Finnhub and Alpha Vantage adapters |
//! | [`batch`] | Concurrent per-symbol fetch and classification of failures |
//! | [`chart`] | Chart series builder |
//! | [`config`] | Env-driven dashboard configuration |
//! | [`dashboard`] | Dashboard state, render model, and async controller |
//! | [`data_source`] | Adapter trait and structured source errors |
//! | [`domain`] | Symbol, quote record, chart point, watchlist entry |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Quote record normalizer |
//! | [`payload`] | Response-shape tags and defensive JSON readers |
//! | [`source`] | Provider identifiers |
//! | [`view`] | Filter, sort, and summary derivation |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerboard_core::{DashboardConfig, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DashboardConfig::builder().with_env().build()?;
//!     let controller = config.controller(Arc::new(ReqwestHttpClient::new()))?;
//!
//!     controller.refresh().await;
//!     let view = controller.render();
//!     println!("{}", serde_json::to_string_pretty(&view)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ DashboardController  │  refresh / load_chart / user entry points
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ BatchFetcher         │────▶│ DataSource       │──▶ HttpClient
//! └──────────┬───────────┘     │ (adapter trait)  │
//!            │                 └──────────────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ normalize            │  RawQuote ─▶ QuoteRecord | None
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ Dashboard + view     │  records + ViewState ─▶ DashboardView
//! └──────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Per-symbol failures never surface as errors; they drop the symbol and are
//! recorded as a [`FailureReason`]:
//!
//! ```rust
//! use tickerboard_core::{FailureReason, SourceErrorKind};
//!
//! fn describe(reason: &FailureReason) -> &'static str {
//!     match reason {
//!         FailureReason::Transport(error) if error.kind() == SourceErrorKind::Unavailable => {
//!             "upstream unreachable"
//!         }
//!         FailureReason::Transport(_) => "bad response",
//!         FailureReason::Unusable => "no usable quote",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from the environment and never logged
//! - Symbols are validated before they reach a URL

pub mod adapters;
pub mod batch;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod payload;
pub mod source;
pub mod view;

// Adapter implementations
pub use adapters::{AlphaVantageAdapter, AlphaVantageQuoteMode, FinnhubAdapter};

// Batch orchestration
pub use batch::{BatchFetcher, BatchOutcome, FailureReason, FetchFailure};

// Chart series
pub use chart::build_series;

// Configuration
pub use config::{DashboardConfig, DashboardConfigBuilder};

// Dashboard state
pub use dashboard::{
    ChartPanel, ChartStatus, Dashboard, DashboardController, DashboardView, FencingMode,
    LoadStatus, TablePanel, FETCH_ERROR_NOTICE,
};

// Data source trait and types
pub use data_source::{CapabilitySet, DataSource, Endpoint, SourceError, SourceErrorKind};

// Domain models
pub use domain::{default_watchlist, ChartPoint, QuoteRecord, Symbol, TrackedSymbol, UtcDateTime};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Normalizer
pub use normalize::{apply_profile, normalize};

// Payload shapes
pub use payload::{QuoteShape, RawProfile, RawQuote, RawSeries, SeriesShape};

// Source identifiers
pub use source::ProviderId;

// View-state derivation
pub use view::{
    derive, filter_records, sort_records, summarize, DerivedView, MarketSummary, SortDirection,
    SortKey, SortSpec, ViewState,
};
