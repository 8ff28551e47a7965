//! # Batch Fetch Orchestrator
//!
//! One quote fetch per tracked symbol, all in flight at once on the calling
//! task. Every symbol succeeds or fails alone; the batch always completes
//! with whatever survived.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use futures::future::join_all;

use crate::data_source::{DataSource, SourceError};
use crate::normalize::{apply_profile, normalize};
use crate::{QuoteRecord, Symbol, TrackedSymbol, UtcDateTime};

/// Why a symbol is missing from a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The request failed or the body was not JSON.
    Transport(SourceError),
    /// The payload decoded but carried no usable quote.
    Unusable,
}

impl FailureReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Unusable => "unusable",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(error) => write!(f, "transport: {error}"),
            Self::Unusable => f.write_str("unusable payload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub symbol: Symbol,
    pub reason: FailureReason,
}

/// Result of one fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Surviving records in watchlist order, one per symbol.
    pub records: Vec<QuoteRecord>,
    pub failures: Vec<FetchFailure>,
    pub fetched_at: UtcDateTime,
}

impl BatchOutcome {
    /// Nothing survived; the dashboard shows its error notice.
    pub fn all_failed(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fans quote fetches out over one [`DataSource`].
#[derive(Clone)]
pub struct BatchFetcher {
    source: Arc<dyn DataSource>,
    enrich_profiles: bool,
}

impl BatchFetcher {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            enrich_profiles: false,
        }
    }

    /// Also fetch company profiles for name and market cap. Ignored when the
    /// source has no profile endpoint.
    pub fn with_profile_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_profiles = enabled;
        self
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub async fn fetch_all(&self, watchlist: &[TrackedSymbol]) -> BatchOutcome {
        let tracked = dedupe(watchlist);
        let results = join_all(tracked.iter().map(|entry| self.fetch_one(entry))).await;

        let mut records = Vec::with_capacity(tracked.len());
        let mut failures = Vec::new();
        for (entry, result) in tracked.iter().zip(results) {
            match result {
                Ok(record) => records.push(record),
                Err(reason) => {
                    tracing::debug!(
                        provider = %self.source.id(),
                        symbol = %entry.symbol,
                        reason = reason.as_str(),
                        detail = %reason,
                        "dropping symbol from batch"
                    );
                    failures.push(FetchFailure {
                        symbol: entry.symbol.clone(),
                        reason,
                    });
                }
            }
        }

        let outcome = BatchOutcome {
            records,
            failures,
            fetched_at: UtcDateTime::now(),
        };

        if outcome.all_failed() {
            tracing::warn!(
                provider = %self.source.id(),
                requested = tracked.len(),
                "every symbol in the batch failed"
            );
        } else {
            tracing::info!(
                provider = %self.source.id(),
                requested = tracked.len(),
                loaded = outcome.records.len(),
                dropped = outcome.failures.len(),
                "batch fetched"
            );
        }

        outcome
    }

    async fn fetch_one(&self, tracked: &TrackedSymbol) -> Result<QuoteRecord, FailureReason> {
        let raw = self
            .source
            .quote(&tracked.symbol)
            .await
            .map_err(FailureReason::Transport)?;
        let record = normalize(tracked, &raw).ok_or(FailureReason::Unusable)?;

        if !self.enrich_profiles || !self.source.capabilities().profile {
            return Ok(record);
        }

        match self.source.profile(&tracked.symbol).await {
            Ok(profile) => Ok(apply_profile(record, &profile)),
            Err(error) => {
                tracing::debug!(
                    symbol = %tracked.symbol,
                    error = %error,
                    "profile unavailable, keeping quote"
                );
                Ok(record)
            }
        }
    }
}

/// Drops repeated symbols; the first occurrence wins.
pub fn dedupe(watchlist: &[TrackedSymbol]) -> Vec<TrackedSymbol> {
    let mut seen = HashSet::with_capacity(watchlist.len());
    watchlist
        .iter()
        .filter(|entry| seen.insert(entry.symbol.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{CapabilitySet, SourceFuture};
    use crate::payload::{QuoteShape, RawProfile, RawQuote, RawSeries};
    use crate::ProviderId;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    /// Canned per-symbol answers; symbols without one fail as unavailable.
    #[derive(Default)]
    struct ScriptedSource {
        quotes: HashMap<String, Value>,
        profiles: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn quote(mut self, symbol: &str, body: Value) -> Self {
            self.quotes.insert(symbol.to_owned(), body);
            self
        }

        fn profile(mut self, symbol: &str, body: Value) -> Self {
            self.profiles.insert(symbol.to_owned(), body);
            self
        }
    }

    impl DataSource for ScriptedSource {
        fn id(&self) -> ProviderId {
            ProviderId::Finnhub
        }

        fn capabilities(&self) -> CapabilitySet {
            CapabilitySet::new(true, false, true)
        }

        fn quote<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawQuote> {
            self.calls
                .lock()
                .expect("call log should not be poisoned")
                .push(symbol.to_string());
            let body = self.quotes.get(symbol.as_str()).cloned();
            Box::pin(async move {
                body.map(|body| RawQuote::new(QuoteShape::FinnhubQuote, body))
                    .ok_or_else(|| SourceError::unavailable("finnhub returned status 500"))
            })
        }

        fn series<'a>(&'a self, _symbol: &'a Symbol) -> SourceFuture<'a, RawSeries> {
            Box::pin(async move { Err(SourceError::unavailable("no series")) })
        }

        fn profile<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, RawProfile> {
            let body = self.profiles.get(symbol.as_str()).cloned();
            Box::pin(async move {
                body.map(RawProfile::new)
                    .ok_or_else(|| SourceError::unavailable("finnhub returned status 403"))
            })
        }
    }

    fn tracked(symbol: &str, name: &str) -> TrackedSymbol {
        TrackedSymbol::new(Symbol::parse(symbol).expect("valid symbol"), name)
    }

    fn symbols(outcome: &BatchOutcome) -> Vec<&str> {
        outcome
            .records
            .iter()
            .map(|record| record.symbol.as_str())
            .collect()
    }

    #[test]
    fn one_failing_symbol_does_not_abort_the_batch() {
        let source = ScriptedSource::default()
            .quote("AAPL", json!({ "c": 175.43, "d": 2.15, "dp": 1.24, "pc": 173.28 }))
            .quote("TSLA", json!({ "c": 248.5, "d": -8.75, "dp": -3.4, "pc": 257.25 }));
        let fetcher = BatchFetcher::new(Arc::new(source));
        let watchlist = vec![
            tracked("AAPL", "Apple Inc."),
            tracked("MSFT", "Microsoft Corporation"),
            tracked("TSLA", "Tesla Inc."),
        ];

        let outcome = block_on(fetcher.fetch_all(&watchlist));

        assert_eq!(symbols(&outcome), vec!["AAPL", "TSLA"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].symbol.as_str(), "MSFT");
        assert!(matches!(
            outcome.failures[0].reason,
            FailureReason::Transport(_)
        ));
        assert!(!outcome.all_failed());
    }

    #[test]
    fn unusable_payloads_are_classified_separately() {
        let source = ScriptedSource::default().quote("AAPL", json!({ "error": "no access" }));
        let fetcher = BatchFetcher::new(Arc::new(source));

        let outcome = block_on(fetcher.fetch_all(&[tracked("AAPL", "Apple Inc.")]));

        assert!(outcome.all_failed());
        assert_eq!(outcome.failures[0].reason, FailureReason::Unusable);
    }

    #[test]
    fn duplicate_symbols_are_fetched_once() {
        let source = Arc::new(
            ScriptedSource::default()
                .quote("AAPL", json!({ "c": 175.43, "d": 2.15, "dp": 1.24 })),
        );
        let fetcher = BatchFetcher::new(source.clone());
        let watchlist = vec![tracked("AAPL", "Apple Inc."), tracked("AAPL", "Apple again")];

        let outcome = block_on(fetcher.fetch_all(&watchlist));

        assert_eq!(symbols(&outcome), vec!["AAPL"]);
        assert_eq!(outcome.records[0].name, "Apple Inc.");
        assert_eq!(
            source
                .calls
                .lock()
                .expect("call log should not be poisoned")
                .len(),
            1
        );
    }

    #[test]
    fn profile_enrichment_fills_name_and_market_cap() {
        let source = ScriptedSource::default()
            .quote("AAPL", json!({ "c": 175.43, "d": 2.15, "dp": 1.24 }))
            .profile(
                "AAPL",
                json!({ "name": "Apple Inc", "marketCapitalization": 2_700_000.0 }),
            );
        let fetcher = BatchFetcher::new(Arc::new(source)).with_profile_enrichment(true);

        let outcome = block_on(fetcher.fetch_all(&[tracked("AAPL", "Apple Inc.")]));

        let record = &outcome.records[0];
        assert_eq!(record.name, "Apple Inc");
        assert_eq!(record.market_cap, Some(2.7e12));
    }

    #[test]
    fn profile_failure_keeps_the_quote() {
        let source = ScriptedSource::default()
            .quote("MSFT", json!({ "c": 402.56, "d": -1.0, "dp": -0.25 }));
        let fetcher = BatchFetcher::new(Arc::new(source)).with_profile_enrichment(true);

        let outcome = block_on(fetcher.fetch_all(&[tracked("MSFT", "Microsoft Corporation")]));

        assert_eq!(symbols(&outcome), vec!["MSFT"]);
        assert_eq!(outcome.records[0].market_cap, None);
        assert!(outcome.failures.is_empty());
    }

    fn block_on<F>(future: F) -> F::Output
    where
        F: Future,
    {
        let waker = noop_waker();
        let mut context = Context::from_waker(&waker);
        let mut future = std::pin::pin!(future);

        loop {
            match future.as_mut().poll(&mut context) {
                Poll::Ready(output) => return output,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn noop_waker() -> Waker {
        // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
        unsafe { Waker::from_raw(noop_raw_waker()) }
    }

    fn noop_raw_waker() -> RawWaker {
        RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
    }

    unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
        noop_raw_waker()
    }

    unsafe fn noop_raw_waker_wake(_: *const ()) {}

    unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

    unsafe fn noop_raw_waker_drop(_: *const ()) {}

    static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
        noop_raw_waker_clone,
        noop_raw_waker_wake,
        noop_raw_waker_wake_by_ref,
        noop_raw_waker_drop,
    );
}
