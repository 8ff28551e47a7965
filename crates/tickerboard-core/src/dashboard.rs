//! # Dashboard State
//!
//! [`Dashboard`] is the single state object behind the table and the chart:
//! the current batch, the user's [`ViewState`], load status, chart state, and
//! the generation counters that fence overlapping requests.
//!
//! Transitions are synchronous. Network work happens between a `begin_*` and
//! its matching `complete_*`, normally driven by [`DashboardController`].
//!
//! | Entry point | Re-runs |
//! |-------------|---------|
//! | [`Dashboard::toggle_sort`] / [`Dashboard::set_filter`] | derive |
//! | [`Dashboard::select_symbol`] | chart |
//! | [`DashboardController::refresh`] | fetch, normalize, derive |

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::batch::{dedupe, BatchFetcher, BatchOutcome};
use crate::chart::build_series;
use crate::data_source::SourceError;
use crate::view::{derive, DerivedView, MarketSummary, SortKey, ViewState};
use crate::{ChartPoint, QuoteRecord, Symbol, TrackedSymbol, UtcDateTime, ValidationError};

/// Notice shown when a refresh produced no records at all.
pub const FETCH_ERROR_NOTICE: &str = "failed to fetch data, try again";

/// How results of overlapping requests are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FencingMode {
    /// Results from a request older than the latest one begun are discarded.
    #[default]
    Fenced,
    /// Whichever result arrives last is shown, even if it is older.
    LastResolvedWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The last applied refresh produced no records.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Handle for one outstanding refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Handle for one outstanding chart load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTicket {
    generation: u64,
    symbol: Symbol,
}

impl ChartTicket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ChartState {
    status: ChartStatus,
    points: Vec<ChartPoint>,
    error: Option<String>,
}

/// Table panel render model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TablePanel {
    /// A refresh is outstanding; one placeholder row per tracked symbol.
    Loading { placeholder_rows: usize },
    Ready {
        rows: Vec<QuoteRecord>,
        summary: MarketSummary,
        /// The batch is non-empty but the filter matched nothing.
        no_matches: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub symbol: Symbol,
    pub status: ChartStatus,
    pub points: Vec<ChartPoint>,
    pub error: Option<String>,
}

/// Everything a renderer needs, computed from the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub status: LoadStatus,
    pub table: TablePanel,
    pub error: Option<&'static str>,
    pub view_state: ViewState,
    pub fetched_at: Option<UtcDateTime>,
    /// Symbols missing from the last applied batch.
    pub dropped: Vec<Symbol>,
    pub chart: ChartPanel,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    watchlist: Vec<TrackedSymbol>,
    view: ViewState,
    fencing: FencingMode,
    status: LoadStatus,
    records: Vec<QuoteRecord>,
    dropped: Vec<Symbol>,
    fetched_at: Option<UtcDateTime>,
    refresh_generation: u64,
    chart: ChartState,
    chart_generation: u64,
}

impl Dashboard {
    /// Repeated symbols are dropped; the first entry becomes the selection.
    pub fn new(watchlist: &[TrackedSymbol]) -> Result<Self, ValidationError> {
        let watchlist = dedupe(watchlist);
        let selected = watchlist
            .first()
            .map(|entry| entry.symbol.clone())
            .ok_or(ValidationError::EmptyWatchlist)?;

        Ok(Self {
            watchlist,
            view: ViewState::new(selected),
            fencing: FencingMode::default(),
            status: LoadStatus::Idle,
            records: Vec::new(),
            dropped: Vec::new(),
            fetched_at: None,
            refresh_generation: 0,
            chart: ChartState::default(),
            chart_generation: 0,
        })
    }

    pub fn with_fencing(mut self, fencing: FencingMode) -> Self {
        self.fencing = fencing;
        self
    }

    pub fn watchlist(&self) -> &[TrackedSymbol] {
        &self.watchlist
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub const fn fencing(&self) -> FencingMode {
        self.fencing
    }

    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn chart_points(&self) -> &[ChartPoint] {
        &self.chart.points
    }

    pub fn chart_error(&self) -> Option<&str> {
        self.chart.error.as_deref()
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.view.sort = self.view.sort.toggled(key);
    }

    pub fn set_filter(&mut self, term: impl Into<String>) {
        self.view.filter_term = term.into();
    }

    /// Returns `true` when the selection changed, which also clears the
    /// chart panel and supersedes any chart load still in flight.
    pub fn select_symbol(&mut self, symbol: &Symbol) -> Result<bool, ValidationError> {
        if !self.watchlist.iter().any(|entry| &entry.symbol == symbol) {
            return Err(ValidationError::UntrackedSymbol {
                symbol: symbol.to_string(),
            });
        }
        if &self.view.selected_symbol == symbol {
            return Ok(false);
        }

        self.view.selected_symbol = symbol.clone();
        self.chart = ChartState::default();
        self.chart_generation += 1;
        Ok(true)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.refresh_generation += 1;
        self.status = LoadStatus::Loading;
        RefreshTicket {
            generation: self.refresh_generation,
        }
    }

    /// Applies `outcome` unless it is stale under [`FencingMode::Fenced`].
    ///
    /// A batch with records replaces the previous one outright. A batch with
    /// none keeps the last good records on screen and raises the error
    /// notice.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, outcome: BatchOutcome) -> bool {
        if self.is_stale(ticket.generation, self.refresh_generation) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.refresh_generation,
                "discarding stale refresh"
            );
            return false;
        }

        self.dropped = outcome
            .failures
            .into_iter()
            .map(|failure| failure.symbol)
            .collect();

        if outcome.records.is_empty() {
            self.status = LoadStatus::Failed;
        } else {
            self.records = outcome.records;
            self.fetched_at = Some(outcome.fetched_at);
            self.status = LoadStatus::Loaded;
        }
        true
    }

    pub fn begin_chart(&mut self) -> ChartTicket {
        self.chart_generation += 1;
        self.chart.status = ChartStatus::Loading;
        self.chart.error = None;
        ChartTicket {
            generation: self.chart_generation,
            symbol: self.view.selected_symbol.clone(),
        }
    }

    /// An empty series is a valid, loaded chart; only a fetch error sets the
    /// chart error. The table is never touched.
    ///
    /// Under [`FencingMode::Fenced`] a ticket is stale once a newer chart
    /// load began or the selection moved to another symbol.
    pub fn complete_chart(
        &mut self,
        ticket: ChartTicket,
        result: Result<Vec<ChartPoint>, SourceError>,
    ) -> bool {
        let other_symbol = ticket.symbol != self.view.selected_symbol;
        if self.is_stale(ticket.generation, self.chart_generation)
            || (self.fencing == FencingMode::Fenced && other_symbol)
        {
            tracing::debug!(
                symbol = %ticket.symbol,
                generation = ticket.generation,
                latest = self.chart_generation,
                "discarding stale chart"
            );
            return false;
        }

        self.chart = match result {
            Ok(points) => ChartState {
                status: ChartStatus::Loaded,
                points,
                error: None,
            },
            Err(error) => {
                tracing::warn!(symbol = %ticket.symbol, error = %error, "chart fetch failed");
                ChartState {
                    status: ChartStatus::Failed,
                    points: Vec::new(),
                    error: Some(format!("failed to load chart for {}", ticket.symbol)),
                }
            }
        };
        true
    }

    /// Display list and summary for the current batch and view state.
    pub fn derived(&self) -> DerivedView {
        derive(&self.records, &self.view.filter_term, self.view.sort)
    }

    pub fn render(&self) -> DashboardView {
        let table = match self.status {
            LoadStatus::Loading => TablePanel::Loading {
                placeholder_rows: self.watchlist.len(),
            },
            LoadStatus::Idle | LoadStatus::Loaded | LoadStatus::Failed => {
                let DerivedView { rows, summary } = self.derived();
                TablePanel::Ready {
                    no_matches: rows.is_empty() && !self.records.is_empty(),
                    rows,
                    summary,
                }
            }
        };

        DashboardView {
            status: self.status,
            table,
            error: (self.status == LoadStatus::Failed).then_some(FETCH_ERROR_NOTICE),
            view_state: self.view.clone(),
            fetched_at: self.fetched_at,
            dropped: self.dropped.clone(),
            chart: ChartPanel {
                symbol: self.view.selected_symbol.clone(),
                status: self.chart.status,
                points: self.chart.points.clone(),
                error: self.chart.error.clone(),
            },
        }
    }

    fn is_stale(&self, generation: u64, latest: u64) -> bool {
        self.fencing == FencingMode::Fenced && generation < latest
    }
}

/// Drives refresh and chart cycles against a shared [`Dashboard`].
///
/// The lock is held only for state transitions, never across a fetch, so
/// user interaction stays responsive while requests are in flight.
#[derive(Clone)]
pub struct DashboardController {
    state: Arc<Mutex<Dashboard>>,
    fetcher: BatchFetcher,
}

impl DashboardController {
    pub fn new(dashboard: Dashboard, fetcher: BatchFetcher) -> Self {
        Self {
            state: Arc::new(Mutex::new(dashboard)),
            fetcher,
        }
    }

    pub fn render(&self) -> DashboardView {
        self.lock().render()
    }

    /// Fetch, normalize, and apply a new batch. Returns whether the result
    /// was applied.
    pub async fn refresh(&self) -> bool {
        let (ticket, watchlist) = {
            let mut dashboard = self.lock();
            (dashboard.begin_refresh(), dashboard.watchlist().to_vec())
        };

        let outcome = self.fetcher.fetch_all(&watchlist).await;
        self.lock().complete_refresh(ticket, outcome)
    }

    /// Load the chart for the currently selected symbol.
    pub async fn load_chart(&self) -> bool {
        let ticket = self.lock().begin_chart();

        let result = self
            .fetcher
            .source()
            .series(ticket.symbol())
            .await
            .map(|raw| build_series(&raw));
        self.lock().complete_chart(ticket, result)
    }

    pub fn toggle_sort(&self, key: SortKey) {
        self.lock().toggle_sort(key);
    }

    pub fn set_filter(&self, term: impl Into<String>) {
        self.lock().set_filter(term);
    }

    /// Select `symbol` and, if the selection changed, reload the chart.
    pub async fn select_symbol(&self, symbol: &Symbol) -> Result<bool, ValidationError> {
        let changed = self.lock().select_symbol(symbol)?;
        if changed {
            self.load_chart().await;
        }
        Ok(changed)
    }

    fn lock(&self) -> MutexGuard<'_, Dashboard> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
