//! # Derived View-State Engine
//!
//! Pure functions from a record batch plus [`ViewState`] to the table's
//! render model. Nothing here holds state between calls.
//!
//! | Function | Output |
//! |----------|--------|
//! | [`filter_records`] | Records whose symbol or name contains the term |
//! | [`sort_records`] | Stable sort by [`SortSpec`] |
//! | [`summarize`] | [`MarketSummary`] over the unfiltered batch |
//! | [`derive`] | [`DerivedView`]: display list + summary |

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{QuoteRecord, Symbol, ValidationError};

/// Column the table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Symbol,
    Price,
    Change,
    Volume,
}

impl SortKey {
    pub const ALL: [Self; 4] = [Self::Symbol, Self::Price, Self::Change, Self::Volume];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Price => "price",
            Self::Change => "change",
            Self::Volume => "volume",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "symbol" => Ok(Self::Symbol),
            "price" => Ok(Self::Price),
            "change" => Ok(Self::Change),
            "volume" => Ok(Self::Volume),
            other => Err(ValidationError::InvalidSortKey {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Column-click transition: the active key flips direction, any other
    /// key becomes active in ascending order.
    pub fn toggled(self, key: SortKey) -> Self {
        if self.key == key {
            Self::new(key, self.direction.flipped())
        } else {
            Self::new(key, SortDirection::Ascending)
        }
    }
}

/// User-controlled inputs to the derived table and chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filter_term: String,
    pub sort: SortSpec,
    pub selected_symbol: Symbol,
}

impl ViewState {
    pub fn new(selected_symbol: Symbol) -> Self {
        Self {
            filter_term: String::new(),
            sort: SortSpec::default(),
            selected_symbol,
        }
    }
}

/// Aggregate statistics over the whole batch, ignoring the filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_market_cap: f64,
    pub has_market_cap: bool,
    pub gainer_count: usize,
    pub loser_count: usize,
    pub top_gainer: Option<QuoteRecord>,
    pub top_loser: Option<QuoteRecord>,
}

impl MarketSummary {
    /// `"N/A"` unless some record reported a positive market cap.
    pub fn market_cap_label(&self) -> String {
        if self.has_market_cap {
            format_compact_usd(self.total_market_cap)
        } else {
            String::from("N/A")
        }
    }
}

/// Table render model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedView {
    pub rows: Vec<QuoteRecord>,
    pub summary: MarketSummary,
}

/// Filter, sort, and summarize in one pass over `records`.
pub fn derive(records: &[QuoteRecord], filter_term: &str, sort: SortSpec) -> DerivedView {
    let mut rows = filter_records(records, filter_term);
    sort_records(&mut rows, sort);
    DerivedView {
        rows,
        summary: summarize(records),
    }
}

/// Records whose symbol or name contains `term`, case-insensitively.
/// The term is not trimmed; an empty term keeps everything in input order.
pub fn filter_records(records: &[QuoteRecord], term: &str) -> Vec<QuoteRecord> {
    if term.is_empty() {
        return records.to_vec();
    }

    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.symbol.as_str().to_lowercase().contains(&needle)
                || record.name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Stable in-place sort; equal keys keep their relative order.
pub fn sort_records(records: &mut [QuoteRecord], sort: SortSpec) {
    records.sort_by(|left, right| {
        let ordering = compare_by_key(left, right, sort.key);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

pub fn summarize(records: &[QuoteRecord]) -> MarketSummary {
    let mut summary = MarketSummary::default();

    for record in records {
        if let Some(market_cap) = record.market_cap {
            summary.total_market_cap += market_cap;
            summary.has_market_cap |= market_cap > 0.0;
        }

        match record.change.partial_cmp(&0.0) {
            Some(Ordering::Greater) => summary.gainer_count += 1,
            Some(Ordering::Less) => summary.loser_count += 1,
            _ => {}
        }

        let replaces_gainer = summary
            .top_gainer
            .as_ref()
            .is_none_or(|top| record.change_percent > top.change_percent);
        if replaces_gainer {
            summary.top_gainer = Some(record.clone());
        }

        let replaces_loser = summary
            .top_loser
            .as_ref()
            .is_none_or(|top| record.change_percent < top.change_percent);
        if replaces_loser {
            summary.top_loser = Some(record.clone());
        }
    }

    summary
}

fn compare_by_key(left: &QuoteRecord, right: &QuoteRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Symbol => locale_compare(left.symbol.as_str(), right.symbol.as_str()),
        SortKey::Price => left.price.total_cmp(&right.price),
        SortKey::Change => left.change.total_cmp(&right.change),
        SortKey::Volume => left.volume.cmp(&right.volume),
    }
}

/// Dictionary-style comparison: case-folded first, so `"aapl"` and `"AAPL"`
/// tie and leave ordering to the stable sort.
fn locale_compare(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}

fn format_compact_usd(value: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e12, "T"), (1e9, "B"), (1e6, "M")];

    UNITS
        .iter()
        .find(|(scale, _)| value.abs() >= *scale)
        .map(|(scale, suffix)| format!("${:.2}{suffix}", value / scale))
        .unwrap_or_else(|| format!("${value:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, name: &str, price: f64, change: f64, volume: u64) -> QuoteRecord {
        let previous = price - change;
        QuoteRecord::new(
            Symbol::parse(symbol).expect("valid symbol"),
            name,
            price,
            change,
            change / previous * 100.0,
            volume,
        )
        .expect("valid record")
    }

    fn symbols(records: &[QuoteRecord]) -> Vec<&str> {
        records.iter().map(|record| record.symbol.as_str()).collect()
    }

    #[test]
    fn toggle_flips_direction_on_active_key_and_resets_on_new_key() {
        let spec = SortSpec::default();
        let flipped = spec.toggled(SortKey::Symbol);
        assert_eq!(flipped, SortSpec::new(SortKey::Symbol, SortDirection::Descending));

        let price = flipped.toggled(SortKey::Price);
        assert_eq!(price, SortSpec::new(SortKey::Price, SortDirection::Ascending));
    }

    #[test]
    fn filter_matches_symbol_or_name_without_trimming() {
        let records = vec![
            record("AAPL", "Apple Inc.", 175.43, 2.15, 10),
            record("MSFT", "Microsoft Corporation", 402.56, -1.0, 20),
        ];

        assert_eq!(symbols(&filter_records(&records, "apple")), vec!["AAPL"]);
        assert_eq!(symbols(&filter_records(&records, "ms")), vec!["MSFT"]);
        assert!(filter_records(&records, " apple").is_empty());
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let mut records = vec![
            record("NVDA", "NVIDIA", 10.0, 0.5, 5),
            record("AMZN", "Amazon", 10.0, 0.5, 5),
            record("META", "Meta", 10.0, 0.5, 5),
        ];

        sort_records(&mut records, SortSpec::new(SortKey::Price, SortDirection::Descending));
        assert_eq!(symbols(&records), vec!["NVDA", "AMZN", "META"]);
    }

    #[test]
    fn volume_sorts_numerically_not_lexically() {
        let mut records = vec![
            record("AAPL", "Apple", 1.0, 0.1, 900),
            record("MSFT", "Microsoft", 1.0, 0.1, 10_000),
            record("TSLA", "Tesla", 1.0, 0.1, 0),
        ];

        sort_records(&mut records, SortSpec::new(SortKey::Volume, SortDirection::Ascending));
        assert_eq!(symbols(&records), vec!["TSLA", "AAPL", "MSFT"]);
    }

    #[test]
    fn summary_ignores_unchanged_records_and_unknown_market_caps() {
        let records = vec![
            record("AAPL", "Apple", 175.43, 2.15, 0)
                .with_market_cap(Some(2.7e12))
                .expect("valid cap"),
            record("TSLA", "Tesla", 248.5, -8.75, 0),
            record("NFLX", "Netflix", 610.0, 0.0, 0),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.gainer_count, 1);
        assert_eq!(summary.loser_count, 1);
        assert!(summary.has_market_cap);
        assert_eq!(summary.total_market_cap, 2.7e12);
        assert_eq!(summary.market_cap_label(), "$2.70T");
        assert_eq!(
            summary.top_gainer.map(|record| record.symbol.to_string()),
            Some(String::from("AAPL"))
        );
        assert_eq!(
            summary.top_loser.map(|record| record.symbol.to_string()),
            Some(String::from("TSLA"))
        );
    }

    #[test]
    fn zero_market_caps_render_as_unknown() {
        let records = vec![record("AAPL", "Apple", 1.0, 0.0, 0)
            .with_market_cap(Some(0.0))
            .expect("valid cap")];

        let summary = summarize(&records);
        assert!(!summary.has_market_cap);
        assert_eq!(summary.market_cap_label(), "N/A");
    }

    #[test]
    fn empty_batch_has_no_top_movers() {
        let summary = summarize(&[]);
        assert_eq!(summary.top_gainer, None);
        assert_eq!(summary.top_loser, None);
        assert_eq!(summary.market_cap_label(), "N/A");
    }

    #[test]
    fn compact_usd_picks_the_largest_unit() {
        assert_eq!(format_compact_usd(456.7e9), "$456.70B");
        assert_eq!(format_compact_usd(12e6), "$12.00M");
        assert_eq!(format_compact_usd(999.0), "$999.00");
    }
}
