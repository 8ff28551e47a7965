//! Chart series builder.

use crate::payload::{self, RawSeries, RawSeriesPoint};
use crate::{ChartPoint, SeriesShape};

/// Build a plot-ready series, oldest sample first.
///
/// An empty result is a valid outcome: the upstream had no data, reported an
/// error status, or no sample carried a parseable price. A sample whose
/// price or timestamp does not parse is dropped on its own.
pub fn build_series(raw: &RawSeries) -> Vec<ChartPoint> {
    let points = match raw.shape {
        SeriesShape::AlphaVantageIntraday => payload::intraday_points(&raw.body),
        SeriesShape::FinnhubCandles => payload::candle_points(&raw.body),
    };

    payload::chronological(points)
        .into_iter()
        .filter_map(into_chart_point)
        .collect()
}

fn into_chart_point(point: RawSeriesPoint<'_>) -> Option<ChartPoint> {
    let price = payload::numeric(point.close).filter(|price| *price >= 0.0)?;
    Some(ChartPoint::new(point.label, price))
}
