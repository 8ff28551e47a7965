//! Contract tests for the normalizer and the chart builder across every
//! provider response shape.

use serde_json::{json, Value};

use tickerboard_core::{
    apply_profile, build_series, normalize, ChartPoint, QuoteShape, RawProfile, RawQuote,
    RawSeries, SeriesShape, Symbol, TrackedSymbol,
};

struct QuoteCase {
    name: &'static str,
    shape: QuoteShape,
    body: Value,
    expected_price: f64,
    expected_change: f64,
    expected_change_percent: f64,
    expected_volume: u64,
}

fn apple() -> TrackedSymbol {
    TrackedSymbol::new(Symbol::parse("AAPL").expect("valid symbol"), "Apple Inc.")
}

fn usable_cases() -> Vec<QuoteCase> {
    vec![
        QuoteCase {
            name: "finnhub quote",
            shape: QuoteShape::FinnhubQuote,
            body: json!({ "c": 175.43, "d": 2.15, "dp": 1.2408, "h": 176.1, "pc": 173.28, "t": 1704412800 }),
            expected_price: 175.43,
            expected_change: 2.15,
            expected_change_percent: 1.2408,
            expected_volume: 0,
        },
        QuoteCase {
            name: "alpha vantage global quote",
            shape: QuoteShape::AlphaVantageGlobalQuote,
            body: json!({
                "Global Quote": {
                    "01. symbol": "AAPL",
                    "05. price": "175.4300",
                    "06. volume": "52164535",
                    "08. previous close": "173.2800",
                    "09. change": "2.1500",
                    "10. change percent": "1.2408%"
                }
            }),
            expected_price: 175.43,
            expected_change: 2.15,
            expected_change_percent: 1.2408,
            expected_volume: 52_164_535,
        },
        QuoteCase {
            name: "alpha vantage intraday",
            shape: QuoteShape::AlphaVantageIntraday,
            body: json!({
                "Time Series (5min)": {
                    "2024-01-05 16:00:00": { "4. close": "110.00", "5. volume": "1500" },
                    "2024-01-05 15:55:00": { "4. close": "100.00", "5. volume": "900" },
                    "2024-01-05 15:50:00": { "4. close": "95.00", "5. volume": "700" }
                }
            }),
            expected_price: 110.0,
            expected_change: 10.0,
            expected_change_percent: 10.0,
            expected_volume: 1_500,
        },
        QuoteCase {
            name: "finnhub candles",
            shape: QuoteShape::FinnhubCandles,
            body: json!({
                "s": "ok",
                "t": [1704153600, 1704240000, 1704326400],
                "c": [185.64, 184.25, 181.91],
                "v": [82488700, 58414500, 71983600]
            }),
            expected_price: 181.91,
            expected_change: 181.91 - 184.25,
            expected_change_percent: (181.91 - 184.25) / 184.25 * 100.0,
            expected_volume: 71_983_600,
        },
    ]
}

#[test]
fn every_shape_normalizes_to_the_same_record_contract() {
    for case in usable_cases() {
        let raw = RawQuote::new(case.shape, case.body);
        let record = normalize(&apple(), &raw)
            .unwrap_or_else(|| panic!("{}: payload should be usable", case.name));

        assert_eq!(record.symbol.as_str(), "AAPL", "{}: symbol", case.name);
        assert_eq!(record.name, "Apple Inc.", "{}: name", case.name);
        assert!(
            (record.price - case.expected_price).abs() < 1e-9,
            "{}: price {}",
            case.name,
            record.price
        );
        assert!(
            (record.change - case.expected_change).abs() < 1e-9,
            "{}: change {}",
            case.name,
            record.change
        );
        assert!(
            (record.change_percent - case.expected_change_percent).abs() < 1e-9,
            "{}: change percent {}",
            case.name,
            record.change_percent
        );
        assert_eq!(record.volume, case.expected_volume, "{}: volume", case.name);
        assert_eq!(record.market_cap, None, "{}: market cap", case.name);
    }
}

#[test]
fn payloads_without_a_numeric_price_are_absent() {
    let cases = vec![
        ("finnhub error", QuoteShape::FinnhubQuote, json!({ "error": "Invalid API key" })),
        (
            "finnhub text price",
            QuoteShape::FinnhubQuote,
            json!({ "c": "abc", "d": 1.0, "dp": 1.0 }),
        ),
        (
            "finnhub unknown ticker",
            QuoteShape::FinnhubQuote,
            json!({ "c": 0, "d": null, "dp": null, "pc": 0 }),
        ),
        (
            "alpha vantage empty quote",
            QuoteShape::AlphaVantageGlobalQuote,
            json!({ "Global Quote": {} }),
        ),
        (
            "alpha vantage rate limit",
            QuoteShape::AlphaVantageGlobalQuote,
            json!({ "Note": "Thank you for using Alpha Vantage!" }),
        ),
        (
            "alpha vantage invalid call",
            QuoteShape::AlphaVantageIntraday,
            json!({ "Error Message": "Invalid API call." }),
        ),
        (
            "single intraday sample",
            QuoteShape::AlphaVantageIntraday,
            json!({ "Time Series (5min)": { "2024-01-05 16:00:00": { "4. close": "110.00" } } }),
        ),
        ("candles no data", QuoteShape::FinnhubCandles, json!({ "s": "no_data" })),
        ("not an object", QuoteShape::FinnhubQuote, json!([1, 2, 3])),
    ];

    for (name, shape, body) in cases {
        assert_eq!(
            normalize(&apple(), &RawQuote::new(shape, body)),
            None,
            "{name}: payload should be unusable"
        );
    }
}

#[test]
fn blank_name_hint_falls_back_to_symbol() {
    let tracked = TrackedSymbol::bare(Symbol::parse("NFLX").expect("valid symbol"));
    let raw = RawQuote::new(
        QuoteShape::FinnhubQuote,
        json!({ "c": 610.0, "d": 0.0, "dp": 0.0 }),
    );

    let record = normalize(&tracked, &raw).expect("usable payload");
    assert_eq!(record.name, "NFLX");
}

#[test]
fn profile_overlay_ignores_missing_and_invalid_fields() {
    let record = normalize(
        &apple(),
        &RawQuote::new(QuoteShape::FinnhubQuote, json!({ "c": 1.0, "d": 0.1, "dp": 11.1 })),
    )
    .expect("usable payload");

    let empty = apply_profile(record.clone(), &RawProfile::new(json!({})));
    assert_eq!(empty, record);

    let negative = apply_profile(
        record.clone(),
        &RawProfile::new(json!({ "name": "  ", "marketCapitalization": -5.0 })),
    );
    assert_eq!(negative.name, "Apple Inc.");
    assert_eq!(negative.market_cap, None);

    let zero = apply_profile(record, &RawProfile::new(json!({ "marketCapitalization": 0 })));
    assert_eq!(zero.market_cap, Some(0.0));
}

#[test]
fn series_shapes_build_oldest_first_points() {
    let intraday = RawSeries::new(
        SeriesShape::AlphaVantageIntraday,
        json!({
            "Meta Data": { "2. Symbol": "AAPL" },
            "Time Series (5min)": {
                "2024-01-05 16:00:00": { "4. close": "181.18" },
                "2024-01-05 09:35:00": { "4. close": "180.10" },
                "2024-01-04 16:00:00": { "4. close": "181.91" }
            }
        }),
    );
    assert_eq!(
        build_series(&intraday),
        vec![
            ChartPoint::new("2024-01-04 16:00:00", 181.91),
            ChartPoint::new("2024-01-05 09:35:00", 180.10),
            ChartPoint::new("2024-01-05 16:00:00", 181.18),
        ]
    );

    let candles = RawSeries::new(
        SeriesShape::FinnhubCandles,
        json!({
            "s": "ok",
            "t": [1704153600, 1704240000, "bad", 1704412800],
            "c": [185.64, 184.25, 183.0, null]
        }),
    );
    assert_eq!(
        build_series(&candles),
        vec![
            ChartPoint::new("2024-01-02", 185.64),
            ChartPoint::new("2024-01-03", 184.25),
        ]
    );
}

#[test]
fn series_error_statuses_are_empty_not_errors() {
    let bodies = vec![
        RawSeries::new(SeriesShape::FinnhubCandles, json!({ "s": "no_data" })),
        RawSeries::new(SeriesShape::FinnhubCandles, json!({})),
        RawSeries::new(
            SeriesShape::AlphaVantageIntraday,
            json!({ "Information": "The **demo** API key is for demo purposes only." }),
        ),
        RawSeries::new(SeriesShape::AlphaVantageIntraday, json!(null)),
    ];

    for raw in bodies {
        assert!(build_series(&raw).is_empty(), "{:?}", raw.body);
    }
}
