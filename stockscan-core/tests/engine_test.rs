//! Scenario tests for the signal & target engine.
//!
//! Each test builds an explicit bar fixture and checks one rule:
//! history gate, liquidity gate, prior-range window, label precedence and
//! the two target formulas.

use chrono::NaiveDate;
use stockscan_core::domain::{
    Bar, InstrumentSeries, ReferenceData, Rejection, ScanThresholds, TrendLabel,
};
use stockscan_core::data::{ingest, RawBar};
use stockscan_core::engine::ScreenEngine;
use stockscan_core::params::EngineParams;
use stockscan_core::evaluate;

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

const SHARES_50K_LOTS: u64 = 50_000_000;

fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

fn flat_bar(i: usize, price: f64, volume: u64) -> Bar {
    Bar {
        date: date(i),
        open: price,
        high: price,
        low: price,
        close: price,
        volume,
    }
}

fn flat_bars(n: usize, price: f64, volume: u64) -> Vec<Bar> {
    (0..n).map(|i| flat_bar(i, price, volume)).collect()
}

fn series(bars: Vec<Bar>) -> InstrumentSeries {
    InstrumentSeries::new("2330.TW", bars).unwrap()
}

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "actual={actual}, expected={expected}"
    );
}

// ──────────────────────────────────────────────
// Gates
// ──────────────────────────────────────────────

#[test]
fn short_series_is_insufficient_history() {
    for n in [0, 1, 20, 59] {
        let s = series(flat_bars(n, 100.0, SHARES_50K_LOTS));
        let err = evaluate(&s, &ReferenceData::bare("2330.TW"), &ScanThresholds::new(0)).unwrap_err();
        assert_eq!(err, Rejection::InsufficientHistory { bars: n, required: 60 });
    }
}

#[test]
fn illiquid_symbol_is_absent() {
    // 10,000 lots vs threshold 30,000
    let s = series(flat_bars(60, 100.0, 10_000_000));
    let err = evaluate(&s, &ReferenceData::bare("2330.TW"), &ScanThresholds::new(30_000)).unwrap_err();
    assert_eq!(
        err,
        Rejection::BelowLiquidityThreshold {
            lots: 10_000,
            min_lots: 30_000
        }
    );
}

#[test]
fn only_latest_volume_counts() {
    let mut bars = flat_bars(60, 100.0, 1_000);
    bars[59].volume = SHARES_50K_LOTS;
    let result = evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(30_000)).unwrap();
    assert_eq!(result.today_volume_lots, 50_000);

    let mut bars = flat_bars(60, 100.0, SHARES_50K_LOTS);
    bars[59].volume = 1_000;
    assert!(evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(30_000)).is_err());
}

// ──────────────────────────────────────────────
// Flat scenario
// ──────────────────────────────────────────────

#[test]
fn flat_series_without_earnings() {
    let s = series(flat_bars(60, 100.0, SHARES_50K_LOTS));
    let reference = ReferenceData::bare("2330.TW").with_eps(0.0);
    let result = evaluate(&s, &reference, &ScanThresholds::new(30_000)).unwrap();

    assert_eq!(result.symbol, "2330.TW");
    assert_eq!(result.today_volume_lots, 50_000);
    approx(result.current_price, 100.0);
    approx(result.short_term_target, 100.0);
    approx(result.long_term_target, 130.0);
    assert_eq!(result.trend_label, TrendLabel::Consolidating);
}

// ──────────────────────────────────────────────
// Prior range window
// ──────────────────────────────────────────────

#[test]
fn prior_high_covers_exactly_the_twenty_bars_before_latest() {
    let mut bars = flat_bars(60, 8.0, SHARES_50K_LOTS);
    // bars -21..-2 (indices 39..=58) get highs 10..=29
    for (k, idx) in (39..=58).enumerate() {
        bars[idx].high = 10.0 + k as f64;
    }
    // bar -22 is outside the window and higher than everything in it
    bars[38].high = 30.0;
    // latest bar high is below the window
    bars[59].high = 5.0;
    bars[59].low = 5.0;
    bars[59].close = 5.0;
    bars[59].open = 5.0;

    let engine = ScreenEngine::default();
    let signals = engine.signals(&series(bars)).unwrap();
    approx(signals.prior_high, 29.0);
    approx(signals.prior_low, 8.0);
    assert!(!signals.is_breakout);
}

#[test]
fn latest_bar_low_does_not_lower_the_range() {
    let mut bars = flat_bars(60, 100.0, SHARES_50K_LOTS);
    bars[59].low = 50.0;
    let result = evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap();
    approx(result.signals.prior_low, 100.0);
    approx(result.short_term_target, 100.0);
}

// ──────────────────────────────────────────────
// Breakout
// ──────────────────────────────────────────────

#[test]
fn close_above_prior_high_is_breakout() {
    let mut bars = flat_bars(60, 100.0, SHARES_50K_LOTS);
    for bar in bars.iter_mut().take(59).skip(39) {
        bar.high = 110.0;
        bar.low = 95.0;
    }
    let last = &mut bars[59];
    last.open = 112.0;
    last.high = 121.0;
    last.low = 111.0;
    last.close = 120.0;

    let result = evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(30_000)).unwrap();
    assert!(result.signals.is_breakout);
    assert_eq!(result.trend_label, TrendLabel::Breakout);
    approx(result.signals.prior_high, 110.0);
    approx(result.signals.prior_low, 95.0);
    // 120 + (120 - 95)
    approx(result.short_term_target, 145.0);
}

#[test]
fn bar_with_missing_range_is_dropped_before_evaluation() {
    let mut raw: Vec<RawBar> = (0..61)
        .map(|i| RawBar {
            date: date(i),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: SHARES_50K_LOTS,
        })
        .collect();
    // inside the last 20 sessions
    raw[50].high = f64::NAN;
    raw[50].low = f64::NAN;
    let last = &mut raw[60];
    last.open = 104.0;
    last.high = 106.0;
    last.low = 104.0;
    last.close = 105.0;

    let ingested = ingest("2330.TW", raw).unwrap();
    assert_eq!(ingested.dropped, 1);
    assert_eq!(ingested.series.len(), 60);

    let result = evaluate(
        &ingested.series,
        &ReferenceData::bare("2330.TW"),
        &ScanThresholds::new(30_000),
    )
    .unwrap();
    assert_eq!(result.trend_label, TrendLabel::Breakout);
    approx(result.signals.prior_high, 101.0);
    approx(result.signals.prior_low, 99.0);
    // 105 + (105 - 99)
    approx(result.short_term_target, 111.0);
    approx(result.long_term_target, 136.5);
    assert!(result.short_term_target.is_finite() && result.long_term_target.is_finite());
}

#[test]
fn close_equal_to_prior_high_is_not_breakout() {
    let mut bars = flat_bars(60, 100.0, SHARES_50K_LOTS);
    bars[50].high = 110.0;
    bars[59].close = 110.0;
    bars[59].high = 110.0;
    let result = evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap();
    assert!(!result.signals.is_breakout);
}

#[test]
fn breakout_takes_priority_over_bull_alignment() {
    // Steady uptrend: MA5 > MA20 > MA60, and the last close jumps above the range.
    let mut bars: Vec<Bar> = (0..60)
        .map(|i| {
            let p = 50.0 + i as f64;
            Bar {
                date: date(i),
                open: p - 0.5,
                high: p + 0.5,
                low: p - 1.0,
                close: p,
                volume: SHARES_50K_LOTS,
            }
        })
        .collect();
    bars[59].close = 130.0;
    bars[59].high = 131.0;

    let result = evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap();
    assert!(result.signals.is_bull_aligned);
    assert!(result.signals.is_breakout);
    assert_eq!(result.trend_label, TrendLabel::Breakout);
}

// ──────────────────────────────────────────────
// Bull alignment
// ──────────────────────────────────────────────

#[test]
fn ordered_averages_without_breakout_are_bull_aligned() {
    // Rising closes, but the latest close stays under the prior highs.
    let mut bars: Vec<Bar> = (0..60)
        .map(|i| {
            let p = 50.0 + i as f64;
            Bar {
                date: date(i),
                open: p,
                high: p + 10.0,
                low: p - 1.0,
                close: p,
                volume: SHARES_50K_LOTS,
            }
        })
        .collect();
    bars[59].high = 110.0;

    let result = evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap();
    assert!(!result.signals.is_breakout);
    assert!(result.signals.ma_short > result.signals.ma_mid);
    assert!(result.signals.ma_mid > result.signals.ma_long);
    assert_eq!(result.trend_label, TrendLabel::BullAligned);
}

#[test]
fn alignment_requires_the_full_chain() {
    // MA5 > MA60 but MA20 < MA60: a V-shape.
    let closes: Vec<f64> = (0..60)
        .map(|i| match i {
            0..=39 => 100.0,
            40..=54 => 80.0,
            _ => 120.0,
        })
        .collect();
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            date: date(i),
            open: c,
            high: 200.0,
            low: c,
            close: c,
            volume: SHARES_50K_LOTS,
        })
        .collect();

    let result = evaluate(&series(bars), &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap();
    assert!(result.signals.ma_short > result.signals.ma_long);
    assert!(result.signals.ma_mid < result.signals.ma_long);
    assert!(!result.signals.is_bull_aligned);
    assert_eq!(result.trend_label, TrendLabel::Consolidating);
}

// ──────────────────────────────────────────────
// Long-term target
// ──────────────────────────────────────────────

#[test]
fn earnings_valuation_uses_pe_floor() {
    // EPS 5, forward P/E 10, floor 20 → 5 × 20 × 1.2 = 120 (spot 100)
    let s = series(flat_bars(60, 100.0, SHARES_50K_LOTS));
    let reference = ReferenceData::bare("X").with_eps(5.0).with_forward_pe(10.0);
    let result = evaluate(&s, &reference, &ScanThresholds::new(0)).unwrap();
    approx(result.long_term_target, 5.0 * 20.0 * 1.2);
}

#[test]
fn stale_valuation_falls_back_to_sentiment_premium() {
    let s = series(flat_bars(60, 100.0, SHARES_50K_LOTS));
    let reference = ReferenceData::bare("X").with_eps(1.0).with_forward_pe(25.0);
    let result = evaluate(&s, &reference, &ScanThresholds::new(0)).unwrap();
    // 1 × 25 × 1.2 = 30 < 100 → 100 × 1.2
    approx(result.long_term_target, 120.0);
}

#[test]
fn custom_parameters_flow_through() {
    let params = EngineParams {
        growth_multiplier: 1.5,
        pe_floor: 35.0,
        default_pe: 35.0,
        ..EngineParams::default()
    };
    let engine = ScreenEngine::new(params).unwrap();
    let s = series(flat_bars(60, 100.0, SHARES_50K_LOTS));

    let no_eps = engine.evaluate(&s, &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap();
    approx(no_eps.long_term_target, 150.0);

    let eps = ReferenceData::bare("X").with_eps(4.0);
    let with_eps = engine.evaluate(&s, &eps, &ScanThresholds::new(0)).unwrap();
    // 4 × 35 × 1.2 = 168
    approx(with_eps.long_term_target, 168.0);
}

#[test]
fn display_name_comes_from_reference() {
    let s = series(flat_bars(60, 100.0, SHARES_50K_LOTS));
    let reference = ReferenceData::bare("2330.TW").with_name("TSMC");
    let result = evaluate(&s, &reference, &ScanThresholds::new(0)).unwrap();
    assert_eq!(result.display_name, "TSMC");
}
