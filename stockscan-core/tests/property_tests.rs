//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. History gate — any series shorter than the minimum is rejected as
//!    insufficient history, whatever its volume or fundamentals
//! 2. Liquidity gate — accepted results always meet the lot threshold
//! 3. Long-term floor — the long-term target is never below spot
//! 4. Purity — evaluating twice gives identical output
//! 5. Label precedence — breakout always wins

use chrono::NaiveDate;
use proptest::prelude::*;
use stockscan_core::domain::{
    Bar, InstrumentSeries, ReferenceData, Rejection, ScanThresholds, TrendLabel,
};
use stockscan_core::engine::ScreenEngine;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_bar_values() -> impl Strategy<Value = (f64, f64, f64, u64)> {
    // (close, up-wick, down-wick, volume in shares)
    (
        (1.0..2000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0),
        0.0..0.05_f64,
        0.0..0.05_f64,
        0u64..80_000_000,
    )
}

fn build_series(values: &[(f64, f64, f64, u64)]) -> InstrumentSeries {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = values
        .iter()
        .enumerate()
        .map(|(i, &(close, up, down, volume))| Bar {
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close * (1.0 + up),
            low: close * (1.0 - down),
            close,
            volume,
        })
        .collect();
    InstrumentSeries::new("PROP", bars).unwrap()
}

fn arb_series(len: std::ops::Range<usize>) -> impl Strategy<Value = InstrumentSeries> {
    prop::collection::vec(arb_bar_values(), len).prop_map(|v| build_series(&v))
}

fn arb_reference() -> impl Strategy<Value = ReferenceData> {
    (
        prop::option::of(-10.0..60.0_f64),
        prop::option::of(0.5..80.0_f64),
    )
        .prop_map(|(eps, pe)| ReferenceData {
            symbol: "PROP".into(),
            display_name: None,
            trailing_eps: eps,
            forward_pe: pe,
        })
}

proptest! {
    #[test]
    fn short_series_always_insufficient(
        series in arb_series(0..60),
        reference in arb_reference(),
        min_lots in 0u64..100_000,
    ) {
        let engine = ScreenEngine::default();
        let result = engine.evaluate(&series, &reference, &ScanThresholds::new(min_lots));
        prop_assert_eq!(
            result,
            Err(Rejection::InsufficientHistory { bars: series.len(), required: 60 })
        );
    }

    #[test]
    fn accepted_results_meet_liquidity_threshold(
        series in arb_series(60..120),
        reference in arb_reference(),
        min_lots in 0u64..80_000,
    ) {
        let engine = ScreenEngine::default();
        match engine.evaluate(&series, &reference, &ScanThresholds::new(min_lots)) {
            Ok(result) => prop_assert!(result.today_volume_lots >= min_lots),
            Err(Rejection::BelowLiquidityThreshold { lots, min_lots: min }) => {
                prop_assert!(lots < min);
                prop_assert_eq!(lots, series.latest().unwrap().volume / 1000);
            }
            Err(other) => prop_assert!(false, "unexpected rejection {other:?}"),
        }
    }

    #[test]
    fn long_term_target_never_below_spot(
        series in arb_series(60..90),
        reference in arb_reference(),
    ) {
        let engine = ScreenEngine::default();
        let result = engine.evaluate(&series, &reference, &ScanThresholds::new(0)).unwrap();
        prop_assert!(result.long_term_target >= result.current_price);
    }

    #[test]
    fn evaluation_is_idempotent(
        series in arb_series(55..90),
        reference in arb_reference(),
        min_lots in 0u64..50_000,
    ) {
        let engine = ScreenEngine::default();
        let thresholds = ScanThresholds::new(min_lots);
        let first = engine.evaluate(&series, &reference, &thresholds);
        let second = engine.evaluate(&series, &reference, &thresholds);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn breakout_flag_decides_label(
        series in arb_series(60..90),
        reference in arb_reference(),
    ) {
        let engine = ScreenEngine::default();
        let result = engine.evaluate(&series, &reference, &ScanThresholds::new(0)).unwrap();
        let expected = if result.signals.is_breakout {
            TrendLabel::Breakout
        } else if result.signals.is_bull_aligned {
            TrendLabel::BullAligned
        } else {
            TrendLabel::Consolidating
        };
        prop_assert_eq!(result.trend_label, expected);
        prop_assert_eq!(
            result.signals.is_breakout,
            result.current_price > result.signals.prior_high
        );
    }

    #[test]
    fn short_term_target_is_measured_move(
        series in arb_series(60..90),
    ) {
        let engine = ScreenEngine::default();
        let result = engine
            .evaluate(&series, &ReferenceData::bare("PROP"), &ScanThresholds::new(0))
            .unwrap();
        let expected = 2.0 * result.current_price - result.signals.prior_low;
        prop_assert!((result.short_term_target - expected).abs() < 1e-9);
    }
}
