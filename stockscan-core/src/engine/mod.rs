//! Signal & target engine.
//!
//! `evaluate` turns one symbol's bar history plus fundamentals into either an
//! [`EvaluationResult`] or a [`Rejection`]. It is a pure function of its
//! inputs: no I/O, no shared state, identical inputs give identical output.
//!
//! Gates, checked in order:
//! 1. fewer than `min_history` bars → `InsufficientHistory`
//! 2. latest volume in lots below the threshold → `BelowLiquidityThreshold`

pub mod targets;

pub use targets::{effective_pe, long_term_target, short_term_target};

use crate::domain::{
    EvaluationResult, InstrumentSeries, ReferenceData, Rejection, ScanThresholds, SignalSnapshot,
};
use crate::indicators::{Indicator, PriorRange, Sma};
use crate::params::{EngineParams, ParamsError};

/// Stateless screening engine bound to one parameter set.
#[derive(Debug, Clone)]
pub struct ScreenEngine {
    params: EngineParams,
    ma_short: Sma,
    ma_mid: Sma,
    ma_long: Sma,
    prior_high: PriorRange,
    prior_low: PriorRange,
}

impl ScreenEngine {
    pub fn new(params: EngineParams) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self::from_validated(params))
    }

    /// Caller guarantees `params` passed `validate`.
    fn from_validated(params: EngineParams) -> Self {
        Self {
            ma_short: Sma::new(params.ma_short),
            ma_mid: Sma::new(params.ma_mid),
            ma_long: Sma::new(params.ma_long),
            prior_high: PriorRange::upper(params.breakout_lookback),
            prior_low: PriorRange::lower(params.breakout_lookback),
            params,
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Compute the signal values at the latest bar.
    ///
    /// Returns `None` when the series is shorter than the signals need.
    pub fn signals(&self, series: &InstrumentSeries) -> Option<SignalSnapshot> {
        let bars = series.bars();
        if bars.len() < self.params.bars_needed() {
            return None;
        }
        let current_price = bars[bars.len() - 1].close;

        let ma_short = self.ma_short.latest(bars);
        let ma_mid = self.ma_mid.latest(bars);
        let ma_long = self.ma_long.latest(bars);
        let prior_high = self.prior_high.latest(bars);
        let prior_low = self.prior_low.latest(bars);

        Some(SignalSnapshot {
            ma_short,
            ma_mid,
            ma_long,
            prior_high,
            prior_low,
            is_breakout: current_price > prior_high,
            is_bull_aligned: ma_short > ma_mid && ma_mid > ma_long,
        })
    }

    pub fn evaluate(
        &self,
        series: &InstrumentSeries,
        reference: &ReferenceData,
        thresholds: &ScanThresholds,
    ) -> Result<EvaluationResult, Rejection> {
        let required = self.params.min_history;
        let latest = match series.latest() {
            Some(bar) if series.len() >= required => bar,
            _ => {
                return Err(Rejection::InsufficientHistory {
                    bars: series.len(),
                    required,
                })
            }
        };

        let lots = self.params.to_lots(latest.volume);
        if lots < thresholds.min_volume_lots {
            return Err(Rejection::BelowLiquidityThreshold {
                lots,
                min_lots: thresholds.min_volume_lots,
            });
        }

        // min_history >= bars_needed is enforced by EngineParams::validate
        let signals = self
            .signals(series)
            .ok_or(Rejection::InsufficientHistory {
                bars: series.len(),
                required: self.params.bars_needed(),
            })?;

        let current_price = latest.close;
        Ok(EvaluationResult {
            symbol: series.symbol().to_string(),
            display_name: reference.display_name().to_string(),
            current_price,
            short_term_target: short_term_target(current_price, signals.prior_low),
            long_term_target: long_term_target(current_price, reference, &self.params),
            today_volume_lots: lots,
            trend_label: signals.trend_label(),
            signals,
        })
    }
}

impl Default for ScreenEngine {
    fn default() -> Self {
        // Default parameters always validate.
        Self::from_validated(EngineParams::default())
    }
}

/// Evaluate one symbol with the default parameter set.
pub fn evaluate(
    series: &InstrumentSeries,
    reference: &ReferenceData,
    thresholds: &ScanThresholds,
) -> Result<EvaluationResult, Rejection> {
    ScreenEngine::default().evaluate(series, reference, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, TrendLabel};
    use crate::indicators::assert_approx;
    use chrono::NaiveDate;

    fn flat_series(n: usize, close: f64, volume: u64) -> InstrumentSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect();
        InstrumentSeries::new("2330.TW", bars).unwrap()
    }

    #[test]
    fn default_engine_matches_validated_engine() {
        let a = ScreenEngine::default();
        let b = ScreenEngine::new(EngineParams::default()).unwrap();
        assert_eq!(a.params(), b.params());

        let closes: Vec<f64> = (0..70).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0).collect();
        let series = InstrumentSeries::new("X", crate::indicators::make_bars(&closes)).unwrap();
        assert_eq!(a.signals(&series), b.signals(&series));
    }

    #[test]
    fn invalid_params_are_refused() {
        let params = EngineParams {
            min_history: 10,
            ..EngineParams::default()
        };
        assert!(ScreenEngine::new(params).is_err());
    }

    #[test]
    fn empty_series_is_insufficient() {
        let series = InstrumentSeries::new("X", Vec::new()).unwrap();
        let err = evaluate(&series, &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap_err();
        assert_eq!(err, Rejection::InsufficientHistory { bars: 0, required: 60 });
    }

    #[test]
    fn history_gate_runs_before_liquidity_gate() {
        let series = flat_series(59, 100.0, 0);
        let err = evaluate(&series, &ReferenceData::bare("X"), &ScanThresholds::new(30_000)).unwrap_err();
        assert!(matches!(err, Rejection::InsufficientHistory { bars: 59, .. }));
    }

    #[test]
    fn flat_series_is_consolidating() {
        let series = flat_series(60, 100.0, 50_000_000);
        let result = evaluate(&series, &ReferenceData::bare("2330.TW"), &ScanThresholds::new(30_000)).unwrap();
        assert_eq!(result.trend_label, TrendLabel::Consolidating);
        assert_eq!(result.today_volume_lots, 50_000);
        assert_approx(result.short_term_target, 100.0, 1e-9);
        assert_approx(result.long_term_target, 130.0, 1e-9);
        assert_eq!(result.display_name, "2330.TW");
    }

    #[test]
    fn threshold_equal_to_volume_is_accepted() {
        let series = flat_series(60, 100.0, 30_000_999);
        let result = evaluate(&series, &ReferenceData::bare("X"), &ScanThresholds::new(30_000));
        assert!(result.is_ok());
    }

    #[test]
    fn void_close_never_breaks_out() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut bars: Vec<Bar> = (0..60)
            .map(|i| Bar {
                date: base + chrono::Duration::days(i),
                open: 10.0,
                high: 10.0,
                low: 10.0,
                close: 10.0,
                volume: 5_000_000,
            })
            .collect();
        bars[59].close = f64::NAN;
        let series = InstrumentSeries::new("X", bars).unwrap();
        let result = evaluate(&series, &ReferenceData::bare("X"), &ScanThresholds::new(0)).unwrap();
        assert_eq!(result.trend_label, TrendLabel::Consolidating);
    }
}
