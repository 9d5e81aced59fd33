//! Tunable engine parameters.
//!
//! Every window length and valuation constant the engine uses lives here. The
//! defaults are one consistent set; deployments override them through the
//! `[engine]` table of the scan config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Short moving-average window (bars).
pub const DEFAULT_MA_SHORT: usize = 5;
/// Medium moving-average window (bars).
pub const DEFAULT_MA_MID: usize = 20;
/// Long moving-average window (bars).
pub const DEFAULT_MA_LONG: usize = 60;
/// Bars in the prior range tested for a breakout (latest bar excluded).
pub const DEFAULT_BREAKOUT_LOOKBACK: usize = 20;
/// Minimum series length for evaluation.
pub const DEFAULT_MIN_HISTORY: usize = 60;
/// Shares per lot.
pub const DEFAULT_LOT_SIZE: u64 = 1000;
/// Long-term multiplier applied to spot when there is no earnings basis.
pub const DEFAULT_GROWTH_MULTIPLIER: f64 = 1.3;
/// P/E used when the provider has no forward estimate.
pub const DEFAULT_PE: f64 = 20.0;
/// Lower bound on the P/E used for valuation.
pub const DEFAULT_PE_FLOOR: f64 = 20.0;
/// Premium applied on top of EPS × P/E.
pub const DEFAULT_GROWTH_WEIGHT: f64 = 1.2;
/// Multiplier applied to spot when the valuation lands below it.
pub const DEFAULT_SENTIMENT_MULTIPLIER: f64 = 1.2;

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("moving-average windows must satisfy 1 <= short < mid < long (got {short}/{mid}/{long})")]
    MovingAverageOrder { short: usize, mid: usize, long: usize },

    #[error("breakout_lookback must be >= 1")]
    ZeroBreakoutLookback,

    #[error("min_history {min_history} is shorter than the {needed} bars the signals read")]
    HistoryTooShort { min_history: usize, needed: usize },

    #[error("lot_size must be >= 1")]
    ZeroLotSize,

    #[error("{name} must be a finite number >= {min} (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
    },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineParams {
    pub ma_short: usize,
    pub ma_mid: usize,
    pub ma_long: usize,
    pub breakout_lookback: usize,
    pub min_history: usize,
    pub lot_size: u64,
    pub growth_multiplier: f64,
    pub default_pe: f64,
    pub pe_floor: f64,
    pub growth_weight: f64,
    pub sentiment_multiplier: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            ma_short: DEFAULT_MA_SHORT,
            ma_mid: DEFAULT_MA_MID,
            ma_long: DEFAULT_MA_LONG,
            breakout_lookback: DEFAULT_BREAKOUT_LOOKBACK,
            min_history: DEFAULT_MIN_HISTORY,
            lot_size: DEFAULT_LOT_SIZE,
            growth_multiplier: DEFAULT_GROWTH_MULTIPLIER,
            default_pe: DEFAULT_PE,
            pe_floor: DEFAULT_PE_FLOOR,
            growth_weight: DEFAULT_GROWTH_WEIGHT,
            sentiment_multiplier: DEFAULT_SENTIMENT_MULTIPLIER,
        }
    }
}

impl EngineParams {
    /// Bars the signal computation actually reads.
    pub fn bars_needed(&self) -> usize {
        self.ma_long.max(self.breakout_lookback + 1)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.ma_short == 0 || self.ma_short >= self.ma_mid || self.ma_mid >= self.ma_long {
            return Err(ParamsError::MovingAverageOrder {
                short: self.ma_short,
                mid: self.ma_mid,
                long: self.ma_long,
            });
        }
        if self.breakout_lookback == 0 {
            return Err(ParamsError::ZeroBreakoutLookback);
        }
        if self.min_history < self.bars_needed() {
            return Err(ParamsError::HistoryTooShort {
                min_history: self.min_history,
                needed: self.bars_needed(),
            });
        }
        if self.lot_size == 0 {
            return Err(ParamsError::ZeroLotSize);
        }

        check_at_least("growth_multiplier", self.growth_multiplier, 1.0)?;
        check_at_least("growth_weight", self.growth_weight, 1.0)?;
        check_at_least("sentiment_multiplier", self.sentiment_multiplier, 1.0)?;
        check_positive("default_pe", self.default_pe)?;
        check_positive("pe_floor", self.pe_floor)?;
        Ok(())
    }

    /// Latest-session volume converted to whole lots (truncated).
    pub fn to_lots(&self, volume_shares: u64) -> u64 {
        volume_shares / self.lot_size
    }
}

fn check_at_least(name: &'static str, value: f64, min: f64) -> Result<(), ParamsError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ParamsError::OutOfRange { name, value, min })
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ParamsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamsError::OutOfRange {
            name,
            value,
            min: 0.0,
        })
    }
}
