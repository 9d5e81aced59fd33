//! Engine inputs and outputs: thresholds, trend labels, results, rejections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The only externally supplied knob the engine gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanThresholds {
    /// Minimum latest-session volume, in lots.
    pub min_volume_lots: u64,
}

impl ScanThresholds {
    pub fn new(min_volume_lots: u64) -> Self {
        Self { min_volume_lots }
    }
}

/// Trend classification. Breakout outranks BullAligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Breakout,
    BullAligned,
    Consolidating,
}

impl TrendLabel {
    pub const ALL: [TrendLabel; 3] = [
        TrendLabel::Breakout,
        TrendLabel::BullAligned,
        TrendLabel::Consolidating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Breakout => "breakout",
            TrendLabel::BullAligned => "bull_aligned",
            TrendLabel::Consolidating => "consolidating",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown trend label '{0}' (valid: breakout, bull_aligned, consolidating)")]
pub struct ParseTrendLabelError(pub String);

impl FromStr for TrendLabel {
    type Err = ParseTrendLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "breakout" => Ok(TrendLabel::Breakout),
            "bull_aligned" | "bull" => Ok(TrendLabel::BullAligned),
            "consolidating" | "consolidation" => Ok(TrendLabel::Consolidating),
            _ => Err(ParseTrendLabelError(s.to_string())),
        }
    }
}

/// Intermediate signal values behind a classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub ma_short: f64,
    pub ma_mid: f64,
    pub ma_long: f64,
    /// Highest high of the prior window (latest bar excluded).
    pub prior_high: f64,
    /// Lowest low of the prior window (latest bar excluded).
    pub prior_low: f64,
    pub is_breakout: bool,
    pub is_bull_aligned: bool,
}

impl SignalSnapshot {
    pub fn trend_label(&self) -> TrendLabel {
        if self.is_breakout {
            TrendLabel::Breakout
        } else if self.is_bull_aligned {
            TrendLabel::BullAligned
        } else {
            TrendLabel::Consolidating
        }
    }
}

/// One accepted symbol from a scan pass. Prices are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub symbol: String,
    pub display_name: String,
    pub current_price: f64,
    pub short_term_target: f64,
    pub long_term_target: f64,
    pub today_volume_lots: u64,
    pub trend_label: TrendLabel,
    pub signals: SignalSnapshot,
}

impl EvaluationResult {
    /// Long-term upside in percent. Derived for ranking; not stored.
    pub fn expected_upside_pct(&self) -> f64 {
        (self.long_term_target / self.current_price - 1.0) * 100.0
    }

    /// Symbol without its exchange suffix (`2330.TW` → `2330`).
    pub fn code(&self) -> &str {
        self.symbol
            .split_once('.')
            .map(|(code, _)| code)
            .unwrap_or(&self.symbol)
    }
}

/// Why a symbol was excluded by the engine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    #[error("insufficient history: {bars} bars, {required} required")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("below liquidity threshold: {lots} lots < {min_lots}")]
    BelowLiquidityThreshold { lots: u64, min_lots: u64 },
}
