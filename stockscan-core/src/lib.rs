//! StockScan Core — domain types, indicators, the signal & target engine, data providers.
//!
//! This crate contains the per-instrument screening logic:
//! - Domain types (bars, series, fundamentals, results, rejections)
//! - Moving-average and prior-range indicators
//! - The pure `evaluate` engine: history gate, liquidity gate, trend label,
//!   short-term measured-move target, long-term valuation target
//! - Tunable engine parameters
//! - History/fundamentals provider traits with Yahoo Finance, synthetic and
//!   in-memory implementations

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod params;

pub use domain::{
    Bar, EvaluationResult, InstrumentSeries, ReferenceData, Rejection, ScanThresholds, TrendLabel,
};
pub use engine::{evaluate, ScreenEngine};
pub use params::EngineParams;
