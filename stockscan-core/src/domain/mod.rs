//! Domain types for StockScan

pub mod bar;
pub mod evaluation;
pub mod reference;
pub mod series;

pub use bar::Bar;
pub use evaluation::{
    EvaluationResult, ParseTrendLabelError, Rejection, ScanThresholds, SignalSnapshot, TrendLabel,
};
pub use reference::ReferenceData;
pub use series::{InstrumentSeries, SeriesError};
