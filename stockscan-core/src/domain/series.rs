//! InstrumentSeries — one symbol's ordered bar history.

use super::bar::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("bar dates must be strictly increasing: {previous} is followed by {next}")]
    NotStrictlyIncreasing { previous: NaiveDate, next: NaiveDate },
}

/// Ordered daily bars for one symbol, oldest first.
///
/// Dates are strictly increasing (no duplicates). The series is immutable once
/// built; the only constructor enforces the ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl InstrumentSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(SeriesError::NotStrictlyIncreasing {
                previous: pair[0].date,
                next: pair[1].date,
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar (index -1).
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }
}
