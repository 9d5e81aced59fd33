//! Raw bars → validated `InstrumentSeries`.
//!
//! Providers hand back bars in whatever order and quality the upstream API
//! produced. Ingest sorts by date, drops void bars (any OHLC field missing)
//! and keeps the last bar when a date repeats.

use super::provider::{DataError, RawBar};
use crate::domain::{Bar, InstrumentSeries};

/// Output of the ingest step.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub series: InstrumentSeries,
    pub dropped: usize,
}

pub fn ingest(symbol: &str, mut raw: Vec<RawBar>) -> Result<IngestResult, DataError> {
    let total = raw.len();
    raw.sort_by_key(|b| b.date);

    let mut bars: Vec<Bar> = Vec::with_capacity(total);
    for r in raw {
        let bar = Bar {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        };
        if bar.is_void() {
            continue;
        }
        match bars.last_mut() {
            Some(prev) if prev.date == bar.date => *prev = bar,
            _ => bars.push(bar),
        }
    }

    let dropped = total - bars.len();
    if dropped > 0 {
        tracing::debug!(symbol, dropped, "ingest dropped void or duplicate bars");
    }

    let series = InstrumentSeries::new(symbol, bars)?;
    Ok(IngestResult { series, dropped })
}
