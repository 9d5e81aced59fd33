//! In-memory provider: pre-loaded series and fundamentals.
//!
//! Used by tests and by callers that already hold bar data. Unknown symbols
//! report `SymbolNotFound`, the same way the network provider does.

use super::provider::{DataError, DataSource, FetchResult, HistoryProvider, ReferenceProvider};
use crate::domain::{InstrumentSeries, ReferenceData};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, InstrumentSeries>,
    references: HashMap<String, ReferenceData>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_series(&mut self, series: InstrumentSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    pub fn insert_reference(&mut self, reference: ReferenceData) {
        self.references.insert(reference.symbol.clone(), reference);
    }

    pub fn with(mut self, series: InstrumentSeries, reference: ReferenceData) -> Self {
        self.insert_series(series);
        self.insert_reference(reference);
        self
    }
}

impl HistoryProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    /// Returns the stored series whole; `lookback_days` is not applied.
    fn fetch(&self, symbol: &str, _lookback_days: u32) -> Result<FetchResult, DataError> {
        let series = self
            .series
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        Ok(FetchResult {
            series,
            source: DataSource::InMemory,
            dropped_bars: 0,
        })
    }
}

impl ReferenceProvider for InMemoryProvider {
    fn fetch_reference(&self, symbol: &str) -> Result<ReferenceData, DataError> {
        self.references
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}
