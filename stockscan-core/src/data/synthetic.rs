//! Deterministic synthetic provider for offline runs and demos.
//!
//! Bars are a seeded random walk; the seed is the BLAKE3 hash of the symbol,
//! so the same symbol always produces the same history regardless of scan
//! order. Results built on synthetic data are tagged with
//! `DataSource::Synthetic`.

use super::ingest::ingest;
use super::provider::{
    DataError, DataSource, FetchResult, HistoryProvider, RawBar, ReferenceProvider,
};
use crate::domain::ReferenceData;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic bars and fundamentals, anchored at a fixed end date.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: NaiveDate,
}

impl SyntheticProvider {
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }

    /// Anchored at today's local date.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    fn rng_for(symbol: &str, stream: &[u8]) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(stream);
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    /// Weekday-only random walk between `start` and `end` (inclusive).
    pub fn generate_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
        let mut rng = Self::rng_for(symbol, b"bars");

        let mut price: f64 = rng.gen_range(20.0..900.0);
        let drift: f64 = rng.gen_range(-0.004..0.006);
        let base_volume: u64 = rng.gen_range(2_000_000..60_000_000);

        let mut bars = Vec::new();
        let mut current = start;
        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = drift + rng.gen_range(-0.03..0.03);
            let open = price;
            let close = (price * (1.0 + daily_return)).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.015));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.015));
            let volume = (base_volume as f64 * rng.gen_range(0.5..1.8)) as u64;

            bars.push(RawBar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += chrono::Duration::days(1);
        }
        bars
    }

    /// Fundamentals: roughly one symbol in five has no earnings basis.
    pub fn generate_reference(symbol: &str) -> ReferenceData {
        let mut rng = Self::rng_for(symbol, b"reference");
        let trailing_eps = if rng.gen_bool(0.2) {
            None
        } else {
            Some(rng.gen_range(-2.0..45.0))
        };
        let forward_pe = if rng.gen_bool(0.3) {
            None
        } else {
            Some(rng.gen_range(6.0..40.0))
        };
        ReferenceData {
            symbol: symbol.to_string(),
            display_name: Some(format!("Synthetic {symbol}")),
            trailing_eps,
            forward_pe,
        }
    }
}

impl HistoryProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, lookback_days: u32) -> Result<FetchResult, DataError> {
        let start = self.end - chrono::Duration::days(i64::from(lookback_days));
        let ingested = ingest(symbol, Self::generate_bars(symbol, start, self.end))?;
        Ok(FetchResult {
            series: ingested.series,
            source: DataSource::Synthetic,
            dropped_bars: ingested.dropped,
        })
    }
}

impl ReferenceProvider for SyntheticProvider {
    fn fetch_reference(&self, symbol: &str) -> Result<ReferenceData, DataError> {
        Ok(Self::generate_reference(symbol))
    }
}
