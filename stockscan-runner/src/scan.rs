//! Scan orchestration: fetch, evaluate and collect one watch-list pass.
//!
//! Every symbol produces exactly one `SymbolOutcome` and exactly one
//! progress update. A failure on one symbol never aborts the scan.

use std::fmt;
use std::sync::Mutex;
use std::time::Instant;

use rayon::prelude::*;
use stockscan_core::data::{HistoryProvider, ReferenceProvider};
use stockscan_core::domain::{EvaluationResult, ReferenceData, Rejection, ScanThresholds};
use stockscan_core::engine::ScreenEngine;

use crate::config::{ConfigError, ScanConfig};
use crate::table::ResultTable;

/// What happened to one watch-list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Accepted(EvaluationResult),
    Rejected(Rejection),
    /// History or fundamentals could not be retrieved.
    FetchFailed(String),
}

impl SymbolOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SymbolOutcome::Accepted(_))
    }

    /// Short status used in logs.
    pub fn status(&self) -> &'static str {
        match self {
            SymbolOutcome::Accepted(_) => "accepted",
            SymbolOutcome::Rejected(Rejection::InsufficientHistory { .. }) => "insufficient history",
            SymbolOutcome::Rejected(Rejection::BelowLiquidityThreshold { .. }) => "illiquid",
            SymbolOutcome::FetchFailed(_) => "fetch failed",
        }
    }
}

/// Progress for one finished symbol.
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate<'a> {
    pub symbol: &'a str,
    /// Position in the watch-list.
    pub index: usize,
    /// Symbols finished so far, this one included.
    pub completed: usize,
    pub total: usize,
    /// `completed / total`, strictly increasing across one scan.
    pub fraction: f64,
    pub outcome: &'a SymbolOutcome,
}

/// Receives scan progress. Called from worker threads in parallel mode,
/// one call at a time.
pub trait ScanProgress: Send + Sync {
    fn on_symbol(&self, update: &ProgressUpdate<'_>);

    fn on_complete(&self, _summary: &ScanSummary) {}
}

/// Progress sink that writes through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ScanProgress for LogProgress {
    fn on_symbol(&self, update: &ProgressUpdate<'_>) {
        tracing::info!(
            symbol = update.symbol,
            status = update.outcome.status(),
            "[{}/{}] {:.0}%",
            update.completed,
            update.total,
            update.fraction * 100.0
        );
    }

    fn on_complete(&self, summary: &ScanSummary) {
        tracing::info!("{summary}");
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn on_symbol(&self, _update: &ProgressUpdate<'_>) {}
}

/// Outcome counts for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub accepted: usize,
    pub insufficient_history: usize,
    pub illiquid: usize,
    pub fetch_failed: usize,
    pub elapsed_ms: u64,
}

impl ScanSummary {
    fn tally<'a>(outcomes: impl Iterator<Item = &'a SymbolOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.total += 1;
            match outcome {
                SymbolOutcome::Accepted(_) => summary.accepted += 1,
                SymbolOutcome::Rejected(Rejection::InsufficientHistory { .. }) => {
                    summary.insufficient_history += 1
                }
                SymbolOutcome::Rejected(Rejection::BelowLiquidityThreshold { .. }) => {
                    summary.illiquid += 1
                }
                SymbolOutcome::FetchFailed(_) => summary.fetch_failed += 1,
            }
        }
        summary
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scanned {} symbols: {} accepted, {} insufficient history, {} illiquid, {} fetch failed ({} ms)",
            self.total,
            self.accepted,
            self.insufficient_history,
            self.illiquid,
            self.fetch_failed,
            self.elapsed_ms
        )
    }
}

/// Everything one scan produced, in watch-list order.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub outcomes: Vec<(String, SymbolOutcome)>,
    pub summary: ScanSummary,
    pub min_volume_lots: u64,
}

impl ScanReport {
    /// Accepted results in watch-list order.
    pub fn results(&self) -> Vec<EvaluationResult> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                SymbolOutcome::Accepted(result) => Some(result.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn table(&self) -> ResultTable {
        ResultTable::new(self.results())
    }

    pub fn is_empty(&self) -> bool {
        self.summary.accepted == 0
    }

    /// Guidance shown when nothing passed the gates.
    pub fn empty_message(&self) -> Option<String> {
        if !self.is_empty() {
            return None;
        }
        let mut msg = format!(
            "No symbols met the criteria (minimum {} lots). Try lowering the liquidity threshold",
            self.min_volume_lots
        );
        if self.min_volume_lots > 10_000 {
            msg.push_str(", e.g. --min-lots 10000");
        }
        msg.push('.');
        if self.summary.total > 0 && self.summary.fetch_failed == self.summary.total {
            msg.push_str(" Every fetch failed; check network access or try --synthetic.");
        }
        Some(msg)
    }
}

/// Runs the engine over a watch-list using the given providers.
pub struct Scanner<'a> {
    config: ScanConfig,
    engine: ScreenEngine,
    history: &'a dyn HistoryProvider,
    reference: &'a dyn ReferenceProvider,
}

impl<'a> Scanner<'a> {
    pub fn new(
        config: ScanConfig,
        history: &'a dyn HistoryProvider,
        reference: &'a dyn ReferenceProvider,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = ScreenEngine::new(config.engine.clone())?;
        Ok(Self {
            config,
            engine,
            history,
            reference,
        })
    }

    /// Scan the configured watch-list.
    pub fn run(&self, progress: &dyn ScanProgress) -> ScanReport {
        let started = Instant::now();
        let watchlist = &self.config.watchlist;
        let total = watchlist.len();
        let thresholds = self.config.thresholds();
        let completed = Mutex::new(0usize);

        tracing::info!(
            symbols = total,
            min_volume_lots = thresholds.min_volume_lots,
            provider = self.history.name(),
            parallel = self.config.parallel,
            "starting scan"
        );

        let step = |index: usize, symbol: &String| {
            let outcome = self.evaluate_symbol(symbol, &thresholds);
            // The counter and the callback share one lock so fractions arrive in order.
            let mut done = completed.lock().unwrap_or_else(|e| e.into_inner());
            *done += 1;
            progress.on_symbol(&ProgressUpdate {
                symbol,
                index,
                completed: *done,
                total,
                fraction: *done as f64 / total as f64,
                outcome: &outcome,
            });
            drop(done);
            (symbol.clone(), outcome)
        };

        let outcomes: Vec<(String, SymbolOutcome)> = if self.config.parallel {
            watchlist
                .par_iter()
                .enumerate()
                .map(|(i, s)| step(i, s))
                .collect()
        } else {
            watchlist.iter().enumerate().map(|(i, s)| step(i, s)).collect()
        };

        let mut summary = ScanSummary::tally(outcomes.iter().map(|(_, o)| o));
        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        progress.on_complete(&summary);

        ScanReport {
            outcomes,
            summary,
            min_volume_lots: thresholds.min_volume_lots,
        }
    }

    /// Fetch and evaluate a single symbol. Never panics, never retries.
    pub fn evaluate_symbol(&self, symbol: &str, thresholds: &ScanThresholds) -> SymbolOutcome {
        if !self.history.is_available() {
            tracing::warn!(symbol, provider = self.history.name(), "provider unavailable; skipping");
            return SymbolOutcome::FetchFailed(format!(
                "{} is unavailable (blocked or cooling down)",
                self.history.name()
            ));
        }
        let fetched = match self.history.fetch(symbol, self.config.lookback_days) {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "history fetch failed; skipping");
                return SymbolOutcome::FetchFailed(e.to_string());
            }
        };
        if fetched.dropped_bars > 0 {
            tracing::debug!(symbol, dropped = fetched.dropped_bars, "dropped unusable bars");
        }

        let reference = match self.reference.fetch_reference(symbol) {
            Ok(reference) => reference,
            Err(e) if self.config.reference_fallback => {
                tracing::warn!(symbol, error = %e, "fundamentals unavailable; scoring without earnings");
                ReferenceData::bare(symbol)
            }
            Err(e) => {
                tracing::warn!(symbol, error = %e, "fundamentals fetch failed; skipping");
                return SymbolOutcome::FetchFailed(e.to_string());
            }
        };

        match self.engine.evaluate(&fetched.series, &reference, thresholds) {
            Ok(result) => {
                tracing::debug!(
                    symbol,
                    trend = %result.trend_label,
                    lots = result.today_volume_lots,
                    "accepted"
                );
                SymbolOutcome::Accepted(result)
            }
            Err(rejection) => {
                tracing::debug!(symbol, %rejection, "rejected");
                SymbolOutcome::Rejected(rejection)
            }
        }
    }
}
