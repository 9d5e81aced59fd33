//! StockScan Runner — scan orchestration, result table, export, market brief.
//!
//! This crate builds on `stockscan-core` to provide:
//! - TOML scan configuration with the default Taiwan watch-list
//! - The watch-list scanner with per-symbol outcomes and progress reporting
//! - Sortable, filterable result tables with display rounding
//! - CSV/JSON export
//! - The optional market brief collaborator

pub mod brief;
pub mod config;
pub mod export;
pub mod scan;
pub mod table;

pub use brief::{brief_or_diagnostic, Brief, BriefError, FileBrief, MarketBrief, NoBrief};
pub use config::{ConfigError, ScanConfig, DEFAULT_WATCHLIST};
pub use export::{export_csv, export_json, write_csv, write_json};
pub use scan::{
    LogProgress, NoProgress, ProgressUpdate, ScanProgress, ScanReport, ScanSummary, Scanner,
    SymbolOutcome,
};
pub use table::{ResultTable, SortKey, SortOrder, TableRow};
