//! Export: CSV and JSON.
//!
//! - **CSV**: the display rows (rounded, exchange suffix stripped) for
//!   spreadsheets
//! - **JSON**: the unrounded results with their signal values, stamped with
//!   the scan date and threshold

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockscan_core::domain::EvaluationResult;

use crate::table::ResultTable;

pub const SCHEMA_VERSION: u32 = 1;

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: code, name, price, short_target, long_target, volume_lots,
/// trend, upside_pct
pub fn export_csv(table: &ResultTable, decimals: u32) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in table.rows(decimals) {
        wtr.serialize(&row).context("failed to write CSV row")?;
    }
    // serialize() only writes a header with the first row
    if table.is_empty() {
        wtr.write_record([
            "code",
            "name",
            "price",
            "short_target",
            "long_target",
            "volume_lots",
            "trend",
            "upside_pct",
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanExport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub min_volume_lots: u64,
    pub results: Vec<EvaluationResult>,
}

pub fn export_json(table: &ResultTable, min_volume_lots: u64) -> Result<String> {
    let export = ScanExport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        min_volume_lots,
        results: table.results().to_vec(),
    };
    serde_json::to_string_pretty(&export).context("failed to serialize scan results to JSON")
}

/// Parse a JSON export, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<ScanExport> {
    let export: ScanExport =
        serde_json::from_str(json).context("failed to deserialize scan export")?;
    if export.schema_version > SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema version {} (max supported: {})",
            export.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(export)
}

// ─── File helpers ───────────────────────────────────────────────────

pub fn write_csv(path: &Path, table: &ResultTable, decimals: u32) -> Result<()> {
    let csv = export_csv(table, decimals)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_json(path: &Path, table: &ResultTable, min_volume_lots: u64) -> Result<()> {
    let json = export_json(table, min_volume_lots)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockscan_core::domain::{SignalSnapshot, TrendLabel};

    fn sample_result() -> EvaluationResult {
        EvaluationResult {
            symbol: "2330.TW".into(),
            display_name: "Taiwan Semiconductor".into(),
            current_price: 333.25,
            short_term_target: 350.0,
            long_term_target: 400.0,
            today_volume_lots: 42_000,
            trend_label: TrendLabel::Breakout,
            signals: SignalSnapshot {
                ma_short: 330.0,
                ma_mid: 320.0,
                ma_long: 310.0,
                prior_high: 330.0,
                prior_low: 316.0,
                is_breakout: true,
                is_bull_aligned: true,
            },
        }
    }

    #[test]
    fn csv_has_header_and_rounded_row() {
        let table = ResultTable::new(vec![sample_result()]);
        let csv = export_csv(&table, 2).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "code,name,price,short_target,long_target,volume_lots,trend,upside_pct"
        );
        assert_eq!(lines[1], "2330,Taiwan Semiconductor,333.25,350.0,400.0,42000,breakout,20.0");
    }

    #[test]
    fn csv_empty_table_keeps_header() {
        let csv = export_csv(&ResultTable::default(), 2).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("code,name"));
    }

    #[test]
    fn json_keeps_unrounded_values() {
        let table = ResultTable::new(vec![sample_result()]);
        let json = export_json(&table, 30_000).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.min_volume_lots, 30_000);
        assert_eq!(back.results, table.results());
    }

    #[test]
    fn json_rejects_future_schema() {
        let table = ResultTable::default();
        let json = export_json(&table, 0)
            .unwrap()
            .replace("\"schema_version\": 1", "\"schema_version\": 99");
        assert!(import_json(&json).is_err());
    }
}
