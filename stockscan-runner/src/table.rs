//! Result table: sorting, filtering and display rounding.
//!
//! Values inside `ResultTable` stay unrounded. Rounding happens only when
//! rows are produced for display or CSV.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stockscan_core::domain::{EvaluationResult, TrendLabel};
use thiserror::Error;

/// Column to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Symbol,
    Name,
    Price,
    ShortTarget,
    LongTarget,
    VolumeLots,
    Trend,
    ExpectedUpside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseSortError {
    #[error(
        "unknown sort key '{0}' (valid: symbol, name, price, short, long, volume, trend, upside)"
    )]
    Key(String),
    #[error("unknown sort order '{0}' (valid: asc, desc)")]
    Order(String),
}

impl FromStr for SortKey {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "symbol" | "code" => Ok(SortKey::Symbol),
            "name" => Ok(SortKey::Name),
            "price" | "current_price" => Ok(SortKey::Price),
            "short" | "short_target" => Ok(SortKey::ShortTarget),
            "long" | "long_target" => Ok(SortKey::LongTarget),
            "volume" | "lots" | "volume_lots" => Ok(SortKey::VolumeLots),
            "trend" => Ok(SortKey::Trend),
            "upside" | "expected_upside" => Ok(SortKey::ExpectedUpside),
            _ => Err(ParseSortError::Key(s.to_string())),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ParseSortError::Order(s.to_string())),
        }
    }
}

fn compare(a: &EvaluationResult, b: &EvaluationResult, key: SortKey) -> Ordering {
    match key {
        SortKey::Symbol => a.symbol.cmp(&b.symbol),
        SortKey::Name => a.display_name.cmp(&b.display_name),
        SortKey::Price => a.current_price.total_cmp(&b.current_price),
        SortKey::ShortTarget => a.short_term_target.total_cmp(&b.short_term_target),
        SortKey::LongTarget => a.long_term_target.total_cmp(&b.long_term_target),
        SortKey::VolumeLots => a.today_volume_lots.cmp(&b.today_volume_lots),
        SortKey::Trend => a.trend_label.cmp(&b.trend_label),
        SortKey::ExpectedUpside => a.expected_upside_pct().total_cmp(&b.expected_upside_pct()),
    }
}

/// Round half away from zero to `decimals` places.
///
/// Display rounding on the binary value: a decimal literal that is stored
/// just below its midpoint (`1.005` is `1.00499999...`) rounds down. Exact
/// binary midpoints such as `0.125` round away from zero, where `{:.2}`
/// would round them to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// One display row. Prices are rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub short_target: f64,
    pub long_target: f64,
    pub volume_lots: u64,
    pub trend: TrendLabel,
    pub upside_pct: f64,
}

impl TableRow {
    pub fn from_result(result: &EvaluationResult, decimals: u32) -> Self {
        Self {
            code: result.code().to_string(),
            name: result.display_name.clone(),
            price: round_to(result.current_price, decimals),
            short_target: round_to(result.short_term_target, decimals),
            long_target: round_to(result.long_term_target, decimals),
            volume_lots: result.today_volume_lots,
            trend: result.trend_label,
            upside_pct: round_to(result.expected_upside_pct(), 1),
        }
    }
}

/// Accepted results from one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    results: Vec<EvaluationResult>,
}

impl ResultTable {
    pub fn new(results: Vec<EvaluationResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Stable sort; ties keep their current order in both directions.
    pub fn sorted_by(&self, key: SortKey, order: SortOrder) -> Self {
        let mut results = self.results.clone();
        match order {
            SortOrder::Asc => results.sort_by(|a, b| compare(a, b, key)),
            SortOrder::Desc => results.sort_by(|a, b| compare(b, a, key)),
        }
        Self { results }
    }

    pub fn filter_trend(&self, label: TrendLabel) -> Self {
        Self {
            results: self
                .results
                .iter()
                .filter(|r| r.trend_label == label)
                .cloned()
                .collect(),
        }
    }

    pub fn breakout_candidates(&self) -> Self {
        self.filter_trend(TrendLabel::Breakout)
    }

    /// Highest expected upside first.
    pub fn ranked_by_upside(&self) -> Self {
        self.sorted_by(SortKey::ExpectedUpside, SortOrder::Desc)
    }

    pub fn rows(&self, decimals: u32) -> Vec<TableRow> {
        self.results
            .iter()
            .map(|r| TableRow::from_result(r, decimals))
            .collect()
    }

    /// Plain-text table with aligned columns.
    pub fn render_text(&self, decimals: u32) -> String {
        const HEADERS: [&str; 8] = ["Code", "Name", "Price", "Short", "Long", "Lots", "Trend", "Upside%"];
        let prec = decimals as usize;
        let cells: Vec<[String; 8]> = self
            .rows(decimals)
            .into_iter()
            .map(|row| {
                [
                    row.code,
                    row.name,
                    format!("{:.prec$}", row.price),
                    format!("{:.prec$}", row.short_target),
                    format!("{:.prec$}", row.long_target),
                    row.volume_lots.to_string(),
                    row.trend.to_string(),
                    format!("{:.1}", row.upside_pct),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for line in &cells {
            for (w, cell) in widths.iter_mut().zip(line.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let mut push_line = |line: &[String]| {
            let parts: Vec<String> = line
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(col, (cell, &w))| {
                    // text columns left-aligned, numbers right-aligned
                    if col < 2 || col == 6 {
                        pad_right(cell, w)
                    } else {
                        pad_left(cell, w)
                    }
                })
                .collect();
            out.push_str(parts.join("  ").trim_end());
            out.push('\n');
        };

        let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        push_line(&header);
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        push_line(&rule);
        for line in &cells {
            push_line(line);
        }
        out
    }
}

fn pad_right(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.chars().count());
    format!("{s}{}", " ".repeat(fill))
}

fn pad_left(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.chars().count());
    format!("{}{s}", " ".repeat(fill))
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = f.precision().unwrap_or(2) as u32;
        f.write_str(&self.render_text(decimals))
    }
}
