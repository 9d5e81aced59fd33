//! Serializable scan configuration.
//!
//! Everything a scan needs is passed in through `ScanConfig`; there is no
//! process-wide state. The file format is TOML:
//!
//! ```toml
//! watchlist = ["2330.TW", "2317.TW"]
//! min_volume_lots = 30000
//! lookback_days = 180
//!
//! [engine]
//! pe_floor = 20.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stockscan_core::params::{EngineParams, ParamsError};
use stockscan_core::ScanThresholds;
use thiserror::Error;

/// Calendar days needed to cover 60 sessions after weekends and holidays.
pub const MIN_LOOKBACK_DAYS: u32 = 120;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 180;
pub const DEFAULT_MIN_VOLUME_LOTS: u64 = 30_000;
pub const DEFAULT_DECIMALS: u32 = 2;
pub const MAX_DECIMALS: u32 = 6;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Large-cap Taiwan listings: semiconductors, AI servers, shipping,
/// financials, panels and power equipment.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "2330.TW", "2317.TW", "2303.TW", "2454.TW", "2382.TW", "3231.TW", "2357.TW", "2301.TW",
    "2376.TW", "6669.TW", "2603.TW", "2609.TW", "2618.TW", "2881.TW", "2882.TW", "2886.TW",
    "2409.TW", "3481.TW", "1513.TW", "1605.TW", "2313.TW", "2360.TW", "3034.TW", "3711.TW",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid engine parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one scan invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Symbols to scan, in order. Duplicates are scanned twice.
    pub watchlist: Vec<String>,

    /// Minimum latest-session volume, in lots.
    pub min_volume_lots: u64,

    /// Calendar days of history requested per symbol.
    pub lookback_days: u32,

    /// Decimal places for displayed prices.
    pub decimals: u32,

    /// Per-request HTTP timeout.
    pub fetch_timeout_secs: u64,

    /// Evaluate symbols on the rayon pool instead of one at a time.
    pub parallel: bool,

    /// Keep symbols whose fundamentals lookup failed, scoring them as if
    /// they had no earnings basis.
    pub reference_fallback: bool,

    pub engine: EngineParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
            min_volume_lots: DEFAULT_MIN_VOLUME_LOTS,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            decimals: DEFAULT_DECIMALS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            parallel: false,
            reference_fallback: false,
            engine: EngineParams::default(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watchlist.is_empty() {
            return Err(ConfigError::Invalid("watchlist is empty".into()));
        }
        if let Some(blank) = self.watchlist.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "watchlist entry {blank} is blank"
            )));
        }
        if self.lookback_days < MIN_LOOKBACK_DAYS {
            return Err(ConfigError::Invalid(format!(
                "lookback_days must be >= {MIN_LOOKBACK_DAYS} (got {})",
                self.lookback_days
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "decimals must be <= {MAX_DECIMALS} (got {})",
                self.decimals
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be >= 1".into()));
        }
        self.engine.validate()?;
        Ok(())
    }

    pub fn thresholds(&self) -> ScanThresholds {
        ScanThresholds::new(self.min_volume_lots)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
