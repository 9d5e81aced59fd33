//! Optional market brief shown alongside scan results.
//!
//! The brief is informational only. It never influences evaluation, and a
//! failing source degrades to a diagnostic line instead of an error.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Brief {
    Text(String),
    Headlines(Vec<String>),
}

impl fmt::Display for Brief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brief::Text(text) => f.write_str(text),
            Brief::Headlines(lines) => {
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "- {line}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum BriefError {
    #[error("failed to read brief source {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("brief source has no content")]
    Empty,

    #[error("brief unavailable: {0}")]
    Unavailable(String),
}

pub trait MarketBrief {
    fn fetch_brief(&self) -> Result<Brief, BriefError>;
}

/// Fetch a brief, turning any failure into a user-facing message.
pub fn brief_or_diagnostic(source: &dyn MarketBrief) -> Brief {
    match source.fetch_brief() {
        Ok(brief) => brief,
        Err(e) => {
            tracing::warn!(error = %e, "market brief unavailable");
            Brief::Text(format!("Market brief unavailable ({e})."))
        }
    }
}

/// Headlines read from a text file, one per non-blank line.
#[derive(Debug, Clone)]
pub struct FileBrief {
    path: PathBuf,
}

impl FileBrief {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MarketBrief for FileBrief {
    fn fetch_brief(&self) -> Result<Brief, BriefError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| BriefError::Io {
            path: self.path.clone(),
            source,
        })?;
        let headlines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if headlines.is_empty() {
            return Err(BriefError::Empty);
        }
        Ok(Brief::Headlines(headlines))
    }
}

/// No brief configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBrief;

impl MarketBrief for NoBrief {
    fn fetch_brief(&self) -> Result<Brief, BriefError> {
        Ok(Brief::Text("No market brief configured.".into()))
    }
}
