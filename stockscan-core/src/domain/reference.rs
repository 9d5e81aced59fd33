use serde::{Deserialize, Serialize};

/// Static fundamentals for one symbol.
///
/// `trailing_eps` of `None`, zero or negative all mean "no earnings basis".
/// `forward_pe` of `None` is replaced by the engine's default P/E.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub symbol: String,
    pub display_name: Option<String>,
    pub trailing_eps: Option<f64>,
    pub forward_pe: Option<f64>,
}

impl ReferenceData {
    /// Reference data with no name and no fundamentals.
    pub fn bare(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: None,
            trailing_eps: None,
            forward_pe: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.trailing_eps = Some(eps);
        self
    }

    pub fn with_forward_pe(mut self, pe: f64) -> Self {
        self.forward_pe = Some(pe);
        self
    }

    /// Display name, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.symbol,
        }
    }

    /// Trailing EPS when it is a usable positive number.
    pub fn positive_eps(&self) -> Option<f64> {
        self.trailing_eps.filter(|eps| eps.is_finite() && *eps > 0.0)
    }
}
