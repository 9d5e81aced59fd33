//! Prior range — highest high / lowest low over the window that ends one
//! bar before the evaluated bar.
//!
//! Produces two series (exposed as separate Indicator instances):
//! - Upper: max(high[t-period..=t-1])
//! - Lower: min(low[t-period..=t-1])
//!
//! Bar t never contributes to its own value, so `close[t] > upper[t]` is a
//! meaningful breakout test. Lookback: period.

use super::Indicator;
use crate::domain::Bar;

/// Which side of the prior range to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct PriorRange {
    period: usize,
    band: RangeBand,
    name: String,
}

impl PriorRange {
    pub fn upper(period: usize) -> Self {
        assert!(period >= 1, "prior range period must be >= 1");
        Self {
            period,
            band: RangeBand::Upper,
            name: format!("prior_high_{period}"),
        }
    }

    pub fn lower(period: usize) -> Self {
        assert!(period >= 1, "prior range period must be >= 1");
        Self {
            period,
            band: RangeBand::Lower,
            name: format!("prior_low_{period}"),
        }
    }

    /// Extreme over an explicit window. NaN anywhere in the window yields NaN.
    fn extreme(&self, window: &[Bar]) -> f64 {
        match self.band {
            RangeBand::Upper => {
                let mut max_val = f64::NEG_INFINITY;
                for bar in window {
                    if bar.high.is_nan() {
                        return f64::NAN;
                    }
                    max_val = max_val.max(bar.high);
                }
                max_val
            }
            RangeBand::Lower => {
                let mut min_val = f64::INFINITY;
                for bar in window {
                    if bar.low.is_nan() {
                        return f64::NAN;
                    }
                    min_val = min_val.min(bar.low);
                }
                min_val
            }
        }
    }
}

impl Indicator for PriorRange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for (t, slot) in result.iter_mut().enumerate().skip(self.period) {
            *slot = self.extreme(&bars[(t - self.period)..t]);
        }

        result
    }

    fn latest(&self, bars: &[Bar]) -> f64 {
        let n = bars.len();
        if n <= self.period {
            return f64::NAN;
        }
        self.extreme(&bars[(n - 1 - self.period)..(n - 1)])
    }
}
