//! Price projections.
//!
//! Short term: symmetric range projection (measured move). Long term: an
//! earnings-based valuation with a growth premium, floored at spot.

use crate::domain::ReferenceData;
use crate::params::EngineParams;

/// `price + (price - prior_low)`: the breakout travels as far above the
/// current price as the prior range reached below it.
pub fn short_term_target(current_price: f64, prior_low: f64) -> f64 {
    current_price + (current_price - prior_low)
}

/// P/E used for valuation: the forward estimate (or the default), never
/// below the floor.
pub fn effective_pe(reference: &ReferenceData, params: &EngineParams) -> f64 {
    let forward = reference
        .forward_pe
        .filter(|pe| pe.is_finite())
        .unwrap_or(params.default_pe);
    forward.max(params.pe_floor)
}

/// Growth-premium valuation target, never below `current_price`.
pub fn long_term_target(current_price: f64, reference: &ReferenceData, params: &EngineParams) -> f64 {
    let valuation = match reference.positive_eps() {
        Some(eps) => eps * effective_pe(reference, params) * params.growth_weight,
        None => current_price * params.growth_multiplier,
    };

    // Lagging fundamentals must not read as a downside target.
    if valuation < current_price {
        current_price * params.sentiment_multiplier
    } else {
        valuation
    }
}
