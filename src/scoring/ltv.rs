use super::types::MarketTier;

/// Map a market score to an adjusted loan-to-value.
///
/// Pure function of `score` and `base_ltv`. A non-numeric score or base
/// resolves to 0 instead of failing.
pub fn adjust_ltv(score: f64, base_ltv: f64) -> i32 {
    if !score.is_finite() || !base_ltv.is_finite() {
        return 0;
    }
    let adjusted = base_ltv + MarketTier::from_score(score).adjustment();
    round_to_integer(adjusted)
}

fn round_to_integer(value: f64) -> i32 {
    // saturating float -> int cast; finite by construction
    value.round() as i32
}
