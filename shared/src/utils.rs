// Numeric helpers shared by the funnel and profitability calculations.

/// Converts a 0-100 percentage into a fraction.
pub fn pct_to_fraction(pct: f64) -> f64 {
    pct / 100.0
}

/// Snaps a fractional order count to a whole number, half away from zero.
pub fn round_count(value: f64) -> f64 {
    value.round()
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Same as [`ratio_or_zero`], expressed as a percentage.
pub fn percent_or_zero(numerator: f64, denominator: f64) -> f64 {
    ratio_or_zero(numerator, denominator) * 100.0
}
