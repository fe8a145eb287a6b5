// Stock <-> leads conversion through the confirmation and delivery rates
use shared::models::StockProjection;
use shared::utils::{pct_to_fraction, round_count};

/// Orders confirmed from `leads`, snapped to a whole order.
pub fn confirmed_from_leads(leads: f64, confirmation_rate_pct: f64) -> f64 {
    round_count(leads * pct_to_fraction(confirmation_rate_pct))
}

/// Orders delivered out of `confirmed`, snapped to a whole order.
pub fn delivered_from_confirmed(confirmed: f64, delivery_rate_pct: f64) -> f64 {
    round_count(confirmed * pct_to_fraction(delivery_rate_pct))
}

/// Forward direction. Each stage is rounded before feeding the next one.
pub fn stock_from_leads(leads: f64, delivery_rate_pct: f64, confirmation_rate_pct: f64) -> StockProjection {
    let confirmed = confirmed_from_leads(leads, confirmation_rate_pct);
    let delivered = delivered_from_confirmed(confirmed, delivery_rate_pct);
    StockProjection {
        stock: delivered,
        expected_deliveries: delivered,
        expected_returns: confirmed - delivered,
    }
}

/// Inverse direction: leads needed to end up with `target_stock` delivered units.
///
/// Uses the combined rate in one step, so running the result back through
/// [`stock_from_leads`] may land a unit or so away from `target_stock`.
/// Returns 0 when either rate is zero.
pub fn leads_from_stock(target_stock: f64, delivery_rate_pct: f64, confirmation_rate_pct: f64) -> f64 {
    let conversion_rate = pct_to_fraction(delivery_rate_pct) * pct_to_fraction(confirmation_rate_pct);
    if conversion_rate == 0.0 {
        return 0.0;
    }
    (target_stock / conversion_rate).ceil()
}
