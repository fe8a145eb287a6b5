// Profitability pipeline: funnel -> cost components -> totals, margin and ROI
use shared::models::{CostBreakdown, ProfitabilityInputs, ProfitabilityResult};
use shared::utils::{pct_to_fraction, percent_or_zero, ratio_or_zero};

use crate::funnel::{confirmed_from_leads, delivered_from_confirmed, leads_from_stock};

/// Order counts derived from the target stock.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Funnel {
    leads: f64,
    confirmed: f64,
    delivered: f64,
    returned: f64,
}

impl Funnel {
    fn from_inputs(inputs: &ProfitabilityInputs) -> Self {
        let leads = leads_from_stock(inputs.target_stock, inputs.delivery_rate_pct, inputs.confirmation_rate_pct);
        let confirmed = confirmed_from_leads(leads, inputs.confirmation_rate_pct);
        let delivered = delivered_from_confirmed(confirmed, inputs.delivery_rate_pct);
        Funnel {
            leads,
            confirmed,
            delivered,
            returned: confirmed - delivered,
        }
    }
}

fn cost_breakdown(inputs: &ProfitabilityInputs, funnel: &Funnel) -> CostBreakdown {
    let returns = funnel.returned * inputs.return_shipping_cost;
    // Forward shipping is paid on every confirmed order, returned ones included.
    let shipping = funnel.confirmed * inputs.shipping_cost + returns;

    let call_center = if inputs.use_call_center {
        let fees = &inputs.call_center_fees;
        funnel.leads * fees.lead + funnel.confirmed * fees.confirmation + funnel.delivered * fees.delivered
    } else {
        0.0
    };

    CostBreakdown {
        product: inputs.purchase_price * funnel.delivered,
        shipping,
        returns,
        call_center,
        cod: inputs.sale_price * funnel.delivered * pct_to_fraction(inputs.cod_fee_pct),
        advertising: funnel.leads * inputs.cost_per_lead,
        monthly_charges: inputs.monthly_charge_per_unit * inputs.target_stock,
    }
}

/// Runs the whole pipeline. Inputs are not validated: negative or out-of-range
/// values flow through the arithmetic as they are.
pub fn compute_profitability(inputs: &ProfitabilityInputs) -> ProfitabilityResult {
    let funnel = Funnel::from_inputs(inputs);
    let cost_breakdown = cost_breakdown(inputs, &funnel);

    let total_sales = inputs.sale_price * funnel.delivered;
    let total_cost = cost_breakdown.total();
    let total_profit = total_sales - total_cost;

    let result = ProfitabilityResult {
        required_leads: funnel.leads,
        confirmed_orders: funnel.confirmed,
        delivered_orders: funnel.delivered,
        returned_orders: funnel.returned,
        total_sales,
        total_cost,
        cost_breakdown,
        total_profit,
        profit_margin_pct: percent_or_zero(total_profit, total_sales),
        profit_per_delivered_unit: ratio_or_zero(total_profit, funnel.delivered),
        roi_pct: percent_or_zero(total_profit, total_cost),
    };

    tracing::debug!(
        leads = result.required_leads,
        delivered = result.delivered_orders,
        total_sales = result.total_sales,
        total_cost = result.total_cost,
        total_profit = result.total_profit,
        "Profitability computed"
    );
    result
}

/// Cost per lead at which the campaign breaks even, all other inputs fixed.
/// 0 when no leads are needed.
pub fn break_even_cost_per_lead(inputs: &ProfitabilityInputs) -> f64 {
    let result = compute_profitability(inputs);
    let profit_before_ads = result.total_profit + result.cost_breakdown.advertising;
    ratio_or_zero(profit_before_ads, result.required_leads)
}

/// Sale price at which the campaign breaks even, all other inputs fixed.
///
/// Sales and the COD fee both scale with the sale price, so the price solves
/// `price * delivered * (1 - cod) = other costs`. 0 when nothing is delivered
/// or the COD fee eats the whole price.
pub fn break_even_sale_price(inputs: &ProfitabilityInputs) -> f64 {
    let result = compute_profitability(inputs);
    let price_independent_cost = result.total_cost - result.cost_breakdown.cod;
    let net_per_price_unit = result.delivered_orders * (1.0 - pct_to_fraction(inputs.cod_fee_pct));
    ratio_or_zero(price_independent_cost, net_per_price_unit)
}
