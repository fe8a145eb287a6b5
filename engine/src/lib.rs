// Engine library root
// Formula evaluation and profitability calculations for the operations dashboard.
// Every calculator here is a pure function of its inputs; the only I/O is the
// explicit settings loading in `config`.

pub mod config;
pub mod error;
pub mod formula;
pub mod funnel;
pub mod kpi;
pub mod profitability;
pub mod variables;

pub use error::EngineError;
pub use formula::{evaluate, try_evaluate, validate, EvalError};
pub use funnel::{leads_from_stock, stock_from_leads};
pub use kpi::{classify, KpiMetric};
pub use profitability::compute_profitability;

#[cfg(test)]
mod tests {
    use super::*;
    use config::EngineSettings;
    use shared::models::{Band, ProductForm, VariableBinding};
    use variables::VariableStore;

    fn init_test_logging() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_form_to_bands_end_to_end() {
        init_test_logging();

        let settings = EngineSettings::load_default().unwrap();
        let form = ProductForm {
            purchase_price: 60.0,
            sale_price: 249.0,
            target_stock: 50.0,
            confirmation_rate_pct: 60.0,
            delivery_rate_pct: 70.0,
            cost_per_lead: 8.0,
            use_call_center: true,
            monthly_charge_per_unit: None,
        };
        let inputs = settings.resolve_inputs("ma", &form).unwrap();
        let result = compute_profitability(&inputs);

        // 50 / (0.7 * 0.6) = 119.05 -> 120 leads, 72 confirmed, round(50.4) = 50 delivered.
        assert_eq!(result.required_leads, 120.0);
        assert_eq!(result.confirmed_orders, 72.0);
        assert_eq!(result.delivered_orders, 50.0);
        assert_eq!(result.returned_orders, 22.0);
        // Call center (MA): 120 * 1 + 72 * 4 + 50 * 6
        assert!((result.cost_breakdown.call_center - 708.0).abs() < 1e-9);

        // MA confirmation thresholds are 40 / 55 / 70.
        let bands = kpi::classify_campaign(&settings, "MA", &inputs, &result);
        assert_eq!(bands[0], (KpiMetric::ConfirmationRate, Band::High));
    }

    #[test]
    fn test_store_to_formula_end_to_end() {
        init_test_logging();

        let mut store = VariableStore::new();
        store.set_global("salePrice", 30.0).unwrap();
        store.set_global("purchasePrice", 12.0).unwrap();

        let formula: shared::models::Formula =
            serde_json::from_str(r#"[{"id":"1","type":"variable","value":"salePrice"},{"id":"2","type":"operator","value":"−"},{"id":"3","type":"variable","value":"purchasePrice"}]"#)
                .unwrap();
        assert!(validate(&formula));
        assert_eq!(evaluate(&formula, &store.bindings_for(None)), 18.0);
        assert_eq!(evaluate(&formula, &VariableBinding::new()), 0.0);
    }
}
