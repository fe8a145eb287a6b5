// KPI band classification for dashboard coloring
use serde::{Deserialize, Serialize};
use shared::models::{Band, ProfitabilityInputs, ProfitabilityResult, RateThreshold};

use crate::config::EngineSettings;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
    ConfirmationRate,
    DeliveryRate,
    ProfitMargin,
    Roi,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 4] = [
        KpiMetric::ConfirmationRate,
        KpiMetric::DeliveryRate,
        KpiMetric::ProfitMargin,
        KpiMetric::Roi,
    ];
}

/// Inclusive upper bounds: a value equal to `low` is still Low. The triple is
/// not checked for ordering; `high` is never consulted.
pub fn classify(value: f64, threshold: &RateThreshold) -> Band {
    if value <= threshold.low {
        Band::Low
    } else if value <= threshold.medium {
        Band::Medium
    } else {
        Band::High
    }
}

/// None when neither the country nor the defaults define this metric.
pub fn classify_metric(settings: &EngineSettings, country: &str, metric: KpiMetric, value: f64) -> Option<Band> {
    let threshold = settings.thresholds(country, metric);
    if threshold.is_none() {
        tracing::debug!(country, ?metric, "No KPI threshold configured");
    }
    threshold.map(|t| classify(value, &t))
}

/// Bands for a computed campaign: the two funnel rates from the inputs, margin
/// and ROI from the result. Metrics without a threshold are left out.
pub fn classify_campaign(
    settings: &EngineSettings,
    country: &str,
    inputs: &ProfitabilityInputs,
    result: &ProfitabilityResult,
) -> Vec<(KpiMetric, Band)> {
    KpiMetric::ALL
        .into_iter()
        .filter_map(|metric| {
            let value = match metric {
                KpiMetric::ConfirmationRate => inputs.confirmation_rate_pct,
                KpiMetric::DeliveryRate => inputs.delivery_rate_pct,
                KpiMetric::ProfitMargin => result.profit_margin_pct,
                KpiMetric::Roi => result.roi_pct,
            };
            classify_metric(settings, country, metric, value).map(|band| (metric, band))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profitability::compute_profitability;

    const BANDS: RateThreshold = RateThreshold {
        low: 10.0,
        medium: 20.0,
        high: 30.0,
    };

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify(10.0, &BANDS), Band::Low);
        assert_eq!(classify(20.0, &BANDS), Band::Medium);
        assert_eq!(classify(20.01, &BANDS), Band::High);
        assert_eq!(classify(1000.0, &BANDS), Band::High);
        assert_eq!(classify(-5.0, &BANDS), Band::Low);
        assert_eq!(classify(10.5, &BANDS), Band::Medium);
    }

    #[test]
    fn test_malformed_threshold_is_accepted() {
        let inverted = RateThreshold {
            low: 30.0,
            medium: 20.0,
            high: 10.0,
        };
        // Nothing can be Medium when medium < low.
        assert_eq!(classify(25.0, &inverted), Band::Low);
        assert_eq!(classify(31.0, &inverted), Band::High);
    }

    #[test]
    fn test_nan_is_high() {
        // NaN fails every comparison and lands in the last band.
        assert_eq!(classify(f64::NAN, &BANDS), Band::High);
    }

    #[test]
    fn test_bands_are_ordered() {
        assert!(Band::Low < Band::Medium);
        assert!(Band::Medium < Band::High);
    }

    #[test]
    fn test_classify_metric_uses_country_then_defaults() {
        let mut settings = EngineSettings::new("MA");
        settings.set_threshold("MA", KpiMetric::Roi, BANDS);
        settings.default_kpi_thresholds.insert(
            KpiMetric::Roi,
            RateThreshold {
                low: 100.0,
                medium: 200.0,
                high: 300.0,
            },
        );

        assert_eq!(classify_metric(&settings, "ma", KpiMetric::Roi, 15.0), Some(Band::Medium));
        assert_eq!(classify_metric(&settings, "SA", KpiMetric::Roi, 15.0), Some(Band::Low));
        assert_eq!(classify_metric(&settings, "MA", KpiMetric::DeliveryRate, 15.0), None);
    }

    #[test]
    fn test_classify_campaign() {
        let settings = EngineSettings::load_default().unwrap();
        let country = settings.default_country.clone();
        let inputs = ProfitabilityInputs {
            purchase_price: 10.0,
            sale_price: 30.0,
            target_stock: 100.0,
            confirmation_rate_pct: 50.0,
            delivery_rate_pct: 80.0,
            cost_per_lead: 2.0,
            shipping_cost: 5.0,
            return_shipping_cost: 3.0,
            cod_fee_pct: 5.0,
            ..ProfitabilityInputs::default()
        };
        let result = compute_profitability(&inputs);
        let bands = classify_campaign(&settings, &country, &inputs, &result);

        assert_eq!(bands.len(), 4);
        // MA: confirmation 40/55/70, delivery 50/65/80; defaults margin 10/20/30, ROI 10/25/50.
        assert_eq!(bands[0], (KpiMetric::ConfirmationRate, Band::Medium));
        assert_eq!(bands[1], (KpiMetric::DeliveryRate, Band::High));
        assert_eq!(bands[2], (KpiMetric::ProfitMargin, Band::High));
        assert_eq!(bands[3], (KpiMetric::Roi, Band::High));
    }
}
