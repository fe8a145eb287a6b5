// Engine settings: per-country fee schedules and KPI thresholds, loaded from JSON
use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::models::{CallCenterFees, ProductForm, ProfitabilityInputs, RateThreshold};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::EngineError;
use crate::kpi::KpiMetric;

const DEFAULT_SETTINGS_JSON: &str = include_str!("../../assets/settings.json");

/// Country-dependent costs the product form does not ask for.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct CountrySettings {
    pub shipping_cost: f64,
    pub return_shipping_cost: f64,
    pub cod_fee_pct: f64,
    #[serde(default)]
    pub call_center_fees: CallCenterFees,
    #[serde(default)]
    pub monthly_charge_per_unit: f64,
}

impl CountrySettings {
    /// Combines the product form with this country's fees. A monthly charge
    /// given on the form wins over the country default.
    pub fn resolve_inputs(&self, form: &ProductForm) -> ProfitabilityInputs {
        ProfitabilityInputs {
            purchase_price: form.purchase_price,
            sale_price: form.sale_price,
            target_stock: form.target_stock,
            confirmation_rate_pct: form.confirmation_rate_pct,
            delivery_rate_pct: form.delivery_rate_pct,
            cost_per_lead: form.cost_per_lead,
            shipping_cost: self.shipping_cost,
            return_shipping_cost: self.return_shipping_cost,
            call_center_fees: self.call_center_fees,
            cod_fee_pct: self.cod_fee_pct,
            monthly_charge_per_unit: form.monthly_charge_per_unit.unwrap_or(self.monthly_charge_per_unit),
            use_call_center: form.use_call_center,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EngineSettings {
    pub default_country: String,
    #[serde(default)]
    pub countries: BTreeMap<String, CountrySettings>,
    #[serde(default)]
    pub kpi_thresholds: BTreeMap<String, BTreeMap<KpiMetric, RateThreshold>>,
    // Used when a country has no threshold of its own for a metric.
    #[serde(default)]
    pub default_kpi_thresholds: BTreeMap<KpiMetric, RateThreshold>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl EngineSettings {
    pub fn new(default_country: &str) -> Self {
        EngineSettings {
            default_country: normalize_code(default_country),
            countries: BTreeMap::new(),
            kpi_thresholds: BTreeMap::new(),
            default_kpi_thresholds: BTreeMap::new(),
        }
    }

    /// The settings bundled with the engine.
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_json_str(DEFAULT_SETTINGS_JSON)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(raw)?;
        let settings = settings.normalized();
        if settings.default_country.is_empty() {
            return Err(EngineError::ConfigError("default_country must not be empty".to_string()));
        }
        tracing::info!(
            countries = settings.countries.len(),
            default_country = %settings.default_country,
            "Engine settings loaded"
        );
        Ok(settings)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        Self::from_json_str(&raw)
    }

    // Country codes are stored upper-cased so lookups are case-insensitive.
    fn normalized(self) -> Self {
        EngineSettings {
            default_country: normalize_code(&self.default_country),
            countries: self
                .countries
                .into_iter()
                .map(|(code, country)| (normalize_code(&code), country))
                .collect(),
            kpi_thresholds: self
                .kpi_thresholds
                .into_iter()
                .map(|(code, thresholds)| (normalize_code(&code), thresholds))
                .collect(),
            default_kpi_thresholds: self.default_kpi_thresholds,
        }
    }

    pub fn country(&self, code: &str) -> Result<&CountrySettings, EngineError> {
        let code = normalize_code(code);
        self.countries.get(&code).ok_or_else(|| {
            tracing::warn!(country = %code, "No settings for country");
            EngineError::UnknownCountry(code)
        })
    }

    pub fn default_country_settings(&self) -> Result<&CountrySettings, EngineError> {
        self.country(&self.default_country)
    }

    pub fn with_country(mut self, code: &str, country: CountrySettings) -> Self {
        self.countries.insert(normalize_code(code), country);
        self
    }

    /// Inserts or replaces country entries, e.g. from an imported fee schedule.
    /// Returns how many entries were replaced.
    pub fn merge_countries<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, CountrySettings)>,
    {
        let mut replaced = 0;
        for (code, country) in entries {
            if self.countries.insert(normalize_code(&code), country).is_some() {
                replaced += 1;
            }
        }
        replaced
    }

    pub fn set_threshold(&mut self, code: &str, metric: KpiMetric, threshold: RateThreshold) {
        self.kpi_thresholds
            .entry(normalize_code(code))
            .or_default()
            .insert(metric, threshold);
    }

    /// Threshold for a country and metric, falling back to the defaults.
    pub fn thresholds(&self, code: &str, metric: KpiMetric) -> Option<RateThreshold> {
        self.kpi_thresholds
            .get(&normalize_code(code))
            .and_then(|by_metric| by_metric.get(&metric))
            .or_else(|| self.default_kpi_thresholds.get(&metric))
            .copied()
    }

    /// Builds pipeline inputs for a product sold in `code`.
    pub fn resolve_inputs(&self, code: &str, form: &ProductForm) -> Result<ProfitabilityInputs, EngineError> {
        Ok(self.country(code)?.resolve_inputs(form))
    }
}
