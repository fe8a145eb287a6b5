use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Variable name -> numeric value, built by the dashboard from its variable store.
pub type VariableBinding = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Operator,
    Variable,
    Number,
    Parenthesis,
}

/// One token of a user-built formula. `id` only exists so the UI can diff its
/// element list; evaluation never looks at it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormulaElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub value: String,
}

impl FormulaElement {
    pub fn new(kind: ElementKind, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            value: value.into(),
        }
    }

    pub fn operator(value: impl Into<String>) -> Self {
        Self::new(ElementKind::Operator, value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(ElementKind::Variable, name)
    }

    pub fn number(literal: impl Into<String>) -> Self {
        Self::new(ElementKind::Number, literal)
    }

    pub fn paren(value: impl Into<String>) -> Self {
        Self::new(ElementKind::Parenthesis, value)
    }
}

/// Ordered sequence of formula elements, as the user assembled them.
///
/// Two formulas are equal when their elements match by kind and value; element
/// ids are ignored. `FormulaElement` equality does include the id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Formula {
    elements: Vec<FormulaElement>,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<FormulaElement>) -> Self {
        Self { elements }
    }

    /// Appends an element with a freshly generated id.
    pub fn push(&mut self, kind: ElementKind, value: impl Into<String>) -> &mut Self {
        self.elements.push(FormulaElement::new(kind, value));
        self
    }

    pub fn elements(&self) -> &[FormulaElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_kind(&self, kind: ElementKind) -> bool {
        self.elements.iter().any(|e| e.kind == kind)
    }

    /// A formula is worth keeping once it has an operand and an operator.
    pub fn is_non_trivial(&self) -> bool {
        let has_operand = self
            .elements
            .iter()
            .any(|e| matches!(e.kind, ElementKind::Variable | ElementKind::Number));
        has_operand && self.has_kind(ElementKind::Operator)
    }

    /// Distinct variable names, in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for element in &self.elements {
            if element.kind == ElementKind::Variable && !names.contains(&element.value.as_str()) {
                names.push(element.value.as_str());
            }
        }
        names
    }

    /// Preview text for the formula builder, e.g. `salePrice × 2`.
    pub fn to_expression_string(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.kind == b.kind && a.value == b.value)
    }
}

impl FromIterator<FormulaElement> for Formula {
    fn from_iter<I: IntoIterator<Item = FormulaElement>>(iter: I) -> Self {
        Self::from_elements(iter.into_iter().collect())
    }
}

/// Band boundaries for one KPI. Intended as low < medium < high, not enforced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateThreshold {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CallCenterFees {
    pub lead: f64,
    pub confirmation: f64,
    pub delivered: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityInputs {
    pub purchase_price: f64,
    pub sale_price: f64,
    pub target_stock: f64,
    pub confirmation_rate_pct: f64,
    pub delivery_rate_pct: f64,
    pub cost_per_lead: f64,
    pub shipping_cost: f64,
    pub return_shipping_cost: f64,
    pub call_center_fees: CallCenterFees,
    pub cod_fee_pct: f64,
    pub monthly_charge_per_unit: f64,
    pub use_call_center: bool,
}

/// Per-product form fields; the country-dependent fees come from settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub purchase_price: f64,
    pub sale_price: f64,
    pub target_stock: f64,
    pub confirmation_rate_pct: f64,
    pub delivery_rate_pct: f64,
    pub cost_per_lead: f64,
    pub use_call_center: bool,
    #[serde(default)]
    pub monthly_charge_per_unit: Option<f64>,
}

/// `shipping` already includes `returns`; the latter is reported separately
/// for the breakdown chart only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub product: f64,
    pub shipping: f64,
    pub returns: f64,
    pub call_center: f64,
    pub cod: f64,
    pub advertising: f64,
    pub monthly_charges: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.product + self.shipping + self.call_center + self.cod + self.advertising + self.monthly_charges
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityResult {
    pub required_leads: f64,
    pub confirmed_orders: f64,
    pub delivered_orders: f64,
    pub returned_orders: f64,
    pub total_sales: f64,
    pub total_cost: f64,
    pub cost_breakdown: CostBreakdown,
    pub total_profit: f64,
    pub profit_margin_pct: f64,
    pub profit_per_delivered_unit: f64,
    pub roi_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockProjection {
    pub stock: f64,
    pub expected_deliveries: f64,
    pub expected_returns: f64,
}
