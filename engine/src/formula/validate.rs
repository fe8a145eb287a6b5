// Structural check for formulas, run without real variable values
use shared::models::{ElementKind, Formula};

use super::evaluate::CompiledFormula;

/// Smoke test used by the formula builder before a formula can be saved.
///
/// Every variable is bound to `1` and the formula is parsed and evaluated; only
/// syntax failures reject it; arithmetic ones (e.g. `a / (a - a)`) do not. A
/// non-empty formula also needs at least one operator and one variable.
pub fn validate(formula: &Formula) -> bool {
    if formula.is_empty() {
        return true;
    }

    if !formula.has_kind(ElementKind::Operator) || !formula.has_kind(ElementKind::Variable) {
        return false;
    }

    let outcome = CompiledFormula::compile(formula).and_then(|compiled| compiled.evaluate_with(&|_: &str| 1.0));
    match outcome {
        Ok(_) => true,
        Err(e) if e.is_syntax() => {
            tracing::debug!(formula = %formula.to_expression_string(), error = %e, "Formula rejected by validation");
            false
        }
        Err(_) => true,
    }
}
