// Formula evaluation against a variable binding
use shared::models::{Formula, VariableBinding};

use super::parser::{self, Program};
use super::EvalError;

/// A parsed formula that can be evaluated repeatedly with different bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    // None for the empty formula, which always evaluates to 0.
    program: Option<Program>,
}

impl CompiledFormula {
    pub fn compile(formula: &Formula) -> Result<Self, EvalError> {
        if formula.is_empty() {
            return Ok(Self { program: None });
        }
        Ok(Self {
            program: Some(parser::parse(formula)?),
        })
    }

    /// Unbound variables count as 0.
    pub fn evaluate(&self, bindings: &VariableBinding) -> Result<f64, EvalError> {
        self.evaluate_with(&|name: &str| bindings.get(name).copied().unwrap_or(0.0))
    }

    pub fn evaluate_with<F>(&self, resolve: &F) -> Result<f64, EvalError>
    where
        F: Fn(&str) -> f64,
    {
        let Some(program) = &self.program else {
            return Ok(0.0);
        };
        let value = program.eval(resolve)?;
        if !value.is_finite() {
            return Err(EvalError::NonFinite);
        }
        Ok(value)
    }
}

pub fn try_evaluate(formula: &Formula, bindings: &VariableBinding) -> Result<f64, EvalError> {
    CompiledFormula::compile(formula)?.evaluate(bindings)
}

/// Evaluates a formula, returning 0 for anything that cannot produce a finite
/// number. Half-built formulas are a normal state in the builder.
pub fn evaluate(formula: &Formula, bindings: &VariableBinding) -> f64 {
    match try_evaluate(formula, bindings) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(
                formula = %formula.to_expression_string(),
                error = %e,
                "Formula evaluation failed, using 0"
            );
            0.0
        }
    }
}

/// Evaluates a set of named formulas against the same binding, keeping order.
pub fn evaluate_all<'a, I>(formulas: I, bindings: &VariableBinding) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (&'a str, &'a Formula)>,
{
    formulas
        .into_iter()
        .map(|(name, formula)| (name.to_string(), evaluate(formula, bindings)))
        .collect()
}
