// In-memory variable store with global and entity-scoped values
use serde::{Deserialize, Serialize};
use shared::models::{Formula, VariableBinding};
use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::formula::try_evaluate;

/// Named numeric variables for formulas. Entity-scoped values (e.g. per
/// product) shadow global ones with the same name when bindings are resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VariableStore {
    global: BTreeMap<String, f64>,
    scoped: BTreeMap<String, BTreeMap<String, f64>>,
}

fn checked_key(kind: &str, raw: &str) -> Result<String, EngineError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(EngineError::InvalidVariable(format!("{} must not be empty", kind)));
    }
    Ok(key.to_string())
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous value, if any.
    pub fn set_global(&mut self, name: &str, value: f64) -> Result<Option<f64>, EngineError> {
        let name = checked_key("variable name", name)?;
        Ok(self.global.insert(name, value))
    }

    pub fn set_scoped(&mut self, entity: &str, name: &str, value: f64) -> Result<Option<f64>, EngineError> {
        let entity = checked_key("entity", entity)?;
        let name = checked_key("variable name", name)?;
        Ok(self.scoped.entry(entity).or_default().insert(name, value))
    }

    pub fn global(&self, name: &str) -> Option<f64> {
        self.global.get(name.trim()).copied()
    }

    /// Scoped value first, then the global one.
    pub fn get(&self, entity: Option<&str>, name: &str) -> Option<f64> {
        let name = name.trim();
        entity
            .and_then(|e| self.scoped.get(e.trim()))
            .and_then(|vars| vars.get(name))
            .copied()
            .or_else(|| self.global(name))
    }

    pub fn remove_global(&mut self, name: &str) -> Option<f64> {
        self.global.remove(name.trim())
    }

    pub fn remove_scoped(&mut self, entity: &str, name: &str) -> Option<f64> {
        let entity = entity.trim();
        let vars = self.scoped.get_mut(entity)?;
        let removed = vars.remove(name.trim());
        if vars.is_empty() {
            self.scoped.remove(entity);
        }
        removed
    }

    /// Drops every variable of one entity; returns how many were removed.
    pub fn clear_scope(&mut self, entity: &str) -> usize {
        self.scoped.remove(entity.trim()).map_or(0, |vars| vars.len())
    }

    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.global.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.scoped.values().map(BTreeMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binding handed to the formula evaluator for `entity` (or globals only).
    pub fn bindings_for(&self, entity: Option<&str>) -> VariableBinding {
        let mut bindings: VariableBinding = self.global.iter().map(|(k, v)| (k.clone(), *v)).collect();
        if let Some(vars) = entity.and_then(|e| self.scoped.get(e.trim())) {
            for (name, value) in vars {
                bindings.insert(name.clone(), *value);
            }
        }
        bindings
    }

    /// Evaluates `formula` with this store's bindings for `entity`, reporting
    /// failures instead of falling back to 0.
    pub fn try_evaluate_for(&self, entity: Option<&str>, formula: &Formula) -> Result<f64, EngineError> {
        Ok(try_evaluate(formula, &self.bindings_for(entity))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{evaluate, EvalError};
    use shared::models::FormulaElement;

    fn store() -> VariableStore {
        let mut store = VariableStore::new();
        store.set_global("salePrice", 30.0).unwrap();
        store.set_global("purchasePrice", 12.0).unwrap();
        store.set_scoped("product-1", "salePrice", 45.0).unwrap();
        store
    }

    #[test]
    fn test_scoped_values_shadow_globals() {
        let store = store();
        assert_eq!(store.get(None, "salePrice"), Some(30.0));
        assert_eq!(store.get(Some("product-1"), "salePrice"), Some(45.0));
        assert_eq!(store.get(Some("product-1"), "purchasePrice"), Some(12.0));
        assert_eq!(store.get(Some("product-2"), "salePrice"), Some(30.0));
        assert_eq!(store.get(None, "missing"), None);
    }

    #[test]
    fn test_bindings_for_entity() {
        let store = store();
        let global = store.bindings_for(None);
        assert_eq!(global.len(), 2);
        assert_eq!(global["salePrice"], 30.0);

        let scoped = store.bindings_for(Some("product-1"));
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped["salePrice"], 45.0);
        assert_eq!(scoped["purchasePrice"], 12.0);
    }

    #[test]
    fn test_bindings_feed_the_evaluator() {
        let store = store();
        let margin: Formula = vec![
            FormulaElement::variable("salePrice"),
            FormulaElement::operator("−"),
            FormulaElement::variable("purchasePrice"),
        ]
        .into_iter()
        .collect();
        assert_eq!(evaluate(&margin, &store.bindings_for(None)), 18.0);
        assert_eq!(evaluate(&margin, &store.bindings_for(Some("product-1"))), 33.0);
    }

    #[test]
    fn test_set_returns_previous_value() {
        let mut store = store();
        assert_eq!(store.set_global(" salePrice ", 31.0).unwrap(), Some(30.0));
        assert_eq!(store.set_scoped("product-1", "salePrice", 46.0).unwrap(), Some(45.0));
        assert_eq!(store.set_scoped("product-1", "weight", 0.4).unwrap(), None);
    }

    #[test]
    fn test_empty_names_are_rejected() {
        let mut store = VariableStore::new();
        assert!(matches!(store.set_global("   ", 1.0), Err(EngineError::InvalidVariable(_))));
        assert!(matches!(store.set_scoped("", "x", 1.0), Err(EngineError::InvalidVariable(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = store();
        store.set_scoped("product-1", "weight", 0.4).unwrap();
        assert_eq!(store.len(), 4);

        assert_eq!(store.remove_scoped("product-1", "weight"), Some(0.4));
        assert_eq!(store.remove_scoped("product-9", "weight"), None);
        assert_eq!(store.clear_scope("product-1"), 1);
        assert_eq!(store.clear_scope("product-1"), 0);
        assert_eq!(store.remove_global("purchasePrice"), Some(12.0));
        assert_eq!(store.global_names().collect::<Vec<_>>(), vec!["salePrice"]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_try_evaluate_for_reports_failures() {
        let store = store();
        let per_unit = Formula::from_elements(vec![
            FormulaElement::variable("salePrice"),
            FormulaElement::operator("÷"),
            FormulaElement::variable("weight"),
        ]);
        let err = store.try_evaluate_for(Some("product-1"), &per_unit).unwrap_err();
        assert!(matches!(err, EngineError::FormulaError(EvalError::DivisionByZero)));
        assert_eq!(err.code(), "formula");

        let mut store = store;
        store.set_scoped("product-1", "weight", 0.5).unwrap();
        assert_eq!(store.try_evaluate_for(Some("product-1"), &per_unit).unwrap(), 90.0);
    }
}
