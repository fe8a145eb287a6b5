// User-authored arithmetic formulas: parsing, evaluation and validation
pub mod evaluate;
pub mod parser;
pub mod validate;

pub use evaluate::{evaluate, evaluate_all, try_evaluate, CompiledFormula};
pub use validate::validate;

use thiserror::Error;

/// Why a formula could not produce a number.
///
/// These never reach the dashboard as failures: [`evaluate`] turns them into 0
/// and [`validate`] into `false`. [`try_evaluate`] exposes them for callers that
/// need to tell a legitimate 0 from a failed one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    #[error("Unbalanced parenthesis")]
    UnbalancedParenthesis,

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Formula nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFinite,
}

impl EvalError {
    /// True for structural problems (the formula cannot be parsed), false for
    /// arithmetic failures of an otherwise well-formed formula.
    pub fn is_syntax(&self) -> bool {
        !matches!(self, EvalError::DivisionByZero | EvalError::NonFinite)
    }
}
