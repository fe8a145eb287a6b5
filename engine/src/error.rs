use thiserror::Error;

use crate::formula::EvalError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Settings JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("Invalid variable: {0}")]
    InvalidVariable(String),

    #[error("Formula error: {0}")]
    FormulaError(#[from] EvalError),

    // Wraps loader errors that already carry anyhow context.
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    /// Short machine-readable code for the dashboard to switch on.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigError(_) | EngineError::JsonError { .. } => "config",
            EngineError::CsvSystemError { .. } | EngineError::CsvDataFormatError(_) => "csv",
            EngineError::IoError { .. } => "io",
            EngineError::UnknownCountry(_) => "unknown_country",
            EngineError::InvalidVariable(_) => "invalid_variable",
            EngineError::FormulaError(_) => "formula",
            EngineError::AnyhowError(_) => "internal",
        }
    }
}
