//! Error taxonomy for the Box 3 engine
//!
//! Every error is raised at the entry boundary, before any calculation runs.

use thiserror::Error;

/// Rate table lookup and loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no Box 3 rate table entry for tax year {0} (supported: 2022-2025)")]
    UnsupportedYear(u16),

    #[error("failed to read rate table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rate table: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file}: missing column {column}")]
    MissingColumn { file: &'static str, column: &'static str },

    #[error("{file}: invalid value {value:?} in column {column}")]
    InvalidValue {
        file: &'static str,
        column: &'static str,
        value: String,
    },
}

/// Input record rejected by the validation pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Path of the offending field, e.g. `assets[2].amount`
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure reading a household snapshot from disk
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed household JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed positions CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Any failure surfaced by [`crate::ComparisonEngine`]
#[derive(Debug, Error)]
pub enum Box3Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Box3Result<T> = Result<T, Box3Error>;
