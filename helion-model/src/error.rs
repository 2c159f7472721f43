use thiserror::Error;

/// Errors produced by model constructors and wire conversions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid status string: {0:?}")]
    InvalidStatus(String),
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}
