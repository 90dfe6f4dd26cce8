//! Errors of the estimation and control operations.
//!
//! Numerical operations either complete or fail as a whole, there are no partial results.

use thiserror::Error;

/// Errors that can occur in a tracking, filtering or simulation operation.
#[derive(Error, Debug)]
pub enum EstimateError {
    /// A matrix or vector has a shape incompatible with the model
    #[error("Dimension mismatch in {what}: expected {expected:?}, got {found:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Two sequences that are consumed step by step have different lengths
    #[error("Length mismatch in {what}: expected {expected}, got {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A matrix that must be inverted is not positive definite
    #[error("Singular matrix: {0}")]
    Singular(&'static str),

    /// A covariance is not positive semi-definite
    #[error("Not positive semi-definite: {0}")]
    NotPSD(&'static str),

    /// A scalar parameter is outside its domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Scenario file could not be parsed
    #[error("Invalid scenario: {0}")]
    Config(#[from] toml::de::Error),

    /// Scenario file could not be read
    #[error("Scenario file: {0}")]
    Io(#[from] std::io::Error),
}
