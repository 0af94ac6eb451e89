//! Error types for the numeric kernels

use thiserror::Error;

/// Errors raised while validating inputs to an algorithm
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgoError {
    /// No rows were supplied
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A row does not have the same number of columns as the first row
    #[error("Dimension mismatch at row {row}: expected {expected} columns, got {got}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// NaN or infinite value in the input matrix
    #[error("Non-finite value at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },

    /// Requested cluster count is outside [1, n_points]
    #[error("Invalid cluster count {k}: must be between 1 and {max}")]
    InvalidClusterCount { k: usize, max: usize },

    /// A hyperparameter is out of its valid range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type AlgoResult<T> = Result<T, AlgoError>;
