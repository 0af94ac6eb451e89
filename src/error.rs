//! Error types for the analysis pipeline
//!
//! Every error is fatal for the run that raised it: stages never retry and a
//! failed run produces no plot.

use graphscape_algorithms::AlgoError;
use thiserror::Error;

/// Analysis pipeline errors
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Feature vectors of inconsistent length
    #[error("Dimension mismatch at row {row}: expected {expected} features, got {got}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Empty or non-numeric cell where a feature value is required
    #[error("Missing value at row {row}, column '{column}'")]
    MissingValue { row: usize, column: String },

    /// Cell that could not be parsed as a number
    #[error("Invalid value '{value}' at row {row}, column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Table with no rows (possibly after filtering)
    #[error("Empty table: {0}")]
    EmptyTable(String),

    /// Two rows share a graph identifier
    #[error("Duplicate graph id: {0}")]
    DuplicateGraphId(String),

    /// Input header does not contain a required column
    #[error("Missing column '{0}' in input header")]
    MissingColumn(String),

    /// Cluster count outside [1, number of points]
    #[error("Invalid cluster count {k}: must be between 1 and {max}")]
    InvalidClusterCount { k: usize, max: usize },

    /// Derived tables disagree on length or row identity
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// Category without a configured color
    #[error("No color mapped for category '{0}'")]
    UnmappedCategory(String),

    /// Cluster label without a configured marker
    #[error("No marker mapped for cluster {0}")]
    UnmappedCluster(usize),

    /// Hyperparameter or configuration value out of range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl From<AlgoError> for AnalysisError {
    fn from(err: AlgoError) -> Self {
        match err {
            AlgoError::EmptyInput(msg) => AnalysisError::EmptyTable(msg),
            AlgoError::DimensionMismatch { row, expected, got } => {
                AnalysisError::DimensionMismatch { row, expected, got }
            }
            AlgoError::NonFinite { row, column } => AnalysisError::MissingValue {
                row,
                column: format!("#{}", column),
            },
            AlgoError::InvalidClusterCount { k, max } => {
                AnalysisError::InvalidClusterCount { k, max }
            }
            AlgoError::InvalidParameter { name, reason } => AnalysisError::InvalidParameter {
                name: name.to_string(),
                reason,
            },
        }
    }
}
