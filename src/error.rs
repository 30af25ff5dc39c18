use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised while building datasets, evaluating predicates and
/// computing selectivities.
#[derive(Debug, Error)]
pub enum SelectivityError {
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),

    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("row {row}: {reason}")]
    SchemaMismatch { row: usize, reason: String },

    #[error("cannot combine masks of length {left} and {right}")]
    MaskLengthMismatch { left: usize, right: usize },

    /// Selectivity of an empty dataset is undefined under the default policy.
    #[error("selectivity is undefined for an empty dataset")]
    EmptyDataset,

    #[error("invalid predicate '{input}': {reason}")]
    InvalidPredicate { input: String, reason: String },

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

pub type Result<T, E = SelectivityError> = std::result::Result<T, E>;
