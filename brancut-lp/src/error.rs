//! Error types for model construction.

use thiserror::Error;

/// Errors raised while building or validating an [`LpModel`](crate::LpModel).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    /// Vectors describing the model disagree in length.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A column index does not exist in the model.
    #[error("Column index {index} out of range ({num_cols} columns)")]
    ColumnOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of columns in the model.
        num_cols: usize,
    },

    /// A row index does not exist in the model.
    #[error("Row index {index} out of range ({num_rows} rows)")]
    RowOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of rows in the model.
        num_rows: usize,
    },

    /// NaN or infinite data where a finite number is required.
    #[error("Non-finite value in {0}")]
    NonFinite(String),

    /// Lower bound above upper bound.
    #[error("Crossed bounds on {what}: lower {lower} > upper {upper}")]
    CrossedBounds {
        /// Which row or column.
        what: String,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
}

/// Result type for model operations.
pub type LpResult<T> = Result<T, LpError>;
