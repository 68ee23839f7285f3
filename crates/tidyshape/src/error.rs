//! Error types for the tidyshape library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tidyshape operations.
///
/// Every transform returns errors as values. Tables are immutable, so a failed
/// operation never leaves a partially modified table behind.
#[derive(Debug, Error)]
pub enum TidyError {
    /// A referenced column is absent, a name collides, or a type does not fit.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Long-to-wide pivot found the same identifier combination and key twice.
    #[error("Ambiguous pivot: key '{key}' appears for the same identifiers at rows {first_row} and {second_row}")]
    AmbiguousPivot {
        key: String,
        first_row: usize,
        second_row: usize,
    },

    /// A pattern failed to match a value in strict extraction mode.
    #[error("Extraction failed for column '{column}' at row {row}: '{value}'")]
    Extraction {
        column: String,
        row: usize,
        value: String,
    },

    /// Partitioned extraction did not select every row exactly once.
    #[error("Coverage error: uncovered rows {uncovered:?}, rows in several partitions {overlapping:?}")]
    Coverage {
        uncovered: Vec<usize>,
        overlapping: Vec<usize>,
    },

    /// Fewer than two paired observations for a correlation cell.
    #[error("Insufficient data for correlation of '{left}' and '{right}': {pairs} paired observation(s)")]
    InsufficientData {
        left: String,
        right: String,
        pairs: usize,
    },

    /// Integer reduction overflowed.
    #[error("Integer overflow while reducing column '{column}'")]
    Overflow { column: String },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cell in a fixture file could not be parsed as its declared type.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Empty file or no data to read.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TidyError {
    /// Shorthand for a missing-column schema error.
    pub(crate) fn missing_column(name: &str) -> Self {
        TidyError::Schema(format!("Column '{}' not found", name))
    }
}

/// Result type alias for tidyshape operations.
pub type Result<T> = std::result::Result<T, TidyError>;
