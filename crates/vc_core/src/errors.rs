//! Error types for tabular data handling

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, reshaping or writing tables
#[derive(Error, Debug)]
pub enum DataError {
    /// Input file does not exist
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizer or writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Expected column is absent
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Column exists but has the wrong shape or storage type
    #[error("schema violation: {0}")]
    Schema(String),

    /// A cell could not be parsed into its target type
    #[error("cannot parse {column}[{row}] = {value:?}: {reason}")]
    Parse {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    /// Layered configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;
