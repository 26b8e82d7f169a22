use thiserror::Error;
use vc_core::DataError;

/// Errors returned by the model builder.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Data(#[from] DataError),

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("no rows with label {label}; cannot rebalance")]
    EmptyClass { label: u8 },

    #[error("feature shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("row count mismatch: expected {expected} rows, got {actual}")]
    RowMismatch { expected: usize, actual: usize },

    #[error("{0} used before fit")]
    NotFitted(&'static str),

    #[error("training error: {0}")]
    Training(String),

    #[error("persistence error: {0}")]
    Persist(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
