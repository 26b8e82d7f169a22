//! VC Core - tabular data model and shared plumbing
//!
//! Holds the pieces both pipeline stages need: a typed columnar [`Table`],
//! CSV I/O with encoding fallback and dtype inference, layered configuration
//! and tracing setup.

pub mod config;
pub mod errors;
pub mod io;
pub mod logging;
pub mod table;

pub use config::{load_layered, LogFormat, LoggingConfig, PathsConfig};
pub use errors::{DataError, Result};
pub use io::{infer_column, read_raw_csv, read_typed_csv, write_csv};
pub use logging::init_logging;
pub use table::{format_float, Cell, Column, DType, Table};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
