//! VC Cleaner - raw funding records to a model-ready table
//!
//! Repairs missing and malformed fields, expands the category list into
//! indicator columns, derives date-delta features and one-hot encodes the
//! founding-date and geography dimensions.

pub mod categories;
pub mod config;
pub mod dates;
pub mod encoding;
pub mod errors;
pub mod funding;
pub mod names;
pub mod pipeline;
pub mod schema;

use std::path::Path;

pub use config::{CleanerConfig, NameRepair};
pub use errors::{CleanerError, Result};
pub use pipeline::{CleanSummary, Cleaner};

/// Clean `input` into `output` with the default settings.
pub fn clean_file(input: &Path, output: &Path) -> Result<CleanSummary> {
    Cleaner::new(CleanerConfig::default()).run(input, output)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
