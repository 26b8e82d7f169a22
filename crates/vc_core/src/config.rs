//! Layered configuration shared by the pipeline binaries
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! then `VC_`-prefixed environment variables (`VC_TRAINER__SEED=7`). Each
//! binary deserializes only the sections it reads.

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{DataError, Result};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "VC";

/// File locations used by both stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw company funding records
    pub raw_input: PathBuf,
    /// Cleaner output, trainer input
    pub cleaned_output: PathBuf,
    /// Serialized classifier
    pub model_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_input: PathBuf::from("data/investments_VC.csv"),
            cleaned_output: PathBuf::from("data/cleaned_data.csv"),
            model_output: PathBuf::from("rf-up-86.bin"),
        }
    }
}

/// Output style of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Load `T` from defaults, an optional file and the environment.
///
/// A file that was named explicitly but does not exist is an error.
pub fn load_layered<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(DataError::NotFound(path.to_path_buf()));
        }
        builder = builder.add_source(File::from(path));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    Ok(builder.build()?.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        paths: PathsConfig,
        logging: LoggingConfig,
    }

    #[test]
    fn test_defaults_without_file() {
        let sample: Sample = load_layered(None).unwrap();
        assert_eq!(sample.paths, PathsConfig::default());
        assert_eq!(sample.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_file_overrides_defaults() -> anyhow::Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[paths]\ncleaned_output = \"out/clean.csv\"\n[logging]\nformat = \"compact\"")?;
        file.flush()?;

        let sample: Sample = load_layered(Some(file.path()))?;
        assert_eq!(sample.paths.cleaned_output, PathBuf::from("out/clean.csv"));
        assert_eq!(sample.paths.raw_input, PathsConfig::default().raw_input);
        assert_eq!(sample.logging.format, LogFormat::Compact);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_layered::<Sample>(Some(Path::new("nope/missing.toml"))).unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }
}
