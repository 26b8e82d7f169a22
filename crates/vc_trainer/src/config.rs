//! `[trainer]` configuration section

use serde::{Deserialize, Serialize};

use crate::resample::DEFAULT_SAMPLES_PER_CLASS;
use crate::trainer::ForestConfig;

/// Resampling, splitting, thresholding and forest settings.
///
/// One seed drives resampling, both splits and forest growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub seed: u64,
    pub samples_per_class: usize,
    pub test_fraction: f64,
    pub validation_fraction: f64,
    /// Probabilities strictly above this are predicted acquired
    pub threshold: f64,
    /// Also write a JSON manifest beside the model
    pub write_manifest: bool,
    pub forest: ForestConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            samples_per_class: DEFAULT_SAMPLES_PER_CLASS,
            test_fraction: 0.2,
            validation_fraction: 0.25,
            threshold: 0.5,
            write_manifest: true,
            forest: ForestConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trainer::MaxFeatures;
    use std::io::Write;
    use vc_core::load_layered;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Settings {
        trainer: TrainerConfig,
    }

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.samples_per_class, 5_000);
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.max_depth, None);
        assert_eq!(config.forest.max_features, MaxFeatures::Sqrt);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[trainer]\nseed = 7\n\n[trainer.forest]\nn_trees = 12\nmax_depth = 8\nmax_features = \"log2\""
        )
        .unwrap();
        file.flush().unwrap();

        let settings: Settings = load_layered(Some(file.path())).unwrap();
        assert_eq!(settings.trainer.seed, 7);
        assert_eq!(settings.trainer.test_fraction, 0.2);
        assert_eq!(settings.trainer.forest.n_trees, 12);
        assert_eq!(settings.trainer.forest.max_depth, Some(8));
        assert_eq!(settings.trainer.forest.max_features, MaxFeatures::Log2);
        assert_eq!(settings.trainer.forest.min_samples_leaf, 1);
    }
}
