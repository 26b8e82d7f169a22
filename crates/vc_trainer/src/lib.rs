//! VC Trainer - acquisition-outcome random forest
//!
//! Rebalances the cleaned company table, splits it into train, validation
//! and test partitions, fits the feature transforms and a random forest on
//! the training rows, reports on the held-out rows and persists everything
//! as one verifiable artifact.

pub mod artifact;
pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod matrix;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod resample;
pub mod split;
pub mod trainer;

use std::path::Path;

pub use artifact::{ArtifactMetadata, ForestArtifact, SavedArtifact};
pub use cart::{CartBuilder, Node, Tree, TreeConfig};
pub use config::TrainerConfig;
pub use dataset::{load_cleaned, status_label, Dataset, FeatureSpec};
pub use deterministic::{derive_seed, seeded_rng};
pub use errors::{Result, TrainerError};
pub use matrix::FeatureMatrix;
pub use metrics::{ClassificationReport, ConfusionMatrix, Evaluation};
pub use pipeline::{ModelBuilder, TrainingOutcome};
pub use preprocess::{FeaturePipeline, OneHotEncoder, StandardScaler};
pub use resample::balance_classes;
pub use split::{partition, train_test_split, Partitions, Split};
pub use trainer::{ForestConfig, ForestTrainer, MaxFeatures, RandomForest};

/// Train a model from a cleaned CSV and keep it in memory.
pub fn train_model_from_csv(path: &Path, config: TrainerConfig) -> Result<(ForestArtifact, TrainingOutcome)> {
    let table = load_cleaned(path)?;
    ModelBuilder::new(config).fit(table)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
