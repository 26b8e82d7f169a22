//! End-to-end model building

use std::path::Path;
use tracing::info;
use vc_core::Table;

use crate::artifact::{ArtifactMetadata, ForestArtifact, SavedArtifact};
use crate::config::TrainerConfig;
use crate::dataset::{load_cleaned, Dataset, FeatureSpec, NON_FEATURES};
use crate::errors::Result;
use crate::metrics::Evaluation;
use crate::preprocess::FeaturePipeline;
use crate::resample::balance_classes;
use crate::split::{partition, Partitions};
use crate::trainer::{ForestTrainer, RandomForest};

/// What a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub labeled_rows: usize,
    pub class_counts: (usize, usize),
    pub train_rows: usize,
    pub validation: Evaluation,
    pub test: Evaluation,
}

/// Builds and persists the acquisition model from a cleaned table
pub struct ModelBuilder {
    config: TrainerConfig,
}

impl ModelBuilder {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Read `input`, train, evaluate and save the artifact to `output`
    pub fn run(&self, input: &Path, output: &Path) -> Result<(TrainingOutcome, SavedArtifact)> {
        info!("Loading cleaned dataset from: {}", input.display());
        let table = load_cleaned(input)?;
        let (artifact, outcome) = self.fit(table)?;

        let saved = artifact.save(output, self.config.write_manifest)?;
        if saved.model_path.exists() {
            info!("[DONE] Model saved to {}", saved.model_path.display());
        }
        Ok((outcome, saved))
    }

    /// Train and evaluate in memory
    pub fn fit(&self, table: Table) -> Result<(ForestArtifact, TrainingOutcome)> {
        let cfg = &self.config;

        let mut spec = FeatureSpec::partition(&table);
        spec.exclude(&NON_FEATURES)?;
        info!(
            "Features: {} numeric, {} categorical",
            spec.numeric.len(),
            spec.categorical.len()
        );

        let dataset = Dataset::from_table(table)?;
        let labeled_rows = dataset.len();
        let (negatives, positives) = dataset.class_counts();
        info!(
            "Loaded {} labeled rows ({} acquired, {} not acquired)",
            labeled_rows, positives, negatives
        );

        let balanced = dataset.take(&balance_classes(&dataset.labels, cfg.samples_per_class, cfg.seed)?);
        let class_counts = balanced.class_counts();
        info!(
            "Resampled to {} not acquired / {} acquired",
            class_counts.0, class_counts.1
        );

        let Partitions {
            train,
            validation,
            test,
        } = partition(&balanced, cfg.test_fraction, cfg.validation_fraction, cfg.seed)?;
        info!(
            "Split: train={} validation={} test={}",
            train.len(),
            validation.len(),
            test.len()
        );

        let features = FeaturePipeline::fit(spec, &train.table)?;
        let x_train = features.transform(&train.table)?;
        info!("Encoded {} features", x_train.n_cols());

        let forest = ForestTrainer::new(cfg.forest.clone(), cfg.seed).train(&x_train, &train.labels)?;

        let validation_eval = self.evaluate(&forest, &features, &validation)?;
        log_evaluation("Validation", &validation_eval);
        let test_eval = self.evaluate(&forest, &features, &test)?;
        log_evaluation("Test", &test_eval);

        let metadata = ArtifactMetadata {
            version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().timestamp(),
            seed: cfg.seed,
            forest: cfg.forest.clone(),
            training_rows: train.len(),
            feature_count: x_train.n_cols(),
            model_hash: forest.model_hash()?,
            validation: validation_eval.clone(),
            test: test_eval.clone(),
        };
        let artifact = ForestArtifact {
            metadata,
            feature_names: features.feature_names(),
            features,
            forest,
        };

        let outcome = TrainingOutcome {
            labeled_rows,
            class_counts,
            train_rows: train.len(),
            validation: validation_eval,
            test: test_eval,
        };
        Ok((artifact, outcome))
    }

    fn evaluate(
        &self,
        forest: &RandomForest,
        features: &FeaturePipeline,
        data: &Dataset,
    ) -> Result<Evaluation> {
        let x = features.transform(&data.table)?;
        let predicted = forest.predict(&x, self.config.threshold)?;
        Evaluation::new(&data.labels, &predicted)
    }
}

fn log_evaluation(name: &str, evaluation: &Evaluation) {
    info!("{} confusion matrix:\n{}", name, evaluation.confusion);
    info!("{} classification report:\n{}", name, evaluation.report);
}
