//! Random forest trainer
//!
//! Trees are grown in parallel, each on its own bootstrap sample and its own
//! generator derived from the forest seed, so the result does not depend on
//! thread scheduling.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{CartBuilder, Tree, TreeConfig};
use crate::deterministic::{derive_seed, seeded_rng};
use crate::errors::{Result, TrainerError};
use crate::matrix::FeatureMatrix;

/// Features examined per split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    #[default]
    Sqrt,
    Log2,
    All,
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
        }
    }
}

/// Trained ensemble of classification trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<Tree>,
    pub n_features: usize,
}

impl RandomForest {
    /// Mean of the trees' leaf fractions for every row
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if features.n_cols() != self.n_features {
            return Err(TrainerError::ShapeMismatch {
                expected: self.n_features,
                actual: features.n_cols(),
            });
        }
        if self.trees.is_empty() {
            return Err(TrainerError::NotFitted("random forest"));
        }
        let n_trees = self.trees.len() as f64;
        Ok((0..features.n_rows())
            .into_par_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .map(|t| t.predict(features, row) as f64)
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }

    /// Positive where the probability exceeds `threshold`
    pub fn predict(&self, features: &FeatureMatrix, threshold: f64) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(features)?
            .into_iter()
            .map(|p| u8::from(p > threshold))
            .collect())
    }

    /// BLAKE3 over the serialized trees
    pub fn model_hash(&self) -> Result<String> {
        let bytes = bincode::serialize(&self.trees).map_err(|e| TrainerError::Persist(e.to_string()))?;
        Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
    }
}

/// Random forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
    seed: u64,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn train(&self, features: &FeatureMatrix, labels: &[u8]) -> Result<RandomForest> {
        let n_samples = features.n_rows();
        if n_samples != labels.len() {
            return Err(TrainerError::RowMismatch {
                expected: n_samples,
                actual: labels.len(),
            });
        }
        if n_samples == 0 || features.n_cols() == 0 {
            return Err(TrainerError::Training("empty training matrix".into()));
        }
        if self.config.n_trees == 0 {
            return Err(TrainerError::Training("n_trees must be positive".into()));
        }

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self.config.max_features.resolve(features.n_cols()),
        };
        info!(
            "Growing {} trees on {} samples x {} features ({} per split)",
            self.config.n_trees,
            n_samples,
            features.n_cols(),
            tree_config.max_features
        );

        let builder = CartBuilder::new(features, labels, tree_config);
        let trees: Vec<Tree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = seeded_rng(derive_seed(self.seed, t as u64));
                let samples = if self.config.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                let tree = builder.build(samples, &mut rng);
                debug!("tree {} done: {} nodes, depth {}", t + 1, tree.nodes.len(), tree.depth());
                tree
            })
            .collect();

        Ok(RandomForest {
            trees,
            n_features: features.n_cols(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_threshold_data() -> (FeatureMatrix, Vec<u8>) {
        let mut rng = seeded_rng(11);
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..200 {
            let x = i as f32 / 200.0;
            rows.push(vec![x, rng.gen::<f32>(), (i % 3) as f32]);
            labels.push(u8::from(x > 0.6));
        }
        (FeatureMatrix::from_rows(&rows).unwrap(), labels)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 15,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(100), 10);
        assert_eq!(MaxFeatures::Sqrt.resolve(3), 1);
        assert_eq!(MaxFeatures::Log2.resolve(1024), 10);
        assert_eq!(MaxFeatures::All.resolve(7), 7);
        assert_eq!(MaxFeatures::Sqrt.resolve(0), 1);
    }

    #[test]
    fn test_forest_learns_threshold() {
        let (features, labels) = noisy_threshold_data();
        let forest = ForestTrainer::new(small_config(), 42).train(&features, &labels).unwrap();

        assert_eq!(forest.trees.len(), 15);
        let predicted = forest.predict(&features, 0.5).unwrap();
        let correct = predicted.iter().zip(&labels).filter(|(p, l)| p == l).count();
        assert!(correct >= 190, "training accuracy too low: {correct}/200");

        let proba = forest.predict_proba(&features).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (features, labels) = noisy_threshold_data();
        let a = ForestTrainer::new(small_config(), 42).train(&features, &labels).unwrap();
        let b = ForestTrainer::new(small_config(), 42).train(&features, &labels).unwrap();
        let c = ForestTrainer::new(small_config(), 43).train(&features, &labels).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.model_hash().unwrap(), b.model_hash().unwrap());
        assert_ne!(a.model_hash().unwrap(), c.model_hash().unwrap());
    }

    #[test]
    fn test_shape_mismatch() {
        let (features, labels) = noisy_threshold_data();
        let forest = ForestTrainer::new(small_config(), 1).train(&features, &labels).unwrap();
        let narrow = FeatureMatrix::from_rows(&[vec![0.5, 0.5]]).unwrap();
        assert!(matches!(
            forest.predict_proba(&narrow),
            Err(TrainerError::ShapeMismatch { expected: 3, actual: 2 })
        ));
        assert!(ForestTrainer::new(small_config(), 1)
            .train(&features, &labels[..10])
            .is_err());
    }
}
