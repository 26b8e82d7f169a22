//! Persisted model artifact
//!
//! The forest is stored together with the fitted transforms and the feature
//! names, so a loaded artifact scores raw cleaned rows directly. The file is
//! bincode; a `.hash` sidecar holds its hex BLAKE3 digest and an optional
//! `.json` manifest holds the metadata as pretty JSON with sorted keys.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vc_core::Table;

use crate::errors::{Result, TrainerError};
use crate::metrics::Evaluation;
use crate::preprocess::FeaturePipeline;
use crate::trainer::{ForestConfig, RandomForest};

/// Provenance and scores recorded at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub version: String,
    pub created_at: i64,
    pub seed: u64,
    pub forest: ForestConfig,
    pub training_rows: usize,
    pub feature_count: usize,
    pub model_hash: String,
    pub validation: Evaluation,
    pub test: Evaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub metadata: ArtifactMetadata,
    pub features: FeaturePipeline,
    pub feature_names: Vec<String>,
    pub forest: RandomForest,
}

/// Where [`ForestArtifact::save`] wrote its files
#[derive(Debug, Clone)]
pub struct SavedArtifact {
    pub model_path: PathBuf,
    pub hash_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub hash: String,
}

/// `<model>.hash` beside the model file
pub fn hash_path_for(path: &Path) -> PathBuf {
    path.with_extension("hash")
}

/// `<model>.json` beside the model file
pub fn manifest_path_for(path: &Path) -> PathBuf {
    path.with_extension("json")
}

#[derive(Serialize)]
struct Manifest<'a> {
    metadata: &'a ArtifactMetadata,
    feature_names: &'a [String],
}

impl Manifest<'_> {
    /// Going through `Value` orders every object's keys
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&serde_json::to_value(self)?)
    }
}

impl ForestArtifact {
    fn check_shape(&self) -> Result<()> {
        let expected = self.forest.n_features;
        for actual in [self.feature_names.len(), self.features.n_features()] {
            if actual != expected {
                return Err(TrainerError::ShapeMismatch { expected, actual });
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path, write_manifest: bool) -> Result<SavedArtifact> {
        self.check_shape()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = bincode::serialize(self).map_err(|e| TrainerError::Persist(e.to_string()))?;
        fs::write(path, &bytes)?;

        let hash = hex::encode(blake3::hash(&bytes).as_bytes());
        let hash_path = hash_path_for(path);
        fs::write(&hash_path, &hash)?;
        debug!("wrote {} bytes, hash {}", bytes.len(), hash);

        let manifest_path = if write_manifest {
            let manifest = Manifest {
                metadata: &self.metadata,
                feature_names: &self.feature_names,
            };
            let json = manifest
                .to_json()
                .map_err(|e| TrainerError::Persist(e.to_string()))?;
            let manifest_path = manifest_path_for(path);
            fs::write(&manifest_path, json)?;
            Some(manifest_path)
        } else {
            None
        };

        Ok(SavedArtifact {
            model_path: path.to_path_buf(),
            hash_path,
            manifest_path,
            hash,
        })
    }

    /// Load an artifact, verifying its hash sidecar when one exists
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;

        let hash_path = hash_path_for(path);
        if hash_path.exists() {
            let expected = fs::read_to_string(&hash_path)?;
            let actual = hex::encode(blake3::hash(&bytes).as_bytes());
            if expected.trim() != actual {
                return Err(TrainerError::Persist(format!(
                    "hash mismatch for {}: expected {}, got {}",
                    path.display(),
                    expected.trim(),
                    actual
                )));
            }
        } else {
            info!("No hash file beside {}; skipping verification", path.display());
        }

        let artifact: Self =
            bincode::deserialize(&bytes).map_err(|e| TrainerError::Persist(e.to_string()))?;
        artifact.check_shape()?;
        Ok(artifact)
    }

    /// Acquisition probability for each row of a cleaned table
    pub fn predict_proba(&self, table: &Table) -> Result<Vec<f64>> {
        let features = self.features.transform(table)?;
        self.forest.predict_proba(&features)
    }

    pub fn predict(&self, table: &Table, threshold: f64) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(table)?
            .into_iter()
            .map(|p| u8::from(p > threshold))
            .collect())
    }
}
