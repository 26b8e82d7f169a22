//! Cleaned-dataset loading and label preparation
//!
//! Reads the cleaner's output, prunes the columns the model never sees,
//! splits the rest into numeric and categorical features by storage type and
//! turns `status` into a binary acquired / not-acquired label.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};
use vc_core::{read_typed_csv, DType, Table};

use crate::errors::{Result, TrainerError};

/// Column holding the company outcome
pub const LABEL_COLUMN: &str = "status";

/// Columns removed right after loading
pub const PRUNED_COLUMNS: [&str; 2] = ["homepage_url", "state_code"];

/// Identifiers, the label and raw dates; never encoded as features
pub const NON_FEATURES: [&str; 5] = [
    "permalink",
    "status",
    "founded_at",
    "first_funding_at",
    "last_funding_at",
];

/// Positive class
pub const ACQUIRED: u8 = 1;
/// Negative class
pub const NOT_ACQUIRED: u8 = 0;

/// Binary label for a status string; unknown statuses have none
pub fn status_label(status: &str) -> Option<u8> {
    match status {
        "acquired" => Some(ACQUIRED),
        "operating" | "pending" | "closed" => Some(NOT_ACQUIRED),
        _ => None,
    }
}

/// Load the cleaned CSV and drop the pruned columns
pub fn load_cleaned<P: AsRef<Path>>(path: P) -> Result<Table> {
    let mut table = read_typed_csv(path)?;
    table.drop_columns(&PRUNED_COLUMNS)?;
    Ok(table)
}

/// Which columns feed the scaler and which feed the one-hot encoder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl FeatureSpec {
    /// Float columns are numeric; every other storage type is categorical
    pub fn partition(table: &Table) -> Self {
        let mut spec = Self::default();
        for (name, column) in table.columns() {
            if column.dtype() == DType::Float {
                spec.numeric.push(name.to_string());
            } else {
                spec.categorical.push(name.to_string());
            }
        }
        spec
    }

    /// Remove non-feature columns from the categorical set; each must be present
    pub fn exclude(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            let pos = self
                .categorical
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| {
                    TrainerError::Schema(format!("{name} is not a categorical column"))
                })?;
            self.categorical.remove(pos);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Feature table with one binary label per row
#[derive(Clone, Debug)]
pub struct Dataset {
    pub table: Table,
    pub labels: Vec<u8>,
}

impl Dataset {
    /// Label every row from `status`; rows with an unknown status are dropped.
    pub fn from_table(mut table: Table) -> Result<Self> {
        let labels: Vec<Option<u8>> = table
            .text(LABEL_COLUMN)?
            .iter()
            .map(|s| s.as_deref().and_then(status_label))
            .collect();

        let keep: Vec<bool> = labels.iter().map(Option::is_some).collect();
        let unlabeled = table.retain_rows(&keep);
        if unlabeled > 0 {
            warn!("{} rows have an unmapped status and were excluded", unlabeled);
        }

        let labels: Vec<u8> = labels.into_iter().flatten().collect();
        if labels.is_empty() {
            return Err(TrainerError::Schema("dataset has no labeled rows".into()));
        }
        debug!("labeled {} rows", labels.len());

        Ok(Self { table, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Gather rows by index; indices may repeat
    pub fn take(&self, indices: &[usize]) -> Dataset {
        Dataset {
            table: self.table.take_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// (not acquired, acquired)
    pub fn class_counts(&self) -> (usize, usize) {
        let positives = self.labels.iter().filter(|&&l| l == ACQUIRED).count();
        (self.labels.len() - positives, positives)
    }
}
