//! Cleaner settings

use serde::{Deserialize, Serialize};

/// One record whose missing name is rebuilt from its homepage URL.
///
/// A record matches when its permalink equals `permalink` or its zero-based
/// data-row index in the raw file equals `raw_row`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRepair {
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub raw_row: Option<usize>,
}

impl NameRepair {
    pub fn by_permalink(permalink: impl Into<String>) -> Self {
        Self {
            permalink: Some(permalink.into()),
            raw_row: None,
        }
    }

    pub fn by_raw_row(raw_row: usize) -> Self {
        Self {
            permalink: None,
            raw_row: Some(raw_row),
        }
    }

    pub fn matches(&self, permalink: Option<&str>, raw_row: usize) -> bool {
        let by_link = matches!((&self.permalink, permalink), (Some(want), Some(have)) if want == have);
        by_link || self.raw_row == Some(raw_row)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub name_repairs: Vec<NameRepair>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            // The one record in investments_VC.csv shipped without a name.
            name_repairs: vec![NameRepair::by_raw_row(28221)],
        }
    }
}
