//! Feature transforms fitted on the training partition
//!
//! Numeric columns are standardized, categorical columns one-hot encoded,
//! and the two blocks concatenated (numeric first) into a [`FeatureMatrix`].
//! Both transforms are fitted once and then applied unchanged to validation,
//! test and scoring data.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use vc_core::{Cell, Column, Table};

use crate::dataset::FeatureSpec;
use crate::errors::{Result, TrainerError};
use crate::matrix::FeatureMatrix;

/// Below this a column is treated as constant
const MIN_SCALE: f64 = 10.0 * f64::EPSILON;

fn numeric_values(table: &Table, name: &str) -> Result<Vec<f64>> {
    let column = table.column(name)?;
    let values: Vec<Option<f64>> = match column {
        Column::Float(v) => v.iter().map(|x| x.filter(|x| !x.is_nan())).collect(),
        Column::Int(v) => v.iter().map(|x| x.map(|x| x as f64)).collect(),
        other => {
            return Err(TrainerError::Schema(format!(
                "numeric column {name} has type {}",
                other.dtype()
            )))
        }
    };
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| TrainerError::Schema(format!("numeric column {name} is null at row {row}")))
        })
        .collect()
}

/// Zero-mean, unit-variance scaling with population statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(table: &Table, columns: &[String]) -> Result<Self> {
        let mut scaler = Self {
            columns: columns.to_vec(),
            ..Self::default()
        };
        for name in columns {
            let values = numeric_values(table, name)?;
            let n = values.len().max(1) as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            scaler.means.push(mean);
            scaler.scales.push(if std < MIN_SCALE { 1.0 } else { std });
        }
        Ok(scaler)
    }

    pub fn transform(&self, table: &Table) -> Result<FeatureMatrix> {
        let columns = self
            .columns
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(name, (&mean, &scale))| {
                Ok(numeric_values(table, name)?
                    .into_iter()
                    .map(|v| ((v - mean) / scale) as f32)
                    .collect())
            })
            .collect::<Result<Vec<Vec<f32>>>>()?;
        FeatureMatrix::from_columns(table.n_rows(), columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

/// Indicator encoding over the categories seen during fit.
///
/// Null is a category of its own; values unseen at fit time encode to all
/// zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<Cell>>,
}

impl OneHotEncoder {
    pub fn fit(table: &Table, columns: &[String]) -> Result<Self> {
        let mut encoder = Self {
            columns: columns.to_vec(),
            categories: Vec::with_capacity(columns.len()),
        };
        for name in columns {
            let column = table.column(name)?;
            let seen: BTreeSet<_> = (0..column.len()).map(|i| column.cell(i)).collect();
            encoder.categories.push(seen.into_iter().collect());
        }
        Ok(encoder)
    }

    pub fn transform(&self, table: &Table) -> Result<FeatureMatrix> {
        let n = table.n_rows();
        let mut out = Vec::with_capacity(self.n_features());
        for (name, categories) in self.columns.iter().zip(&self.categories) {
            let column = table.column(name)?;
            let lookup: HashMap<&Cell, usize> =
                categories.iter().enumerate().map(|(i, c)| (c, i)).collect();

            let mut block = vec![vec![0f32; n]; categories.len()];
            for row in 0..n {
                if let Some(&k) = lookup.get(&column.cell(row)) {
                    block[k][row] = 1.0;
                }
            }
            out.extend(block);
        }
        FeatureMatrix::from_columns(n, out)
    }

    pub fn n_features(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// `column=value` for every indicator, nulls as `column=<null>`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(name, cats)| {
                cats.iter().map(move |c| {
                    if c.is_null() {
                        format!("{name}=<null>")
                    } else {
                        format!("{name}={c}")
                    }
                })
            })
            .collect()
    }
}

/// Scaler and encoder fitted together over a [`FeatureSpec`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    pub spec: FeatureSpec,
    pub scaler: StandardScaler,
    pub encoder: OneHotEncoder,
}

impl FeaturePipeline {
    pub fn fit(spec: FeatureSpec, table: &Table) -> Result<Self> {
        let scaler = StandardScaler::fit(table, &spec.numeric)?;
        let encoder = OneHotEncoder::fit(table, &spec.categorical)?;
        Ok(Self {
            spec,
            scaler,
            encoder,
        })
    }

    pub fn transform(&self, table: &Table) -> Result<FeatureMatrix> {
        FeatureMatrix::hstack(vec![self.scaler.transform(table)?, self.encoder.transform(table)?])
    }

    pub fn n_features(&self) -> usize {
        self.spec.numeric.len() + self.encoder.n_features()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.spec.numeric.clone();
        names.extend(self.encoder.feature_names());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_table() -> Table {
        Table::from_columns(vec![
            ("funding", Column::Float(vec![Some(1.0), Some(2.0), Some(3.0), Some(6.0)])),
            ("flat", Column::Float(vec![Some(5.0); 4])),
            (
                "market",
                Column::Text(vec![Some("games".into()), Some("finance".into()), None, Some("games".into())]),
            ),
            ("mobile", Column::Bool(vec![true, false, false, true])),
        ])
        .unwrap()
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scaler_population_statistics() {
        let scaler = StandardScaler::fit(&train_table(), &names(&["funding", "flat"])).unwrap();
        assert_eq!(scaler.means(), &[3.0, 5.0]);
        // population variance of [1,2,3,6] is 3.5
        assert!((scaler.scales()[0] - 3.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(scaler.scales()[1], 1.0);

        let m = scaler.transform(&train_table()).unwrap();
        assert_eq!(m.column(1), &[0.0; 4]);
        let mean: f32 = m.column(0).iter().sum::<f32>() / 4.0;
        assert!(mean.abs() < 1e-6);
    }

    #[test]
    fn test_scaler_uses_fit_statistics_on_new_data() {
        let scaler = StandardScaler::fit(&train_table(), &names(&["funding"])).unwrap();
        let other = Table::from_columns(vec![("funding", Column::Float(vec![Some(3.0), Some(103.0)]))]).unwrap();
        let m = scaler.transform(&other).unwrap();
        assert_eq!(m.get(0, 0), 0.0);
        assert!((m.get(1, 0) as f64 - 100.0 / 3.5f64.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_scaler_rejects_nulls() {
        let table = Table::from_columns(vec![("funding", Column::Float(vec![Some(1.0), None]))]).unwrap();
        assert!(matches!(
            StandardScaler::fit(&table, &names(&["funding"])),
            Err(TrainerError::Schema(_))
        ));
    }

    #[test]
    fn test_one_hot_categories_and_unknowns() {
        let encoder = OneHotEncoder::fit(&train_table(), &names(&["market", "mobile"])).unwrap();
        assert_eq!(
            encoder.feature_names(),
            vec![
                "market=finance",
                "market=games",
                "market=<null>",
                "mobile=False",
                "mobile=True"
            ]
        );

        let scoring = Table::from_columns(vec![
            ("market", Column::Text(vec![Some("biotech".into()), Some("games".into())])),
            ("mobile", Column::Bool(vec![false, true])),
        ])
        .unwrap();
        let m = encoder.transform(&scoring).unwrap();
        assert_eq!(m.row(0), vec![0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(m.row(1), vec![0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_pipeline_orders_numeric_first() {
        let spec = FeatureSpec {
            numeric: names(&["funding"]),
            categorical: names(&["market"]),
        };
        let pipeline = FeaturePipeline::fit(spec, &train_table()).unwrap();
        assert_eq!(pipeline.n_features(), 4);
        assert_eq!(pipeline.feature_names()[0], "funding");

        let m = pipeline.transform(&train_table()).unwrap();
        assert_eq!(m.n_cols(), 4);
        assert_eq!(&m.row(2)[1..], &[0.0, 0.0, 1.0]);
    }
}
