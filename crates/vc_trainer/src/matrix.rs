//! Dense column-major feature matrix

use crate::errors::{Result, TrainerError};

/// Column-major `f32` matrix fed to the forest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    n_rows: usize,
    columns: Vec<Vec<f32>>,
}

impl FeatureMatrix {
    pub fn from_columns(n_rows: usize, columns: Vec<Vec<f32>>) -> Result<Self> {
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(TrainerError::RowMismatch {
                expected: n_rows,
                actual: bad.len(),
            });
        }
        Ok(Self { n_rows, columns })
    }

    /// Row-major construction, mostly for tests
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut columns = vec![Vec::with_capacity(rows.len()); n_cols];
        for row in rows {
            if row.len() != n_cols {
                return Err(TrainerError::ShapeMismatch {
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            for (col, &v) in columns.iter_mut().zip(row) {
                col.push(v);
            }
        }
        Ok(Self {
            n_rows: rows.len(),
            columns,
        })
    }

    /// Concatenate blocks side by side
    pub fn hstack(blocks: Vec<FeatureMatrix>) -> Result<Self> {
        let n_rows = blocks.first().map_or(0, |b| b.n_rows);
        let mut columns = Vec::new();
        for block in blocks {
            if block.n_rows != n_rows {
                return Err(TrainerError::RowMismatch {
                    expected: n_rows,
                    actual: block.n_rows,
                });
            }
            columns.extend(block.columns);
        }
        Ok(Self { n_rows, columns })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, col: usize) -> &[f32] {
        &self.columns[col]
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.columns[col][row]
    }

    pub fn row(&self, row: usize) -> Vec<f32> {
        self.columns.iter().map(|c| c[row]).collect()
    }
}
