//! Seeded train / validation / test partitioning

use rand::seq::SliceRandom;
use tracing::debug;

use crate::dataset::Dataset;
use crate::deterministic::seeded_rng;
use crate::errors::{Result, TrainerError};

/// Index sets produced by [`train_test_split`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed`; the first `ceil(n * test_fraction)` indices
/// form the test set and the remainder the training set.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainerError::Training(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainerError::Training(format!(
            "cannot split {n} rows with test fraction {test_fraction}"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut seeded_rng(seed));
    let train = order.split_off(n_test);

    Ok(Split { train, test: order })
}

/// The three datasets the model builder works with
#[derive(Debug, Clone)]
pub struct Partitions {
    pub train: Dataset,
    pub validation: Dataset,
    pub test: Dataset,
}

/// Hold out `test_fraction` of the rows, then `validation_fraction` of what
/// remains; both splits use the same seed.
pub fn partition(
    dataset: &Dataset,
    test_fraction: f64,
    validation_fraction: f64,
    seed: u64,
) -> Result<Partitions> {
    let outer = train_test_split(dataset.len(), test_fraction, seed)?;
    let test = dataset.take(&outer.test);
    let train_full = dataset.take(&outer.train);

    let inner = train_test_split(train_full.len(), validation_fraction, seed)?;
    let validation = train_full.take(&inner.test);
    let train = train_full.take(&inner.train);

    debug!(
        "split sizes: train={} validation={} test={}",
        train.len(),
        validation.len(),
        test.len()
    );

    Ok(Partitions {
        train,
        validation,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10_000, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2_000);
        assert_eq!(split.train.len(), 8_000);

        let inner = train_test_split(8_000, 0.25, 42).unwrap();
        assert_eq!(inner.test.len(), 2_000);
        assert_eq!(inner.train.len(), 6_000);
    }

    #[test]
    fn test_test_size_rounds_up() {
        let split = train_test_split(11, 0.25, 1).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_split_is_disjoint_cover() {
        let split = train_test_split(97, 0.2, 5).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..97).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_reproducible() {
        assert_eq!(
            train_test_split(500, 0.2, 42).unwrap(),
            train_test_split(500, 0.2, 42).unwrap()
        );
        assert_ne!(
            train_test_split(500, 0.2, 42).unwrap(),
            train_test_split(500, 0.2, 43).unwrap()
        );
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(train_test_split(100, 0.0, 42).is_err());
        assert!(train_test_split(100, 1.0, 42).is_err());
        assert!(train_test_split(1, 0.5, 42).is_err());
    }
}
