//! Class rebalancing by resampling with replacement

use crate::dataset::{ACQUIRED, NOT_ACQUIRED};
use crate::deterministic::{sample_with_replacement, seeded_rng};
use crate::errors::{Result, TrainerError};

/// Rows drawn for each class
pub const DEFAULT_SAMPLES_PER_CLASS: usize = 5_000;

fn rows_with(labels: &[u8], rows: &[usize], label: u8) -> Vec<usize> {
    rows.iter().copied().filter(|&i| labels[i] == label).collect()
}

/// Row indices of a balanced sample with `per_class` rows of each label.
///
/// Two passes, each with a fresh generator seeded by `seed`: the acquired
/// rows are upsampled to `per_class` and merged with every not-acquired row;
/// the not-acquired rows of that merged set are then resampled (with
/// replacement) to `per_class` and merged with the upsampled acquired rows.
/// Positives come first in the result.
pub fn balance_classes(labels: &[u8], per_class: usize, seed: u64) -> Result<Vec<usize>> {
    let all: Vec<usize> = (0..labels.len()).collect();
    let acquired = rows_with(labels, &all, ACQUIRED);
    let not_acquired = rows_with(labels, &all, NOT_ACQUIRED);

    if acquired.is_empty() {
        return Err(TrainerError::EmptyClass { label: ACQUIRED });
    }
    if not_acquired.is_empty() {
        return Err(TrainerError::EmptyClass { label: NOT_ACQUIRED });
    }

    // Upsample acquired
    let upsampled = sample_with_replacement(&mut seeded_rng(seed), &acquired, per_class);
    let merged: Vec<usize> = not_acquired.iter().chain(&upsampled).copied().collect();

    // Resample not acquired out of the merged set
    let merged_not_acquired = rows_with(labels, &merged, NOT_ACQUIRED);
    let merged_acquired = rows_with(labels, &merged, ACQUIRED);
    let downsampled = sample_with_replacement(&mut seeded_rng(seed), &merged_not_acquired, per_class);

    Ok(merged_acquired.into_iter().chain(downsampled).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imbalanced() -> Vec<u8> {
        // 37 acquired out of 1000
        (0..1000).map(|i| u8::from(i % 27 == 0)).collect()
    }

    #[test]
    fn test_exact_class_sizes() {
        let labels = imbalanced();
        let rows = balance_classes(&labels, DEFAULT_SAMPLES_PER_CLASS, 42).unwrap();

        assert_eq!(rows.len(), 2 * DEFAULT_SAMPLES_PER_CLASS);
        let positives = rows.iter().filter(|&&i| labels[i] == 1).count();
        let negatives = rows.iter().filter(|&&i| labels[i] == 0).count();
        assert_eq!(positives, 5_000);
        assert_eq!(negatives, 5_000);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let labels = imbalanced();
        let a = balance_classes(&labels, 500, 42).unwrap();
        let b = balance_classes(&labels, 500, 42).unwrap();
        let c = balance_classes(&labels, 500, 7).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_missing_class_is_an_error() {
        let labels = vec![0u8; 10];
        assert!(matches!(
            balance_classes(&labels, 5, 42),
            Err(TrainerError::EmptyClass { label: 1 })
        ));
    }
}
