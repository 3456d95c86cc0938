// ============================================================
// Layer 4 — Fold and Validation Splitter
// ============================================================
// Two splits are needed:
//
// 1. Stratified k-fold (cross-validation)
//      Indices are grouped by class, each class is shuffled with
//      a seeded ChaCha8 RNG, then dealt round-robin across the k
//      folds. The dealing position carries over from one class to
//      the next, so fold sizes differ by at most one overall and
//      every fold's test set keeps roughly the global class mix.
//
//      Guarantees for a fixed seed:
//        - test sets are pairwise disjoint and cover 0..n
//        - repeated calls return identical folds
//
// 2. Validation tail (early stopping)
//      The last `fraction` of the training samples is held out,
//      taken before any shuffling, e.g. 0.1 of 100 → last 10.
//
// Reference: rand_chacha crate documentation

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use crate::data::DataError;
use crate::domain::fold::Fold;

/// Split `labels.len()` rows into `k` stratified folds.
///
/// # Arguments
/// * `labels` - Class index of every row
/// * `k`      - Number of folds, at least 2 and at most the row count
/// * `seed`   - Seed for the per-class shuffles
pub fn stratified_kfold(labels: &[usize], k: usize, seed: u64) -> Result<Vec<Fold>, DataError> {
    let n = labels.len();
    if k < 2 {
        return Err(DataError::InvalidFolds { folds: k, reason: "need at least 2 folds".into() });
    }
    if k > n {
        return Err(DataError::InvalidFolds {
            folds:  k,
            reason: format!("only {} samples", n),
        });
    }

    // BTreeMap keeps class iteration order stable across runs
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng        = ChaCha8Rng::seed_from_u64(seed);
    let mut test_sets  = vec![Vec::new(); k];
    let mut next_fold  = 0usize;

    for (class, mut indices) in by_class {
        if indices.len() < k {
            tracing::warn!(
                "Class {} has only {} members, fewer than {} folds",
                class,
                indices.len(),
                k
            );
        }

        indices.shuffle(&mut rng);
        for idx in indices {
            test_sets[next_fold].push(idx);
            next_fold = (next_fold + 1) % k;
        }
    }

    let folds = test_sets
        .into_iter()
        .enumerate()
        .map(|(fold_idx, mut test)| {
            test.sort_unstable();
            let mut in_test = vec![false; n];
            for &i in &test {
                in_test[i] = true;
            }
            let train = (0..n).filter(|&i| !in_test[i]).collect();
            Fold::new(fold_idx, train, test)
        })
        .collect();

    Ok(folds)
}

/// Split off the last `fraction` of `samples` as a validation set.
///
/// # Returns
/// A tuple (train_samples, val_samples)
pub fn split_validation_tail<T>(mut samples: Vec<T>, fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let split_at = ((total as f64) * (1.0 - fraction.clamp(0.0, 1.0))) as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Validation split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}
