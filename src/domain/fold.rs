// ============================================================
// Layer 3 — Fold Domain Type
// ============================================================
// A single train/test partition produced by k-fold splitting.
// Indices refer to rows of the shared, padded dataset.
//
// Across all folds of one split:
//   - test sets are pairwise disjoint
//   - the union of test sets is 0..n
//   - train = complement of test

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// Zero-based fold number
    pub index: usize,

    /// Row indices used for training, ascending
    pub train: Vec<usize>,

    /// Row indices held out for evaluation, ascending
    pub test: Vec<usize>,
}

impl Fold {
    pub fn new(index: usize, train: Vec<usize>, test: Vec<usize>) -> Self {
        Self { index, train, test }
    }

    /// Human-facing fold number, starting at 1
    pub fn number(&self) -> usize {
        self.index + 1
    }
}
