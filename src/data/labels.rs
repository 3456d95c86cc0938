// ============================================================
// Layer 4 — Label Encoder
// ============================================================
// Maps label strings to class indices 0..n. The encoder is fit
// once on the full label set before any fold split so every fold
// shares the same mapping. Classes are ordered by sorted label
// string.
//
//   ["outdoor", "indoor", "outdoor"]  →  classes ["indoor", "outdoor"]
//                                    →  [1, 0, 1]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let classes: BTreeSet<&str> = labels.iter().map(AsRef::as_ref).collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(label)).ok()
    }

    /// Encode every label; None if any label was not seen by `fit`.
    pub fn transform_all<S: AsRef<str>>(&self, labels: &[S]) -> Option<Vec<usize>> {
        labels.iter().map(|l| self.transform(l.as_ref())).collect()
    }

    pub fn inverse(&self, class: usize) -> Option<&str> {
        self.classes.get(class).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_sorted_and_unique() {
        let enc = LabelEncoder::fit(&["outdoor", "indoor", "outdoor", "animal"]);
        assert_eq!(enc.classes(), &["animal", "indoor", "outdoor"]);
        assert_eq!(enc.len(), 3);
    }

    #[test]
    fn test_transform_and_inverse() {
        let enc = LabelEncoder::fit(&["b", "a"]);
        assert_eq!(enc.transform("a"), Some(0));
        assert_eq!(enc.transform("b"), Some(1));
        assert_eq!(enc.transform("c"), None);
        assert_eq!(enc.inverse(1), Some("b"));
        assert_eq!(enc.inverse(2), None);
    }

    #[test]
    fn test_transform_all() {
        let enc = LabelEncoder::fit(&["x", "y"]);
        assert_eq!(enc.transform_all(&["y", "x", "y"]), Some(vec![1, 0, 1]));
        assert_eq!(enc.transform_all(&["y", "z"]), None);
    }
}
