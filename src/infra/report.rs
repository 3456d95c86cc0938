// ============================================================
// Layer 6 — Console Report
// ============================================================
// Human-readable output of a cross-validation run:
//
//   Model type: feedforward
//   batch_size: 128
//   ...
//
//   Label frequencies in y[test]
//   indoor   41  0.5125
//   outdoor  39  0.4875
//
//   fold 1/10 - time: 4.21 s - acc: 0.8125 on 80 samples
//   ...
//   Avg cv accuracy: 0.8012 (std 0.0231)
//
// Label frequency tables are diagnostics only: building one can
// fail (a class index the encoder does not know) and the caller
// logs and skips it.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::labels::LabelEncoder;

/// One row of a label frequency table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelFrequency {
    pub label:    String,
    pub count:    usize,
    /// count / total
    pub fraction: f64,
}

/// Count class indices and name them through `encoder`, most frequent first.
pub fn label_frequencies(classes: &[usize], encoder: &LabelEncoder) -> Result<Vec<LabelFrequency>> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &c in classes {
        *counts.entry(c).or_default() += 1;
    }

    let total = classes.len().max(1) as f64;
    let mut rows = counts
        .into_iter()
        .map(|(class, count)| {
            let label = encoder
                .inverse(class)
                .ok_or_else(|| anyhow!("class index {} is not in the label encoder", class))?;
            Ok(LabelFrequency { label: label.to_string(), count, fraction: count as f64 / total })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    Ok(rows)
}

pub fn print_hyperparameters(model_type: &str, params: &[(&str, String)]) {
    println!("\nModel type: {}", model_type);
    for (name, value) in params {
        println!("{}: {}", name, value);
    }
}

pub fn print_label_frequencies(title: &str, rows: &[LabelFrequency]) {
    println!("\n{}", title);
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    for r in rows {
        println!("{:<width$}  {:>5}  {:.4}", r.label, r.count, r.fraction, width = width);
    }
}

pub fn fold_line(fold: usize, folds: usize, seconds: f64, accuracy: f64, test_size: usize) -> String {
    format!(
        "fold {}/{} - time: {:.2} s - acc: {:.4} on {} samples",
        fold, folds, seconds, accuracy, test_size
    )
}

pub fn summary_line(mean: f64, std_dev: f64) -> String {
    format!("Avg cv accuracy: {:.4} (std {:.4})", mean, std_dev)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> LabelEncoder {
        LabelEncoder::fit(&["indoor", "outdoor", "unknown"])
    }

    #[test]
    fn test_frequencies_sorted_by_count() {
        let rows = label_frequencies(&[1, 0, 1, 2, 1, 0], &encoder()).unwrap();

        assert_eq!(rows[0].label, "outdoor");
        assert_eq!(rows[0].count, 3);
        assert!((rows[0].fraction - 0.5).abs() < 1e-12);
        assert_eq!(rows[1].label, "indoor");
        assert_eq!(rows[2].label, "unknown");
    }

    #[test]
    fn test_unknown_class_index_is_an_error() {
        assert!(label_frequencies(&[0, 7], &encoder()).is_err());
    }

    #[test]
    fn test_empty_classes() {
        assert!(label_frequencies(&[], &encoder()).unwrap().is_empty());
    }

    #[test]
    fn test_line_formats() {
        assert_eq!(
            fold_line(3, 10, 4.2061, 0.8125, 80),
            "fold 3/10 - time: 4.21 s - acc: 0.8125 on 80 samples"
        );
        assert_eq!(summary_line(0.80123, 0.02311), "Avg cv accuracy: 0.8012 (std 0.0231)");
    }
}
