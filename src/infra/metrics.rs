// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Writes cross-validation metrics to CSV files in the run
// directory, one row appended per epoch and per fold.
//
// Output files:
//   <output_dir>/epoch_metrics.csv
//     fold,epoch,train_loss,val_loss,val_acc
//     1,1,0.693100,0.688400,0.540000
//     1,2,0.671900,0.680200,0.570000
//     ...
//   <output_dir>/cv_metrics.csv
//     fold,accuracy,seconds,test_size,epochs_run
//     1,0.812500,4.210000,160,7
//     ...
//
// val_loss / val_acc are empty when the fold had no validation rows.
// Both files are recreated at the start of each run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

pub const EPOCH_CSV: &str = "epoch_metrics.csv";
pub const FOLD_CSV:  &str = "cv_metrics.csv";

/// One epoch of one fold's training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch:      usize,
    /// Mean loss over the training batches
    pub train_loss: f64,
    pub val_loss:   Option<f64>,
    pub val_acc:    Option<f64>,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: Option<f64>, val_acc: Option<f64>) -> Self {
        Self { epoch, train_loss, val_loss, val_acc }
    }
}

/// Final numbers of one fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldMetrics {
    /// Starts at 1
    pub fold:       usize,
    pub accuracy:   f64,
    pub seconds:    f64,
    pub test_size:  usize,
    pub epochs_run: usize,
}

pub struct MetricsLogger {
    epoch_path: PathBuf,
    fold_path:  PathBuf,
}

impl MetricsLogger {
    /// Create `dir` if needed and start both CSV files with a header.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let epoch_path = dir.join(EPOCH_CSV);
        let fold_path  = dir.join(FOLD_CSV);

        write_header(&epoch_path, &["fold", "epoch", "train_loss", "val_loss", "val_acc"])?;
        write_header(&fold_path, &["fold", "accuracy", "seconds", "test_size", "epochs_run"])?;
        tracing::debug!("Created metrics files in '{}'", dir.display());

        Ok(Self { epoch_path, fold_path })
    }

    pub fn log_epochs(&self, fold: usize, history: &[EpochMetrics]) -> Result<()> {
        let mut w = appender(&self.epoch_path)?;
        for m in history {
            w.write_record([
                fold.to_string(),
                m.epoch.to_string(),
                format!("{:.6}", m.train_loss),
                m.val_loss.map(|v| format!("{:.6}", v)).unwrap_or_default(),
                m.val_acc.map(|v| format!("{:.6}", v)).unwrap_or_default(),
            ])?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn log_fold(&self, m: &FoldMetrics) -> Result<()> {
        let mut w = appender(&self.fold_path)?;
        w.write_record([
            m.fold.to_string(),
            format!("{:.6}", m.accuracy),
            format!("{:.6}", m.seconds),
            m.test_size.to_string(),
            m.epochs_run.to_string(),
        ])?;
        w.flush()?;

        tracing::debug!("Logged fold {} metrics: acc={:.4}", m.fold, m.accuracy);
        Ok(())
    }

    pub fn fold_csv_path(&self) -> &Path {
        &self.fold_path
    }

    pub fn epoch_csv_path(&self) -> &Path {
        &self.epoch_path
    }
}

fn write_header(path: &Path, columns: &[&str]) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    w.write_record(columns)?;
    w.flush()?;
    Ok(())
}

fn appender(path: &Path) -> Result<csv::Writer<File>> {
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open '{}' for appending", path.display()))?;
    Ok(csv::WriterBuilder::new().has_headers(false).from_writer(file))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fold_rows_are_appended() {
        let dir    = tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        for fold in 1..=2 {
            logger
                .log_fold(&FoldMetrics { fold, accuracy: 0.75, seconds: 1.5, test_size: 8, epochs_run: 3 })
                .unwrap();
        }

        let text  = fs::read_to_string(logger.fold_csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "fold,accuracy,seconds,test_size,epochs_run");
        assert_eq!(lines[1], "1,0.750000,1.500000,8,3");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_missing_validation_is_empty_field() {
        let dir    = tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        logger
            .log_epochs(2, &[
                EpochMetrics::new(1, 0.5, Some(0.4), Some(0.9)),
                EpochMetrics::new(2, 0.3, None, None),
            ])
            .unwrap();

        let text = fs::read_to_string(logger.epoch_csv_path()).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows, vec!["2,1,0.500000,0.400000,0.900000", "2,2,0.300000,,"]);
    }

    #[test]
    fn test_new_run_truncates_previous_rows() {
        let dir = tempdir().unwrap();
        MetricsLogger::new(dir.path())
            .unwrap()
            .log_fold(&FoldMetrics { fold: 1, accuracy: 1.0, seconds: 0.1, test_size: 1, epochs_run: 1 })
            .unwrap();

        let logger = MetricsLogger::new(dir.path()).unwrap();
        let text   = fs::read_to_string(logger.fold_csv_path()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
