// ============================================================
// Layer 6 — Run Store
// ============================================================
// Keeps the JSON side of a cross-validation run next to its
// metrics CSVs:
//
//   <output_dir>/
//     experiment_config.json  ← every setting of the run
//     cv_report.json          ← per-fold outcomes, mean and std
//     cv_metrics.csv          ← written by MetricsLogger
//     epoch_metrics.csv       ← written by MetricsLogger
//
// `rerun --run-dir <dir>` loads the config back to repeat a run and
// compares the new result with the saved report.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::crossval_use_case::{CrossValidationReport, ExperimentConfig};

pub const CONFIG_FILE: &str = "experiment_config.json";
pub const REPORT_FILE: &str = "cv_report.json";

pub struct RunStore {
    dir: PathBuf,
}

impl RunStore {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        // Errors resurface on the first write
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_config(&self, cfg: &ExperimentConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved experiment config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<ExperimentConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid experiment config", path.display()))
    }

    pub fn save_report(&self, report: &CrossValidationReport) -> Result<()> {
        let path = self.dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(report)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write report to '{}'", path.display()))?;

        tracing::info!("Saved cross-validation report to '{}'", path.display());
        Ok(())
    }

    pub fn load_report(&self) -> Result<CrossValidationReport> {
        let path = self.dir.join(REPORT_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read report from '{}'", path.display()))?;

        Ok(serde_json::from_str(&json)?)
    }
}
