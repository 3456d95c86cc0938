// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting output of a run:
//
//   report.rs    — Console report
//                  Hyperparameters, label frequency tables,
//                  per-fold lines and the final average.
//
//   metrics.rs   — Metrics CSVs
//                  One row per epoch and one per fold, for
//                  learning curves and fold comparisons.
//
//   run_store.rs — Run directory JSON
//                  Saves the experiment config and the final
//                  cross-validation report.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Rust Book §12 (I/O and File Handling)

/// Console report formatting and label frequencies
pub mod report;

/// Per-epoch and per-fold CSV logger
pub mod metrics;

/// Experiment config and report persistence
pub mod run_store;
