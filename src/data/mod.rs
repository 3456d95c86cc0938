// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the CSV corpus to tensor batches.
//
//   sentences.csv
//       │
//       ▼
//   CsvCorpus         → (sentence, label) rows
//       │
//       ▼
//   Preprocessor      → token lists
//       │
//       ▼
//   Vocabulary        → padded index sequences (0 = padding)
//   LabelEncoder      → class indices, fit once on all labels
//   WordVectors       → pretrained + unknown-word vectors
//       │
//       ▼
//   splitter          → stratified k folds, validation tail
//       │
//       ▼
//   TextDataset       → Burn Dataset over one fold's rows
//       │
//       ▼
//   TextBatcher       → [batch, max_len] token tensors + labels

use thiserror::Error;

/// Reads the labelled CSV corpus
pub mod loader;

/// Cleans and tokenises sentences
pub mod preprocessor;

/// Token → index mapping and padding
pub mod vocab;

/// Label string → class index mapping
pub mod labels;

/// Pretrained word vectors and the embedding matrix
pub mod embeddings;

/// Stratified k-fold and validation splits
pub mod splitter;

/// Implements Burn's Dataset trait for encoded sentences
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Failures while reading or shaping input data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("column '{column}' not found in CSV header {header:?}")]
    MissingColumn { column: String, header: Vec<String> },

    #[error("corpus is empty after filtering")]
    EmptyCorpus,

    #[error("malformed word vector file: {0}")]
    MalformedVectors(String),

    #[error("word vectors have dimension {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("cannot make {folds} folds: {reason}")]
    InvalidFolds { folds: usize, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
