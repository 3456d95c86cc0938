// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads a labelled sentence corpus from a CSV file with a header
// row. Two columns are used: the sentence text and its label
// (column names are configurable). Rows whose label is listed in
// `drop_labels` are skipped, e.g. to remove an "unk" class.
//
// Example file:
//   sentence,label
//   "A man rides a bike down the street.",outdoor
//   "Two people cook dinner.",indoor

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::{io::Read, path::PathBuf};

use crate::data::DataError;
use crate::domain::sentence::LabeledSentence;
use crate::domain::traits::CorpusSource;

/// Loads labelled sentences from a CSV file.
/// Implements the CorpusSource trait from Layer 3.
#[derive(Debug, Clone)]
pub struct CsvCorpus {
    path:         PathBuf,
    text_column:  String,
    label_column: String,
    drop_labels:  Vec<String>,
}

impl CsvCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:         path.into(),
            text_column:  "sentence".to_string(),
            label_column: "label".to_string(),
            drop_labels:  Vec::new(),
        }
    }

    pub fn with_columns(mut self, text: impl Into<String>, label: impl Into<String>) -> Self {
        self.text_column  = text.into();
        self.label_column = label.into();
        self
    }

    pub fn with_drop_labels(mut self, labels: Vec<String>) -> Self {
        self.drop_labels = labels;
        self
    }

    /// Parse CSV rows from any reader. Split out from `load_all`
    /// so tests can feed in-memory data.
    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<LabeledSentence>, DataError> {
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let column = |name: &str| {
            header.iter().position(|h| h == name).ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                header: header.clone(),
            })
        };
        let text_idx  = column(&self.text_column)?;
        let label_idx = column(&self.label_column)?;

        let mut sentences = Vec::new();
        let mut dropped   = 0usize;

        for record in reader.records() {
            let record = record?;
            let (Some(text), Some(label)) = (record.get(text_idx), record.get(label_idx)) else {
                tracing::warn!("Skipping short CSV row at {:?}", record.position());
                continue;
            };

            if self.drop_labels.iter().any(|d| d == label) {
                dropped += 1;
                continue;
            }

            sentences.push(LabeledSentence::new(text, label));
        }

        if dropped > 0 {
            tracing::info!("Dropped {} rows with labels {:?}", dropped, self.drop_labels);
        }

        if sentences.is_empty() {
            return Err(DataError::EmptyCorpus);
        }

        Ok(sentences)
    }
}

impl CorpusSource for CsvCorpus {
    fn load_all(&self) -> Result<Vec<LabeledSentence>> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Cannot open corpus '{}'", self.path.display()))?;

        let sentences = self
            .read_from(file)
            .with_context(|| format!("Cannot parse corpus '{}'", self.path.display()))?;

        tracing::info!("Loaded {} sentences from '{}'", sentences.len(), self.path.display());
        Ok(sentences)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "id,sentence,label\n\
                       1,A man rides a bike.,outdoor\n\
                       2,\"Two people, cooking.\",indoor\n\
                       3,Something odd.,unk\n";

    #[test]
    fn test_reads_configured_columns() {
        let corpus = CsvCorpus::new("unused.csv");
        let rows   = corpus.read_from(CSV.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], LabeledSentence::new("Two people, cooking.", "indoor"));
    }

    #[test]
    fn test_drops_listed_labels() {
        let corpus = CsvCorpus::new("unused.csv").with_drop_labels(vec!["unk".to_string()]);
        let rows   = corpus.read_from(CSV.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.label != "unk"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let corpus = CsvCorpus::new("unused.csv").with_columns("text", "label");
        let err    = corpus.read_from(CSV.as_bytes()).unwrap_err();

        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "text"));
    }

    #[test]
    fn test_empty_after_filtering() {
        let corpus = CsvCorpus::new("unused.csv")
            .with_drop_labels(vec!["outdoor".into(), "indoor".into(), "unk".into()]);

        assert!(matches!(corpus.read_from(CSV.as_bytes()), Err(DataError::EmptyCorpus)));
    }

    #[test]
    fn test_load_all_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let rows = CsvCorpus::new(file.path()).load_all().unwrap();
        assert_eq!(rows.len(), 3);
    }
}
