// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The harness reads its corpus through CorpusSource, not through
// the concrete CSV reader (CsvCorpus implements it). Tests swap in
// an in-memory implementation.

use anyhow::Result;

use crate::domain::sentence::LabeledSentence;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the labelled sentences of a corpus.
pub trait CorpusSource {
    /// Load every (sentence, label) row, in corpus order.
    fn load_all(&self) -> Result<Vec<LabeledSentence>>;
}
