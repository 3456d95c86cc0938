// ============================================================
// Layer 3 — LabeledSentence Domain Type
// ============================================================
// One row of the corpus before tokenisation and encoding:
// the raw sentence text and its label string.
//
// Example:
//   text:  "A man is riding a bicycle down the street."
//   label: "outdoor"

use serde::{Deserialize, Serialize};

/// A raw labelled sentence loaded from the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSentence {
    /// Untouched sentence text
    pub text: String,

    /// Label string as it appears in the corpus
    pub label: String,
}

impl LabeledSentence {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            label: label.into(),
        }
    }
}
