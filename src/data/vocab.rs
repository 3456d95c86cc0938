// ============================================================
// Layer 4 — Vocabulary and Padding
// ============================================================
// Maps each distinct token to a unique index starting at 1.
// Index 0 is reserved as the padding / masking sentinel, so
//
//   size() = distinct tokens + 1
//
// Indices are assigned in first-seen corpus order, which makes
// the mapping deterministic for a given corpus.
//
// Every sentence is encoded to a fixed-length sequence of
// `max_len` indices (the longest sentence in the corpus),
// right-padded with 0:
//
//   ["a", "man", "rides"], max_len = 5  →  [1, 2, 3, 0, 0]

use std::collections::HashMap;

/// Padding index shared by the vocabulary and the embedding layer
pub const PAD_INDEX: u32 = 0;

/// Out-of-vocabulary sentinel token
pub const UNK_TOKEN: &str = "<unk>";

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    index:  HashMap<String, u32>,
    tokens: Vec<String>,
}

impl Vocabulary {
    /// Build the vocabulary from every tokenised sentence of the corpus.
    pub fn build<'a, I, S>(sentences: I) -> Self
    where
        I: IntoIterator<Item = &'a [S]>,
        S: AsRef<str> + 'a,
    {
        let mut vocab = Self::default();
        for sentence in sentences {
            for token in sentence {
                vocab.insert(token.as_ref());
            }
        }
        vocab
    }

    /// Add a token if unseen and return its index.
    pub fn insert(&mut self, token: &str) -> u32 {
        if let Some(&idx) = self.index.get(token) {
            return idx;
        }
        self.tokens.push(token.to_string());
        let idx = self.tokens.len() as u32;
        self.index.insert(token.to_string(), idx);
        idx
    }

    pub fn index_of(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    /// Number of distinct tokens (padding excluded)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Distinct tokens + 1 for the padding index
    pub fn size(&self) -> usize {
        self.tokens.len() + 1
    }

    /// (token, index) pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.tokens.iter().enumerate().map(|(i, t)| (t.as_str(), i as u32 + 1))
    }

    /// Encode a token list into a `max_len` sequence, right-padded with
    /// PAD_INDEX. Tokens missing from the vocabulary fall back to the
    /// `<unk>` entry when present and are skipped otherwise; sequences
    /// longer than `max_len` are truncated.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S], max_len: usize) -> Vec<u32> {
        let unk = self.index_of(UNK_TOKEN);

        let mut ids: Vec<u32> = tokens
            .iter()
            .filter_map(|t| self.index_of(t.as_ref()).or(unk))
            .take(max_len)
            .collect();

        ids.resize(max_len, PAD_INDEX);
        ids
    }
}

/// Length of the longest token list, i.e. the padded sequence length.
pub fn max_sentence_len<S>(sentences: &[Vec<S>]) -> usize {
    sentences.iter().map(Vec::len).max().unwrap_or(0)
}
