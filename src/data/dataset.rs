use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One encoded sentence: padded token indices and its class index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSample {
    pub tokens: Vec<u32>,
    pub label:  usize,
}

impl TextSample {
    pub fn new(tokens: Vec<u32>, label: usize) -> Self {
        Self { tokens, label }
    }
}

/// Collect the samples at `indices`, in that order.
pub fn select(samples: &[TextSample], indices: &[usize]) -> Vec<TextSample> {
    indices.iter().map(|&i| samples[i].clone()).collect()
}

pub struct TextDataset {
    samples: Vec<TextSample>,
}

impl TextDataset {
    pub fn new(samples: Vec<TextSample>) -> Self { Self { samples } }
}

impl Dataset<TextSample> for TextDataset {
    fn get(&self, index: usize) -> Option<TextSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
