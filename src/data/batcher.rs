// ============================================================
// Layer 4 — Text Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<TextSample> into
// tensors for one forward pass.
//
//   Input:  N samples, each padded to max_len tokens
//   Output: tokens [N, max_len] (Int), labels [N] (Int)
//
// All sequences are pre-padded by the Vocabulary, so the token
// ids are flattened and reshaped without per-batch padding.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TextSample;

// ─── TextBatch ────────────────────────────────────────────────────────────────
/// A batch of encoded sentences ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct TextBatch<B: Backend> {
    /// Token ids — shape: [batch_size, max_len]
    pub tokens: Tensor<B, 2, Int>,

    /// Class indices — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── TextBatcher ──────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right CPU/GPU.
#[derive(Clone, Debug)]
pub struct TextBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TextBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TextSample, TextBatch<B>> for TextBatcher<B> {
    fn batch(&self, items: Vec<TextSample>) -> TextBatch<B> {
        let batch_size = items.len();
        let max_len    = items.first().map_or(0, |s| s.tokens.len());

        // Burn Int tensors are built from i32 slices
        let token_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.tokens.iter().map(|&t| t as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(token_flat.as_slice(), &self.device)
            .reshape([batch_size, max_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        TextBatch { tokens, labels }
    }
}
