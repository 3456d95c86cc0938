// ============================================================
// Layer 5 — Classifier Topologies
// ============================================================
// One Burn module, TextClassifier, wired in one of three ways:
//
//   FeedForward (bag of embeddings)
//     tokens [b, L] → Embedding (masked, word dropout 0.2) [b, L, d]
//       → pool (sum | max | mean | concat) → Dropout 0.5
//       → for every layer size except the last:
//           Linear → BatchNorm → activation → Dropout 0.5
//       → Linear(last layer size) → activation
//       → Linear(output units)
//
//   FastText
//     tokens [b, L] → Embedding (masked) → mean over positions
//       → Linear(output units)
//
//   Cnn (Kim 2014)
//     tokens [b, L] → Embedding (masked) → Dropout
//       → per filter width h: Conv1d(d → F, h) → ReLU → max over time
//       → concat [b, F · #widths] → Dropout → Linear(output units)
//
// Output units and activation come from OutputHead (see layers.rs).
// forward_logits() stops before that activation; losses work on logits.
//
// Padding: row 0 of the embedding table is the padding token. When
// masking is on, embeddings at padded positions are zeroed before
// pooling and no gradient reaches row 0. Pooling still runs over all
// max_len positions: sum is unaffected by padding, mean divides by
// max_len, and max sees the zero vectors of a short sentence.

use burn::{
    module::{Ignored, Param},
    nn::{
        conv::{Conv1d, Conv1dConfig},
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::data::embeddings::EmbeddingMatrix;
use crate::data::vocab::PAD_INDEX;
use crate::ml::layers::{Activation, ActivationLayer, OutputHead, PoolMode};

// ─── Errors ───────────────────────────────────────────────────────────────────
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("layer_sizes must name at least one hidden layer")]
    EmptyLayerSizes,

    #[error("hidden layer {position} has zero units")]
    ZeroLayerSize { position: usize },

    #[error("{name} must be positive, got {value}")]
    InvalidDimension { name: &'static str, value: usize },

    #[error("need at least 2 labels, got {0}")]
    TooFewLabels(usize),

    #[error("{name} dropout must be in [0, 1), got {value}")]
    InvalidDropout { name: &'static str, value: f64 },

    #[error("embedding weights are {found:?}, expected {expected:?}")]
    EmbeddingShape { expected: [usize; 2], found: [usize; 2] },

    #[error("filter_sizes must name at least one filter width")]
    NoFilters,

    #[error("filter width {width} exceeds sentence length {max_len}")]
    FilterTooWide { width: usize, max_len: usize },

    #[error("unknown {kind}: '{value}'")]
    Unknown { kind: &'static str, value: String },
}

// ─── Variant ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    FeedForward,
    FastText,
    Cnn,
}

impl FromStr for Variant {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "feedforward" | "ff" | "nn" => Ok(Variant::FeedForward),
            "fasttext"                  => Ok(Variant::FastText),
            "cnn"                       => Ok(Variant::Cnn),
            _ => Err(TopologyError::Unknown { kind: "model variant", value: s.to_string() }),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::FeedForward => "feedforward",
            Variant::FastText    => "fasttext",
            Variant::Cnn         => "cnn",
        };
        f.write_str(name)
    }
}

// ─── Config ───────────────────────────────────────────────────────────────────
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TopologyConfig {
    pub variant:       Variant,
    /// Vocabulary size as reported by Vocabulary::size(); the
    /// embedding table gets one more row than this.
    pub vocab_size:    usize,
    pub nb_labels:     usize,
    pub embedding_dim: usize,
    /// Padded sentence length
    pub max_len:       usize,

    #[config(default = "vec![100]")]
    pub layer_sizes:   Vec<usize>,
    #[config(default = "PoolMode::Max")]
    pub pool_mode:     PoolMode,
    #[config(default = "Activation::Relu")]
    pub activation:    Activation,
    #[config(default = 0.5)]
    pub dropout:       f64,
    /// Probability of dropping a whole word (feedforward only)
    #[config(default = 0.2)]
    pub word_dropout:  f64,
    #[config(default = true)]
    pub mask_padding:  bool,
    #[config(default = true)]
    pub trainable_embeddings: bool,

    #[config(default = "vec![5, 10, 15]")]
    pub filter_sizes:  Vec<usize>,
    #[config(default = 150)]
    pub nb_filters:    usize,
    /// Dropout on the CNN input and on the concatenated features
    #[config(default = "[0.2, 0.2]")]
    pub conv_dropout:  [f64; 2],
}

impl TopologyConfig {
    /// Rows of the embedding table
    pub fn embedding_rows(&self) -> usize {
        self.vocab_size + 1
    }

    pub fn head(&self) -> OutputHead {
        OutputHead::for_labels(self.nb_labels)
    }

    /// Check every dimension before any tensor is allocated.
    pub fn validate(&self, weights: Option<&EmbeddingMatrix>) -> Result<(), TopologyError> {
        for (name, value) in [
            ("vocab_size", self.vocab_size),
            ("embedding_dim", self.embedding_dim),
            ("max_len", self.max_len),
        ] {
            if value == 0 {
                return Err(TopologyError::InvalidDimension { name, value });
            }
        }
        if self.nb_labels < 2 {
            return Err(TopologyError::TooFewLabels(self.nb_labels));
        }

        match self.variant {
            Variant::FeedForward => {
                if self.layer_sizes.is_empty() {
                    return Err(TopologyError::EmptyLayerSizes);
                }
                if let Some(position) = self.layer_sizes.iter().position(|&u| u == 0) {
                    return Err(TopologyError::ZeroLayerSize { position });
                }
                check_dropout("hidden", self.dropout)?;
                check_dropout("word", self.word_dropout)?;
            }
            Variant::FastText => {}
            Variant::Cnn => {
                if self.filter_sizes.is_empty() {
                    return Err(TopologyError::NoFilters);
                }
                if self.nb_filters == 0 {
                    return Err(TopologyError::InvalidDimension { name: "nb_filters", value: 0 });
                }
                if let Some(&width) = self.filter_sizes.iter().find(|&&w| w == 0 || w > self.max_len) {
                    return Err(TopologyError::FilterTooWide { width, max_len: self.max_len });
                }
                check_dropout("convolution input", self.conv_dropout[0])?;
                check_dropout("convolution output", self.conv_dropout[1])?;
            }
        }

        if let (Some(w), true) = (weights, self.uses_pretrained()) {
            let expected = [self.embedding_rows(), self.embedding_dim];
            if w.shape() != expected {
                return Err(TopologyError::EmbeddingShape { expected, found: w.shape() });
            }
        }
        Ok(())
    }

    /// FastText always learns its embeddings from scratch.
    pub fn uses_pretrained(&self) -> bool {
        !matches!(self.variant, Variant::FastText)
    }

    pub fn init<B: Backend>(
        &self,
        weights: Option<&EmbeddingMatrix>,
        device:  &B::Device,
    ) -> Result<TextClassifier<B>, TopologyError> {
        self.validate(weights)?;

        if weights.is_some() && !self.uses_pretrained() {
            tracing::warn!("{} ignores pretrained embeddings", self.variant);
        }
        let weights   = weights.filter(|_| self.uses_pretrained());
        let embedding = self.build_embedding(weights, device);
        let head      = self.head();

        let wiring = Wiring {
            variant:      self.variant,
            pool_mode:    self.pool_mode,
            head,
            mask_padding: self.mask_padding,
        };

        let model = match self.variant {
            Variant::FeedForward => {
                let pooled_width = self.pool_mode.output_width(self.max_len, self.embedding_dim);
                let (last, inner) = self
                    .layer_sizes
                    .split_last()
                    .ok_or(TopologyError::EmptyLayerSizes)?;

                // Every hidden block reads the previous one's width,
                // starting from the pooled vector.
                let mut width  = pooled_width;
                let mut hidden = Vec::with_capacity(inner.len());
                for &units in inner {
                    hidden.push(self.build_hidden_block(width, units, device));
                    width = units;
                }
                let final_hidden = FinalHidden {
                    linear:     LinearConfig::new(width, *last).init(device),
                    activation: self.activation.init(*last, device),
                };

                TextClassifier {
                    embedding,
                    input_dropout:   DropoutConfig::new(self.word_dropout).init(),
                    feature_dropout: DropoutConfig::new(self.dropout).init(),
                    hidden,
                    final_hidden:    Some(final_hidden),
                    convs:           Vec::new(),
                    output:          LinearConfig::new(*last, head.units()).init(device),
                    wiring:          Ignored(wiring),
                }
            }
            Variant::FastText => TextClassifier {
                embedding,
                input_dropout:   DropoutConfig::new(0.0).init(),
                feature_dropout: DropoutConfig::new(0.0).init(),
                hidden:          Vec::new(),
                final_hidden:    None,
                convs:           Vec::new(),
                output:          LinearConfig::new(self.embedding_dim, head.units()).init(device),
                wiring:          Ignored(wiring),
            },
            Variant::Cnn => {
                let convs = self
                    .filter_sizes
                    .iter()
                    .map(|&h| Conv1dConfig::new(self.embedding_dim, self.nb_filters, h).init(device))
                    .collect::<Vec<_>>();
                let features = self.nb_filters * self.filter_sizes.len();

                TextClassifier {
                    embedding,
                    input_dropout:   DropoutConfig::new(self.conv_dropout[0]).init(),
                    feature_dropout: DropoutConfig::new(self.conv_dropout[1]).init(),
                    hidden:          Vec::new(),
                    final_hidden:    None,
                    convs,
                    output:          LinearConfig::new(features, head.units()).init(device),
                    wiring:          Ignored(wiring),
                }
            }
        };

        Ok(model)
    }

    fn build_embedding<B: Backend>(
        &self,
        weights: Option<&EmbeddingMatrix>,
        device:  &B::Device,
    ) -> Embedding<B> {
        let rows          = self.embedding_rows();
        let mut embedding = EmbeddingConfig::new(rows, self.embedding_dim).init(device);

        if let Some(w) = weights {
            let table = Tensor::<B, 1>::from_floats(w.as_slice(), device)
                .reshape([rows, self.embedding_dim]);
            embedding.weight = Param::from_tensor(table);
        }

        if self.trainable_embeddings {
            embedding
        } else {
            embedding.no_grad()
        }
    }

    fn build_hidden_block<B: Backend>(&self, d_in: usize, units: usize, device: &B::Device) -> HiddenBlock<B> {
        HiddenBlock {
            linear:     LinearConfig::new(d_in, units).init(device),
            norm:       BatchNormConfig::new(units).init(device),
            activation: self.activation.init(units, device),
            dropout:    DropoutConfig::new(self.dropout).init(),
        }
    }
}

fn check_dropout(name: &'static str, value: f64) -> Result<(), TopologyError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(TopologyError::InvalidDropout { name, value })
    }
}

// ─── Modules ──────────────────────────────────────────────────────────────────
/// Linear → BatchNorm → activation → Dropout
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    pub linear:     Linear<B>,
    pub norm:       BatchNorm<B, 0>,
    pub activation: ActivationLayer<B>,
    pub dropout:    Dropout,
}

impl<B: Backend> HiddenBlock<B> {
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.norm.forward(self.linear.forward(x));
        self.dropout.forward(self.activation.forward(x))
    }
}

/// Last hidden layer of the feedforward stack: Linear → activation
#[derive(Module, Debug)]
pub struct FinalHidden<B: Backend> {
    pub linear:     Linear<B>,
    pub activation: ActivationLayer<B>,
}

impl<B: Backend> FinalHidden<B> {
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.activation.forward(self.linear.forward(x))
    }
}

/// Choices fixed at construction that carry no parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wiring {
    pub variant:      Variant,
    pub pool_mode:    PoolMode,
    pub head:         OutputHead,
    pub mask_padding: bool,
}

#[derive(Module, Debug)]
pub struct TextClassifier<B: Backend> {
    pub embedding:       Embedding<B>,
    pub input_dropout:   Dropout,
    pub feature_dropout: Dropout,
    pub hidden:          Vec<HiddenBlock<B>>,
    pub final_hidden:    Option<FinalHidden<B>>,
    pub convs:           Vec<Conv1d<B>>,
    pub output:          Linear<B>,
    wiring:              Ignored<Wiring>,
}

impl<B: Backend> TextClassifier<B> {
    pub fn variant(&self) -> Variant {
        self.wiring.0.variant
    }

    pub fn head(&self) -> OutputHead {
        self.wiring.0.head
    }

    /// tokens [batch, max_len] → class probabilities [batch, units]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        self.head().activate(self.forward_logits(tokens))
    }

    /// tokens [batch, max_len] → pre-activation scores [batch, units]
    pub fn forward_logits(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let features = match self.variant() {
            Variant::FeedForward => self.encode_feedforward(tokens),
            Variant::FastText    => PoolMode::Mean.apply(self.embed(tokens)),
            Variant::Cnn         => self.encode_cnn(tokens),
        };
        self.output.forward(features)
    }

    /// Embedding lookup with padded positions zeroed.
    fn embed(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let x = self.embedding.forward(tokens.clone());
        if !self.wiring.0.mask_padding {
            return x;
        }
        let mask = tokens.greater_elem(PAD_INDEX as i64).float().unsqueeze_dim::<3>(2);
        x * mask
    }

    fn encode_feedforward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch, len] = tokens.dims();
        let x = self.embed(tokens);

        // Word dropout: one keep/drop decision per position, shared by
        // every embedding dimension. A no-op outside training.
        let keep = self.input_dropout.forward(Tensor::<B, 3>::ones([batch, len, 1], &x.device()));
        let x    = x * keep;

        let mut h = self.feature_dropout.forward(self.wiring.0.pool_mode.apply(x));
        for block in &self.hidden {
            h = block.forward(h);
        }
        match &self.final_hidden {
            Some(last) => last.forward(h),
            None       => h,
        }
    }

    fn encode_cnn(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        // Conv1d wants channels first: [batch, dim, max_len]
        let x = self.input_dropout.forward(self.embed(tokens)).swap_dims(1, 2);

        let pooled = self
            .convs
            .iter()
            .map(|conv| {
                let c = activation::relu(conv.forward(x.clone()));
                let [batch, filters, _] = c.dims();
                c.max_dim(2).reshape([batch, filters])
            })
            .collect::<Vec<_>>();

        self.feature_dropout.forward(Tensor::cat(pooled, 1))
    }

    pub fn summary(&self) -> TopologySummary {
        let wiring = self.wiring.0;
        let [rows, dim] = self.embedding.weight.val().dims();
        let [pooled_width, _] = match (self.hidden.first(), &self.final_hidden) {
            (Some(block), _)   => block.linear.weight.val().dims(),
            (None, Some(last)) => last.linear.weight.val().dims(),
            (None, None)       => self.output.weight.val().dims(),
        };

        let mut layers = Vec::new();
        for block in &self.hidden {
            let [d_in, d_out] = block.linear.weight.val().dims();
            layers.push(LayerLine { d_in, d_out, activation: Some(block.activation.kind()), batch_norm: true });
        }
        if let Some(last) = &self.final_hidden {
            let [d_in, d_out] = last.linear.weight.val().dims();
            layers.push(LayerLine { d_in, d_out, activation: Some(last.activation.kind()), batch_norm: false });
        }

        let filters = self
            .convs
            .iter()
            .map(|conv| {
                let [out, _, width] = conv.weight.val().dims();
                (width, out)
            })
            .collect();

        let [output_in, _] = self.output.weight.val().dims();

        TopologySummary {
            variant:      wiring.variant,
            embedding:    [rows, dim],
            pool_mode:    matches!(wiring.variant, Variant::FeedForward).then_some(wiring.pool_mode),
            pooled_width,
            layers,
            filters,
            output_in,
            head:         wiring.head,
            num_params:   self.num_params(),
        }
    }
}

// ─── Summary ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct LayerLine {
    pub d_in:       usize,
    pub d_out:      usize,
    pub activation: Option<Activation>,
    pub batch_norm: bool,
}

/// Layer-by-layer description printed before the first fold.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologySummary {
    pub variant:      Variant,
    pub embedding:    [usize; 2],
    pub pool_mode:    Option<PoolMode>,
    /// Width of the vector entering the first dense layer
    pub pooled_width: usize,
    pub layers:       Vec<LayerLine>,
    /// (filter width, number of filters) per convolution
    pub filters:      Vec<(usize, usize)>,
    pub output_in:    usize,
    pub head:         OutputHead,
    pub num_params:   usize,
}

impl fmt::Display for TopologySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} classifier", self.variant)?;
        writeln!(f, "  embedding   {} x {}", self.embedding[0], self.embedding[1])?;
        if let Some(mode) = self.pool_mode {
            writeln!(f, "  pool        {} → {}", mode, self.pooled_width)?;
        }
        for (width, count) in &self.filters {
            writeln!(f, "  conv1d      width {} x {} filters", width, count)?;
        }
        for layer in &self.layers {
            let norm = if layer.batch_norm { " + batchnorm" } else { "" };
            match layer.activation {
                Some(a) => writeln!(f, "  dense       {} → {}{} {}", layer.d_in, layer.d_out, norm, a)?,
                None    => writeln!(f, "  dense       {} → {}{}", layer.d_in, layer.d_out, norm)?,
            }
        }
        writeln!(f, "  output      {} → {}", self.output_in, self.head)?;
        write!(f, "  parameters  {}", self.num_params)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::embeddings::WordVectors;
    use crate::data::vocab::Vocabulary;
    use crate::ml::layers::LossKind;
    use burn::backend::NdArray;

    type B = NdArray;

    fn tokens(rows: &[[i64; 4]]) -> Tensor<B, 2, Int> {
        let flat: Vec<i64> = rows.iter().flatten().copied().collect();
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &Default::default()).reshape([rows.len(), 4])
    }

    fn feedforward(nb_labels: usize, layers: Vec<usize>, pool: PoolMode) -> TopologyConfig {
        TopologyConfig::new(Variant::FeedForward, 99, nb_labels, 8, 4)
            .with_layer_sizes(layers)
            .with_pool_mode(pool)
    }

    #[test]
    fn test_binary_feedforward_shapes() {
        let model = feedforward(2, vec![4, 4], PoolMode::Mean)
            .init::<B>(None, &Default::default())
            .unwrap();

        let summary = model.summary();
        assert_eq!(summary.embedding, [100, 8]);
        assert_eq!(summary.pooled_width, 8);
        assert_eq!(summary.layers.len(), 2);
        assert!(summary.layers[0].batch_norm);
        assert!(!summary.layers[1].batch_norm);
        assert_eq!(summary.head, OutputHead::Sigmoid);

        let out = model.forward(tokens(&[[1, 2, 3, 0], [4, 0, 0, 0], [5, 6, 7, 8]]));
        assert_eq!(out.dims(), [3, 1]);
    }

    #[test]
    fn test_multiclass_outputs_sum_to_one() {
        let model = feedforward(5, vec![6], PoolMode::Max)
            .init::<B>(None, &Default::default())
            .unwrap();

        let probs = model.forward(tokens(&[[1, 2, 0, 0], [3, 4, 5, 0]]));
        assert_eq!(probs.dims(), [2, 5]);
        for row in 0..2 {
            let total: f32 = probs.clone().slice([row..row + 1]).into_data().iter::<f32>().sum();
            assert!((total - 1.0).abs() < 1e-4);
        }
        assert_eq!(model.head().loss_kind(), LossKind::CategoricalCrossEntropy);
    }

    #[test]
    fn test_single_layer_reads_pooled_vector() {
        let model = feedforward(3, vec![7], PoolMode::Concat)
            .init::<B>(None, &Default::default())
            .unwrap();

        assert!(model.hidden.is_empty());
        let summary = model.summary();
        assert_eq!(summary.layers.len(), 1);
        // concat over 4 positions of 8 dims
        assert_eq!(summary.layers[0].d_in, 32);
        assert_eq!(summary.layers[0].d_out, 7);
        assert_eq!(summary.output_in, 7);
    }

    #[test]
    fn test_every_pool_mode_builds() {
        for pool in [PoolMode::Sum, PoolMode::Max, PoolMode::Mean, PoolMode::Concat] {
            let model = feedforward(2, vec![3, 3], pool).init::<B>(None, &Default::default()).unwrap();
            assert_eq!(model.forward(tokens(&[[1, 2, 3, 4]])).dims(), [1, 1]);
        }
    }

    #[test]
    fn test_padded_positions_embed_to_zero() {
        let model = TopologyConfig::new(Variant::FastText, 20, 3, 6, 4)
            .init::<B>(None, &Default::default())
            .unwrap();

        let x = model.embed(tokens(&[[3, 7, 0, 0]]));
        let padded: Vec<f32> = x.clone().slice([0..1, 2..4]).into_data().iter::<f32>().collect();
        assert!(padded.iter().all(|&v| v == 0.0));

        // Summing the masked sentence equals summing its words one at a time
        let whole: Vec<f32> = PoolMode::Sum.apply(x).into_data().iter::<f32>().collect();
        let parts = PoolMode::Sum.apply(model.embed(tokens(&[[3, 0, 0, 0]])))
            + PoolMode::Sum.apply(model.embed(tokens(&[[7, 0, 0, 0]])));
        let parts: Vec<f32> = parts.into_data().iter::<f32>().collect();
        for (a, b) in whole.iter().zip(&parts) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fasttext_shape() {
        let model = TopologyConfig::new(Variant::FastText, 20, 4, 6, 4)
            .init::<B>(None, &Default::default())
            .unwrap();
        assert_eq!(model.forward(tokens(&[[1, 2, 0, 0]])).dims(), [1, 4]);
        assert_eq!(model.summary().output_in, 6);
    }

    #[test]
    fn test_cnn_shape() {
        let model = TopologyConfig::new(Variant::Cnn, 20, 2, 6, 4)
            .with_filter_sizes(vec![2, 3])
            .with_nb_filters(5)
            .init::<B>(None, &Default::default())
            .unwrap();

        let summary = model.summary();
        assert_eq!(summary.filters, vec![(2, 5), (3, 5)]);
        assert_eq!(summary.output_in, 10);
        assert_eq!(model.forward(tokens(&[[1, 2, 3, 0], [4, 0, 0, 0]])).dims(), [2, 1]);
    }

    #[test]
    fn test_pretrained_weights_are_loaded() {
        let vocab       = Vocabulary::build([&["cat"][..]]);
        let mut vectors = WordVectors::new(6);
        vectors.insert("cat", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let matrix = EmbeddingMatrix::from_word_vectors(&vectors, &vocab, 21).unwrap();

        let model = TopologyConfig::new(Variant::FeedForward, 20, 2, 6, 4)
            .with_trainable_embeddings(false)
            .init::<B>(Some(&matrix), &Default::default())
            .unwrap();

        let row: Vec<f32> = model
            .embedding
            .weight
            .val()
            .slice([1..2])
            .into_data()
            .iter::<f32>()
            .collect();
        assert_eq!(row, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_rejects_bad_configs() {
        let device = Default::default();

        let err = feedforward(2, vec![], PoolMode::Max).init::<B>(None, &device).unwrap_err();
        assert!(matches!(err, TopologyError::EmptyLayerSizes));

        let err = feedforward(2, vec![4, 0], PoolMode::Max).init::<B>(None, &device).unwrap_err();
        assert!(matches!(err, TopologyError::ZeroLayerSize { position: 1 }));

        let err = feedforward(1, vec![4], PoolMode::Max).init::<B>(None, &device).unwrap_err();
        assert!(matches!(err, TopologyError::TooFewLabels(1)));

        let wrong = EmbeddingMatrix::zeros(50, 8);
        let err   = feedforward(2, vec![4], PoolMode::Max).init::<B>(Some(&wrong), &device).unwrap_err();
        assert!(matches!(err, TopologyError::EmbeddingShape { expected: [100, 8], found: [50, 8] }));

        let err = TopologyConfig::new(Variant::Cnn, 20, 2, 6, 4)
            .with_filter_sizes(vec![5])
            .init::<B>(None, &device)
            .unwrap_err();
        assert!(matches!(err, TopologyError::FilterTooWide { width: 5, max_len: 4 }));
    }

    #[test]
    fn test_variant_names() {
        assert_eq!("FastText".parse::<Variant>().unwrap(), Variant::FastText);
        assert_eq!("ff".parse::<Variant>().unwrap(), Variant::FeedForward);
        assert!("lstm".parse::<Variant>().is_err());
    }

    #[test]
    fn test_summary_display_lists_layers() {
        let model = feedforward(2, vec![4, 3], PoolMode::Sum).init::<B>(None, &Default::default()).unwrap();
        let text  = model.summary().to_string();
        assert!(text.contains("embedding   100 x 8"));
        assert!(text.contains("pool        sum → 8"));
        assert!(text.contains("dense       8 → 4 + batchnorm relu"));
        assert!(text.contains("output      3 → 1 sigmoid"));
    }
}
