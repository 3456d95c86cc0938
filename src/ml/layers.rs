// ============================================================
// Layer 5 — Pooling, Activation and Output Strategies
// ============================================================
// Closed enumerations chosen once when a topology is built:
//
//   PoolMode    — how [batch, max_len, dim] embeddings become one
//                 vector per sentence
//   Activation  — the nonlinearity used by every hidden layer
//   OutputHead  — output cardinality, activation AND loss, fixed
//                 together so they can never disagree:
//                   2 labels → 1 unit, sigmoid, binary cross-entropy
//                   N labels → N units, softmax, categorical CE
//
// All three parse from their lowercase names (FromStr) so the CLI
// can hand strings straight through.

use burn::{
    module::Ignored,
    nn::{
        loss::{BinaryCrossEntropyLossConfig, CrossEntropyLossConfig},
        PRelu, PReluConfig,
    },
    prelude::*,
    tensor::activation,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::ml::topology::TopologyError;

/// Negative slope of LeakyReLU
pub const LEAKY_RELU_SLOPE: f64 = 0.3;

/// Saturation value of ELU for negative inputs
pub const ELU_ALPHA: f64 = 1.0;

// ─── PoolMode ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolMode {
    /// Element-wise sum over positions → [batch, dim]
    Sum,
    /// Element-wise max over positions → [batch, dim]
    Max,
    /// Element-wise mean over positions → [batch, dim]
    Mean,
    /// Flatten all positions → [batch, max_len * dim]
    Concat,
}

impl PoolMode {
    /// Width of the pooled vector for sentences of `max_len` tokens
    pub fn output_width(self, max_len: usize, dim: usize) -> usize {
        match self {
            PoolMode::Concat => max_len * dim,
            PoolMode::Sum | PoolMode::Max | PoolMode::Mean => dim,
        }
    }

    /// [batch, max_len, dim] → [batch, output_width]
    pub fn apply<B: Backend>(self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, len, dim] = x.dims();
        match self {
            PoolMode::Sum    => x.sum_dim(1).reshape([batch, dim]),
            PoolMode::Max    => x.max_dim(1).reshape([batch, dim]),
            PoolMode::Mean   => x.mean_dim(1).reshape([batch, dim]),
            PoolMode::Concat => x.reshape([batch, len * dim]),
        }
    }
}

impl FromStr for PoolMode {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum"                => Ok(PoolMode::Sum),
            "max"                => Ok(PoolMode::Max),
            "mean" | "avg"       => Ok(PoolMode::Mean),
            "concat" | "flatten" => Ok(PoolMode::Concat),
            _ => Err(TopologyError::Unknown { kind: "pool mode", value: s.to_string() }),
        }
    }
}

impl fmt::Display for PoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolMode::Sum    => "sum",
            PoolMode::Max    => "max",
            PoolMode::Mean   => "mean",
            PoolMode::Concat => "concat",
        };
        f.write_str(name)
    }
}

// ─── Activation ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Tanh,
    /// ReLU with a learned negative slope per unit
    PRelu,
    LeakyRelu,
    Elu,
}

impl Activation {
    /// Build the activation module for a layer of `units` outputs.
    pub fn init<B: Backend>(self, units: usize, device: &B::Device) -> ActivationLayer<B> {
        let prelu = matches!(self, Activation::PRelu).then(|| {
            PReluConfig::new()
                .with_num_parameters(units)
                .with_alpha(0.0)
                .init(device)
        });

        ActivationLayer { kind: Ignored(self), prelu }
    }
}

impl FromStr for Activation {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relu"                    => Ok(Activation::Relu),
            "tanh"                    => Ok(Activation::Tanh),
            "prelu"                   => Ok(Activation::PRelu),
            "leakyrelu" | "leaky_relu" => Ok(Activation::LeakyRelu),
            "elu"                     => Ok(Activation::Elu),
            _ => Err(TopologyError::Unknown { kind: "activation", value: s.to_string() }),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Relu      => "relu",
            Activation::Tanh      => "tanh",
            Activation::PRelu     => "prelu",
            Activation::LeakyRelu => "leakyrelu",
            Activation::Elu       => "elu",
        };
        f.write_str(name)
    }
}

/// An Activation bound to a layer; holds the learned slopes for PReLU.
#[derive(Module, Debug)]
pub struct ActivationLayer<B: Backend> {
    kind:  Ignored<Activation>,
    prelu: Option<PRelu<B>>,
}

impl<B: Backend> ActivationLayer<B> {
    pub fn kind(&self) -> Activation {
        self.kind.0
    }

    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match (self.kind.0, &self.prelu) {
            (Activation::Relu, _)        => activation::relu(x),
            (Activation::Tanh, _)        => activation::tanh(x),
            (Activation::LeakyRelu, _)   => activation::leaky_relu(x, LEAKY_RELU_SLOPE),
            (Activation::Elu, _)         => elu(x, ELU_ALPHA),
            (Activation::PRelu, Some(p)) => p.forward(x),
            (Activation::PRelu, None)    => activation::relu(x),
        }
    }
}

/// x for x > 0, alpha * (exp(x) - 1) otherwise
pub fn elu<B: Backend, const D: usize>(x: Tensor<B, D>, alpha: f64) -> Tensor<B, D> {
    let negative = x.clone().exp().sub_scalar(1.0).mul_scalar(alpha);
    let mask     = x.clone().lower_elem(0.0);
    x.mask_where(mask, negative)
}

// ─── OutputHead ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputHead {
    /// One sigmoid unit for two-class problems
    Sigmoid,
    /// One softmax unit per class
    Softmax { classes: usize },
}

/// Loss paired with an OutputHead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    BinaryCrossEntropy,
    CategoricalCrossEntropy,
}

impl OutputHead {
    pub fn for_labels(nb_labels: usize) -> Self {
        if nb_labels == 2 {
            OutputHead::Sigmoid
        } else {
            OutputHead::Softmax { classes: nb_labels }
        }
    }

    /// Number of output units
    pub fn units(self) -> usize {
        match self {
            OutputHead::Sigmoid               => 1,
            OutputHead::Softmax { classes }   => classes,
        }
    }

    pub fn loss_kind(self) -> LossKind {
        match self {
            OutputHead::Sigmoid        => LossKind::BinaryCrossEntropy,
            OutputHead::Softmax { .. } => LossKind::CategoricalCrossEntropy,
        }
    }

    /// Logits → probabilities
    pub fn activate<B: Backend>(self, logits: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            OutputHead::Sigmoid        => activation::sigmoid(logits),
            OutputHead::Softmax { .. } => activation::softmax(logits, 1),
        }
    }

    /// Mean loss of a batch. `labels` are class indices [batch].
    /// Both losses take logits so the sigmoid / softmax is folded in.
    pub fn loss<B: Backend>(self, logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let device = logits.device();
        match self.loss_kind() {
            LossKind::BinaryCrossEntropy => {
                let [batch, _] = logits.dims();
                BinaryCrossEntropyLossConfig::new()
                    .with_logits(true)
                    .init(&device)
                    .forward(logits, labels.reshape([batch, 1]))
            }
            LossKind::CategoricalCrossEntropy => {
                CrossEntropyLossConfig::new()
                    .init(&device)
                    .forward(logits, labels)
            }
        }
    }

    /// Predicted class index per row: p > 0.5 for sigmoid, argmax for softmax
    pub fn predict<B: Backend>(self, logits: Tensor<B, 2>) -> Tensor<B, 1, Int> {
        let [batch, _] = logits.dims();
        match self {
            OutputHead::Sigmoid        => logits.greater_elem(0.0).int().reshape([batch]),
            OutputHead::Softmax { .. } => logits.argmax(1).reshape([batch]),
        }
    }
}

impl fmt::Display for OutputHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputHead::Sigmoid             => write!(f, "1 sigmoid"),
            OutputHead::Softmax { classes } => write!(f, "{} softmax", classes),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn embedded(max_len: usize, dim: usize) -> Tensor<B, 3> {
        let values: Vec<f32> = (0..2 * max_len * dim).map(|v| v as f32).collect();
        Tensor::<B, 1>::from_floats(values.as_slice(), &Default::default()).reshape([2, max_len, dim])
    }

    #[test]
    fn test_reducing_pools_keep_embedding_dim() {
        for max_len in [1, 3, 7] {
            for mode in [PoolMode::Sum, PoolMode::Max, PoolMode::Mean] {
                let pooled = mode.apply(embedded(max_len, 4));
                assert_eq!(pooled.dims(), [2, 4], "{mode} with max_len {max_len}");
                assert_eq!(mode.output_width(max_len, 4), 4);
            }
        }
    }

    #[test]
    fn test_concat_flattens_positions() {
        let pooled = PoolMode::Concat.apply(embedded(5, 3));
        assert_eq!(pooled.dims(), [2, 15]);
        assert_eq!(PoolMode::Concat.output_width(5, 3), 15);
    }

    #[test]
    fn test_pool_values() {
        // first sentence rows: [0,1], [2,3]
        let x = embedded(2, 2);
        let row = |t: Tensor<B, 2>| -> Vec<f32> { t.slice([0..1]).into_data().iter::<f32>().collect() };

        assert_eq!(row(PoolMode::Sum.apply(x.clone())), vec![2.0, 4.0]);
        assert_eq!(row(PoolMode::Max.apply(x.clone())), vec![2.0, 3.0]);
        assert_eq!(row(PoolMode::Mean.apply(x)), vec![1.0, 2.0]);
    }

    #[test]
    fn test_zeroed_padding_still_counts_in_mean_and_max() {
        // one negative token followed by three zeroed padding positions
        let x = Tensor::<B, 1>::from_floats([-2.0, 0.0, 0.0, 0.0], &Default::default()).reshape([1, 4, 1]);

        let sum:  f32 = PoolMode::Sum.apply(x.clone()).into_scalar().elem();
        let mean: f32 = PoolMode::Mean.apply(x.clone()).into_scalar().elem();
        let max:  f32 = PoolMode::Max.apply(x).into_scalar().elem();

        assert_eq!(sum, -2.0);
        assert_eq!(mean, -0.5);
        assert_eq!(max, 0.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("mean".parse::<PoolMode>().unwrap(), PoolMode::Mean);
        assert_eq!("flatten".parse::<PoolMode>().unwrap(), PoolMode::Concat);
        assert_eq!("LeakyReLU".parse::<Activation>().unwrap(), Activation::LeakyRelu);
        assert!("median".parse::<PoolMode>().is_err());
        assert!("swish".parse::<Activation>().is_err());
    }

    #[test]
    fn test_elu() {
        let x = Tensor::<B, 1>::from_floats([-1.0, 0.0, 2.0], &Default::default());
        let y: Vec<f32> = elu(x, 1.0).into_data().iter::<f32>().collect();
        assert!((y[0] - ((-1.0f32).exp() - 1.0)).abs() < 1e-6);
        assert_eq!(y[1], 0.0);
        assert_eq!(y[2], 2.0);
    }

    #[test]
    fn test_activation_layers_keep_shape() {
        let device = Default::default();
        let x      = Tensor::<B, 2>::from_floats([[-1.0, 0.5, 2.0]], &device);
        for kind in [Activation::Relu, Activation::Tanh, Activation::PRelu, Activation::LeakyRelu, Activation::Elu] {
            let layer = kind.init::<B>(3, &device);
            assert_eq!(layer.kind(), kind);
            assert_eq!(layer.forward(x.clone()).dims(), [1, 3]);
        }
    }

    #[test]
    fn test_head_pairs_units_and_loss() {
        let binary = OutputHead::for_labels(2);
        assert_eq!(binary, OutputHead::Sigmoid);
        assert_eq!(binary.units(), 1);
        assert_eq!(binary.loss_kind(), LossKind::BinaryCrossEntropy);

        let multi = OutputHead::for_labels(5);
        assert_eq!(multi.units(), 5);
        assert_eq!(multi.loss_kind(), LossKind::CategoricalCrossEntropy);
    }

    #[test]
    fn test_head_predictions() {
        let device = Default::default();

        let logits = Tensor::<B, 2>::from_floats([[-2.0], [0.5]], &device);
        let preds: Vec<i64> = OutputHead::Sigmoid.predict(logits).into_data().iter::<i64>().collect();
        assert_eq!(preds, vec![0, 1]);

        let logits = Tensor::<B, 2>::from_floats([[0.1, 3.0, 0.2], [5.0, 0.0, 0.0]], &device);
        let preds: Vec<i64> = OutputHead::Softmax { classes: 3 }.predict(logits).into_data().iter::<i64>().collect();
        assert_eq!(preds, vec![1, 0]);
    }

    #[test]
    fn test_losses_are_finite_and_positive() {
        let device = Default::default();
        let labels = Tensor::<B, 1, Int>::from_ints([0, 1], &device);

        let bce = OutputHead::Sigmoid
            .loss(Tensor::<B, 2>::from_floats([[-1.0], [1.0]], &device), labels.clone())
            .into_scalar();
        assert!(bce.is_finite() && bce > 0.0);

        let cce = OutputHead::Softmax { classes: 3 }
            .loss(Tensor::<B, 2>::from_floats([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0]], &device), labels)
            .into_scalar();
        assert!(cce.is_finite() && cce > 0.0);
    }
}
