// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network code lives here; the harness only sees
// TopologyConfig, TextClassifier and train_and_evaluate.
//
//   layers.rs    — Closed strategy enums chosen at build time:
//                  • PoolMode   (sum, max, mean, concat)
//                  • Activation (relu, tanh, prelu, leakyrelu, elu)
//                  • OutputHead (sigmoid + binary CE for 2 labels,
//                                softmax + categorical CE otherwise)
//
//   topology.rs  — TopologyConfig → TextClassifier
//                  • feedforward bag of embeddings
//                  • fastText (mean of embeddings)
//                  • Kim-style CNN
//
//   trainer.rs   — One fold's training run
//                  Adam, validation tail, early stopping,
//                  test accuracy and predictions
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Joulin et al. (2016) Bag of Tricks for Efficient
//            Text Classification

/// Pooling, activation and output head strategies
pub mod layers;

/// Classifier topologies and their builder
pub mod topology;

/// Training loop with validation and early stopping
pub mod trainer;
