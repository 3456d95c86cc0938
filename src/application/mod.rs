// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal each:
//
//   crossval_use_case.rs — k-fold cross-validation of a classifier
//   inspect_use_case.rs  — prepare data and build the classifier
//                          without training
//
// Rules for this layer:
//   - No tensor code here (that's Layer 5)
//   - No file formats here (that's Layers 4 and 6)
//   - Only workflow coordination

/// Cross-validation harness and experiment configuration
pub mod crossval_use_case;

/// Dry run: shapes, labels and topology summary
pub mod inspect_use_case;
