// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the core concepts:
// labelled sentences, cross-validation folds, and the source
// that produces a corpus.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// A raw labelled sentence as read from the corpus
pub mod sentence;

// One train/test partition of the dataset
pub mod fold;

// Core abstractions (traits) that other layers implement
pub mod traits;
