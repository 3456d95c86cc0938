// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Dry run of an experiment: prepares the corpus and builds the
// classifier exactly as cross-validation would, prints what it
// built, and stops before any training.
//
//   Step 1: Prepare corpus (+ word vectors)  (Layer 4 - data)
//   Step 2: Label distribution               (Layer 6 - infra)
//   Step 3: Build the topology once          (Layer 5 - ml)

use anyhow::{Context, Result};
use burn::prelude::Backend;

use crate::application::crossval_use_case::{prepare_corpus, ExperimentConfig, PreparedCorpus};
use crate::data::{
    embeddings::{Word2VecFile, WordVectorSource},
    loader::CsvCorpus,
};
use crate::infra::report::{self, LabelFrequency};
use crate::ml::topology::TopologySummary;

/// What a dry run found
#[derive(Debug, Clone)]
pub struct Inspection {
    /// [sentences, max_len]
    pub shape:        [usize; 2],
    pub vocab_words:  usize,
    pub labels:       Vec<LabelFrequency>,
    pub embedding:    Option<[usize; 2]>,
    pub topology:     TopologySummary,
}

pub struct InspectUseCase {
    config: ExperimentConfig,
}

impl InspectUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<Inspection> {
        let cfg    = &self.config;
        let corpus = CsvCorpus::new(&cfg.corpus_path)
            .with_columns(cfg.text_column.clone(), cfg.label_column.clone())
            .with_drop_labels(cfg.drop_labels.clone());
        let vectors = cfg
            .word_vectors
            .as_ref()
            .map(|path| Word2VecFile::new(path).with_dim(cfg.embedding_dim));

        let data = prepare_corpus(cfg, &corpus, vectors.as_ref().map(|v| v as &dyn WordVectorSource))?;
        self.inspect::<B>(&data, device)
    }

    pub fn inspect<B: Backend>(&self, data: &PreparedCorpus, device: &B::Device) -> Result<Inspection> {
        let cfg = &self.config;

        let labels = report::label_frequencies(&data.labels, &data.encoder)?;

        let topology = cfg
            .topology(data.vocab.size(), data.nb_labels(), data.max_len)
            .init::<B>(data.embeddings.as_ref(), device)
            .context("Cannot build the classifier")?
            .summary();

        let inspection = Inspection {
            shape:       data.shape(),
            vocab_words: data.vocab.len(),
            labels,
            embedding:   data.embeddings.as_ref().map(|m| m.shape()),
            topology,
        };

        println!("X shape: {:?}", inspection.shape);
        println!("Vocabulary: {} words", inspection.vocab_words);
        if let Some([rows, dim]) = inspection.embedding {
            println!("Embedding matrix: {} x {}", rows, dim);
        }
        report::print_label_frequencies(
            &format!("Number of labels: {}", data.nb_labels()),
            &inspection.labels,
        );
        report::print_hyperparameters(&cfg.variant.to_string(), &cfg.hyperparameters());
        println!("\n{}", inspection.topology);

        Ok(inspection)
    }
}
