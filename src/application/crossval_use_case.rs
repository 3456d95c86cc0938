// ============================================================
// Layer 2 — CrossValUseCase
// ============================================================
// Runs k-fold cross-validation of one classifier configuration:
//
//   Step 1: Load the CSV corpus             (Layer 4 - data)
//   Step 2: Tokenise every sentence         (Layer 4 - data)
//   Step 3: Build vocabulary, pad, encode   (Layer 4 - data)
//   Step 4: Load word vectors (optional)    (Layer 4 - data)
//   Step 5: Stratified k folds              (Layer 4 - data)
//   Step 6: Per fold: build a fresh model,
//           train, evaluate                 (Layer 5 - ml)
//   Step 7: Report, metrics CSV, JSON       (Layer 6 - infra)
//
// Steps 1-4 run once; the prepared corpus is only read afterwards.
// Any fold whose training fails aborts the run. Diagnostics and
// metric files never do: their failures are logged and skipped.
//
// Reference: Kohavi (1995) A Study of Cross-Validation and
//            Bootstrap for Accuracy Estimation

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::data::{
    dataset::{select, TextSample},
    embeddings::{EmbeddingMatrix, Word2VecFile, WordVectorSource},
    labels::LabelEncoder,
    loader::CsvCorpus,
    preprocessor::Preprocessor,
    splitter::stratified_kfold,
    vocab::{max_sentence_len, Vocabulary, UNK_TOKEN},
    DataError,
};
use crate::domain::traits::CorpusSource;
use crate::infra::{
    metrics::{FoldMetrics, MetricsLogger},
    report::{self, LabelFrequency},
    run_store::RunStore,
};
use crate::ml::{
    layers::{Activation, PoolMode},
    topology::{TopologyConfig, Variant},
    trainer::{train_and_evaluate, TrainingConfig},
};

// ─── Experiment Configuration ────────────────────────────────────────────────
// Every setting of one cross-validation run. Saved next to the
// metrics as experiment_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub corpus_path:          String,
    pub text_column:          String,
    pub label_column:         String,
    /// Rows with these labels are removed before anything else
    pub drop_labels:          Vec<String>,
    /// word2vec .bin or text .txt/.vec file
    pub word_vectors:         Option<String>,
    pub output_dir:           String,
    pub lowercase:            bool,

    pub variant:              Variant,
    pub embedding_dim:        usize,
    pub layer_sizes:          Vec<usize>,
    pub pool_mode:            PoolMode,
    pub activation:           Activation,
    pub filter_sizes:         Vec<usize>,
    pub nb_filters:           usize,
    pub trainable_embeddings: bool,
    pub mask_padding:         bool,

    pub batch_size:           usize,
    pub epochs:               usize,
    pub lr:                   f64,
    pub beta_1:               f32,
    pub beta_2:               f32,
    pub epsilon:              f32,
    pub patience:             usize,
    pub folds:                usize,
    pub seed:                 u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            corpus_path:          "data/sentences.csv".to_string(),
            text_column:          "sentence".to_string(),
            label_column:         "label".to_string(),
            drop_labels:          Vec::new(),
            word_vectors:         None,
            output_dir:           "runs".to_string(),
            lowercase:            true,
            variant:              Variant::FeedForward,
            embedding_dim:        300,
            layer_sizes:          vec![100],
            pool_mode:            PoolMode::Max,
            activation:           Activation::Relu,
            filter_sizes:         vec![5, 10, 15],
            nb_filters:           150,
            trainable_embeddings: true,
            mask_padding:         true,
            batch_size:           128,
            epochs:               15,
            lr:                   1e-3,
            beta_1:               0.9,
            beta_2:               0.999,
            epsilon:              1e-8,
            patience:             5,
            folds:                10,
            seed:                 0,
        }
    }
}

impl ExperimentConfig {
    pub fn training(&self) -> TrainingConfig {
        TrainingConfig::new()
            .with_batch_size(self.batch_size)
            .with_max_epochs(self.epochs)
            .with_lr(self.lr)
            .with_beta_1(self.beta_1)
            .with_beta_2(self.beta_2)
            .with_epsilon(self.epsilon)
            .with_patience(self.patience)
            .with_seed(self.seed)
    }

    pub fn topology(&self, vocab_size: usize, nb_labels: usize, max_len: usize) -> TopologyConfig {
        TopologyConfig::new(self.variant, vocab_size, nb_labels, self.embedding_dim, max_len)
            .with_layer_sizes(self.layer_sizes.clone())
            .with_pool_mode(self.pool_mode)
            .with_activation(self.activation)
            .with_filter_sizes(self.filter_sizes.clone())
            .with_nb_filters(self.nb_filters)
            .with_trainable_embeddings(self.trainable_embeddings)
            .with_mask_padding(self.mask_padding)
    }

    /// (name, value) pairs printed before the first fold
    pub fn hyperparameters(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("batch_size", self.batch_size.to_string()),
            ("nb_epoch", self.epochs.to_string()),
            ("lr", self.lr.to_string()),
            ("beta_1", self.beta_1.to_string()),
            ("beta_2", self.beta_2.to_string()),
            ("epsilon", self.epsilon.to_string()),
            ("emb_dim", self.embedding_dim.to_string()),
            ("trainable_embeddings", self.trainable_embeddings.to_string()),
            ("word_vectors", self.word_vectors.clone().unwrap_or_else(|| "none".into())),
        ];
        match self.variant {
            Variant::FeedForward => {
                params.push(("layer_sizes", format!("{:?}", self.layer_sizes)));
                params.push(("pool_mode", self.pool_mode.to_string()));
                params.push(("activation", self.activation.to_string()));
            }
            Variant::FastText => {}
            Variant::Cnn => {
                params.push(("filter_sizes", format!("{:?}", self.filter_sizes)));
                params.push(("nb_filters", self.nb_filters.to_string()));
            }
        }
        params.push(("folds", self.folds.to_string()));
        params
    }
}

// ─── Prepared Corpus ──────────────────────────────────────────────────────────
/// Everything built once from the corpus and shared by all folds.
#[derive(Debug, Clone)]
pub struct PreparedCorpus {
    /// Encoded sentences, corpus order
    pub samples:    Vec<TextSample>,
    /// Class index of every sample
    pub labels:     Vec<usize>,
    pub vocab:      Vocabulary,
    pub encoder:    LabelEncoder,
    pub max_len:    usize,
    pub embeddings: Option<EmbeddingMatrix>,
}

impl PreparedCorpus {
    pub fn nb_labels(&self) -> usize {
        self.encoder.len()
    }

    /// [rows, max_len] of the padded token matrix
    pub fn shape(&self) -> [usize; 2] {
        [self.samples.len(), self.max_len]
    }
}

/// Steps 1-4: load, tokenise, encode and (optionally) attach word vectors.
pub fn prepare_corpus(
    cfg:     &ExperimentConfig,
    corpus:  &dyn CorpusSource,
    vectors: Option<&dyn WordVectorSource>,
) -> Result<PreparedCorpus> {
    tracing::info!("Loading data...");
    let rows = corpus.load_all()?;
    if rows.is_empty() {
        return Err(DataError::EmptyCorpus.into());
    }

    let preprocessor = if cfg.lowercase {
        Preprocessor::new()
    } else {
        Preprocessor::new().preserve_case()
    };
    let tokens: Vec<Vec<String>> = rows.iter().map(|r| preprocessor.tokenize(&r.text)).collect();

    let mut vocab = Vocabulary::build(tokens.iter().map(Vec::as_slice));
    vocab.insert(UNK_TOKEN);
    let max_len = max_sentence_len(&tokens);

    let label_strings: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    let encoder = LabelEncoder::fit(&label_strings);
    let labels  = encoder
        .transform_all(&label_strings)
        .context("Label encoder does not cover every corpus label")?;

    let samples = tokens
        .iter()
        .zip(&labels)
        .map(|(t, &label)| TextSample::new(vocab.encode(t, max_len), label))
        .collect();

    let embeddings = match vectors {
        Some(source) => Some(build_embeddings(cfg, source, &vocab)?),
        None => None,
    };

    tracing::info!(
        "Data loaded: {} sentences, {} words in vocabulary, max length {}",
        rows.len(),
        vocab.len(),
        max_len
    );
    tracing::info!("Number of labels: {} [{}]", encoder.len(), encoder.classes().join(", "));

    Ok(PreparedCorpus { samples, labels, vocab, encoder, max_len, embeddings })
}

fn build_embeddings(
    cfg:    &ExperimentConfig,
    source: &dyn WordVectorSource,
    vocab:  &Vocabulary,
) -> Result<EmbeddingMatrix> {
    let mut vectors = source.load_for(vocab)?;
    if vectors.dim() != cfg.embedding_dim {
        return Err(DataError::DimensionMismatch {
            expected: cfg.embedding_dim,
            found:    vectors.dim(),
        }
        .into());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    vectors.add_unknown_words(vocab, &mut rng);

    // The model's table has vocab.size() + 1 rows; see TopologyConfig
    Ok(EmbeddingMatrix::from_word_vectors(&vectors, vocab, vocab.size() + 1)?)
}

// ─── Results ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldOutcome {
    /// Starts at 1
    pub fold:                  usize,
    pub accuracy:              f64,
    pub elapsed_secs:          f64,
    pub test_size:             usize,
    pub epochs_run:            usize,
    /// None when the diagnostic table could not be built
    pub true_label_freqs:      Option<Vec<LabelFrequency>>,
    pub predicted_label_freqs: Option<Vec<LabelFrequency>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub folds:         Vec<FoldOutcome>,
    pub mean_accuracy: f64,
    /// Population standard deviation of the fold accuracies
    pub std_accuracy:  f64,
}

impl CrossValidationReport {
    pub fn from_folds(folds: Vec<FoldOutcome>) -> Self {
        let n    = folds.len().max(1) as f64;
        let mean = folds.iter().map(|f| f.accuracy).sum::<f64>() / n;
        let var  = folds.iter().map(|f| (f.accuracy - mean).powi(2)).sum::<f64>() / n;
        Self { folds, mean_accuracy: mean, std_accuracy: var.sqrt() }
    }
}

// ─── CrossValUseCase ──────────────────────────────────────────────────────────
pub struct CrossValUseCase {
    config: ExperimentConfig,
}

impl CrossValUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Rebuild the experiment saved in `run_dir`. Results go back to
    /// `run_dir` even if the saved config named another output directory.
    pub fn from_run_dir(run_dir: &str) -> Result<Self> {
        let mut config = RunStore::new(run_dir)
            .load_config()
            .context("Cannot repeat the run")?;
        config.output_dir = run_dir.to_string();
        Ok(Self::new(config))
    }

    /// Load the configured corpus from disk and cross-validate.
    pub fn execute<B: AutodiffBackend>(&self, device: &B::Device) -> Result<CrossValidationReport> {
        let cfg    = &self.config;
        let corpus = CsvCorpus::new(&cfg.corpus_path)
            .with_columns(cfg.text_column.clone(), cfg.label_column.clone())
            .with_drop_labels(cfg.drop_labels.clone());
        let vectors = cfg
            .word_vectors
            .as_ref()
            .map(|path| Word2VecFile::new(path).with_dim(cfg.embedding_dim));

        let data = prepare_corpus(cfg, &corpus, vectors.as_ref().map(|v| v as &dyn WordVectorSource))?;
        self.run::<B>(&data, device)
    }

    /// Steps 5-7 on an already prepared corpus.
    pub fn run<B: AutodiffBackend>(
        &self,
        data:   &PreparedCorpus,
        device: &B::Device,
    ) -> Result<CrossValidationReport> {
        let cfg = &self.config;
        B::seed(cfg.seed);

        report::print_hyperparameters(&cfg.variant.to_string(), &cfg.hyperparameters());

        let store = RunStore::new(&cfg.output_dir);
        if let Err(e) = store.save_config(cfg) {
            tracing::warn!("Could not save experiment config: {:#}", e);
        }
        let metrics = MetricsLogger::new(&cfg.output_dir)
            .map_err(|e| tracing::warn!("Metrics CSV disabled: {:#}", e))
            .ok();

        // ── Step 5: stratified folds ─────────────────────────────────────────
        let folds    = stratified_kfold(&data.labels, cfg.folds, cfg.seed)?;
        let training = cfg.training();
        let topology = cfg.topology(data.vocab.size(), data.nb_labels(), data.max_len);

        // ── Step 6: one fresh model per fold ─────────────────────────────────
        let mut outcomes = Vec::with_capacity(folds.len());
        for fold in &folds {
            let started = Instant::now();

            let model = topology
                .init::<B>(data.embeddings.as_ref(), device)
                .context("Cannot build the classifier")?;
            if fold.index == 0 {
                println!("\n{}", model.summary());
            }

            let train = select(&data.samples, &fold.train);
            let test  = select(&data.samples, &fold.test);

            let outcome = train_and_evaluate(model, train, test, &training, device)
                .with_context(|| format!("Training failed on fold {}", fold.number()))?;

            let elapsed     = started.elapsed().as_secs_f64();
            let true_labels = fold.test.iter().map(|&i| data.labels[i]).collect::<Vec<_>>();

            let true_freqs = diagnostic_table(
                "Label frequencies in y[test]",
                &true_labels,
                &data.encoder,
            );
            let predicted_freqs = diagnostic_table(
                "Label frequencies in predict(y[test])",
                &outcome.test_predictions,
                &data.encoder,
            );

            println!(
                "{}",
                report::fold_line(fold.number(), folds.len(), elapsed, outcome.accuracy, fold.test.len())
            );

            let fold_outcome = FoldOutcome {
                fold:                  fold.number(),
                accuracy:              outcome.accuracy,
                elapsed_secs:          elapsed,
                test_size:             fold.test.len(),
                epochs_run:            outcome.history.len(),
                true_label_freqs:      true_freqs,
                predicted_label_freqs: predicted_freqs,
            };

            if let Some(logger) = &metrics {
                let logged = logger.log_epochs(fold.number(), &outcome.history).and_then(|_| {
                    logger.log_fold(&FoldMetrics {
                        fold:       fold_outcome.fold,
                        accuracy:   fold_outcome.accuracy,
                        seconds:    fold_outcome.elapsed_secs,
                        test_size:  fold_outcome.test_size,
                        epochs_run: fold_outcome.epochs_run,
                    })
                });
                if let Err(e) = logged {
                    tracing::warn!("Could not write metrics for fold {}: {:#}", fold.number(), e);
                }
            }

            outcomes.push(fold_outcome);
        }

        // ── Step 7: aggregate ────────────────────────────────────────────────
        let result = CrossValidationReport::from_folds(outcomes);
        println!("{}", report::summary_line(result.mean_accuracy, result.std_accuracy));

        if let Err(e) = store.save_report(&result) {
            tracing::warn!("Could not save cross-validation report: {:#}", e);
        }
        Ok(result)
    }
}

/// Print one label frequency table; log and skip it on failure.
fn diagnostic_table(title: &str, classes: &[usize], encoder: &LabelEncoder) -> Option<Vec<LabelFrequency>> {
    match report::label_frequencies(classes, encoder) {
        Ok(rows) => {
            report::print_label_frequencies(title, &rows);
            Some(rows)
        }
        Err(e) => {
            tracing::warn!("Skipping '{}': {:#}", title, e);
            None
        }
    }
}
