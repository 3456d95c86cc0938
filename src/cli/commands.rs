// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands. `crossval` and `inspect` share one set
// of experiment flags; `rerun` reads them back from a run directory.
//
// Defaults: 300-dimensional embeddings, one hidden layer of 100
// units, max pooling, ReLU, Adam(lr 0.001, β1 0.9, β2 0.999,
// ε 1e-8), batch 128, 15 epochs, 10 folds.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::crossval_use_case::ExperimentConfig;
use crate::ml::{
    layers::{Activation, PoolMode},
    topology::Variant,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cross-validate a classifier on a labelled sentence corpus
    Crossval(ExperimentArgs),

    /// Load the corpus and build the classifier without training
    Inspect(ExperimentArgs),

    /// Repeat an earlier crossval run from its saved experiment config
    Rerun(RerunArgs),
}

/// Tensor backend the experiment runs on
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU
    Ndarray,
    /// GPU through WebGPU
    Wgpu,
}

#[derive(Args, Debug)]
pub struct ExperimentArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub train: TrainArgs,
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// CSV file with a header row
    #[arg(long, default_value = "data/sentences.csv")]
    pub corpus: String,

    /// Column holding the sentence text
    #[arg(long, default_value = "sentence")]
    pub text_column: String,

    /// Column holding the label
    #[arg(long, default_value = "label")]
    pub label_column: String,

    /// Labels whose rows are removed, comma separated
    #[arg(long, value_delimiter = ',')]
    pub drop_labels: Vec<String>,

    /// Pretrained vectors: word2vec .bin, or .txt/.vec text format
    #[arg(long)]
    pub word_vectors: Option<String>,

    /// Keep the original casing of tokens
    #[arg(long)]
    pub keep_case: bool,

    /// Directory for the config, report and metrics files
    #[arg(long, default_value = "runs")]
    pub output_dir: String,
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// feedforward, fasttext or cnn
    #[arg(long, default_value = "feedforward")]
    pub model: Variant,

    /// Dimension of the word embeddings (must match --word-vectors)
    #[arg(long, default_value_t = 300)]
    pub emb_dim: usize,

    /// Hidden layer widths, comma separated (feedforward)
    #[arg(long, value_delimiter = ',', default_value = "100")]
    pub layer_sizes: Vec<usize>,

    /// sum, max, mean or concat (feedforward)
    #[arg(long, default_value = "max")]
    pub pool_mode: PoolMode,

    /// relu, tanh, prelu, leakyrelu or elu (feedforward)
    #[arg(long, default_value = "relu")]
    pub activation: Activation,

    /// Convolution filter widths, comma separated (cnn)
    #[arg(long, value_delimiter = ',', default_value = "5,10,15")]
    pub filter_sizes: Vec<usize>,

    /// Filters per width (cnn)
    #[arg(long, default_value_t = 150)]
    pub nb_filters: usize,

    /// Freeze the embedding table
    #[arg(long)]
    pub static_embeddings: bool,

    /// Let padded positions take part in pooling
    #[arg(long)]
    pub no_mask: bool,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Upper bound; early stopping may end a fold sooner
    #[arg(long, default_value_t = 15)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 0.9)]
    pub beta_1: f32,

    #[arg(long, default_value_t = 0.999)]
    pub beta_2: f32,

    #[arg(long, default_value_t = 1e-8)]
    pub epsilon: f32,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 5)]
    pub patience: usize,

    #[arg(long, default_value_t = 10)]
    pub folds: usize,

    /// Seed for folds, unknown-word vectors and initialisation
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct RerunArgs {
    /// Output directory of the earlier run (holds experiment_config.json)
    #[arg(long)]
    pub run_dir: String,
}

/// The application layer never sees clap types.
impl From<ExperimentArgs> for ExperimentConfig {
    fn from(a: ExperimentArgs) -> Self {
        let ExperimentArgs { data, model, train } = a;
        ExperimentConfig {
            corpus_path:          data.corpus,
            text_column:          data.text_column,
            label_column:         data.label_column,
            drop_labels:          data.drop_labels,
            word_vectors:         data.word_vectors,
            output_dir:           data.output_dir,
            lowercase:            !data.keep_case,
            variant:              model.model,
            embedding_dim:        model.emb_dim,
            layer_sizes:          model.layer_sizes,
            pool_mode:            model.pool_mode,
            activation:           model.activation,
            filter_sizes:         model.filter_sizes,
            nb_filters:           model.nb_filters,
            trainable_embeddings: !model.static_embeddings,
            mask_padding:         !model.no_mask,
            batch_size:           train.batch_size,
            epochs:               train.epochs,
            lr:                   train.lr,
            beta_1:               train.beta_1,
            beta_2:               train.beta_2,
            epsilon:              train.epsilon,
            patience:             train.patience,
            folds:                train.folds,
            seed:                 train.seed,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> ExperimentConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Crossval(a) | Commands::Inspect(a) => a.into(),
            Commands::Rerun(_) => panic!("rerun takes no experiment flags"),
        }
    }

    #[test]
    fn test_default_hyperparameters() {
        let cfg = parse(&["sentence-cv", "crossval"]);
        let def = ExperimentConfig::default();

        assert_eq!(cfg.embedding_dim, 300);
        assert_eq!(cfg.layer_sizes, vec![100]);
        assert_eq!(cfg.batch_size, def.batch_size);
        assert_eq!(cfg.epochs, def.epochs);
        assert_eq!(cfg.folds, 10);
        assert_eq!(cfg.pool_mode, PoolMode::Max);
        assert!(cfg.trainable_embeddings && cfg.mask_padding && cfg.lowercase);
    }

    #[test]
    fn test_model_flags() {
        let cfg = parse(&[
            "sentence-cv", "inspect",
            "--model", "cnn",
            "--filter-sizes", "3,4,5",
            "--pool-mode", "mean",
            "--activation", "prelu",
            "--drop-labels", "unknown,other",
            "--static-embeddings",
        ]);
        assert_eq!(cfg.variant, Variant::Cnn);
        assert_eq!(cfg.filter_sizes, vec![3, 4, 5]);
        assert_eq!(cfg.pool_mode, PoolMode::Mean);
        assert_eq!(cfg.activation, Activation::PRelu);
        assert_eq!(cfg.drop_labels, vec!["unknown".to_string(), "other".to_string()]);
        assert!(!cfg.trainable_embeddings);
    }

    #[test]
    fn test_unknown_pool_mode_rejected() {
        assert!(Cli::try_parse_from(["sentence-cv", "crossval", "--pool-mode", "median"]).is_err());
    }

    #[test]
    fn test_rerun_needs_run_dir() {
        assert!(Cli::try_parse_from(["sentence-cv", "rerun"]).is_err());

        let cli = Cli::try_parse_from(["sentence-cv", "rerun", "--run-dir", "runs/a"]).unwrap();
        match cli.command {
            Commands::Rerun(args) => assert_eq!(args.run_dir, "runs/a"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_backend_flag() {
        let cli = Cli::try_parse_from(["sentence-cv", "crossval", "--backend", "wgpu"]).unwrap();
        assert_eq!(cli.backend, BackendKind::Wgpu);
    }
}
