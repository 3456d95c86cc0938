// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Trains one freshly built classifier on one fold and scores it on
// that fold's held-out test set.
//
//   1. The last 10% of the training rows (in fold order, before any
//      shuffling) become the validation set
//   2. Adam minimises the loss paired with the model's OutputHead,
//      mini-batches reshuffled every epoch
//   3. After each epoch the validation loss is computed; training
//      stops after `patience` epochs without improvement
//      (no validation rows → all epochs run)
//   4. The weights of the LAST epoch run predict the test set; the
//      accuracy is computed from those predictions
//
// Burn notes:
//   - Training runs on an AutodiffBackend for gradients
//   - model.valid() returns the model on the inner backend with
//     dropout off and batch norm using running statistics
//   - argmax(1) returns [batch, 1]; predictions are flattened to
//     [batch] before .equal()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use burn::{
    data::dataloader::{batcher::Batcher, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use thiserror::Error;

use crate::data::{
    batcher::TextBatcher,
    dataset::{TextDataset, TextSample},
    splitter::split_validation_tail,
};
use crate::infra::metrics::EpochMetrics;
use crate::ml::topology::TextClassifier;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("test set is empty")]
    EmptyTestSet,

    #[error("{name} must be positive")]
    InvalidSetting { name: &'static str },

    #[error("loss became {loss} during epoch {epoch}")]
    NonFiniteLoss { epoch: usize, loss: f64 },
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TrainingConfig {
    #[config(default = 128)]
    pub batch_size:      usize,
    #[config(default = 15)]
    pub max_epochs:      usize,
    #[config(default = 1e-3)]
    pub lr:              f64,
    #[config(default = 0.9)]
    pub beta_1:          f32,
    #[config(default = 0.999)]
    pub beta_2:          f32,
    #[config(default = 1e-8)]
    pub epsilon:         f32,
    /// Fraction of the training rows held out for early stopping
    #[config(default = 0.1)]
    pub val_split:       f64,
    #[config(default = 5)]
    pub patience:        usize,
    #[config(default = 64)]
    pub eval_batch_size: usize,
    /// Seed for the per-epoch batch shuffle
    #[config(default = 0)]
    pub seed:            u64,
}

impl TrainingConfig {
    fn check(&self) -> Result<(), TrainingError> {
        for (name, value) in [
            ("batch_size", self.batch_size),
            ("max_epochs", self.max_epochs),
            ("eval_batch_size", self.eval_batch_size),
        ] {
            if value == 0 {
                return Err(TrainingError::InvalidSetting { name });
            }
        }
        Ok(())
    }
}

/// Everything one fold's training produced.
#[derive(Debug)]
pub struct TrainOutcome<B: AutodiffBackend> {
    pub model:            TextClassifier<B>,
    /// Fraction of test rows predicted correctly
    pub accuracy:         f64,
    /// Predicted class of every test row, in input order
    pub test_predictions: Vec<usize>,
    pub history:          Vec<EpochMetrics>,
}

/// Mean loss and accuracy over a set of samples.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub loss:     f64,
    pub accuracy: f64,
}

// ─── Early stopping ───────────────────────────────────────────────────────────
/// Stops once the monitored loss has not improved for `patience`
/// consecutive epochs. The first epoch always counts as an improvement.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best:     f64,
    wait:     usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best: f64::INFINITY, wait: 0 }
    }

    /// Record one epoch's loss; true means stop now.
    pub fn should_stop(&mut self, loss: f64) -> bool {
        if loss < self.best {
            self.best = loss;
            self.wait = 0;
            return false;
        }
        self.wait += 1;
        self.wait >= self.patience
    }

    pub fn best(&self) -> f64 {
        self.best
    }
}

// ─── Training ─────────────────────────────────────────────────────────────────
pub fn train_and_evaluate<B: AutodiffBackend>(
    mut model: TextClassifier<B>,
    train:     Vec<TextSample>,
    test:      Vec<TextSample>,
    cfg:       &TrainingConfig,
    device:    &B::Device,
) -> Result<TrainOutcome<B>, TrainingError> {
    cfg.check()?;
    if train.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }
    if test.is_empty() {
        return Err(TrainingError::EmptyTestSet);
    }

    let head = model.head();

    // ── Step 1: validation tail ──────────────────────────────────────────────
    let (train, val) = split_validation_tail(train, cfg.val_split);
    if train.is_empty() {
        return Err(TrainingError::EmptyTrainingSet);
    }
    if val.is_empty() {
        tracing::warn!("No validation rows, early stopping disabled");
    }

    // ── Step 2: Adam optimiser ───────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new()
        .with_beta_1(cfg.beta_1)
        .with_beta_2(cfg.beta_2)
        .with_epsilon(cfg.epsilon)
        .init();

    let train_loader = DataLoaderBuilder::new(TextBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(TextDataset::new(train));

    // ── Step 3: epoch loop ───────────────────────────────────────────────────
    let mut stopper = EarlyStopping::new(cfg.patience);
    let mut history = Vec::with_capacity(cfg.max_epochs);

    for epoch in 1..=cfg.max_epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in train_loader.iter() {
            let logits = model.forward_logits(batch.tokens);
            let loss   = head.loss(logits, batch.labels);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                return Err(TrainingError::NonFiniteLoss { epoch, loss: loss_val });
            }
            loss_sum += loss_val;
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = loss_sum / batches.max(1) as f64;

        let val_eval = if val.is_empty() {
            None
        } else {
            Some(evaluate(&model.valid(), &val, cfg.batch_size, device))
        };

        let metrics = EpochMetrics::new(
            epoch,
            train_loss,
            val_eval.as_ref().map(|e| e.loss),
            val_eval.as_ref().map(|e| e.accuracy),
        );
        match (metrics.val_loss, metrics.val_acc) {
            (Some(vl), Some(va)) => tracing::info!(
                "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
                epoch, cfg.max_epochs, train_loss, vl, va * 100.0,
            ),
            _ => tracing::info!(
                "Epoch {:>3}/{} | train_loss={:.4}",
                epoch, cfg.max_epochs, train_loss,
            ),
        }
        history.push(metrics);

        if let Some(e) = &val_eval {
            if stopper.should_stop(e.loss) {
                tracing::info!(
                    "Early stopping after epoch {} (best val_loss={:.4})",
                    epoch,
                    stopper.best()
                );
                break;
            }
        }
    }

    // ── Step 4: score the last weights on the test fold ──────────────────────
    let test_predictions = predict_classes(&model.valid(), &test, cfg.eval_batch_size, device);
    let accuracy         = accuracy(&test_predictions, &test);
    tracing::debug!("Test acc={:.4} on {} rows", accuracy, test.len());

    Ok(TrainOutcome { model, accuracy, test_predictions, history })
}

/// Fraction of `samples` whose label equals the prediction at the same position.
fn accuracy(predictions: &[usize], samples: &[TextSample]) -> f64 {
    let correct = predictions
        .iter()
        .zip(samples)
        .filter(|(&p, s)| p == s.label)
        .count();
    correct as f64 / samples.len().max(1) as f64
}

// ─── Evaluation ───────────────────────────────────────────────────────────────
/// Loss (sample-weighted mean) and accuracy of `model` on `samples`,
/// run in chunks of `batch_size` without shuffling.
pub fn evaluate<B: Backend>(
    model:      &TextClassifier<B>,
    samples:    &[TextSample],
    batch_size: usize,
    device:     &B::Device,
) -> Evaluation {
    let head    = model.head();
    let batcher = TextBatcher::<B>::new(device.clone());

    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;

    for chunk in samples.chunks(batch_size.max(1)) {
        let batch  = batcher.batch(chunk.to_vec());
        let logits = model.forward_logits(batch.tokens);

        let batch_loss: f64 = head
            .loss(logits.clone(), batch.labels.clone())
            .into_scalar()
            .elem::<f64>();
        loss_sum += batch_loss * chunk.len() as f64;

        let hits: i64 = head
            .predict(logits)
            .equal(batch.labels)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
        correct += hits as usize;
    }

    let total = samples.len().max(1) as f64;
    Evaluation {
        loss:     loss_sum / total,
        accuracy: correct as f64 / total,
    }
}

/// Predicted class index for every sample, in input order.
/// Sigmoid heads predict 1 when p > 0.5, softmax heads the argmax.
pub fn predict_classes<B: Backend>(
    model:      &TextClassifier<B>,
    samples:    &[TextSample],
    batch_size: usize,
    device:     &B::Device,
) -> Vec<usize> {
    let head    = model.head();
    let batcher = TextBatcher::<B>::new(device.clone());

    samples
        .chunks(batch_size.max(1))
        .flat_map(|chunk| {
            let batch = batcher.batch(chunk.to_vec());
            let preds = head.predict(model.forward_logits(batch.tokens));
            preds.into_data().iter::<i64>().map(|p| p as usize).collect::<Vec<_>>()
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{embeddings::{EmbeddingMatrix, WordVectors}, vocab::Vocabulary};
    use crate::ml::layers::PoolMode;
    use crate::ml::topology::{TopologyConfig, Variant};
    use burn::backend::{Autodiff, NdArray};

    type B = Autodiff<NdArray>;

    /// Class 1 sentences contain token 5, class 0 sentences token 6.
    fn samples(n: usize) -> Vec<TextSample> {
        (0..n)
            .map(|i| {
                let label = i % 2;
                let word  = if label == 1 { 5 } else { 6 };
                TextSample::new(vec![word, (i % 4 + 1) as u32, 0, 0], label)
            })
            .collect()
    }

    fn binary_model() -> TextClassifier<B> {
        TopologyConfig::new(Variant::FeedForward, 10, 2, 8, 4)
            .with_layer_sizes(vec![6])
            .with_pool_mode(PoolMode::Mean)
            .init::<B>(None, &Default::default())
            .unwrap()
    }

    #[test]
    fn test_early_stopping_waits_for_patience() {
        let mut stop = EarlyStopping::new(2);
        assert!(!stop.should_stop(1.0));
        assert!(!stop.should_stop(0.9));
        assert!(!stop.should_stop(0.95));
        assert!(stop.should_stop(0.91));
        assert_eq!(stop.best(), 0.9);
    }

    #[test]
    fn test_improvement_resets_patience() {
        let mut stop = EarlyStopping::new(2);
        assert!(!stop.should_stop(1.0));
        assert!(!stop.should_stop(1.1));
        assert!(!stop.should_stop(0.5));
        assert!(!stop.should_stop(0.6));
        assert!(stop.should_stop(0.7));
    }

    #[test]
    fn test_one_epoch_run() {
        let cfg = TrainingConfig::new().with_batch_size(4).with_max_epochs(1);
        let outcome = train_and_evaluate(binary_model(), samples(20), samples(6), &cfg, &Default::default())
            .unwrap();

        assert!((0.0..=1.0).contains(&outcome.accuracy));
        assert_eq!(outcome.test_predictions.len(), 6);
        assert!(outcome.test_predictions.iter().all(|&p| p < 2));
        assert_eq!(outcome.history.len(), 1);
        // 20 rows → 18 train, 2 validation
        assert!(outcome.history[0].val_loss.is_some());
    }

    #[test]
    fn test_small_binary_scenario() {
        let device = Default::default();
        let model  = TopologyConfig::new(Variant::FeedForward, 100, 2, 8, 5)
            .with_layer_sizes(vec![4])
            .with_pool_mode(PoolMode::Mean)
            .init::<B>(None, &device)
            .unwrap();
        assert_eq!(model.summary().output_in, 4);
        assert_eq!(model.head().units(), 1);

        let data: Vec<TextSample> = (0..20)
            .map(|i| TextSample::new(vec![(i + 1) as u32, 50, 0, 0, 0], i / 10))
            .collect();
        let cfg = TrainingConfig::new().with_batch_size(4).with_max_epochs(1);

        let outcome = train_and_evaluate(model, data.clone(), data, &cfg, &device).unwrap();
        assert!(outcome.accuracy.is_finite());
        assert!((0.0..=1.0).contains(&outcome.accuracy));
    }

    #[test]
    fn test_multiclass_run() {
        let data: Vec<TextSample> = (0..30)
            .map(|i| TextSample::new(vec![(i % 3 + 1) as u32, 4, 0, 0], i % 3))
            .collect();
        let model = TopologyConfig::new(Variant::FastText, 10, 3, 4, 4)
            .init::<B>(None, &Default::default())
            .unwrap();
        let cfg = TrainingConfig::new().with_batch_size(8).with_max_epochs(2);

        let outcome = train_and_evaluate(model, data.clone(), data[..9].to_vec(), &cfg, &Default::default())
            .unwrap();
        assert!(outcome.test_predictions.iter().all(|&p| p < 3));
        assert!(outcome.history.len() <= 2);
    }

    #[test]
    fn test_no_validation_rows_runs_all_epochs() {
        let cfg = TrainingConfig::new()
            .with_batch_size(4)
            .with_max_epochs(3)
            .with_val_split(0.0)
            .with_patience(0);
        let outcome = train_and_evaluate(binary_model(), samples(8), samples(4), &cfg, &Default::default())
            .unwrap();

        assert_eq!(outcome.history.len(), 3);
        assert!(outcome.history.iter().all(|m| m.val_loss.is_none()));
    }

    #[test]
    fn test_empty_sets_rejected() {
        let cfg = TrainingConfig::new();
        let err = train_and_evaluate(binary_model(), Vec::new(), samples(4), &cfg, &Default::default())
            .unwrap_err();
        assert!(matches!(err, TrainingError::EmptyTrainingSet));

        let err = train_and_evaluate(binary_model(), samples(4), Vec::new(), &cfg, &Default::default())
            .unwrap_err();
        assert!(matches!(err, TrainingError::EmptyTestSet));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let cfg = TrainingConfig::new().with_batch_size(0);
        let err = train_and_evaluate(binary_model(), samples(4), samples(4), &cfg, &Default::default())
            .unwrap_err();
        assert!(matches!(err, TrainingError::InvalidSetting { name: "batch_size" }));
    }

    #[test]
    fn test_predict_matches_evaluate() {
        let model  = binary_model().valid();
        let data   = samples(10);
        let device = Default::default();
        let preds  = predict_classes(&model, &data, 3, &device);
        let eval   = evaluate(&model, &data, 4, &device);

        assert_eq!(preds.len(), 10);
        assert!((eval.accuracy - accuracy(&preds, &data)).abs() < 1e-9);
    }

    #[test]
    fn test_nan_embeddings_fail_the_fold() {
        let words: Vec<String> = (1..10).map(|i| format!("w{}", i)).collect();
        let vocab = Vocabulary::build(std::iter::once(words.as_slice()));
        let mut vectors = WordVectors::new(8);
        for w in &words {
            vectors.insert(w.as_str(), vec![f32::NAN; 8]).unwrap();
        }
        let weights = EmbeddingMatrix::from_word_vectors(&vectors, &vocab, vocab.size() + 1).unwrap();

        let model = TopologyConfig::new(Variant::FeedForward, vocab.size(), 2, 8, 4)
            .with_layer_sizes(vec![6])
            .with_pool_mode(PoolMode::Mean)
            .init::<B>(Some(&weights), &Default::default())
            .unwrap();
        let cfg = TrainingConfig::new().with_batch_size(4).with_max_epochs(3);

        let err = train_and_evaluate(model, samples(20), samples(4), &cfg, &Default::default())
            .unwrap_err();
        assert!(matches!(err, TrainingError::NonFiniteLoss { epoch: 1, .. }));
    }

    #[test]
    fn test_flat_validation_loss_stops_early() {
        // lr = 0 keeps the weights, so the validation loss never improves
        // after the first epoch
        let model = TopologyConfig::new(Variant::FastText, 10, 2, 4, 4)
            .init::<B>(None, &Default::default())
            .unwrap();
        let cfg = TrainingConfig::new()
            .with_batch_size(4)
            .with_max_epochs(20)
            .with_lr(0.0)
            .with_patience(2);

        let outcome = train_and_evaluate(model, samples(20), samples(4), &cfg, &Default::default())
            .unwrap();
        assert_eq!(outcome.history.len(), 3);
        assert_eq!(outcome.history[1].val_loss, outcome.history[2].val_loss);
    }
}
