//! # Training Loop
//!
//! Mini-batch SGD with plateau-based learning-rate annealing over prepared
//! splits. The schedule follows the classic recipe the shipped artifacts
//! were trained with: lr 0.1 halved after 5 stale epochs, floored at 1e-4,
//! at most 20 epochs, shuffled batches.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use candle_core::{DType, Device, Tensor};
use candle_nn::optim::SGD;
use candle_nn::{Optimizer, VarBuilder, VarMap, loss};
use oorandom::Rand32;
use serde::{Deserialize, Serialize};

use kokuseki_core::{CharGruClassifier, ClassifierConfig};

/// Hyperparameters for one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub max_epochs: usize,
    pub mini_batch_size: usize,
    pub learning_rate: f64,
    pub anneal_factor: f64,
    pub patience: usize,
    pub min_learning_rate: f64,
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_epochs: 20,
            mini_batch_size: 128,
            learning_rate: 0.1,
            anneal_factor: 0.5,
            patience: 5,
            min_learning_rate: 1e-4,
            shuffle: true,
            seed: 42,
        }
    }
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    pub fn with_mini_batch_size(mut self, mini_batch_size: usize) -> Self {
        self.mini_batch_size = mini_batch_size;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// One step of the plateau schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Dev loss improved; current weights are the new best.
    Improved,
    /// No improvement, still within patience.
    Stale,
    /// Patience ran out; continue at the new, smaller learning rate.
    Annealed(f64),
    /// The next anneal would fall below the floor; stop training.
    Exhausted,
}

/// ReduceLROnPlateau-style schedule, separated from the ML loop so the
/// annealing behavior is testable on its own.
#[derive(Debug)]
pub struct AnnealSchedule {
    lr: f64,
    factor: f64,
    patience: usize,
    min_lr: f64,
    best: f32,
    stale: usize,
}

impl AnnealSchedule {
    pub fn new(config: &TrainConfig) -> Self {
        Self {
            lr: config.learning_rate,
            factor: config.anneal_factor,
            patience: config.patience,
            min_lr: config.min_learning_rate,
            best: f32::INFINITY,
            stale: 0,
        }
    }

    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Feed one epoch's dev loss and advance the schedule.
    pub fn observe(&mut self, dev_loss: f32) -> Step {
        if dev_loss < self.best {
            self.best = dev_loss;
            self.stale = 0;
            return Step::Improved;
        }
        self.stale += 1;
        if self.stale < self.patience {
            return Step::Stale;
        }
        self.stale = 0;
        let next = self.lr * self.factor;
        if next < self.min_lr {
            return Step::Exhausted;
        }
        self.lr = next;
        Step::Annealed(next)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub epochs_run: usize,
    pub best_dev_loss: f32,
    pub best_dev_accuracy: f32,
}

/// Trains a [`CharGruClassifier`] and persists the best-dev weights.
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the loop over prepared `(token_sequence, label)` rows and write
    /// `model.safetensors` + `config.json` to `out_dir` whenever the dev
    /// loss improves.
    pub fn train(
        &self,
        train: &[(String, String)],
        dev: &[(String, String)],
        arch: ClassifierConfig,
        out_dir: impl AsRef<Path>,
    ) -> Result<TrainReport> {
        if train.is_empty() {
            bail!("training split is empty");
        }
        let out_dir = out_dir.as_ref();
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;

        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = CharGruClassifier::new(arch.clone(), vb)?;

        let label_to_id: HashMap<&str, u32> = arch
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i as u32))
            .collect();

        let mut opt = SGD::new(varmap.all_vars(), self.config.learning_rate)?;
        let mut schedule = AnnealSchedule::new(&self.config);
        let mut rng = Rand32::new(self.config.seed);

        let mut best_accuracy = 0.0f32;
        let mut epochs_run = 0;

        for epoch in 1..=self.config.max_epochs {
            epochs_run = epoch;

            let mut indices: Vec<usize> = (0..train.len()).collect();
            if self.config.shuffle {
                for i in (1..indices.len()).rev() {
                    let j = rng.rand_range(0..(i as u32 + 1)) as usize;
                    indices.swap(i, j);
                }
            }

            let mut epoch_loss = 0.0f32;
            let mut batches = 0usize;
            for batch in indices.chunks(self.config.mini_batch_size.max(1)) {
                let sequences: Vec<String> =
                    batch.iter().map(|&i| train[i].0.clone()).collect();
                let targets = self.targets(batch.iter().map(|&i| &train[i].1), &label_to_id)?;
                let targets = Tensor::from_vec(targets, batch.len(), &device)?;

                let logits = model.forward_batch(&sequences)?;
                let batch_loss = loss::cross_entropy(&logits, &targets)?;
                opt.backward_step(&batch_loss)?;

                epoch_loss += batch_loss.to_scalar::<f32>()?;
                batches += 1;
            }
            let train_loss = epoch_loss / batches.max(1) as f32;

            let (dev_loss, dev_accuracy) = self.evaluate(&model, dev, &label_to_id, &device)?;
            tracing::info!(
                epoch,
                train_loss,
                dev_loss,
                dev_accuracy,
                lr = schedule.lr(),
                "epoch complete"
            );

            match schedule.observe(dev_loss) {
                Step::Improved => {
                    best_accuracy = dev_accuracy;
                    self.save(&varmap, &arch, out_dir)?;
                }
                Step::Stale => {}
                Step::Annealed(lr) => {
                    tracing::info!(lr, "dev loss plateaued, annealing learning rate");
                    opt.set_learning_rate(lr);
                }
                Step::Exhausted => {
                    tracing::info!("learning rate floor reached, stopping");
                    break;
                }
            }
        }

        Ok(TrainReport {
            epochs_run,
            best_dev_loss: schedule.best,
            best_dev_accuracy: best_accuracy,
        })
    }

    fn targets<'a>(
        &self,
        labels: impl Iterator<Item = &'a String>,
        label_to_id: &HashMap<&str, u32>,
    ) -> Result<Vec<u32>> {
        labels
            .map(|label| {
                label_to_id.get(label.as_str()).copied().ok_or_else(|| {
                    anyhow::anyhow!("label {label:?} missing from the architecture config")
                })
            })
            .collect()
    }

    /// Dev-set mean loss and accuracy, batched like training but without
    /// parameter updates.
    fn evaluate(
        &self,
        model: &CharGruClassifier,
        dev: &[(String, String)],
        label_to_id: &HashMap<&str, u32>,
        device: &Device,
    ) -> Result<(f32, f32)> {
        if dev.is_empty() {
            return Ok((f32::INFINITY, 0.0));
        }

        let mut total_loss = 0.0f32;
        let mut batches = 0usize;
        let mut correct = 0usize;

        for batch in dev.chunks(self.config.mini_batch_size.max(1)) {
            let sequences: Vec<String> = batch.iter().map(|(s, _)| s.clone()).collect();
            let target_ids = self.targets(batch.iter().map(|(_, l)| l), label_to_id)?;
            let targets = Tensor::from_vec(target_ids.clone(), batch.len(), device)?;

            let logits = model.forward_batch(&sequences)?;
            total_loss += loss::cross_entropy(&logits, &targets)?.to_scalar::<f32>()?;
            batches += 1;

            let predicted = logits.argmax(candle_core::D::Minus1)?.to_vec1::<u32>()?;
            correct += predicted
                .iter()
                .zip(&target_ids)
                .filter(|(p, t)| p == t)
                .count();
        }

        Ok((
            total_loss / batches.max(1) as f32,
            correct as f32 / dev.len() as f32,
        ))
    }

    fn save(&self, varmap: &VarMap, arch: &ClassifierConfig, out_dir: &Path) -> Result<()> {
        let weights = out_dir.join("model.safetensors");
        varmap
            .save(&weights)
            .with_context(|| format!("failed to save {}", weights.display()))?;

        let config_path = out_dir.join("config.json");
        let json = serde_json::to_string_pretty(arch)?;
        std::fs::write(&config_path, json)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{build_vocab, collect_labels};

    #[test]
    fn test_anneal_halves_after_patience() {
        let config = TrainConfig::new().with_learning_rate(0.1);
        let mut schedule = AnnealSchedule::new(&config);

        assert_eq!(schedule.observe(1.0), Step::Improved);
        for _ in 0..4 {
            assert_eq!(schedule.observe(1.5), Step::Stale);
        }
        assert_eq!(schedule.observe(1.5), Step::Annealed(0.05));
        assert_eq!(schedule.lr(), 0.05);
    }

    #[test]
    fn test_anneal_floors_at_min_learning_rate() {
        let config = TrainConfig {
            learning_rate: 2e-4,
            patience: 1,
            ..Default::default()
        };
        let mut schedule = AnnealSchedule::new(&config);

        schedule.observe(1.0);
        assert_eq!(schedule.observe(2.0), Step::Annealed(1e-4));
        assert_eq!(schedule.observe(2.0), Step::Exhausted);
    }

    #[test]
    fn test_improvement_resets_patience() {
        let config = TrainConfig::new();
        let mut schedule = AnnealSchedule::new(&config);

        schedule.observe(1.0);
        schedule.observe(1.5);
        schedule.observe(1.5);
        assert_eq!(schedule.observe(0.5), Step::Improved);
        // Counter restarted: four stale epochs are still within patience.
        for _ in 0..4 {
            assert_eq!(schedule.observe(0.9), Step::Stale);
        }
    }

    #[test]
    fn test_training_smoke_run_saves_artifacts() {
        let train: Vec<(String, String)> = vec![
            ("K i m".into(), "Korean".into()),
            ("P a r k".into(), "Korean".into()),
            ("Y a m a d a".into(), "Japanese".into()),
            ("S a t o".into(), "Japanese".into()),
        ];
        let dev = train.clone();

        let mut arch = ClassifierConfig::new(collect_labels(&train), build_vocab(&train));
        arch.embedding_dim = 4;
        arch.hidden_size = 8;

        let dir = tempfile::tempdir().unwrap();
        let config = TrainConfig::new()
            .with_max_epochs(2)
            .with_mini_batch_size(2)
            .with_learning_rate(0.05);
        let report = Trainer::new(config).train(&train, &dev, arch, dir.path()).unwrap();

        assert_eq!(report.epochs_run, 2);
        assert!(report.best_dev_loss.is_finite());
        assert!(dir.path().join("model.safetensors").exists());
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let train = vec![("K i m".into(), "Korean".into())];
        let arch = ClassifierConfig {
            labels: vec!["Japanese".into()],
            vocab: vec!['K', 'i', 'm'],
            embedding_dim: 4,
            hidden_size: 8,
        };

        let dir = tempfile::tempdir().unwrap();
        let err = Trainer::new(TrainConfig::new().with_max_epochs(1))
            .train(&train, &train, arch, dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("Korean"));
    }
}
