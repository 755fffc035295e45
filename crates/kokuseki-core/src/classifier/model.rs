//! # Character GRU Classifier
//!
//! Bidirectional character-level GRU text classifier implemented with candle.
//! The architecture mirrors the network the artifacts were trained with: a
//! learned character embedding feeds a forward GRU and a backward GRU (run
//! over the reversed sequence); their final hidden states are concatenated
//! and projected to per-nationality logits.

use std::collections::HashMap;

use candle_core::{D, Device, Tensor};
use candle_nn::ops::softmax;
use candle_nn::{Embedding, GRU, GRUConfig, Linear, Module, RNN, VarBuilder, embedding, gru, linear};
use serde::{Deserialize, Serialize};

use crate::error::{KokusekiError, Result};
use crate::types::Prediction;

fn default_embedding_dim() -> usize {
    64
}

fn default_hidden_size() -> usize {
    256
}

/// Architecture description persisted as `config.json` next to the weights.
///
/// The weights file is meaningless without this: it names the output labels
/// in model order and the character vocabulary the ids were assigned from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Nationality labels in model output order.
    pub labels: Vec<String>,
    /// Character vocabulary. Id 0 is reserved for padding/unknown; the
    /// character at index `i` maps to id `i + 1`.
    pub vocab: Vec<char>,
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
}

impl ClassifierConfig {
    /// Create a config with the default layer sizes.
    pub fn new(labels: Vec<String>, vocab: Vec<char>) -> Self {
        Self {
            labels,
            vocab,
            embedding_dim: default_embedding_dim(),
            hidden_size: default_hidden_size(),
        }
    }

    /// Total embedding rows, including the reserved padding/unknown id.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len() + 1
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(KokusekiError::Config("no labels defined".into()));
        }
        if self.vocab.is_empty() {
            return Err(KokusekiError::Config("empty character vocabulary".into()));
        }
        if self.embedding_dim == 0 || self.hidden_size == 0 {
            return Err(KokusekiError::Config(
                "embedding_dim and hidden_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// The loaded classifier: read-only after construction, shared for the
/// process lifetime.
#[derive(Debug)]
pub struct CharGruClassifier {
    config: ClassifierConfig,
    char_to_id: HashMap<char, u32>,
    embedding: Embedding,
    gru_fwd: GRU,
    gru_bwd: GRU,
    head: Linear,
    device: Device,
}

fn candle_err(e: candle_core::Error) -> KokusekiError {
    KokusekiError::Candle(e.to_string())
}

impl CharGruClassifier {
    /// Assemble the network from a `VarBuilder`.
    ///
    /// The builder either resolves existing tensors (inference, via the
    /// loader strategies) or creates fresh ones (training, via a `VarMap`).
    pub fn new(config: ClassifierConfig, vb: VarBuilder) -> Result<Self> {
        config.validate()?;
        let device = vb.device().clone();

        let embedding = embedding(
            config.vocab_size(),
            config.embedding_dim,
            vb.pp("embedding"),
        )
        .map_err(candle_err)?;
        let gru_fwd = gru(
            config.embedding_dim,
            config.hidden_size,
            GRUConfig::default(),
            vb.pp("gru_fwd"),
        )
        .map_err(candle_err)?;
        let gru_bwd = gru(
            config.embedding_dim,
            config.hidden_size,
            GRUConfig::default(),
            vb.pp("gru_bwd"),
        )
        .map_err(candle_err)?;
        let head = linear(config.hidden_size * 2, config.labels.len(), vb.pp("head"))
            .map_err(candle_err)?;

        let char_to_id = config
            .vocab
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i as u32 + 1))
            .collect();

        Ok(Self {
            config,
            char_to_id,
            embedding,
            gru_fwd,
            gru_bwd,
            head,
            device,
        })
    }

    /// Nationality labels in model output order.
    pub fn labels(&self) -> &[String] {
        &self.config.labels
    }

    /// The architecture config this model was built from.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Map a token sequence to character ids. Unknown characters map to the
    /// reserved id 0; an empty sequence becomes a single padding token so
    /// every input contributes at least one timestep.
    pub fn encode(&self, token_sequence: &str) -> Vec<u32> {
        let mut ids: Vec<u32> = token_sequence
            .split_whitespace()
            .flat_map(|token| token.chars())
            .map(|c| self.char_to_id.get(&c).copied().unwrap_or(0))
            .collect();
        if ids.is_empty() {
            ids.push(0);
        }
        ids
    }

    /// Raw logits for a batch of token sequences, shape `[batch, labels]`.
    ///
    /// Sequences are right-padded to the batch maximum; each row's feature
    /// vector is taken at its own final real timestep, so padding never
    /// leaks into another row's result.
    pub fn forward_batch(&self, sequences: &[String]) -> Result<Tensor> {
        let batch: Vec<Vec<u32>> = sequences.iter().map(|s| self.encode(s)).collect();
        self.forward_ids(&batch)
            .map_err(|e| KokusekiError::Inference(e.to_string()))
    }

    fn forward_ids(&self, batch: &[Vec<u32>]) -> candle_core::Result<Tensor> {
        let b = batch.len();
        let max_len = batch.iter().map(Vec::len).max().unwrap_or(1);

        let mut fwd_flat = Vec::with_capacity(b * max_len);
        let mut bwd_flat = Vec::with_capacity(b * max_len);
        for ids in batch {
            let mut row = ids.clone();
            row.resize(max_len, 0);
            fwd_flat.extend_from_slice(&row);

            let mut rev: Vec<u32> = ids.iter().rev().copied().collect();
            rev.resize(max_len, 0);
            bwd_flat.extend_from_slice(&rev);
        }

        let fwd_ids = Tensor::from_vec(fwd_flat, (b, max_len), &self.device)?;
        let bwd_ids = Tensor::from_vec(bwd_flat, (b, max_len), &self.device)?;

        let fwd_states = self.gru_fwd.seq(&self.embedding.forward(&fwd_ids)?)?;
        let bwd_states = self.gru_bwd.seq(&self.embedding.forward(&bwd_ids)?)?;

        let mut rows = Vec::with_capacity(b);
        for (i, ids) in batch.iter().enumerate() {
            let last = ids.len().saturating_sub(1);
            let f = fwd_states[last].h().narrow(0, i, 1)?;
            let r = bwd_states[last].h().narrow(0, i, 1)?;
            rows.push(Tensor::cat(&[&f, &r], 1)?);
        }
        let features = Tensor::cat(&rows, 0)?;

        self.head.forward(&features)
    }

    /// Softmax probabilities for one chunk, as one row of `f32` per input.
    fn probabilities(&self, sequences: &[String]) -> Result<Vec<Vec<f32>>> {
        let logits = self.forward_batch(sequences)?;
        let probs = softmax(&logits, D::Minus1)
            .and_then(|p| p.to_vec2::<f32>())
            .map_err(|e| KokusekiError::Inference(e.to_string()))?;
        Ok(probs)
    }

    /// Rank every label for one probability row, best first. `sort_by` is
    /// stable, so equal scores keep the model's original label order.
    fn rank(&self, probs: &[f32]) -> Vec<Prediction> {
        let mut ranked: Vec<Prediction> = self
            .config
            .labels
            .iter()
            .zip(probs)
            .map(|(label, &score)| Prediction::new(label.clone(), score))
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Batched prediction: one fully ranked label list per input sequence,
    /// in input order. `mini_batch_size` only controls chunking for
    /// throughput, never ordering.
    pub fn predict(
        &self,
        sequences: &[String],
        mini_batch_size: usize,
    ) -> Result<Vec<Vec<Prediction>>> {
        let mut out = Vec::with_capacity(sequences.len());
        for chunk in sequences.chunks(mini_batch_size.max(1)) {
            for row in self.probabilities(chunk)? {
                out.push(self.rank(&row));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    fn tiny_model() -> CharGruClassifier {
        let config = ClassifierConfig {
            labels: vec!["Korean".into(), "Japanese".into(), "German".into()],
            vocab: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-▁"
                .chars()
                .collect(),
            embedding_dim: 8,
            hidden_size: 16,
        };
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        CharGruClassifier::new(config, vb).unwrap()
    }

    #[test]
    fn test_encode_maps_unknown_to_zero() {
        let model = tiny_model();
        let ids = model.encode("a b ℥");
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], 0);
        assert_eq!(ids[2], 0);
    }

    #[test]
    fn test_encode_empty_is_single_pad() {
        let model = tiny_model();
        assert_eq!(model.encode(""), vec![0]);
    }

    #[test]
    fn test_predict_shapes_and_distribution() {
        let model = tiny_model();
        let seqs = vec!["K i m".to_string(), "Y a m a d a".to_string()];
        let results = model.predict(&seqs, 128).unwrap();

        assert_eq!(results.len(), 2);
        for ranked in &results {
            assert_eq!(ranked.len(), 3);
            let total: f32 = ranked.iter().map(|p| p.score).sum();
            assert!((total - 1.0).abs() < 1e-4, "probabilities sum to {total}");
            for pair in ranked.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }
    }

    #[test]
    fn test_batching_does_not_change_results() {
        let model = tiny_model();
        let seqs: Vec<String> = ["K i m", "Y a m a d a ▁ T a r o", "M u e l l e r", "P a r k"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let whole = model.predict(&seqs, 128).unwrap();
        let chunked = model.predict(&seqs, 2).unwrap();

        assert_eq!(whole.len(), chunked.len());
        for (a, b) in whole.iter().zip(&chunked) {
            assert_eq!(a[0].label, b[0].label);
            assert!((a[0].score - b[0].score).abs() < 1e-4);
        }
    }

    #[test]
    fn test_config_validation() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = ClassifierConfig::new(vec![], vec!['a']);
        assert!(CharGruClassifier::new(config, vb).is_err());
    }

    #[test]
    fn test_config_serde_defaults() {
        let json = r#"{"labels": ["Korean"], "vocab": ["a", "b"]}"#;
        let config: ClassifierConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.embedding_dim, 64);
        assert_eq!(config.hidden_size, 256);
        assert_eq!(config.vocab_size(), 3);
    }
}
