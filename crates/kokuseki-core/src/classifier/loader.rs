//! # Model Artifact Loader
//!
//! Deserializes a classifier artifact, tolerating the two on-disk schema
//! revisions that exist in the wild: the current safetensors state
//! dictionary and the older monolithic pickle checkpoint. The strategies
//! are an ordered list of pure `(path) -> model` functions tried in
//! sequence; nested exception-driven fallthrough is deliberately avoided.
//!
//! Load failure is fatal for the process: without a model there is nothing
//! to serve. The error names every attempted strategy with its underlying
//! cause, plus the framework versions known to read current artifacts.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;

use crate::classifier::model::{CharGruClassifier, ClassifierConfig};
use crate::error::{KokusekiError, Result};

/// Framework versions known to read current artifacts, newest first.
const KNOWN_COMPATIBLE: &[&str] = &["candle-core 0.8", "candle-core 0.7"];

struct LoaderStrategy {
    name: &'static str,
    load: fn(&Path, &ClassifierConfig, &Device) -> Result<CharGruClassifier>,
}

/// Attempted in order; the first success wins.
const STRATEGIES: &[LoaderStrategy] = &[
    LoaderStrategy {
        name: "safetensors",
        load: load_safetensors,
    },
    LoaderStrategy {
        name: "legacy-pickle",
        load: load_legacy_pickle,
    },
];

/// Structured state dictionary, mmap-loaded. The current artifact format.
fn load_safetensors(
    path: &Path,
    config: &ClassifierConfig,
    device: &Device,
) -> Result<CharGruClassifier> {
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device) }
        .map_err(|e| KokusekiError::Candle(e.to_string()))?;
    CharGruClassifier::new(config.clone(), vb)
}

/// Older monolithic checkpoint. The full serialized object cannot be
/// reconstructed, so an empty model shell of the expected architecture is
/// instantiated and only the numeric parameters are read out of the pickle.
fn load_legacy_pickle(
    path: &Path,
    config: &ClassifierConfig,
    device: &Device,
) -> Result<CharGruClassifier> {
    let tensors: HashMap<String, Tensor> = candle_core::pickle::read_all(path)
        .map_err(|e| KokusekiError::Candle(e.to_string()))?
        .into_iter()
        .collect();
    let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
    CharGruClassifier::new(config.clone(), vb)
}

/// Read the architecture config stored next to the weights.
pub fn load_config(path: impl AsRef<Path>) -> Result<ClassifierConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| KokusekiError::Config(format!("read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| KokusekiError::Config(format!("parse {}: {e}", path.display())))
}

/// Load a classifier from a weights file with `config.json` beside it.
///
/// Tries each strategy in order and returns the first success. If all fail
/// the error is fatal and lists every strategy with its cause.
pub fn load_classifier(weights: impl AsRef<Path>) -> Result<CharGruClassifier> {
    let weights = weights.as_ref();
    let config = load_config(weights.with_file_name("config.json"))?;
    load_classifier_with_config(weights, &config)
}

/// Loader entry point for callers that manage the config themselves.
pub fn load_classifier_with_config(
    weights: impl AsRef<Path>,
    config: &ClassifierConfig,
) -> Result<CharGruClassifier> {
    let weights = weights.as_ref();
    let device = Device::Cpu;

    let mut failures = Vec::with_capacity(STRATEGIES.len());
    for strategy in STRATEGIES {
        match (strategy.load)(weights, config, &device) {
            Ok(model) => {
                tracing::info!(
                    path = %weights.display(),
                    strategy = strategy.name,
                    labels = model.labels().len(),
                    "loaded classifier"
                );
                return Ok(model);
            }
            Err(e) => {
                tracing::debug!(
                    path = %weights.display(),
                    strategy = strategy.name,
                    error = %e,
                    "loader strategy failed"
                );
                failures.push(format!("{}: {e}", strategy.name));
            }
        }
    }

    Err(KokusekiError::ModelLoad {
        path: weights.display().to_string(),
        details: format!(
            "{}; if the artifact was written by an incompatible framework revision, try {}",
            failures.join("; "),
            KNOWN_COMPATIBLE.join(" or "),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;
    use std::io::Write;

    fn test_config() -> ClassifierConfig {
        ClassifierConfig {
            labels: vec!["Korean".into(), "Japanese".into()],
            vocab: "abcdefghij▁".chars().collect(),
            embedding_dim: 4,
            hidden_size: 8,
        }
    }

    #[test]
    fn test_missing_artifact_names_all_strategies() {
        let err =
            load_classifier_with_config("/nonexistent/model.safetensors", &test_config())
                .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/model.safetensors"));
        assert!(msg.contains("safetensors:"));
        assert!(msg.contains("legacy-pickle:"));
        assert!(msg.contains("candle-core 0.8"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let weights = dir.path().join("model.safetensors");
        let err = load_classifier(&weights).unwrap_err();
        assert!(matches!(err, KokusekiError::Config(_)));
    }

    #[test]
    fn test_round_trip_through_safetensors() {
        let dir = tempfile::tempdir().unwrap();
        let weights = dir.path().join("model.safetensors");
        let config = test_config();

        // Train-side save: fresh VarMap with the model's variable names.
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let trained = CharGruClassifier::new(config.clone(), vb).unwrap();
        let seqs = vec!["a b c".to_string()];
        let before = trained.predict(&seqs, 1).unwrap();
        varmap.save(&weights).unwrap();

        let loaded = load_classifier_with_config(&weights, &config).unwrap();
        let after = loaded.predict(&seqs, 1).unwrap();

        assert_eq!(before[0][0].label, after[0][0].label);
        assert!((before[0][0].score - after[0][0].score).abs() < 1e-5);
    }

    #[test]
    fn test_load_config_from_sibling_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"{{"labels": ["Korean"], "vocab": ["a", "▁"]}}"#
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.labels, vec!["Korean".to_string()]);
        assert_eq!(config.vocab.len(), 2);
    }
}
