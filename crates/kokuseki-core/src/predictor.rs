//! # Prediction Pipeline
//!
//! Fans a batch of names through tokenize -> model predict -> restore ->
//! merge, preserving input order. The merge step applies the dictionary
//! override policy: a known name short-circuits the model entirely.
//!
//! The model handle and dictionary are explicit, read-only state owned by
//! the [`Predictor`]; each `classify` call keeps its intermediates local,
//! so concurrent calls from an embedding host need no locking.

use std::path::Path;

use crate::classifier::{self, NationalityModel};
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::tokenizer::{convert, restore};
use crate::types::{Classification, Prediction};

/// Per-call knobs for [`Predictor::classify`].
///
/// Defaults mirror the classic interactive use: best single label, with
/// dictionary overrides on.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// How many ranked labels to keep on the model path.
    pub top_n: usize,
    /// Whether known names are answered from the dictionary.
    pub use_dict: bool,
    /// Forward-pass chunk size inside the adapter.
    pub mini_batch_size: usize,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            top_n: 1,
            use_dict: true,
            mini_batch_size: 128,
        }
    }
}

impl ClassifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many ranked labels to return on the model path.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Enable or disable dictionary overrides.
    pub fn with_dict(mut self, use_dict: bool) -> Self {
        self.use_dict = use_dict;
        self
    }

    /// Set the adapter's internal batching granularity.
    pub fn with_mini_batch_size(mut self, mini_batch_size: usize) -> Self {
        self.mini_batch_size = mini_batch_size;
        self
    }
}

/// Nationality predictor: the loaded model plus the override dictionary.
pub struct Predictor {
    model: Box<dyn NationalityModel>,
    dictionary: Dictionary,
}

impl Predictor {
    /// Build a predictor from an explicit model handle and dictionary.
    pub fn new(model: Box<dyn NationalityModel>, dictionary: Dictionary) -> Self {
        Self { model, dictionary }
    }

    /// Load model and dictionary artifacts from disk.
    ///
    /// Model load failure is fatal and surfaced to the caller; a missing or
    /// unreadable dictionary degrades to an empty store (model-only
    /// predictions) and is only logged.
    pub fn from_files(weights: impl AsRef<Path>, dictionary: impl AsRef<Path>) -> Result<Self> {
        let model = classifier::load_classifier(weights)?;
        let dictionary = Dictionary::load(dictionary);
        Ok(Self::new(Box::new(model), dictionary))
    }

    /// The override dictionary this predictor consults.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Classify a single name. Normalized internally to a one-element batch.
    pub fn classify_one(&self, name: &str, opts: &ClassifyOptions) -> Result<Classification> {
        let mut results = self.classify(&[name.to_string()], opts)?;
        Ok(results.remove(0))
    }

    /// Classify a batch of names, one result per input, in input order.
    pub fn classify(
        &self,
        names: &[String],
        opts: &ClassifyOptions,
    ) -> Result<Vec<Classification>> {
        let sequences: Vec<String> = names.iter().map(|name| convert(name)).collect();
        let ranked = self.model.predict(&sequences, opts.mini_batch_size)?;

        let results = sequences
            .iter()
            .zip(ranked)
            .map(|(sequence, model_ranked)| {
                self.resolve(restore(sequence), model_ranked, opts)
            })
            .collect();
        Ok(results)
    }

    /// Merge policy: dictionary hits are authoritative and bypass both the
    /// model ranking and top-N truncation; every dictionary label is
    /// reported at confidence 1.0 in stored order. Otherwise the model's
    /// ranked list is truncated to `top_n` (descending score, ties stable).
    fn resolve(
        &self,
        name: String,
        model_ranked: Vec<Prediction>,
        opts: &ClassifyOptions,
    ) -> Classification {
        if opts.use_dict {
            if let Some(labels) = self.dictionary.lookup(&name) {
                if !labels.is_empty() {
                    let predictions = labels
                        .iter()
                        .map(|label| Prediction::new(label.clone(), 1.0))
                        .collect();
                    return Classification { name, predictions };
                }
            }
        }

        let predictions = model_ranked.into_iter().take(opts.top_n).collect();
        Classification { name, predictions }
    }
}
