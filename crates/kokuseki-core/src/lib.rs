//! # Kokuseki Core
//!
//! The heart of the Kokuseki nationality-prediction engine. Wraps a
//! character-level recurrent neural classifier behind a batched prediction
//! pipeline with exact-match dictionary overrides for known names.
//!
//! ## Quick Start
//!
//! ```rust
//! use kokuseki_core::tokenizer::{convert, restore};
//!
//! let encoded = convert("Kyubyong Park");
//! assert_eq!(encoded, "K y u b y o n g ▁ P a r k");
//! assert_eq!(restore(&encoded), "Kyubyong Park");
//! ```
//!
//! Loading real artifacts and classifying:
//!
//! ```rust,no_run
//! use kokuseki_core::{ClassifyOptions, Predictor};
//!
//! let predictor = Predictor::from_files(
//!     "resources/production-model/model.safetensors",
//!     "resources/name2nats.json",
//! )?;
//! let results = predictor.classify(
//!     &["Kim Jong-un".to_string()],
//!     &ClassifyOptions::new().with_top_n(3),
//! )?;
//! assert_eq!(results[0].name, "Kim Jong-un");
//! # Ok::<(), kokuseki_core::KokusekiError>(())
//! ```
pub mod classifier;
pub mod dictionary;
pub mod error;
pub mod predictor;
pub mod tokenizer;
pub mod types;

// Re-export primary API
pub use classifier::{
    CharGruClassifier, ClassifierConfig, NationalityModel, load_classifier,
    load_classifier_with_config,
};
pub use dictionary::Dictionary;
pub use error::{KokusekiError, Result};
pub use predictor::{ClassifyOptions, Predictor};
pub use tokenizer::{PLACEHOLDER, convert, restore};
pub use types::{Classification, Prediction};
