//! # Kokuseki
//!
//! Predicts the likely nationality of a person from their full name using a
//! character-level recurrent neural classifier, with an exact-match
//! dictionary override for known names.
//!
//! This facade re-exports the serving API from `kokuseki-core`; the offline
//! dataset/training workflows live under [`trainer`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kokuseki::{ClassifyOptions, Predictor};
//!
//! let predictor = Predictor::from_files(
//!     "resources/production-model/model.safetensors",
//!     "resources/name2nats.json",
//! )?;
//! let result = predictor.classify_one(
//!     "Kyubyong Park",
//!     &ClassifyOptions::new().with_top_n(3),
//! )?;
//! for prediction in &result.predictions {
//!     println!("{}: {:.1}%", prediction.label, prediction.score * 100.0);
//! }
//! # Ok::<(), kokuseki::KokusekiError>(())
//! ```

pub use kokuseki_core::*;

/// Offline workflows: dataset preparation and model training.
pub use kokuseki_trainer as trainer;
