//! # Classifier Adapter
//!
//! Wraps the pre-trained neural model behind a black-box trait: token
//! sequences in, ranked label/score lists out. The engine never touches
//! model internals beyond this seam, which also keeps the orchestrator
//! testable with mock adapters.

pub mod loader;
pub mod model;

pub use loader::{load_classifier, load_classifier_with_config, load_config};
pub use model::{CharGruClassifier, ClassifierConfig};

use crate::error::Result;
use crate::types::Prediction;

/// A pre-trained model handle: batched, order-preserving prediction over
/// token sequences. Implementations must not mutate parameters during
/// prediction and must return exactly one ranked list per input.
pub trait NationalityModel: Send + Sync {
    /// Predict nationalities for a batch of token sequences.
    ///
    /// `mini_batch_size` bounds how many sequences run through the forward
    /// pass at once; it must never alter or reorder output relative to
    /// input order. A failure mid-batch fails the whole batch; partial
    /// results are not returned.
    fn predict(
        &self,
        sequences: &[String],
        mini_batch_size: usize,
    ) -> Result<Vec<Vec<Prediction>>>;
}

impl NationalityModel for CharGruClassifier {
    fn predict(
        &self,
        sequences: &[String],
        mini_batch_size: usize,
    ) -> Result<Vec<Vec<Prediction>>> {
        CharGruClassifier::predict(self, sequences, mini_batch_size)
    }
}
