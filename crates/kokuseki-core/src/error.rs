use thiserror::Error;

/// Errors that can occur during Kokuseki core operations.
#[derive(Debug, Error)]
pub enum KokusekiError {
    /// No loader strategy could deserialize the model artifact.
    #[error("failed to load model from {path}: {details}")]
    ModelLoad {
        /// Path of the artifact that could not be loaded.
        path: String,
        /// Per-strategy causes and a version-skew hint.
        details: String,
    },

    /// The model architecture config is missing or malformed.
    #[error("invalid model config: {0}")]
    Config(String),

    /// The forward pass failed mid-batch. Retryable: the whole batch is
    /// reported, no partial results are returned.
    #[error("inference error: {0}")]
    Inference(String),

    /// The dictionary artifact could not be read or parsed.
    #[error("dictionary error: {0}")]
    Dictionary(String),

    /// Candle ML framework error outside the forward pass.
    #[error("ML framework error: {0}")]
    Candle(String),
}

impl KokusekiError {
    /// Whether the caller may retry the failed operation as-is.
    ///
    /// Only inference failures are retryable; load-time errors are
    /// permanent until the artifact on disk changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KokusekiError::Inference(_))
    }
}

/// Result type alias for Kokuseki operations.
pub type Result<T> = std::result::Result<T, KokusekiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = KokusekiError::ModelLoad {
            path: "resources/model.safetensors".into(),
            details: "no such file".into(),
        };
        assert!(err.to_string().contains("resources/model.safetensors"));
        assert!(err.to_string().contains("no such file"));

        let err = KokusekiError::Inference("tensor shape mismatch".into());
        assert!(err.to_string().contains("tensor shape mismatch"));
    }

    #[test]
    fn only_inference_is_retryable() {
        assert!(KokusekiError::Inference("oom".into()).is_retryable());
        assert!(
            !KokusekiError::ModelLoad {
                path: "m".into(),
                details: "d".into()
            }
            .is_retryable()
        );
        assert!(!KokusekiError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KokusekiError>();
    }
}
