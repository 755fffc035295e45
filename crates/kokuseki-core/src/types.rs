//! Shared result types for nationality prediction.

use serde::{Deserialize, Serialize};

/// A single ranked nationality candidate for a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Nationality label, e.g. `"Korean"`.
    pub label: String,
    /// Confidence in `[0, 1]`. Dictionary hits are reported at `1.0`.
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// The classification outcome for one input name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The display name, restored from its token-sequence encoding.
    pub name: String,
    /// Ranked predictions, best first.
    pub predictions: Vec<Prediction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_serde_round_trip() {
        let pred = Prediction::new("Korean", 0.93);
        let json = serde_json::to_string(&pred).unwrap();
        let back: Prediction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pred);
    }
}
