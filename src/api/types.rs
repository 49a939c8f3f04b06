//! API request and response types
//!
//! All types are framework-agnostic and can be used by any client.

use serde::{Deserialize, Serialize};

/// Probability above which a message is classified positive
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Request body for `POST /predict`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictRequest {
    /// Text to classify; required and non-empty
    #[serde(default)]
    pub message_text: Option<String>,
}

impl PredictRequest {
    /// Request for the given text
    #[must_use]
    pub fn new(message_text: impl Into<String>) -> Self {
        Self {
            message_text: Some(message_text.into()),
        }
    }
}

/// Response body for a successful prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictData {
    /// `1` when `confidence` is above the threshold, else `0`
    pub prediction: u8,
    /// Classifier probability in `[0, 1]`
    pub confidence: f64,
}

impl PredictData {
    /// Apply the decision threshold to a probability
    #[must_use]
    pub fn from_probability(probability: f32) -> Self {
        let confidence = f64::from(probability);
        Self {
            prediction: u8::from(confidence > DECISION_THRESHOLD),
            confidence,
        }
    }
}
