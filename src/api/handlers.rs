//! Pure API handlers
//!
//! These handlers contain business logic and are HTTP-agnostic.
//! They take typed input and return `Result<T, ApiError>`.

use crate::core::ports::TextClassifier;

use super::error::ApiError;
use super::types::{PredictData, PredictRequest};

/// Message for a missing or empty `message_text`
pub const MISSING_MESSAGE_TEXT: &str = "Missing 'message_text' in request body";

// =============================================================================
// PREDICT
// =============================================================================

/// Classify a message
///
/// Rejects a missing or empty `message_text` before the classifier is touched.
/// Classifier failures are logged and reported as a generic internal error.
pub fn predict(
    classifier: &dyn TextClassifier,
    req: &PredictRequest,
) -> Result<PredictData, ApiError> {
    let text = match req.message_text.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ApiError::bad_request(MISSING_MESSAGE_TEXT)),
    };

    let probability = classifier.classify(text).map_err(|e| {
        log::error!("Error during prediction: {e}");
        ApiError::internal()
    })?;

    Ok(PredictData::from_probability(probability))
}
