//! Text classifier port

use thiserror::Error;

/// Errors raised while scoring a message
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InferenceError {
    /// A token index fell outside the embedding table
    #[error("token index {index} outside embedding table of {rows} rows")]
    TokenOutOfRange {
        /// Offending index
        index: usize,
        /// Embedding table size
        rows: usize,
    },

    /// The model produced NaN or infinity
    #[error("classifier produced a non-finite probability: {0}")]
    NonFinite(f32),
}

/// Binary text classifier
///
/// Implementations are read-only after construction and shared across
/// request threads.
pub trait TextClassifier: Send + Sync {
    /// Probability in `[0, 1]` that `text` belongs to the positive class
    fn classify(&self, text: &str) -> Result<f32, InferenceError>;
}
