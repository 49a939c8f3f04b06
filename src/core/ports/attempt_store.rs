//! Attempt store port
//!
//! Defines the interface for reading verification attempts and marking them
//! processed.

use async_trait::async_trait;
use thiserror::Error;

use super::super::models::{AttemptKey, UserAttempt};

/// Errors reported by document store backends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the operation
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A stored document did not have the expected shape
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Read/mark access to verification attempts
///
/// Attempts live nested inside user documents; implementations unwind them
/// into [`UserAttempt`] pairs.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// All attempts with result `flagged` that are not yet `ai_processed`
    async fn flagged_unprocessed(&self) -> Result<Vec<UserAttempt>, StoreError>;

    /// Set `ai_processed` on one flagged, unprocessed attempt matching `key`
    ///
    /// Returns `false` when no such attempt exists (already processed or
    /// gone). Calling this once per attempt marks every attempt that shares
    /// the same key.
    async fn mark_processed(&self, key: &AttemptKey) -> Result<bool, StoreError>;

    /// Every attempt of every user, in stored order
    async fn all_attempts(&self) -> Result<Vec<UserAttempt>, StoreError>;
}
