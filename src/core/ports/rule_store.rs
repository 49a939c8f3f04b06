//! Rule store port

use async_trait::async_trait;

use super::StoreError;
use super::super::models::Rule;

/// Append-only persistence for generated rules
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Insert a new rule record
    async fn insert_rule(&self, rule: &Rule) -> Result<(), StoreError>;
}
