//! Rule generator port
//!
//! A generator is any text-in/text-out language service. It knows nothing
//! about rules; prompting and parsing happen in the learning service.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by generative-language backends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// Transport failure or timeout
    #[error("generator request failed: {0}")]
    Request(String),

    /// Non-success HTTP status
    #[error("generator returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The response envelope could not be decoded
    #[error("malformed generator response: {0}")]
    Malformed(String),

    /// The response carried no candidate text
    #[error("generator returned no text")]
    EmptyReply,
}

/// Text generation capability
#[async_trait]
pub trait RuleGenerator: Send + Sync {
    /// Send one prompt and return the raw reply text
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}
