//! Business logic services
//!
//! Orchestration logic that operates on domain models through the port
//! traits. Nothing here talks to the network directly.
//!
//! - [`learning`] - The flag -> analyze -> persist -> mark cycle
//! - [`prompt`] - Batch prompt construction
//! - [`rule_parser`] - Strict parsing of generator replies
//! - [`retry`] - Bounded retry with backoff

pub mod learning;
pub mod prompt;
pub mod retry;
pub mod rule_parser;

pub use learning::{CycleError, CycleOutcome, LearningCycle, RuleCreated};
pub use prompt::build_rule_prompt;
pub use retry::RetryPolicy;
pub use rule_parser::{extract_json_object, parse_rule};
