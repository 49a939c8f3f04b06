//! Domain models for sentinel-engine
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`VerificationAttempt`] - One answer a user gave to the verification bot
//! - [`UserAttempt`] - An attempt paired with its owner
//! - [`Rule`] - A validated moderation rule

mod attempt;
mod rule;

pub use attempt::{
    AttemptKey, AttemptRecord, AttemptResult, UserAttempt, UserId, VerificationAttempt,
};
pub use rule::{MAX_SCORE, MIN_SCORE, Rule, RuleDraft, RuleKind, RuleValidationError};
