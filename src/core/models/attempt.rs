//! Verification attempts
//!
//! An attempt is one answer a user gave to the verification bot, together
//! with the rule evaluation that produced its result. Attempts are created by
//! the bot and only ever mutated here by flipping `ai_processed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome the verification bot assigned to an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptResult {
    /// No rule fired
    Passed,
    /// Verification failed outright
    Failed,
    /// Suspicious but not auto-resolved; input to the learning cycle
    Flagged,
    /// Suspicion score reached the deny threshold
    Denied,
}

impl AttemptResult {
    /// Lowercase tag as stored in the document store
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Flagged => "flagged",
            Self::Denied => "denied",
        }
    }
}

impl std::fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttemptResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "flagged" => Ok(Self::Flagged),
            "denied" => Ok(Self::Denied),
            _ => Err(format!(
                "Invalid attempt result: {s}. Use: passed, failed, flagged, denied"
            )),
        }
    }
}

/// Opaque identity of the user owning an attempt
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create a user id from any string-like key
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw key
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single verification attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationAttempt {
    /// What the user answered
    pub response_text: String,
    /// Sum of the scores of every rule that fired
    pub suspicion_score: f64,
    /// Bot decision
    pub result: AttemptResult,
    /// When the attempt was recorded
    pub timestamp: DateTime<Utc>,
    /// Names of rules that passed
    #[serde(default)]
    pub passed_rules: Vec<String>,
    /// Names of rules that fired
    #[serde(default)]
    pub failed_rules: Vec<String>,
    /// Whether the attempt already contributed to a generated rule
    #[serde(default)]
    pub ai_processed: bool,
}

impl VerificationAttempt {
    /// Create an unprocessed attempt with no rule bookkeeping
    #[must_use]
    pub fn new(
        response_text: impl Into<String>,
        suspicion_score: f64,
        result: AttemptResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            response_text: response_text.into(),
            suspicion_score,
            result,
            timestamp,
            passed_rules: Vec::new(),
            failed_rules: Vec::new(),
            ai_processed: false,
        }
    }

    /// Builder-style setter for the rules that fired
    #[must_use]
    pub fn with_failed_rules(mut self, rules: Vec<String>) -> Self {
        self.failed_rules = rules;
        self
    }

    /// Builder-style setter for the rules that passed
    #[must_use]
    pub fn with_passed_rules(mut self, rules: Vec<String>) -> Self {
        self.passed_rules = rules;
        self
    }

    /// Whether the learning cycle should pick this attempt up
    #[must_use]
    pub fn awaits_analysis(&self) -> bool {
        self.result == AttemptResult::Flagged && !self.ai_processed
    }
}

/// Natural key of an attempt: owning user plus attempt timestamp
///
/// Attempts carry no identifier of their own, so two attempts of one user
/// recorded in the same millisecond share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptKey {
    /// Owning user
    pub user_id: UserId,
    /// Attempt timestamp
    pub timestamp: DateTime<Utc>,
}

/// An attempt together with the user it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct UserAttempt {
    /// Owning user
    pub user_id: UserId,
    /// The attempt itself
    pub attempt: VerificationAttempt,
}

impl UserAttempt {
    /// Pair an attempt with its owner
    #[must_use]
    pub const fn new(user_id: UserId, attempt: VerificationAttempt) -> Self {
        Self { user_id, attempt }
    }

    /// Key used to mark this attempt processed
    #[must_use]
    pub fn key(&self) -> AttemptKey {
        AttemptKey {
            user_id: self.user_id.clone(),
            timestamp: self.attempt.timestamp,
        }
    }
}

/// Flattened attempt row for offline training exports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// Owning user
    pub user_id: String,
    /// What the user answered
    pub response_text: String,
    /// Suspicion score
    pub suspicion_score: f64,
    /// Bot decision
    pub result: AttemptResult,
    /// When the attempt was recorded (RFC3339)
    pub timestamp: String,
    /// Names of rules that passed
    pub passed_rules: Vec<String>,
    /// Names of rules that fired
    pub failed_rules: Vec<String>,
    /// Response length in characters
    pub text_length: usize,
}

impl From<&UserAttempt> for AttemptRecord {
    fn from(entry: &UserAttempt) -> Self {
        let attempt = &entry.attempt;
        Self {
            user_id: entry.user_id.to_string(),
            response_text: attempt.response_text.clone(),
            suspicion_score: attempt.suspicion_score,
            result: attempt.result,
            timestamp: attempt.timestamp.to_rfc3339(),
            passed_rules: attempt.passed_rules.clone(),
            failed_rules: attempt.failed_rules.clone(),
            text_length: attempt.response_text.chars().count(),
        }
    }
}
