//! Strict parsing of generator replies into rules
//!
//! The reply is treated as untrusted text: the first JSON object is read,
//! deserialized against the fixed rule schema, then validated. Prose or code
//! fences around the object are ignored.

use serde::de::IgnoredAny;
use serde_json::Deserializer;

use crate::core::models::{Rule, RuleDraft, RuleValidationError};

/// Parse and validate a generator reply
pub fn parse_rule(reply: &str) -> Result<Rule, RuleValidationError> {
    let start = reply.find('{').ok_or(RuleValidationError::NoJsonObject)?;

    let draft = Deserializer::from_str(&reply[start..])
        .into_iter::<RuleDraft>()
        .next()
        .ok_or(RuleValidationError::NoJsonObject)?
        .map_err(|e| RuleValidationError::Schema(e.to_string()))?;

    Rule::try_from(draft)
}

/// The first complete JSON object in `raw`
///
/// Reading stops at the object's closing brace, so trailing prose may
/// contain braces of its own.
#[must_use]
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let tail = &raw[start..];

    let mut stream = Deserializer::from_str(tail).into_iter::<IgnoredAny>();
    match stream.next() {
        Some(Ok(_)) => Some(&tail[..stream.byte_offset()]),
        _ => None,
    }
}
