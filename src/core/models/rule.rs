//! Moderation rules
//!
//! A rule is a typed detection heuristic consumed by the verification bot.
//! Rules only enter the store through [`Rule::try_from`] on a [`RuleDraft`],
//! so anything persisted has passed the field and parameter checks below.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Lowest accepted risk weight
pub const MIN_SCORE: i64 = 1;
/// Highest accepted risk weight
pub const MAX_SCORE: i64 = 100;

/// Errors raised while turning generator output into a rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleValidationError {
    /// The reply contained no JSON object at all
    #[error("no JSON object found in generator reply")]
    NoJsonObject,

    /// The object did not deserialize into the rule schema
    #[error("rule does not match the schema: {0}")]
    Schema(String),

    /// A required string field was blank
    #[error("rule field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// Score outside 1..=100
    #[error("rule score {0} is outside {MIN_SCORE}..={MAX_SCORE}")]
    ScoreOutOfRange(i64),

    /// `rule_data` was not an object
    #[error("rule_data must be a JSON object")]
    RuleDataNotObject,

    /// `rule_data` is missing parameters the rule type needs
    #[error("{rule_type} rule_data is invalid: {reason}")]
    InvalidRuleData {
        /// Rule type tag
        rule_type: String,
        /// What is wrong
        reason: String,
    },
}

/// Rule types the verification bot knows how to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Fires when the response contains any listed keyword
    KeywordBlacklist,
    /// Fires when the response length is outside a per-account-type window
    LengthCheck,
    /// Fires on age/date keywords below a minimum age
    DateCheck,
    /// Any other tag; stored as-is
    Other,
}

impl RuleKind {
    /// Classify a rule type tag
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "keyword_blacklist" => Self::KeywordBlacklist,
            "length_check" => Self::LengthCheck,
            "date_check" => Self::DateCheck,
            _ => Self::Other,
        }
    }
}

/// Rule exactly as a generator is asked to produce it
///
/// Every field is required and unknown fields are rejected. Values are kept
/// loose here and checked by [`Rule::try_from`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDraft {
    /// Rule name
    pub name: String,
    /// Rule type tag
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Type-specific parameters
    pub rule_data: Value,
    /// Risk weight
    pub score: i64,
    /// What the rule detects
    pub description: String,
}

/// A validated moderation rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Rule name (unique by convention only)
    pub name: String,
    /// Rule type tag, e.g. `keyword_blacklist`
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Type-specific parameters
    pub rule_data: Map<String, Value>,
    /// Risk weight in 1..=100
    pub score: u8,
    /// What the rule detects
    pub description: String,
}

impl Rule {
    /// Kind of this rule
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        RuleKind::from_tag(&self.rule_type)
    }
}

impl TryFrom<RuleDraft> for Rule {
    type Error = RuleValidationError;

    fn try_from(draft: RuleDraft) -> Result<Self, Self::Error> {
        let name = non_empty("name", draft.name)?;
        let rule_type = non_empty("type", draft.rule_type)?;
        let description = non_empty("description", draft.description)?;

        let score = u8::try_from(draft.score)
            .ok()
            .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(&i64::from(*s)))
            .ok_or(RuleValidationError::ScoreOutOfRange(draft.score))?;

        let Value::Object(mut rule_data) = draft.rule_data else {
            return Err(RuleValidationError::RuleDataNotObject);
        };

        check_rule_data(&rule_type, &mut rule_data)?;

        Ok(Self {
            name,
            rule_type,
            rule_data,
            score,
            description,
        })
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, RuleValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RuleValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// TYPE-SPECIFIC PARAMETERS
// =============================================================================

/// Validate the parameters of known rule types
///
/// Keyword lists are lowercased in place; the bot matches them against the
/// lowercased response.
fn check_rule_data(
    rule_type: &str,
    data: &mut Map<String, Value>,
) -> Result<(), RuleValidationError> {
    let invalid = |reason: String| RuleValidationError::InvalidRuleData {
        rule_type: rule_type.to_string(),
        reason,
    };

    match RuleKind::from_tag(rule_type) {
        RuleKind::KeywordBlacklist => {
            if string_list(data, "keywords").map_err(invalid)?.is_empty() {
                return Err(invalid("`keywords` must not be empty".to_string()));
            }
            lowercase_list(data, "keywords");
            Ok(())
        },
        RuleKind::LengthCheck => {
            for account in ["standard_user", "nitro_user"] {
                length_window(data, account).map_err(invalid)?;
            }
            Ok(())
        },
        RuleKind::DateCheck => {
            data.get("min_age")
                .and_then(Value::as_u64)
                .ok_or_else(|| invalid("`min_age` must be a non-negative integer".to_string()))?;
            string_list(data, "keywords").map_err(invalid)?;
            lowercase_list(data, "keywords");
            Ok(())
        },
        RuleKind::Other => Ok(()),
    }
}

fn string_list<'a>(data: &'a Map<String, Value>, key: &str) -> Result<Vec<&'a str>, String> {
    let items = data
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| format!("`{key}` must be an array of strings"))?;

    items
        .iter()
        .map(|item| match item.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(format!("`{key}` must only contain non-empty strings")),
        })
        .collect()
}

fn lowercase_list(data: &mut Map<String, Value>, key: &str) {
    if let Some(Value::Array(items)) = data.get_mut(key) {
        for item in items {
            if let Value::String(s) = item {
                *s = s.to_lowercase();
            }
        }
    }
}

fn length_window(data: &Map<String, Value>, account: &str) -> Result<(), String> {
    let window = data
        .get(account)
        .and_then(Value::as_object)
        .ok_or_else(|| format!("`{account}` must be an object"))?;

    let bound = |key: &str| {
        window
            .get(key)
            .and_then(Value::as_u64)
            .ok_or_else(|| format!("`{account}.{key}` must be a non-negative integer"))
    };

    let min = bound("min_length")?;
    let max = bound("max_length")?;
    if min > max {
        return Err(format!("`{account}.min_length` ({min}) exceeds `max_length` ({max})"));
    }
    Ok(())
}
