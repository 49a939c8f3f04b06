//! Prompt construction for rule generation
//!
//! The whole flagged batch goes into one prompt as a JSON array so the
//! generator sees the attempts side by side.

use serde::Serialize;

use crate::core::models::UserAttempt;

/// Per-attempt fields shown to the generator
#[derive(Debug, Serialize)]
struct PromptRecord<'a> {
    user_id: &'a str,
    response: &'a str,
    failed_rules: &'a [String],
    suspicion_score: f64,
}

const PREAMBLE: &str = "You review bypass attempts against an age verification system. \
The JSON array below lists verification attempts that were flagged as suspicious. \
Find the pattern or technique these responses share and write one new detection rule \
that would flag similar attempts in the future.";

const SCHEMA: &str = "Reply with a single JSON object and nothing else. The object must have \
exactly these fields:\n\
- name (string, e.g. \"Sarcastic Age Claim\")\n\
- type (string: keyword_blacklist, length_check, date_check, or another descriptive tag)\n\
- rule_data (object with the rule parameters)\n\
- score (integer from 1 to 100, based on risk)\n\
- description (string explaining what the rule detects)\n\n\
rule_data shapes:\n\
- keyword_blacklist: {\"keywords\": [lowercase strings]}\n\
- length_check: {\"standard_user\": {\"min_length\": int, \"max_length\": int}, \
\"nitro_user\": {\"min_length\": int, \"max_length\": int}}\n\
- date_check: {\"min_age\": int, \"keywords\": [lowercase strings]}";

/// Build the rule-generation prompt for a batch of flagged attempts
#[must_use]
pub fn build_rule_prompt(batch: &[UserAttempt]) -> String {
    let records: Vec<PromptRecord<'_>> = batch
        .iter()
        .map(|entry| PromptRecord {
            user_id: entry.user_id.as_str(),
            response: &entry.attempt.response_text,
            failed_rules: &entry.attempt.failed_rules,
            suspicion_score: entry.attempt.suspicion_score,
        })
        .collect();

    let data = serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string());

    format!("{PREAMBLE}\n\nFlagged attempts: {data}\n\n{SCHEMA}")
}
