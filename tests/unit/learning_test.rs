//! Tests for the rule-learning cycle
//!
//! Drives `LearningCycle` against in-memory ports and checks what gets
//! stored and marked for each way a cycle can end.

use std::time::Duration;

use sentinel_engine::core::models::{AttemptResult, RuleValidationError};
use sentinel_engine::core::ports::{GeneratorError, StoreError};
use sentinel_engine::core::services::{CycleError, CycleOutcome, LearningCycle, RetryPolicy};

use crate::common::fixtures::{attempt, flagged, flagged_by};
use crate::common::mocks::{MockAttemptStore, MockGenerator, MockRuleStore};

const SARCASTIC_RULE: &str = r#"{
    "name": "Sarcastic Age Claim",
    "type": "age_claim_unverified",
    "rule_data": {},
    "score": 72,
    "description": "Bare age claims followed by an appeal to trust"
}"#;

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::ZERO)
}

fn cycle<'a>(
    store: &'a MockAttemptStore,
    rules: &'a MockRuleStore,
    generator: &'a MockGenerator,
) -> LearningCycle<'a> {
    LearningCycle::new(store, rules, generator, fast_retry())
}

// =============================================================================
// IDLE
// =============================================================================

#[tokio::test]
async fn test_no_flagged_attempts_is_idle() {
    let store = MockAttemptStore::with_attempts(vec![
        attempt("u1", "I am 25", AttemptResult::Passed, 10),
        attempt("u2", "no", AttemptResult::Denied, 20),
    ]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Idle);
    assert!(generator.prompts().is_empty());
    assert!(rules.rules().is_empty());
}

#[tokio::test]
async fn test_already_processed_attempts_are_ignored() {
    let mut done = flagged("u1", "I am 18, trust me", 10);
    done.attempt.ai_processed = true;
    let store = MockAttemptStore::with_attempts(vec![done]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Idle);
    assert!(generator.prompts().is_empty());
}

// =============================================================================
// RULE CREATED
// =============================================================================

#[tokio::test]
async fn test_flagged_attempt_becomes_rule_and_is_marked() {
    let store = MockAttemptStore::with_attempts(vec![
        flagged("u1", "I am 18, trust me", 10),
        attempt("u2", "I am 30", AttemptResult::Passed, 20),
    ]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    let CycleOutcome::RuleCreated(created) = outcome else {
        panic!("expected a rule, got {outcome:?}");
    };
    assert_eq!(created.rule.name, "Sarcastic Age Claim");
    assert_eq!(created.rule.rule_type, "age_claim_unverified");
    assert_eq!(created.rule.score, 72);
    assert_eq!(created.attempts, 1);
    assert_eq!(created.marked, 1);
    assert_eq!(created.mark_failures, 0);

    let stored = rules.rules();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], created.rule);

    let attempts = store.attempts();
    assert!(attempts[0].attempt.ai_processed);
    assert!(!attempts[1].attempt.ai_processed);
}

#[tokio::test]
async fn test_age_claim_becomes_keyword_blacklist() {
    let store = MockAttemptStore::with_attempts(vec![flagged_by(
        "u1",
        "I am 18, trust me",
        72.0,
        &["age_claim_unverified"],
        10,
    )]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(
        r#"{"name":"Trust Appeal","type":"keyword_blacklist","rule_data":{"keywords":["trust me"]},"score":40,"description":"Age claims leaning on an appeal to trust"}"#,
    );

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("I am 18, trust me"));
    assert!(prompts[0].contains("age_claim_unverified"));
    assert!(prompts[0].contains("72"));

    let stored = rules.rules();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].rule_type, "keyword_blacklist");
    assert_eq!(stored[0].rule_data["keywords"][0], "trust me");

    assert!(matches!(outcome, CycleOutcome::RuleCreated(created) if created.marked == 1));
    assert!(store.attempts()[0].attempt.ai_processed);
}

#[tokio::test]
async fn test_age_claim_with_malformed_reply_changes_nothing() {
    let store = MockAttemptStore::with_attempts(vec![flagged_by(
        "u1",
        "I am 18, trust me",
        72.0,
        &["age_claim_unverified"],
        10,
    )]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(
        r#"{"name":"Trust Appeal","type":"keyword_blacklist","rule_data":{"keywords":"trust me"},"score":40,"description":"d"}"#,
    );

    let err = cycle(&store, &rules, &generator).run_once().await.unwrap_err();

    assert!(matches!(
        err,
        CycleError::InvalidRule(RuleValidationError::InvalidRuleData { .. })
    ));
    assert_eq!(generator.prompts().len(), 1);
    assert!(rules.rules().is_empty());
    assert_eq!(store.processed_count(), 0);
}

#[tokio::test]
async fn test_prompt_carries_every_flagged_response() {
    let store = MockAttemptStore::with_attempts(vec![
        flagged("u1", "I am 18, trust me", 10),
        flagged("u2", "old enough lol", 20),
    ]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    cycle(&store, &rules, &generator).run_once().await.unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("I am 18, trust me"));
    assert!(prompts[0].contains("old enough lol"));
}

#[tokio::test]
async fn test_second_cycle_after_success_is_idle() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);
    let learning = cycle(&store, &rules, &generator);

    learning.run_once().await.unwrap();
    let second = learning.run_once().await.unwrap();

    assert_eq!(second, CycleOutcome::Idle);
    assert_eq!(generator.prompts().len(), 1);
    assert_eq!(rules.rules().len(), 1);
}

#[tokio::test]
async fn test_attempts_sharing_a_key_are_all_marked() {
    let store = MockAttemptStore::with_attempts(vec![
        flagged("u1", "first", 10),
        flagged("u1", "second", 10),
    ]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    let CycleOutcome::RuleCreated(created) = outcome else {
        panic!("expected a rule, got {outcome:?}");
    };
    assert_eq!(created.marked, 2);
    assert_eq!(store.processed_count(), 2);
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(&format!("```json\n{SARCASTIC_RULE}\n```"));

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::RuleCreated(_)));
}

// =============================================================================
// FAILURES LEAVE ATTEMPTS UNMARKED
// =============================================================================

#[tokio::test]
async fn test_reply_without_json_is_rejected() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying("I could not find a pattern, sorry.");

    let err = cycle(&store, &rules, &generator).run_once().await.unwrap_err();

    assert_eq!(err, CycleError::InvalidRule(RuleValidationError::NoJsonObject));
    assert!(rules.rules().is_empty());
    assert_eq!(store.processed_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_score_is_rejected() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(
        r#"{"name":"X","type":"keyword_blacklist","rule_data":{"keywords":["trust me"]},"score":150,"description":"d"}"#,
    );

    let err = cycle(&store, &rules, &generator).run_once().await.unwrap_err();

    assert_eq!(
        err,
        CycleError::InvalidRule(RuleValidationError::ScoreOutOfRange(150))
    );
    assert!(rules.rules().is_empty());
    assert_eq!(store.processed_count(), 0);
}

#[tokio::test]
async fn test_generator_failure_is_retried_then_reported() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let unavailable = GeneratorError::Status {
        status: 503,
        body: "overloaded".to_string(),
    };
    let generator = MockGenerator::new()
        .then_err(unavailable.clone())
        .then_err(unavailable.clone())
        .then_err(unavailable.clone());

    let err = cycle(&store, &rules, &generator).run_once().await.unwrap_err();

    assert_eq!(err, CycleError::Generate(unavailable));
    assert_eq!(generator.prompts().len(), 3);
    assert!(rules.rules().is_empty());
    assert_eq!(store.processed_count(), 0);
}

#[tokio::test]
async fn test_transient_generator_failure_recovers() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::new()
        .then_err(GeneratorError::Request("timed out".to_string()))
        .then_ok(SARCASTIC_RULE);

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::RuleCreated(_)));
    assert_eq!(generator.prompts().len(), 2);
    assert_eq!(store.processed_count(), 1);
}

#[tokio::test]
async fn test_transient_fetch_failure_recovers() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)])
        .failing_fetches(1);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::RuleCreated(_)));
    assert_eq!(store.fetch_calls(), 2);
}

#[tokio::test]
async fn test_store_down_aborts_before_generation() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)])
        .failing_fetches(10);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let err = cycle(&store, &rules, &generator).run_once().await.unwrap_err();

    assert!(matches!(err, CycleError::Fetch(StoreError::Unavailable(_))));
    assert_eq!(store.fetch_calls(), 3);
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn test_insert_failure_leaves_attempts_unmarked() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::failing();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let err = cycle(&store, &rules, &generator).run_once().await.unwrap_err();

    assert!(matches!(err, CycleError::Persist(_)));
    assert_eq!(store.processed_count(), 0);
}

#[tokio::test]
async fn test_mark_failure_keeps_the_rule() {
    let store = MockAttemptStore::with_attempts(vec![
        flagged("u1", "I am 18, trust me", 10),
        flagged("u2", "old enough lol", 20),
    ])
    .failing_marks();
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let outcome = cycle(&store, &rules, &generator).run_once().await.unwrap();

    let CycleOutcome::RuleCreated(created) = outcome else {
        panic!("expected a rule, got {outcome:?}");
    };
    assert_eq!(created.marked, 0);
    assert_eq!(created.mark_failures, 2);
    assert_eq!(rules.rules().len(), 1);
}

// =============================================================================
// LOOP
// =============================================================================

#[tokio::test]
async fn test_run_until_runs_one_cycle_before_observing_shutdown() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::replying(SARCASTIC_RULE);

    let cycles = cycle(&store, &rules, &generator)
        .run_until(Duration::from_secs(3600), std::future::ready(()))
        .await;

    assert_eq!(cycles, 1);
    assert_eq!(rules.rules().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_until_survives_failed_cycles() {
    let store = MockAttemptStore::with_attempts(vec![flagged("u1", "I am 18, trust me", 10)]);
    let rules = MockRuleStore::new();
    let generator = MockGenerator::new()
        .then_ok("not json")
        .then_ok(SARCASTIC_RULE);
    let learning = LearningCycle::new(&store, &rules, &generator, RetryPolicy::none());

    let cycles = learning
        .run_until(Duration::from_millis(1), tokio::time::sleep(Duration::from_millis(200)))
        .await;

    assert!(cycles >= 2, "ran {cycles} cycles");
    assert_eq!(rules.rules().len(), 1);
    assert_eq!(store.processed_count(), 1);
}
