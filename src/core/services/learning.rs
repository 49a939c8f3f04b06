//! Rule-learning cycle
//!
//! One cycle walks a fixed sequence:
//! `fetch -> (empty? stop) -> analyze -> parse/validate -> persist -> mark`.
//!
//! Attempts are marked only after the rule is stored. A failure anywhere
//! before that leaves every attempt unmarked so the next cycle picks the
//! batch up again.

use std::time::Duration;

use thiserror::Error;

use super::prompt::build_rule_prompt;
use super::retry::RetryPolicy;
use super::rule_parser::parse_rule;
use crate::core::models::{Rule, RuleValidationError, UserAttempt};
use crate::core::ports::{AttemptStore, GeneratorError, RuleGenerator, RuleStore, StoreError};

/// Reasons a cycle ended without storing a rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// Flagged attempts could not be read
    #[error("failed to fetch flagged attempts: {0}")]
    Fetch(StoreError),

    /// The language service call failed
    #[error("rule generation failed: {0}")]
    Generate(GeneratorError),

    /// The reply did not yield a valid rule
    #[error("generated rule rejected: {0}")]
    InvalidRule(RuleValidationError),

    /// The validated rule could not be stored
    #[error("failed to persist rule: {0}")]
    Persist(StoreError),
}

/// Result of a completed cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nothing was waiting for analysis
    Idle,
    /// A rule was stored from the flagged batch
    RuleCreated(RuleCreated),
}

/// Details of a cycle that stored a rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCreated {
    /// The stored rule
    pub rule: Rule,
    /// Size of the analyzed batch
    pub attempts: usize,
    /// Attempts marked processed
    pub marked: usize,
    /// Attempts that could not be marked (retried next cycle)
    pub mark_failures: usize,
}

/// Orchestrates one learning cycle over the injected ports
pub struct LearningCycle<'a> {
    attempts: &'a dyn AttemptStore,
    rules: &'a dyn RuleStore,
    generator: &'a dyn RuleGenerator,
    retry: RetryPolicy,
}

impl std::fmt::Debug for LearningCycle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningCycle")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<'a> LearningCycle<'a> {
    /// Wire a cycle to its store, rule sink and generator
    #[must_use]
    pub fn new(
        attempts: &'a dyn AttemptStore,
        rules: &'a dyn RuleStore,
        generator: &'a dyn RuleGenerator,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            attempts,
            rules,
            generator,
            retry,
        }
    }

    /// Run exactly one cycle
    pub async fn run_once(&self) -> Result<CycleOutcome, CycleError> {
        let batch = self
            .retry
            .run("fetching flagged attempts", || self.attempts.flagged_unprocessed())
            .await
            .map_err(CycleError::Fetch)?;

        if batch.is_empty() {
            log::info!("No new flagged attempts to analyze");
            return Ok(CycleOutcome::Idle);
        }
        log::info!("Found {} new flagged attempts", batch.len());

        let prompt = build_rule_prompt(&batch);
        let reply = self
            .retry
            .run("rule generation", || self.generator.generate(&prompt))
            .await
            .map_err(CycleError::Generate)?;

        let rule = parse_rule(&reply).map_err(|e| {
            log::debug!("Rejected generator reply: {reply}");
            CycleError::InvalidRule(e)
        })?;

        self.retry
            .run("rule insert", || self.rules.insert_rule(&rule))
            .await
            .map_err(CycleError::Persist)?;
        log::info!(
            "Added new rule '{}' (type {}, score {})",
            rule.name,
            rule.rule_type,
            rule.score
        );

        let (marked, mark_failures) = self.mark_batch(&batch).await;

        Ok(CycleOutcome::RuleCreated(RuleCreated {
            rule,
            attempts: batch.len(),
            marked,
            mark_failures,
        }))
    }

    /// Run cycles until `shutdown` resolves, waiting `interval` between them
    ///
    /// Cycle errors are logged and never stop the loop. Shutdown is observed
    /// between cycles; a cycle already in flight runs to completion. Returns
    /// the number of cycles run.
    pub async fn run_until<F>(&self, interval: Duration, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        loop {
            match self.run_once().await {
                Ok(CycleOutcome::Idle) => {},
                Ok(CycleOutcome::RuleCreated(created)) => log::info!(
                    "Learning cycle stored '{}' from {} attempts",
                    created.rule.name,
                    created.attempts
                ),
                Err(e) => log::error!("Learning cycle aborted: {e}"),
            }
            cycles += 1;

            log::info!("Learning cycle complete; next run in {}s", interval.as_secs());
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    log::info!("Shutdown requested, stopping learning loop");
                    break;
                },
                () = tokio::time::sleep(interval) => {},
            }
        }

        cycles
    }

    async fn mark_batch(&self, batch: &[UserAttempt]) -> (usize, usize) {
        let mut marked = 0;
        let mut failures = 0;

        for entry in batch {
            let key = entry.key();
            match self
                .retry
                .run("marking attempt processed", || self.attempts.mark_processed(&key))
                .await
            {
                Ok(true) => marked += 1,
                Ok(false) => {
                    log::warn!(
                        "No unprocessed attempt of user {} at {} left to mark",
                        key.user_id,
                        key.timestamp.to_rfc3339()
                    );
                    failures += 1;
                },
                Err(e) => {
                    log::error!(
                        "Error marking attempt of user {} at {} as processed: {e}",
                        key.user_id,
                        key.timestamp.to_rfc3339()
                    );
                    failures += 1;
                },
            }
        }

        (marked, failures)
    }
}
