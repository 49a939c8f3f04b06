//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use colored::Colorize;
use serde::Serialize;

use crate::api::PredictData;
use crate::core::models::Rule;
use crate::core::services::{CycleError, CycleOutcome};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Status of a finished learning cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Nothing to analyze
    Idle,
    /// A rule was stored
    RuleCreated,
    /// The cycle aborted
    Failed,
}

/// Result of a learning cycle
#[derive(Debug, Serialize)]
pub struct CycleReport {
    /// Outcome category
    pub status: CycleStatus,
    /// Stored rule, when one was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    /// Attempts in the analyzed batch
    pub attempts: usize,
    /// Attempts marked processed
    pub marked: usize,
    /// Attempts left unmarked after the rule was stored
    pub mark_failures: usize,
    /// Why the cycle aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Result<CycleOutcome, CycleError>> for CycleReport {
    fn from(result: &Result<CycleOutcome, CycleError>) -> Self {
        match result {
            Ok(CycleOutcome::Idle) => Self {
                status: CycleStatus::Idle,
                rule: None,
                attempts: 0,
                marked: 0,
                mark_failures: 0,
                error: None,
            },
            Ok(CycleOutcome::RuleCreated(created)) => Self {
                status: CycleStatus::RuleCreated,
                rule: Some(created.rule.clone()),
                attempts: created.attempts,
                marked: created.marked,
                mark_failures: created.mark_failures,
                error: None,
            },
            Err(e) => Self {
                status: CycleStatus::Failed,
                rule: None,
                attempts: 0,
                marked: 0,
                mark_failures: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

impl CycleReport {
    /// Render the report based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        match self.status {
            CycleStatus::Idle => println!("No new flagged attempts to analyze."),
            CycleStatus::RuleCreated => {
                if let Some(rule) = &self.rule {
                    println!("{} {}", "Rule created:".green().bold(), rule.name);
                    println!("  Type:  {}", rule.rule_type);
                    println!("  Score: {}", rule.score);
                    println!("  {}", rule.description);
                }
                println!(
                    "\nMarked {}/{} attempt(s) as processed.",
                    self.marked, self.attempts
                );
                if self.mark_failures > 0 {
                    println!(
                        "{} {} attempt(s) remain unmarked and will be retried next cycle.",
                        "Warning:".yellow().bold(),
                        self.mark_failures
                    );
                }
            },
            CycleStatus::Failed => {
                println!(
                    "{} {}",
                    "Learning cycle failed:".red().bold(),
                    self.error.as_deref().unwrap_or("unknown error")
                );
                println!("Flagged attempts were left unmarked for the next cycle.");
            },
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

/// Result of a local classification
#[derive(Debug, Serialize)]
pub struct ClassifyResult {
    /// Classified text
    pub message_text: String,
    /// Thresholded prediction
    pub prediction: u8,
    /// Classifier probability
    pub confidence: f64,
}

impl ClassifyResult {
    /// Pair a prediction with its input
    #[must_use]
    pub fn new(message_text: impl Into<String>, data: PredictData) -> Self {
        Self {
            message_text: message_text.into(),
            prediction: data.prediction,
            confidence: data.confidence,
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                let label = if self.prediction == 1 {
                    "POSITIVE".red().bold()
                } else {
                    "NEGATIVE".green().bold()
                };
                println!("{label} (confidence {:.4})", self.confidence);
            },
            OutputMode::Json => {
                println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
            },
        }
    }
}
