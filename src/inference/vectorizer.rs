//! Text vectorization
//!
//! Turns a message into a fixed-length sequence of vocabulary indices:
//! standardize, split on whitespace, look tokens up, then pad or truncate.
//! Index 0 is padding and index 1 stands for any out-of-vocabulary token.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Index used to pad short sequences
pub const PAD_INDEX: usize = 0;
/// Index used for tokens missing from the vocabulary
pub const OOV_INDEX: usize = 1;
/// Number of reserved indices before the first vocabulary entry
pub const RESERVED_INDICES: usize = 2;

/// Normalization applied before tokenizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standardize {
    /// Lowercase and drop ASCII punctuation
    #[default]
    LowerAndStripPunctuation,
    /// Lowercase only
    Lower,
    /// Use the text as-is
    None,
}

/// Serialized vectorizer artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Tokens in index order; entry `i` maps to index `i + 2`
    pub vocabulary: Vec<String>,
    /// Length of every produced sequence
    pub output_sequence_length: usize,
    /// Normalization mode
    #[serde(default)]
    pub standardize: Standardize,
}

/// Loaded vectorizer with its lookup table
#[derive(Debug, Clone)]
pub struct Vectorizer {
    config: VectorizerConfig,
    index: HashMap<String, usize>,
}

impl Vectorizer {
    /// Build the lookup table for a config
    ///
    /// Duplicate vocabulary entries keep their first index.
    #[must_use]
    pub fn new(config: VectorizerConfig) -> Self {
        let mut index = HashMap::with_capacity(config.vocabulary.len());
        for (i, token) in config.vocabulary.iter().enumerate() {
            index.entry(token.clone()).or_insert(i + RESERVED_INDICES);
        }
        Self { config, index }
    }

    /// Size of the index space, reserved indices included
    #[must_use]
    pub fn index_space(&self) -> usize {
        self.config.vocabulary.len() + RESERVED_INDICES
    }

    /// Fixed output length
    #[must_use]
    pub const fn sequence_length(&self) -> usize {
        self.config.output_sequence_length
    }

    /// Apply the configured normalization
    #[must_use]
    pub fn standardize(&self, text: &str) -> String {
        match self.config.standardize {
            Standardize::LowerAndStripPunctuation => text
                .to_lowercase()
                .chars()
                .filter(|c| !c.is_ascii_punctuation())
                .collect(),
            Standardize::Lower => text.to_lowercase(),
            Standardize::None => text.to_string(),
        }
    }

    /// Transform text into exactly [`Self::sequence_length`] indices
    #[must_use]
    pub fn transform(&self, text: &str) -> Vec<usize> {
        let standardized = self.standardize(text);
        let mut sequence: Vec<usize> = standardized
            .split_whitespace()
            .take(self.config.output_sequence_length)
            .map(|token| self.index.get(token).copied().unwrap_or(OOV_INDEX))
            .collect();
        sequence.resize(self.config.output_sequence_length, PAD_INDEX);
        sequence
    }
}
