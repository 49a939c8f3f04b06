//! Embedding-bag classifier
//!
//! Embedding lookup, average pooling over non-padding positions, one dense
//! unit with a sigmoid.

use serde::{Deserialize, Serialize};

use super::vectorizer::PAD_INDEX;
use crate::core::ports::InferenceError;

/// Serialized classifier artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierWeights {
    /// Width of each embedding row
    pub embedding_dim: usize,
    /// One row per vectorizer index, reserved indices included
    pub embeddings: Vec<Vec<f32>>,
    /// Dense layer weights, `embedding_dim` long
    pub weights: Vec<f32>,
    /// Dense layer bias
    pub bias: f32,
}

impl ClassifierWeights {
    /// Check internal shape consistency and finiteness
    pub fn check_shape(&self) -> Result<(), String> {
        if self.embedding_dim == 0 {
            return Err("embedding_dim must be positive".to_string());
        }
        if self.weights.len() != self.embedding_dim {
            return Err(format!(
                "weights has {} entries, expected embedding_dim {}",
                self.weights.len(),
                self.embedding_dim
            ));
        }
        if let Some((row, values)) = self
            .embeddings
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != self.embedding_dim)
        {
            return Err(format!(
                "embedding row {row} has {} entries, expected {}",
                values.len(),
                self.embedding_dim
            ));
        }
        let all_finite = self.bias.is_finite()
            && self.weights.iter().all(|w| w.is_finite())
            && self.embeddings.iter().flatten().all(|w| w.is_finite());
        if !all_finite {
            return Err("weights contain NaN or infinite values".to_string());
        }
        Ok(())
    }

    /// Probability of the positive class for an index sequence
    pub fn probability(&self, sequence: &[usize]) -> Result<f32, InferenceError> {
        let mut pooled = vec![0.0_f32; self.embedding_dim];
        let mut count = 0_u32;

        for &index in sequence.iter().filter(|&&i| i != PAD_INDEX) {
            let row = self.embeddings.get(index).ok_or(InferenceError::TokenOutOfRange {
                index,
                rows: self.embeddings.len(),
            })?;
            for (acc, value) in pooled.iter_mut().zip(row) {
                *acc += value;
            }
            count += 1;
        }

        if count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let n = count as f32;
            for acc in &mut pooled {
                *acc /= n;
            }
        }

        let logit = pooled
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f32>()
            + self.bias;

        let probability = sigmoid(logit);
        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(InferenceError::NonFinite(probability))
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
