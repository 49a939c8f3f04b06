//! Property-based tests for vectorization and prediction
//!
//! Uses proptest to verify properties that should hold for all inputs.

use proptest::prelude::*;
use sentinel_engine::api::{PredictRequest, predict};
use sentinel_engine::inference::Vectorizer;

use crate::common::fixtures::{tiny_context, tiny_vectorizer};

proptest! {
    /// Every message becomes exactly one sequence length of indices
    #[test]
    fn sequence_length_is_fixed(text in ".{0,200}") {
        let vectorizer = Vectorizer::new(tiny_vectorizer());
        let sequence = vectorizer.transform(&text);
        prop_assert_eq!(sequence.len(), vectorizer.sequence_length());
        prop_assert!(sequence.iter().all(|&i| i < vectorizer.index_space()));
    }

    /// Padding only ever trails real tokens
    #[test]
    fn padding_is_trailing(text in "[a-z ]{0,40}") {
        let sequence = Vectorizer::new(tiny_vectorizer()).transform(&text);
        if let Some(first_pad) = sequence.iter().position(|&i| i == 0) {
            prop_assert!(sequence[first_pad..].iter().all(|&i| i == 0));
        }
    }

    /// Any non-empty message gets a probability and a consistent label
    #[test]
    fn prediction_matches_confidence(text in ".{1,120}") {
        let context = tiny_context();
        let data = predict(&context, &PredictRequest::new(text)).unwrap();
        prop_assert!((0.0..=1.0).contains(&data.confidence));
        prop_assert_eq!(data.prediction == 1, data.confidence > 0.5);
    }
}
