//! Tests for the vectorizer, classifier and model loading

use sentinel_engine::core::ports::{InferenceError, TextClassifier};
use sentinel_engine::inference::{
    ArtifactError, ClassifierWeights, ModelContext, OOV_INDEX, PAD_INDEX, Standardize, Vectorizer,
    VectorizerConfig,
};

use crate::common::fixtures::{ModelDir, tiny_classifier, tiny_context, tiny_vectorizer};

// =============================================================================
// VECTORIZER
// =============================================================================

mod vectorizer_tests {
    use super::*;

    #[test]
    fn test_known_tokens_map_past_reserved_indices() {
        let vectorizer = Vectorizer::new(tiny_vectorizer());
        assert_eq!(vectorizer.transform("trust me"), vec![2, 3, PAD_INDEX, PAD_INDEX]);
    }

    #[test]
    fn test_unknown_tokens_map_to_oov() {
        let vectorizer = Vectorizer::new(tiny_vectorizer());
        assert_eq!(
            vectorizer.transform("I am 18"),
            vec![OOV_INDEX, OOV_INDEX, OOV_INDEX, PAD_INDEX]
        );
    }

    #[test]
    fn test_long_input_is_truncated() {
        let vectorizer = Vectorizer::new(tiny_vectorizer());
        assert_eq!(
            vectorizer.transform("hello hello hello hello trust trust"),
            vec![4, 4, 4, 4]
        );
    }

    #[test]
    fn test_blank_input_is_all_padding() {
        let vectorizer = Vectorizer::new(tiny_vectorizer());
        assert_eq!(vectorizer.transform("   "), vec![PAD_INDEX; 4]);
    }

    #[test]
    fn test_default_standardization_lowercases_and_strips_punctuation() {
        let vectorizer = Vectorizer::new(tiny_vectorizer());
        assert_eq!(vectorizer.standardize("Trust ME!!"), "trust me");
        assert_eq!(vectorizer.transform("Trust, me."), vec![2, 3, 0, 0]);
    }

    #[test]
    fn test_lower_only_keeps_punctuation() {
        let vectorizer = Vectorizer::new(VectorizerConfig {
            standardize: Standardize::Lower,
            ..tiny_vectorizer()
        });
        assert_eq!(vectorizer.transform("Trust, me"), vec![OOV_INDEX, 3, 0, 0]);
    }

    #[test]
    fn test_no_standardization_is_case_sensitive() {
        let vectorizer = Vectorizer::new(VectorizerConfig {
            standardize: Standardize::None,
            ..tiny_vectorizer()
        });
        assert_eq!(vectorizer.transform("Trust me"), vec![OOV_INDEX, 3, 0, 0]);
    }

    #[test]
    fn test_duplicate_vocabulary_keeps_first_index() {
        let vectorizer = Vectorizer::new(VectorizerConfig {
            vocabulary: vec!["a".to_string(), "a".to_string()],
            output_sequence_length: 1,
            standardize: Standardize::default(),
        });
        assert_eq!(vectorizer.transform("a"), vec![2]);
        assert_eq!(vectorizer.index_space(), 4);
    }

    #[test]
    fn test_standardize_defaults_when_absent_from_artifact() {
        let config: VectorizerConfig =
            serde_json::from_str(r#"{"vocabulary":["a"],"output_sequence_length":3}"#).unwrap();
        assert_eq!(config.standardize, Standardize::LowerAndStripPunctuation);
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

mod classifier_tests {
    use super::*;

    #[test]
    fn test_padding_is_excluded_from_pooling() {
        let classifier = tiny_classifier();
        let with_padding = classifier.probability(&[2, 0, 0, 0]).unwrap();
        let without = classifier.probability(&[2]).unwrap();
        assert!((with_padding - without).abs() < f32::EPSILON);
    }

    #[test]
    fn test_all_padding_scores_the_bias() {
        let classifier = ClassifierWeights {
            bias: 2.0,
            ..tiny_classifier()
        };
        let p = classifier.probability(&[0, 0, 0, 0]).unwrap();
        assert!((p - 1.0 / (1.0 + (-2.0_f32).exp())).abs() < 1e-6);
    }

    #[test]
    fn test_index_outside_table() {
        let err = tiny_classifier().probability(&[7]).unwrap_err();
        assert_eq!(err, InferenceError::TokenOutOfRange { index: 7, rows: 5 });
    }

    #[test]
    fn test_inference_error_is_copy() {
        let err = tiny_classifier().probability(&[9]).unwrap_err();
        let copied = err;
        assert_eq!(err, copied);
        assert_eq!(
            err.to_string(),
            "token index 9 outside embedding table of 5 rows"
        );
    }

    #[test]
    fn test_shape_checks() {
        let wrong_weights = ClassifierWeights {
            weights: vec![1.0, 2.0],
            ..tiny_classifier()
        };
        assert!(wrong_weights.check_shape().is_err());

        let ragged = ClassifierWeights {
            embeddings: vec![vec![0.0], vec![0.0, 1.0]],
            ..tiny_classifier()
        };
        assert!(ragged.check_shape().is_err());

        let nan = ClassifierWeights {
            bias: f32::NAN,
            ..tiny_classifier()
        };
        assert!(nan.check_shape().is_err());

        assert!(tiny_classifier().check_shape().is_ok());
    }
}

// =============================================================================
// MODEL CONTEXT
// =============================================================================

mod context_tests {
    use super::*;

    #[test]
    fn test_positive_and_negative_messages() {
        let context = tiny_context();

        let positive = context.classify("trust me").unwrap();
        let negative = context.classify("hello").unwrap();

        assert!(positive > 0.9, "got {positive}");
        assert!(negative < 0.1, "got {negative}");
    }

    #[test]
    fn test_out_of_vocabulary_message_is_undecided() {
        let p = tiny_context().classify("completely unknown words").unwrap();
        assert!((p - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_embedding_rows_must_cover_index_space() {
        let mut classifier = tiny_classifier();
        classifier.embeddings.pop();

        let err = ModelContext::new(tiny_vectorizer(), classifier).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid(_)));
    }

    #[test]
    fn test_zero_sequence_length_is_invalid() {
        let vectorizer = VectorizerConfig {
            output_sequence_length: 0,
            ..tiny_vectorizer()
        };
        let err = ModelContext::new(vectorizer, tiny_classifier()).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid(_)));
    }

    #[test]
    fn test_load_from_directory() {
        let model = ModelDir::new();

        let context = ModelContext::load(model.path()).unwrap();

        assert_eq!(context.vectorizer().sequence_length(), 4);
        assert!(context.classify("trust me").unwrap() > 0.9);
    }

    #[test]
    fn test_load_missing_artifact() {
        let model = ModelDir::new();
        model.remove_classifier();

        let err = ModelContext::load(model.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing(path) if path.ends_with("classifier.json")));
    }

    #[test]
    fn test_load_corrupt_artifact() {
        let model = ModelDir::new();
        model.write_vectorizer("{ not json");

        let err = ModelContext::load(model.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }
}
