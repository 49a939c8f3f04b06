//! Message classification
//!
//! Loads the vectorizer and classifier artifacts into a [`ModelContext`],
//! which implements [`TextClassifier`](crate::core::ports::TextClassifier).
//!
//! Both artifacts are JSON files in one model directory:
//!
//! - `vectorizer.json` - vocabulary and sequence settings
//! - `classifier.json` - embedding table and dense layer

mod classifier;
mod context;
mod vectorizer;

pub use classifier::ClassifierWeights;
pub use context::{ArtifactError, CLASSIFIER_FILE, ModelContext, VECTORIZER_FILE};
pub use vectorizer::{
    OOV_INDEX, PAD_INDEX, RESERVED_INDICES, Standardize, Vectorizer, VectorizerConfig,
};
