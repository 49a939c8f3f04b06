//! Loaded model context
//!
//! Built once at startup from the two artifacts and shared read-only by every
//! request handler.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::classifier::ClassifierWeights;
use super::vectorizer::{Vectorizer, VectorizerConfig};
use crate::core::ports::{InferenceError, TextClassifier};

/// Vectorizer artifact file name inside the model directory
pub const VECTORIZER_FILE: &str = "vectorizer.json";
/// Classifier artifact file name inside the model directory
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// Errors raised while loading model artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact file does not exist
    #[error("artifact not found: {0}")]
    Missing(PathBuf),

    /// Artifact file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Artifact is not valid JSON for its schema
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Artifacts parsed but are inconsistent
    #[error("invalid model artifacts: {0}")]
    Invalid(String),
}

/// Vectorizer and classifier, ready to score text
#[derive(Debug, Clone)]
pub struct ModelContext {
    vectorizer: Vectorizer,
    classifier: ClassifierWeights,
}

impl ModelContext {
    /// Assemble a context from in-memory artifacts, checking they agree
    pub fn new(
        vectorizer: VectorizerConfig,
        classifier: ClassifierWeights,
    ) -> Result<Self, ArtifactError> {
        if vectorizer.output_sequence_length == 0 {
            return Err(ArtifactError::Invalid(
                "output_sequence_length must be positive".to_string(),
            ));
        }
        classifier.check_shape().map_err(ArtifactError::Invalid)?;

        let vectorizer = Vectorizer::new(vectorizer);
        if classifier.embeddings.len() != vectorizer.index_space() {
            return Err(ArtifactError::Invalid(format!(
                "classifier has {} embedding rows but the vectorizer produces {} indices",
                classifier.embeddings.len(),
                vectorizer.index_space()
            )));
        }

        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Load both artifacts from `dir`
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let vectorizer_path = dir.join(VECTORIZER_FILE);
        log::info!("Loading vectorizer from: {}", vectorizer_path.display());
        let vectorizer: VectorizerConfig = read_artifact(&vectorizer_path)?;

        let classifier_path = dir.join(CLASSIFIER_FILE);
        log::info!("Loading classifier from: {}", classifier_path.display());
        let classifier: ClassifierWeights = read_artifact(&classifier_path)?;

        let context = Self::new(vectorizer, classifier)?;
        log::info!(
            "Model and vectorizer loaded ({} indices, sequence length {})",
            context.vectorizer.index_space(),
            context.vectorizer.sequence_length()
        );
        Ok(context)
    }

    /// The loaded vectorizer
    #[must_use]
    pub const fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }
}

impl TextClassifier for ModelContext {
    fn classify(&self, text: &str) -> Result<f32, InferenceError> {
        let sequence = self.vectorizer.transform(text);
        self.classifier.probability(&sequence)
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
