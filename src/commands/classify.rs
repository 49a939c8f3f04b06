//! Classify command - score a message without the HTTP layer

use std::path::Path;

use anyhow::Context;

use sentinel_engine::api::{self, PredictRequest};
use sentinel_engine::inference::ModelContext;
use sentinel_engine::output::{ClassifyResult, OutputMode};

/// Classify `text` with the model in `model_dir`
pub fn classify(model_dir: &Path, text: &str, mode: OutputMode) -> anyhow::Result<()> {
    let context = ModelContext::load(model_dir).with_context(|| {
        format!("Failed to load model artifacts from {}", model_dir.display())
    })?;

    let data = api::predict(&context, &PredictRequest::new(text))?;
    ClassifyResult::new(text, data).render(mode);

    Ok(())
}
