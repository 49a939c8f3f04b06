//! Google Generative Language adapter
//!
//! Implements [`RuleGenerator`] over the `generateContent` REST endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GeneratorSettings;
use crate::core::ports::{GeneratorError, RuleGenerator};

/// Longest error body kept in [`GeneratorError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client with the configured timeout
    pub fn new(settings: &GeneratorSettings, api_key: &str) -> Result<Self, GeneratorError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| GeneratorError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint_url(&settings.base_url, &settings.model),
            api_key: api_key.to_string(),
        })
    }

    /// Full request URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RuleGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        log::debug!("Sending {} byte prompt to {}", prompt.len(), self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| GeneratorError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Malformed(e.to_string()))?;

        reply_text(envelope)
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// `{base}/v1beta/models/{model}:generateContent`
fn endpoint_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{model}:generateContent",
        base_url.trim_end_matches('/')
    )
}

/// Request body asking for a JSON reply
fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseMimeType": "application/json" }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Text of the first candidate, parts concatenated
fn reply_text(envelope: GenerateContentResponse) -> Result<String, GeneratorError> {
    let text: String = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(GeneratorError::EmptyReply)
    } else {
        Ok(text)
    }
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}
