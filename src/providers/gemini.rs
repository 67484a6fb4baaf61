use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::ProcessorConfig;
use crate::error::ModelError;
use crate::model::TextModel;

/// Gemini `generateContent` with `responseMimeType: application/json`.
///
/// The key travels in the `x-goog-api-key` header, never in the URL.
pub struct GeminiJson {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiJson {
    pub fn new(client: reqwest::Client, config: &ProcessorConfig) -> Self {
        Self {
            client,
            api_key: config.text_api_key.clone(),
            model: config.text_model.clone(),
            base_url: config.text_base_url.clone(),
        }
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
            },
        })
    }

    /// Concatenate every text part of the first candidate.
    fn extract_text(resp: &serde_json::Value) -> Result<String, ModelError> {
        let parts = resp["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                let reason = resp["promptFeedback"]["blockReason"]
                    .as_str()
                    .map(|r| format!(" (blocked: {r})"))
                    .unwrap_or_default();
                ModelError::MalformedResponse(format!(
                    "missing candidates[0].content.parts{reason}"
                ))
            })?;

        let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if text.is_empty() {
            return Err(ModelError::MalformedResponse(
                "candidates[0].content.parts has no text".into(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextModel for GeminiJson {
    async fn generate_json(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model,
        );
        let body = Self::build_request_body(prompt);

        debug!("Gemini request to model={} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        Self::extract_text(&resp)
    }
}
