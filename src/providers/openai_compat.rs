use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::ProcessorConfig;
use crate::error::ModelError;
use crate::model::{EncodedImage, VisionModel};

/// Vision transcription over an OpenAI-style `/v1/chat/completions` endpoint.
pub struct OpenAiCompatibleVision {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompatibleVision {
    pub fn new(client: reqwest::Client, config: &ProcessorConfig) -> Self {
        Self {
            client,
            api_key: config.vision_api_key.clone(),
            model: config.vision_model.clone(),
            base_url: config.vision_base_url.clone(),
            max_tokens: config.vision_max_tokens,
            temperature: config.vision_temperature,
        }
    }

    /// One user turn carrying the instruction text and the image as a data URL.
    fn build_request_body(
        model: &str,
        instruction: &str,
        image: &EncodedImage,
        max_tokens: u32,
        temperature: f32,
    ) -> serde_json::Value {
        json!({
            "model": model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": instruction },
                    { "type": "image_url", "image_url": { "url": image.to_data_url() } },
                ],
            }],
            "max_tokens": max_tokens,
            "temperature": temperature,
        })
    }
}

#[async_trait]
impl VisionModel for OpenAiCompatibleVision {
    async fn transcribe(
        &self,
        instruction: &str,
        image: EncodedImage,
    ) -> Result<String, ModelError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = Self::build_request_body(
            &self.model,
            instruction,
            &image,
            self.max_tokens,
            self.temperature,
        );

        debug!("Vision request to {} (model={})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ModelError::MalformedResponse("missing choices[0].message.content".into())
            })?
            .to_string();

        Ok(content)
    }
}
