//! Seams to the two hosted models.
//!
//! The pipeline only ever talks to these traits. Production implementations
//! live in [`crate::providers`]; tests plug in in-process stubs. Both traits
//! are object safe so the processor can hold them as `Arc<dyn …>` and share
//! them across concurrent requests.

use crate::error::ModelError;
use async_trait::async_trait;

/// A page bitmap ready for a multimodal request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 (standard alphabet, padded) of the encoded bytes.
    pub data: String,
    /// MIME type of the encoded bytes, e.g. `image/jpeg`.
    pub mime_type: &'static str,
}

impl EncodedImage {
    /// `data:` URI form accepted by OpenAI-style chat APIs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// A remote vision-capable model.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Transcribe `image` following `instruction`; returns the raw response text.
    async fn transcribe(&self, instruction: &str, image: EncodedImage)
        -> Result<String, ModelError>;
}

/// A remote text-generation model constrained to JSON output.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate a JSON document for `prompt`; returns the raw response text.
    async fn generate_json(&self, prompt: &str) -> Result<String, ModelError>;
}
