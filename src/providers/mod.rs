//! HTTP clients for the hosted models.
//!
//! * [`openai_compat::OpenAiCompatibleVision`] — chat-completions vision call
//!   (Together AI by default, any OpenAI-compatible endpoint works)
//! * [`gemini::GeminiJson`] — Gemini `generateContent` with a JSON response
//!   MIME type
//!
//! Both hold a single `reqwest::Client` plus credentials and are cheap to
//! share behind an `Arc`.

pub mod gemini;
pub mod openai_compat;

use crate::config::ProcessorConfig;
use crate::error::InvoiceError;
use std::time::Duration;

pub use gemini::GeminiJson;
pub use openai_compat::OpenAiCompatibleVision;

/// Build the shared HTTP client used by both providers.
pub(crate) fn http_client(config: &ProcessorConfig) -> Result<reqwest::Client, InvoiceError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| InvoiceError::Internal(format!("Failed to build HTTP client: {e}")))
}
