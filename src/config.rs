//! Configuration types for invoice extraction.
//!
//! All processing behaviour is controlled through [`ProcessorConfig`], built
//! via its [`ProcessorConfigBuilder`]. One struct holds every knob so the
//! processor can be constructed once at startup and shared read-only across
//! request handlers.
//!
//! Credentials come from the environment (a `.env` file is loaded first when
//! present) or from explicit builder setters; explicit setters win.

use crate::error::InvoiceError;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding the vision-model API key.
pub const VISION_API_KEY_ENV: &str = "TOGETHER_API_KEY";
/// Environment variable holding the text-generation API key.
pub const TEXT_API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const DEFAULT_VISION_MODEL: &str = "meta-llama/Llama-3.2-90B-Vision-Instruct-Turbo";
pub const DEFAULT_VISION_BASE_URL: &str = "https://api.together.xyz";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_TEXT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for an [`crate::InvoiceProcessor`].
///
/// # Example
/// ```rust
/// use invoice2json::ProcessorConfig;
///
/// let config = ProcessorConfig::builder()
///     .vision_api_key("together-key")
///     .text_api_key("google-key")
///     .dpi(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.target_width, 1800);
/// ```
#[derive(Clone)]
pub struct ProcessorConfig {
    /// API key for the OpenAI-compatible vision endpoint.
    pub vision_api_key: String,

    /// API key for the Gemini text-generation endpoint.
    pub text_api_key: String,

    /// Vision model identifier. Default: Llama 3.2 90B Vision on Together.
    pub vision_model: String,

    /// Base URL of the OpenAI-compatible vision endpoint (no trailing `/v1`).
    pub vision_base_url: String,

    /// Text-generation model identifier. Default: `gemini-1.5-pro`.
    pub text_model: String,

    /// Base URL of the Gemini API.
    pub text_base_url: String,

    /// Nominal rasterisation resolution. Range: 72–600. Default: 300.
    ///
    /// Pages are rendered at this density unless that would exceed
    /// `target_width`.
    pub dpi: u32,

    /// Rendered page width in pixels. Default: 1800.
    pub target_width: u32,

    /// Longest edge of any bitmap sent to the vision model. Default: 2000.
    pub max_dimension: u32,

    /// JPEG quality (1–100) for page bitmaps. Default: 90.
    pub jpeg_quality: u8,

    /// Maximum tokens the vision model may generate per page. Default: 2048.
    pub vision_max_tokens: u32,

    /// Sampling temperature for the vision model. Default: 0.3.
    pub vision_temperature: f32,

    /// Timeout for each remote call in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Explicit pdfium shared library. If None, the system library is used.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            vision_api_key: String::new(),
            text_api_key: String::new(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            vision_base_url: DEFAULT_VISION_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            text_base_url: DEFAULT_TEXT_BASE_URL.to_string(),
            dpi: 300,
            target_width: 1800,
            max_dimension: 2000,
            jpeg_quality: 90,
            vision_max_tokens: 2048,
            vision_temperature: 0.3,
            api_timeout_secs: 120,
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("vision_api_key", &redact(&self.vision_api_key))
            .field("text_api_key", &redact(&self.text_api_key))
            .field("vision_model", &self.vision_model)
            .field("vision_base_url", &self.vision_base_url)
            .field("text_model", &self.text_model)
            .field("text_base_url", &self.text_base_url)
            .field("dpi", &self.dpi)
            .field("target_width", &self.target_width)
            .field("max_dimension", &self.max_dimension)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("vision_max_tokens", &self.vision_max_tokens)
            .field("vision_temperature", &self.vision_temperature)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl ProcessorConfig {
    /// Create a new builder with default settings and no credentials.
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::default()
    }

    /// Build a configuration entirely from the environment.
    ///
    /// Fails with [`InvoiceError::MissingCredential`] when either API key is
    /// unset.
    pub fn from_env() -> Result<Self, InvoiceError> {
        Self::builder().with_env().build()
    }
}

/// Builder for [`ProcessorConfig`].
#[derive(Default)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
    vision_api_key: Option<String>,
    text_api_key: Option<String>,
}

impl ProcessorConfigBuilder {
    /// Fill every field not already set explicitly from the environment.
    ///
    /// Loads `.env` from the working directory (or a parent) first.
    pub fn with_env(mut self) -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        if self.vision_api_key.is_none() {
            self.vision_api_key = non_empty_env(VISION_API_KEY_ENV);
        }
        if self.text_api_key.is_none() {
            self.text_api_key = non_empty_env(TEXT_API_KEY_ENV);
        }
        if let Some(model) = non_empty_env("INVOICE_VISION_MODEL") {
            self.config.vision_model = model;
        }
        if let Some(url) = non_empty_env("INVOICE_VISION_BASE_URL") {
            self = self.vision_base_url(url);
        }
        if let Some(model) = non_empty_env("INVOICE_TEXT_MODEL") {
            self.config.text_model = model;
        }
        if let Some(url) = non_empty_env("INVOICE_TEXT_BASE_URL") {
            self = self.text_base_url(url);
        }
        if self.config.pdfium_lib_path.is_none() {
            self.config.pdfium_lib_path = non_empty_env("PDFIUM_LIB_PATH").map(PathBuf::from);
        }
        self
    }

    pub fn vision_api_key(mut self, key: impl Into<String>) -> Self {
        self.vision_api_key = Some(key.into());
        self
    }

    pub fn text_api_key(mut self, key: impl Into<String>) -> Self {
        self.text_api_key = Some(key.into());
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn vision_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.vision_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn text_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.text_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn target_width(mut self, px: u32) -> Self {
        self.config.target_width = px;
        self
    }

    pub fn max_dimension(mut self, px: u32) -> Self {
        self.config.max_dimension = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q;
        self
    }

    pub fn vision_max_tokens(mut self, n: u32) -> Self {
        self.config.vision_max_tokens = n;
        self
    }

    pub fn vision_temperature(mut self, t: f32) -> Self {
        self.config.vision_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating credentials and ranges.
    pub fn build(self) -> Result<ProcessorConfig, InvoiceError> {
        let mut config = self.config;

        config.vision_api_key = self
            .vision_api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(InvoiceError::MissingCredential {
                name: VISION_API_KEY_ENV,
            })?;
        config.text_api_key = self
            .text_api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(InvoiceError::MissingCredential {
                name: TEXT_API_KEY_ENV,
            })?;

        if config.dpi < 72 || config.dpi > 600 {
            return Err(InvoiceError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                config.dpi
            )));
        }
        if config.target_width == 0 {
            return Err(InvoiceError::InvalidConfig(
                "Target width must be ≥ 1".into(),
            ));
        }
        if config.jpeg_quality == 0 || config.jpeg_quality > 100 {
            return Err(InvoiceError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                config.jpeg_quality
            )));
        }
        Ok(config)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
