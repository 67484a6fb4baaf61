//! The dispatcher: one document in, one [`ProcessingResult`] out.
//!
//! Per request the processor walks a fixed sequence of states:
//!
//! ```text
//! Start ─▶ Normalizing ─▶ Extracting ─▶ Structuring ─▶ Parsing ─▶ Succeeded
//!   │          │              │              │            │
//!   └ NotFound └ Unsupported  └ Empty        └ Transport  └ InvalidJson
//! ```
//!
//! Every stage returns `Result<_, InvoiceError>`; the single conversion into
//! an envelope happens in [`InvoiceProcessor::process_file`], so no error
//! escapes it. Each remote call is attempted exactly once.
//!
//! The processor holds no per-request state. Construct it once at startup
//! and share it behind an `Arc`.

use crate::config::ProcessorConfig;
use crate::envelope::ProcessingResult;
use crate::error::InvoiceError;
use crate::model::{TextModel, VisionModel};
use crate::pipeline::format::DocumentFormat;
use crate::pipeline::vision::{self, ExtractedText};
use crate::pipeline::{input, postprocess, render, spreadsheet, structure};
use crate::providers::{self, GeminiJson, OpenAiCompatibleVision};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Extracts invoice records from PDFs, images and spreadsheets.
pub struct InvoiceProcessor {
    config: ProcessorConfig,
    vision: Arc<dyn VisionModel>,
    text: Arc<dyn TextModel>,
}

impl fmt::Debug for InvoiceProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvoiceProcessor")
            .field("config", &self.config)
            .field("vision", &"<dyn VisionModel>")
            .field("text", &"<dyn TextModel>")
            .finish()
    }
}

impl InvoiceProcessor {
    /// Build a processor talking to the hosted models named in `config`.
    pub fn new(config: ProcessorConfig) -> Result<Self, InvoiceError> {
        let client = providers::http_client(&config)?;
        let vision = Arc::new(OpenAiCompatibleVision::new(client.clone(), &config));
        let text = Arc::new(GeminiJson::new(client, &config));
        Ok(Self::with_models(config, vision, text))
    }

    /// Build a processor from the environment (`.env` honoured).
    pub fn from_env() -> Result<Self, InvoiceError> {
        Self::new(ProcessorConfig::from_env()?)
    }

    /// Build a processor around caller-supplied model clients.
    pub fn with_models(
        config: ProcessorConfig,
        vision: Arc<dyn VisionModel>,
        text: Arc<dyn TextModel>,
    ) -> Self {
        Self {
            config,
            vision,
            text,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process the document at `path`.
    pub async fn process_file(&self, path: impl AsRef<Path>) -> ProcessingResult {
        let path = path.as_ref();
        let source = path.display().to_string();
        let start = Instant::now();
        info!("Processing {}", source);

        let mut skipped_pages = 0;
        let result = match self.run(path, &mut skipped_pages).await {
            Ok(data) => ProcessingResult::succeeded(data, &source, skipped_pages),
            Err(e) => {
                warn!("Failed to process {}: {}", source, e);
                ProcessingResult::failed(&e, &source).with_skipped_pages(skipped_pages)
            }
        };

        info!(
            "Finished {} in {}ms (success={})",
            source,
            start.elapsed().as_millis(),
            result.success()
        );
        result
    }

    /// Process an uploaded document.
    ///
    /// The bytes are written under `file_name` (directories stripped) into a
    /// temp directory that is removed before this returns. The envelope's
    /// `source_file` is the client-supplied name.
    pub async fn process_bytes(&self, file_name: &str, bytes: &[u8]) -> ProcessingResult {
        let staged = match input::stage_upload(file_name, bytes).await {
            Ok(s) => s,
            Err(e) => return ProcessingResult::failed(&e, file_name),
        };

        self.process_file(staged.path())
            .await
            .with_source_file(file_name)
    }

    /// Run the pipeline, recording dropped pages in `skipped_pages` as soon
    /// as they are known so failed envelopes can report them too.
    async fn run(&self, path: &Path, skipped_pages: &mut usize) -> Result<Value, InvoiceError> {
        // Start → Normalizing
        input::ensure_exists(path)?;

        // Normalizing → Extracting
        let format = DocumentFormat::from_path(path)?;
        let text = match format {
            DocumentFormat::Spreadsheet(kind) => non_empty(
                spreadsheet::spreadsheet_text(path, kind).await?,
                "Spreadsheet contains no data",
            )?,
            DocumentFormat::Pdf | DocumentFormat::Image => {
                let extracted = if format == DocumentFormat::Pdf {
                    self.extract_pdf(path).await?
                } else {
                    self.extract_image(path).await?
                };
                *skipped_pages = extracted.pages_skipped;
                require_text(extracted, empty_message(format))?
            }
        };

        // Extracting → Structuring
        let raw = structure::structure_text(self.text.as_ref(), &text).await?;

        // Structuring → Parsing
        postprocess::parse_model_json(&raw)
    }

    async fn extract_pdf(&self, path: &Path) -> Result<ExtractedText, InvoiceError> {
        let pages = render::render_pages(path, &self.config).await?;
        Ok(vision::transcribe_pages(self.vision.as_ref(), pages, &self.config).await)
    }

    /// Decode a single image and transcribe it.
    ///
    /// The image goes through the same longest-edge bound and RGB/JPEG
    /// encoding as a rendered PDF page, so oversized photos and RGBA PNGs
    /// reach the vision model in an accepted form.
    async fn extract_image(&self, path: &Path) -> Result<ExtractedText, InvoiceError> {
        let owned = path.to_path_buf();
        let img = tokio::task::spawn_blocking(move || image::open(&owned))
            .await
            .map_err(|e| InvoiceError::Internal(format!("Image task panicked: {e}")))?
            .map_err(|e| InvoiceError::Image {
                detail: e.to_string(),
            })?;

        let outcome = vision::transcribe_page(self.vision.as_ref(), 1, img, &self.config).await;
        Ok(ExtractedText::from_outcomes(vec![outcome]))
    }
}

fn empty_message(format: DocumentFormat) -> &'static str {
    match format {
        DocumentFormat::Pdf => "Failed to extract text from all PDF pages",
        _ => "Failed to extract text from image",
    }
}

fn require_text(extracted: ExtractedText, empty_message: &str) -> Result<String, InvoiceError> {
    if extracted.pages_skipped > 0 {
        warn!(
            "{}/{} pages skipped during transcription",
            extracted.pages_skipped, extracted.pages_total
        );
    }
    let text = extracted.text.ok_or_else(|| InvoiceError::ExtractionEmpty {
        message: empty_message.to_string(),
    })?;
    non_empty(text, empty_message)
}

fn non_empty(text: String, empty_message: &str) -> Result<String, InvoiceError> {
    if text.trim().is_empty() {
        Err(InvoiceError::ExtractionEmpty {
            message: empty_message.to_string(),
        })
    } else {
        Ok(text)
    }
}
