//! Error types for the invoice2json library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`InvoiceError`] — **Request-fatal**: the document cannot be turned into
//!   an invoice record (missing file, unsupported format, nothing extracted,
//!   model failure, unparseable JSON) or the processor is misconfigured.
//!   The dispatcher converts it into a failed
//!   [`crate::envelope::ProcessingResult`]; it never escapes `process_file`.
//!
//! * [`PageError`] — **Non-fatal**: a single page could not be transcribed.
//!   Recorded as a skipped page; the request only fails when every page is
//!   skipped.
//!
//! * [`ModelError`] — a remote model call failed. Raised by the
//!   [`crate::model`] traits; the vision stage downgrades it to a
//!   [`PageError`], the structuring stage upgrades it to
//!   [`InvoiceError::ModelTransport`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Failure category carried by every failed envelope.
///
/// The HTTP layer maps categories onto status codes; everything else only
/// needs the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    UnsupportedFormat,
    ExtractionEmpty,
    ModelTransport,
    InvalidJson,
    Unexpected,
}

impl ErrorKind {
    /// Anticipated pipeline failures, answered with 400 by the HTTP layer.
    ///
    /// Only [`ErrorKind::Unexpected`] is treated as a server fault.
    pub fn is_client_error(self) -> bool {
        !matches!(self, ErrorKind::Unexpected)
    }
}

/// All request-level errors returned by the invoice2json pipeline.
#[derive(Debug, Error)]
pub enum InvoiceError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The extension is not one of the supported spreadsheet, PDF or image suffixes.
    #[error("Unsupported file format: {suffix}")]
    UnsupportedFormat { suffix: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// No text could be extracted from the document.
    #[error("{message}")]
    ExtractionEmpty { message: String },

    // The three decode failures below are the document's fault, so they are
    // reported as `ExtractionEmpty` alongside empty transcriptions.
    /// The spreadsheet could not be opened or read.
    #[error("Spreadsheet processing error: {detail}")]
    Spreadsheet { detail: String },

    /// The image could not be decoded.
    #[error("Image processing error: {detail}")]
    Image { detail: String },

    /// pdfium could not open or rasterise the PDF.
    #[error("PDF processing error: {detail}")]
    Pdf { detail: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The text-generation call failed.
    #[error("Text processing error: {source}")]
    ModelTransport {
        #[source]
        source: ModelError,
    },

    /// The model answered, but not with JSON.
    #[error("Invalid JSON format: {detail}")]
    InvalidJson { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A required API credential is absent.
    #[error("Missing required API key: {name}")]
    MissingCredential { name: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium on the system library path."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InvoiceError {
    /// The category reported in the result envelope.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvoiceError::NotFound { .. } => ErrorKind::NotFound,
            InvoiceError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            InvoiceError::ExtractionEmpty { .. }
            | InvoiceError::Spreadsheet { .. }
            | InvoiceError::Image { .. }
            | InvoiceError::Pdf { .. } => ErrorKind::ExtractionEmpty,
            InvoiceError::ModelTransport { .. } => ErrorKind::ModelTransport,
            InvoiceError::InvalidJson { .. } => ErrorKind::InvalidJson,
            InvoiceError::MissingCredential { .. }
            | InvoiceError::InvalidConfig(_)
            | InvoiceError::PdfiumBindingFailed(_)
            | InvoiceError::Internal(_) => ErrorKind::Unexpected,
        }
    }
}

/// A remote model call failed.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Connection, TLS, timeout or body-decoding failure.
    ///
    /// Build it through `From`, which strips the request URL.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} — {body}")]
    Api { status: u16, body: String },

    /// The API answered 200 but the payload lacks the expected field.
    #[error("failed to parse response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        ModelError::Http(e.without_url())
    }
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::pipeline::vision::PageOutcome::Skipped`] when a page is
/// dropped from the assembled text.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum PageError {
    /// The page bitmap could not be JPEG-encoded.
    #[error("Page {page}: encoding failed: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The vision call failed.
    #[error("Page {page}: vision call failed: {detail}")]
    VisionFailed { page: usize, detail: String },

    /// The vision model returned nothing usable.
    #[error("Page {page}: empty transcription")]
    Empty { page: usize },
}
