//! The uniform success/failure wrapper returned for every document.

use crate::error::{ErrorKind, InvoiceError};
use serde::Serialize;
use serde_json::Value;

/// Outcome of processing one document.
///
/// Exactly one of `data` / `error_message` is present: `success` is true iff
/// `data` is. Fields are private so the invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    success: bool,
    data: Option<Value>,
    error_message: Option<String>,
    source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    skipped_pages: usize,
}

impl ProcessingResult {
    /// A successful result carrying the decoded invoice record.
    pub fn succeeded(data: Value, source_file: impl Into<String>, skipped_pages: usize) -> Self {
        Self {
            success: true,
            data: Some(data),
            error_message: None,
            source_file: Some(source_file.into()),
            error_kind: None,
            skipped_pages,
        }
    }

    /// A failed result built from `err`.
    pub fn failed(err: &InvoiceError, source_file: impl Into<String>) -> Self {
        Self::failed_with(err.kind(), err.to_string(), source_file)
    }

    /// A failed result with an explicit category and message.
    pub fn failed_with(
        kind: ErrorKind,
        message: impl Into<String>,
        source_file: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "Failed to process invoice".to_string();
        }
        Self {
            success: false,
            data: None,
            error_message: Some(message),
            source_file: Some(source_file.into()),
            error_kind: Some(kind),
            skipped_pages: 0,
        }
    }

    /// Replace the recorded source, e.g. a temp path with the uploaded name.
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Record how many pages were dropped before the outcome was decided.
    pub fn with_skipped_pages(mut self, skipped_pages: usize) -> Self {
        self.skipped_pages = skipped_pages;
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    /// Pages dropped from the transcription because their vision call failed.
    pub fn skipped_pages(&self) -> usize {
        self.skipped_pages
    }

    /// Consume the envelope, yielding the record or the failure.
    pub fn into_result(self) -> Result<Value, (ErrorKind, String)> {
        match (self.data, self.error_kind, self.error_message) {
            (Some(data), _, _) => Ok(data),
            (None, kind, msg) => Err((
                kind.unwrap_or(ErrorKind::Unexpected),
                msg.unwrap_or_default(),
            )),
        }
    }
}
