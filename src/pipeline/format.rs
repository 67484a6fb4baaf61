//! Format classification by file extension.
//!
//! The extension alone picks the strategy; file contents are never sniffed.
//! Matching is case-insensitive, so `INVOICE.PDF` and `invoice.pdf` take the
//! same route.

use crate::error::InvoiceError;
use std::path::Path;

/// Spreadsheet flavours, each with its own reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetKind {
    /// `.xlsx` / `.xls`, read via calamine.
    Workbook,
    /// `.csv`, read via the csv crate.
    Csv,
}

/// How a document is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Rendered as a fixed-width table; no vision call.
    Spreadsheet(SpreadsheetKind),
    /// Rasterised page by page, each page transcribed by the vision model.
    Pdf,
    /// Transcribed by the vision model in one call.
    Image,
}

impl DocumentFormat {
    /// Classify `path` by its lowercase extension.
    pub fn from_path(path: &Path) -> Result<Self, InvoiceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xls" => Ok(DocumentFormat::Spreadsheet(SpreadsheetKind::Workbook)),
            "csv" => Ok(DocumentFormat::Spreadsheet(SpreadsheetKind::Csv)),
            "pdf" => Ok(DocumentFormat::Pdf),
            "jpg" | "jpeg" | "png" => Ok(DocumentFormat::Image),
            _ => Err(InvoiceError::UnsupportedFormat {
                suffix: display_suffix(path),
            }),
        }
    }
}

/// The suffix as the user wrote it, with its leading dot.
fn display_suffix(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => "(none)".to_string(),
    }
}
