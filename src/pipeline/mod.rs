//! Pipeline stages for invoice extraction.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the dispatcher in [`crate::processor`] only
//! sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! input ─▶ format ─┬─ spreadsheet ─────────────────────────┐
//!                  ├─ pdf ──▶ render ─┐                     ├─▶ structure ─▶ postprocess
//!                  └─ image ──────────┴─▶ encode ─▶ vision ─┘
//! ```
//!
//! 1. [`input`]       — existence check; stage uploads in a temp directory
//! 2. [`format`]      — classify by extension
//! 3. [`spreadsheet`] — workbook/CSV → fixed-width text
//! 4. [`render`]      — rasterise PDF pages via pdfium (`spawn_blocking`)
//! 5. [`encode`]      — bound size, JPEG, base64
//! 6. [`vision`]      — per-page transcription; failures become skipped pages
//! 7. [`structure`]   — one JSON-constrained text-generation call
//! 8. [`postprocess`] — strip code fences, decode JSON

pub mod encode;
pub mod format;
pub mod input;
pub mod postprocess;
pub mod render;
pub mod spreadsheet;
pub mod structure;
pub mod vision;
