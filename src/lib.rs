//! # invoice2json
//!
//! Turn invoices (PDF, image or spreadsheet) into a fixed-schema JSON record
//! using two hosted models: a vision model that transcribes page bitmaps and
//! a text model that fills in the invoice schema.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Normalise   existence check, classify by extension
//!  ├─ 2. Extract     spreadsheet → fixed-width text
//!  │                 PDF → pdfium pages ─┐
//!  │                 image ──────────────┴─▶ JPEG/base64 ─▶ vision model
//!  ├─ 3. Structure   one JSON-mode call to the text model
//!  ├─ 4. Parse       strip code fences, decode JSON
//!  └─ 5. Envelope    ProcessingResult { success, data, error_message, … }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice2json::InvoiceProcessor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from TOGETHER_API_KEY / GOOGLE_API_KEY (a .env file is honoured)
//!     let processor = InvoiceProcessor::from_env()?;
//!     let result = processor.process_file("invoice.pdf").await;
//!     match result.data() {
//!         Some(record) => println!("{record:#}"),
//!         None => eprintln!("failed: {}", result.error_message().unwrap_or_default()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `invoice2json` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Supported Inputs
//!
//! | Extension              | Route                           |
//! |------------------------|---------------------------------|
//! | `.xlsx`, `.xls`, `.csv`| first sheet rendered as text    |
//! | `.pdf`                 | every page through the vision model |
//! | `.jpg`, `.jpeg`, `.png`| single image through the vision model |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod envelope;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod processor;
pub mod prompts;
pub mod providers;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ProcessorConfig, ProcessorConfigBuilder};
pub use envelope::ProcessingResult;
pub use error::{ErrorKind, InvoiceError, ModelError, PageError};
pub use model::{EncodedImage, TextModel, VisionModel};
pub use processor::InvoiceProcessor;
pub use server::{build_router, serve, AppState};
