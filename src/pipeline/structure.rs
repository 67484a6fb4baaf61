//! Structured extraction: assembled text → raw JSON text from the model.
//!
//! One call, no retries. Transport and API errors are hard failures for the
//! request; the response is returned unvalidated for
//! [`crate::pipeline::postprocess`] to parse.

use crate::error::InvoiceError;
use crate::model::TextModel;
use crate::prompts::{invoice_prompt, looks_tabular};
use std::time::Instant;
use tracing::{debug, info};

/// Ask the text model to turn `text` into an invoice record.
pub async fn structure_text(text_model: &dyn TextModel, text: &str) -> Result<String, InvoiceError> {
    let tabular = looks_tabular(text);
    let prompt = invoice_prompt(text, tabular);
    debug!(
        "Structuring {} chars of {} text",
        text.len(),
        if tabular { "tabular" } else { "invoice" }
    );

    let start = Instant::now();
    let raw = text_model
        .generate_json(&prompt)
        .await
        .map_err(|source| InvoiceError::ModelTransport { source })?;

    info!("Structured response: {} chars in {:?}", raw.len(), start.elapsed());
    Ok(raw)
}
