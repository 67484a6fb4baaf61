//! Post-processing: turn the text model's raw answer into JSON.
//!
//! Even with a JSON response MIME type, models occasionally wrap the
//! document in a Markdown fence (```` ```json … ``` ````) or prefix it with a
//! byte-order mark. Those wrappers are stripped before decoding; nothing else
//! about the payload is touched or validated.

use crate::error::InvoiceError;
use crate::prompts::INVOICE_TOP_LEVEL_KEYS;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```\s*$").unwrap());

/// Remove a single outer Markdown code fence, if present.
pub fn strip_code_fences(input: &str) -> &str {
    let trimmed = input.trim_start_matches('\u{FEFF}').trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str().trim()),
        None => trimmed,
    }
}

/// Strip fences and decode the model's answer.
pub fn parse_model_json(raw: &str) -> Result<Value, InvoiceError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned).map_err(|e| InvoiceError::InvalidJson {
        detail: e.to_string(),
    })?;

    let missing = missing_top_level_keys(&value);
    if !missing.is_empty() {
        debug!("Model JSON lacks top-level keys {:?}", missing);
    }
    Ok(value)
}

/// Invoice-record keys absent from `value`. Informational only.
pub fn missing_top_level_keys(value: &Value) -> Vec<&'static str> {
    INVOICE_TOP_LEVEL_KEYS
        .iter()
        .copied()
        .filter(|k| value.get(k).is_none())
        .collect()
}
