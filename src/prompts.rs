//! Prompts for the two remote models.
//!
//! Every prompt lives here so prompt changes never touch pipeline code, and
//! unit tests can inspect them without a live model.

/// Instruction sent alongside every page image to the vision model.
pub const VISION_PROMPT: &str = r#"Convert the provided image into Markdown format. Ensure that all content from the page is included, such as headers, footers, subtexts, images (with alt text if possible), tables, and any other elements.

Requirements:
- Output Only Markdown: Return solely the Markdown content without any additional explanations or comments.
- No Delimiters: Do not use code fences or delimiters like ```markdown.
- Preserve Numerical Accuracy: Extract and represent numerical values exactly as provided (e.g., "1.000" should NOT be written as "1,000" and vice versa).
- Complete Content: Do not omit any part of the page, including headers, footers, and subtext."#;

/// The JSON shape the text-generation model is asked to produce.
pub const INVOICE_SCHEMA_EXAMPLE: &str = r#"{
    "Invoice": {
        "SerialNumber": "string",
        "CustomerName": "string",
        "Quantity": number,
        "TotalTax": number,
        "TotalAmount": number,
        "Date": "string"
    },
    "Products": [
        {
            "Name": "string",
            "Quantity": number,
            "UnitPrice": number,
            "Tax": number,
            "PriceWithTax": number,
            "Discount": number
        }
    ],
    "Customer": {
        "CustomerName": "string",
        "PhoneNumber": "string(10)",
        "TotalPurchaseAmount": number
    }
}"#;

/// Top-level keys of an invoice record.
pub const INVOICE_TOP_LEVEL_KEYS: [&str; 3] = ["Invoice", "Products", "Customer"];

/// Whether `text` looks like delimited tabular data rather than prose.
///
/// Multi-line text containing a comma, tab or pipe counts as tabular.
pub fn looks_tabular(text: &str) -> bool {
    text.contains('\n') && text.contains([',', '\t', '|'])
}

/// Build the structuring prompt for `text`.
pub fn invoice_prompt(text: &str, tabular: bool) -> String {
    let (kind, label) = if tabular {
        ("tabular", "Tabular")
    } else {
        ("invoice", "Invoice")
    };
    format!(
        "Parse this {kind} text into a structured format with exact values and calculations.\n\
         Include all products, customer details, and invoice information.\n\
         \n\
         {label} Text:\n\
         {text}\n\
         \n\
         Return the data in a JSON format matching this exact structure:\n\
         {INVOICE_SCHEMA_EXAMPLE}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabular_needs_newline_and_delimiter() {
        assert!(looks_tabular("Name,Qty\nX,2"));
        assert!(looks_tabular("a\tb\nc\td"));
        assert!(looks_tabular("| a | b |\n| 1 | 2 |"));
        assert!(!looks_tabular("Name,Qty"));
        assert!(!looks_tabular("Total due\nThank you"));
    }

    #[test]
    fn prompt_embeds_text_and_schema() {
        let p = invoice_prompt("INV-001 total 42.00", false);
        assert!(p.contains("INV-001 total 42.00"));
        assert!(p.contains("Invoice Text:"));
        for key in INVOICE_TOP_LEVEL_KEYS {
            assert!(p.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }

    #[test]
    fn tabular_prompt_is_labelled() {
        let p = invoice_prompt("Name,Qty\nX,2", true);
        assert!(p.starts_with("Parse this tabular text"));
        assert!(p.contains("Tabular Text:"));
    }

    #[test]
    fn vision_prompt_forbids_fences() {
        assert!(VISION_PROMPT.contains("Do not use code fences"));
        assert!(VISION_PROMPT.contains("Preserve Numerical Accuracy"));
    }
}
