//! Dispatcher behaviour with stubbed models.

mod common;

use common::*;
use invoice2json::{ErrorKind, InvoiceProcessor, ProcessorConfig};
use serde_json::json;
use std::fs;

#[tokio::test]
async fn nonexistent_path_is_not_found_without_remote_calls() {
    let vision = StubVision::replying("text");
    let text = StubText::replying(INVOICE_JSON);
    let p = processor(vision.clone(), text.clone());

    let result = p.process_file("/no/such/invoice.pdf").await;

    assert!(!result.success());
    assert!(result.data().is_none());
    assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
    assert_eq!(result.source_file(), Some("/no/such/invoice.pdf"));
    assert_eq!(vision.calls(), 0);
    assert_eq!(text.calls(), 0);
}

#[tokio::test]
async fn unsupported_extension_names_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "hello").unwrap();

    let vision = StubVision::replying("text");
    let text = StubText::replying(INVOICE_JSON);
    let result = processor(vision.clone(), text.clone())
        .process_file(&path)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedFormat));
    assert!(result.error_message().unwrap().contains(".txt"));
    assert_eq!(vision.calls(), 0);
    assert_eq!(text.calls(), 0);
}

#[tokio::test]
async fn csv_skips_vision_and_returns_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    fs::write(&path, "Name,Qty\nX,2\n").unwrap();

    let vision = StubVision::replying("unused");
    let text = StubText::replying(INVOICE_JSON);
    let result = processor(vision.clone(), text.clone())
        .process_file(&path)
        .await;

    assert!(result.success(), "{:?}", result.error_message());
    let data = result.data().unwrap();
    for key in ["Invoice", "Products", "Customer"] {
        assert!(data.get(key).is_some(), "missing {key}");
    }
    assert_eq!(vision.calls(), 0);
    assert_eq!(text.calls(), 1);

    let prompt = &text.prompts()[0];
    assert!(prompt.contains("Name"));
    assert!(prompt.contains('X'));
}

#[tokio::test]
async fn image_with_failing_vision_is_extraction_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "scan.png");

    let vision = StubVision::failing();
    let text = StubText::replying(INVOICE_JSON);
    let result = processor(vision.clone(), text.clone())
        .process_file(&path)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ExtractionEmpty));
    assert!(!result.error_message().unwrap().is_empty());
    assert_eq!(result.skipped_pages(), 1);
    assert_eq!(vision.calls(), 1);
    assert_eq!(text.calls(), 0);
}

#[tokio::test]
async fn fenced_model_answer_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "scan.PNG");

    let vision = StubVision::replying("| Item | Qty |\n| X | 2 |");
    let text = StubText::replying("```json\n{\"a\":1}\n```");
    let result = processor(vision.clone(), text.clone())
        .process_file(&path)
        .await;

    assert!(result.success(), "{:?}", result.error_message());
    assert_eq!(result.data(), Some(&json!({"a": 1})));
    assert_eq!(result.skipped_pages(), 0);
    assert_eq!(vision.calls(), 1);
    assert!(text.prompts()[0].contains("| X | 2 |"));
}

#[tokio::test]
async fn malformed_model_answer_is_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    fs::write(&path, "Name,Qty\nX,2\n").unwrap();

    let text = StubText::replying("I could not find an invoice.");
    let result = processor(StubVision::replying("unused"), text)
        .process_file(&path)
        .await;

    assert!(!result.success());
    assert!(result.data().is_none());
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidJson));
    assert!(!result.error_message().unwrap().is_empty());
}

#[tokio::test]
async fn text_model_failure_is_model_transport() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    fs::write(&path, "Name,Qty\nX,2\n").unwrap();

    let text = StubText::failing();
    let result = processor(StubVision::replying("unused"), text.clone())
        .process_file(&path)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ModelTransport));
    assert!(result.error_message().unwrap().starts_with("Text processing error"));
    // exactly one attempt
    assert_eq!(text.calls(), 1);
}

#[tokio::test]
async fn empty_spreadsheet_is_extraction_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "\n\n").unwrap();

    let text = StubText::replying(INVOICE_JSON);
    let result = processor(StubVision::replying("unused"), text.clone())
        .process_file(&path)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ExtractionEmpty));
    assert_eq!(text.calls(), 0);
}

#[tokio::test]
async fn concurrent_requests_keep_their_own_envelopes() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("a.csv");
    fs::write(&csv, "Name,Qty\nX,2\n").unwrap();
    let missing = dir.path().join("b.pdf");

    let p = processor(StubVision::replying("t"), StubText::replying(INVOICE_JSON));
    let (a, b) = tokio::join!(p.process_file(&csv), p.process_file(&missing));

    assert!(a.success());
    assert_eq!(a.source_file(), Some(csv.display().to_string().as_str()));
    assert!(!b.success());
    assert_eq!(b.source_file(), Some(missing.display().to_string().as_str()));
}

#[tokio::test]
async fn process_bytes_reports_client_file_name() {
    let vision = StubVision::replying("Invoice INV-1");
    let text = StubText::replying(INVOICE_JSON);
    let p = processor(vision.clone(), text);

    let result = p.process_bytes("uploads/invoice.png", &png_bytes()).await;

    assert!(result.success(), "{:?}", result.error_message());
    assert_eq!(result.source_file(), Some("uploads/invoice.png"));
    assert_eq!(vision.calls(), 1);
}

#[tokio::test]
async fn process_bytes_rejects_unknown_suffix() {
    let p = processor(StubVision::replying("t"), StubText::replying(INVOICE_JSON));
    let result = p.process_bytes("invoice.docx", b"PK").await;

    assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedFormat));
    assert_eq!(result.source_file(), Some("invoice.docx"));
}

#[tokio::test]
async fn corrupt_image_is_extraction_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    fs::write(&path, b"not a jpeg").unwrap();

    let vision = StubVision::replying("t");
    let result = processor(vision.clone(), StubText::replying(INVOICE_JSON))
        .process_file(&path)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ExtractionEmpty));
    assert!(result.error_message().unwrap().starts_with("Image processing error"));
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn unreachable_text_endpoint_keeps_key_out_of_message() {
    const KEY: &str = "SUPERSECRETKEY123";
    let config = ProcessorConfig::builder()
        .vision_api_key("v-key")
        .text_api_key(KEY)
        .text_base_url("http://127.0.0.1:1")
        .api_timeout_secs(5)
        .build()
        .unwrap();
    let p = InvoiceProcessor::new(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    fs::write(&path, "Name,Qty\nX,2\n").unwrap();
    let result = p.process_file(&path).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ModelTransport));
    let message = result.error_message().unwrap();
    assert!(message.starts_with("Text processing error"), "{message}");
    assert!(!message.contains(KEY), "credential leaked: {message}");
}
