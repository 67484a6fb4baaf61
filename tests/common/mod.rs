//! In-process model stubs shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use invoice2json::{EncodedImage, InvoiceProcessor, ModelError, ProcessorConfig, TextModel, VisionModel};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const INVOICE_JSON: &str = r#"{
  "Invoice": {"Invoice Number": "INV-1", "Total Amount": "20.00"},
  "Products": [{"Product Name": "X", "Quantity": "2"}],
  "Customer": {"Customer Name": "ACME"}
}"#;

/// Vision stub: answers every page with `reply`, or fails when `reply` is `None`.
pub struct StubVision {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl StubVision {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for StubVision {
    async fn transcribe(
        &self,
        _instruction: &str,
        image: EncodedImage,
    ) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(image.mime_type, "image/jpeg");
        self.reply.clone().ok_or(ModelError::Api {
            status: 503,
            body: "overloaded".into(),
        })
    }
}

/// Text stub: records prompts and answers with `reply` (or fails).
pub struct StubText {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubText {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for StubText {
    async fn generate_json(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(ModelError::Api {
            status: 500,
            body: "internal".into(),
        })
    }
}

pub fn test_config() -> ProcessorConfig {
    ProcessorConfig::builder()
        .vision_api_key("test-vision")
        .text_api_key("test-text")
        .build()
        .unwrap()
}

pub fn processor(vision: Arc<StubVision>, text: Arc<StubText>) -> InvoiceProcessor {
    InvoiceProcessor::with_models(test_config(), vision, text)
}

/// Write a small solid-colour PNG.
pub fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(32, 16, image::Rgb([200, 200, 200]))
        .save(&path)
        .unwrap();
    path
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0])))
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
