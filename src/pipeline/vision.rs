//! Visual extraction: page bitmaps → Markdown transcriptions.
//!
//! Each page is bounded, JPEG-encoded and sent to the [`VisionModel`] exactly
//! once. A page never fails the request on its own: encoding errors, remote
//! errors and empty answers all become [`PageOutcome::Skipped`]. The caller
//! decides what an all-skipped document means.

use crate::config::ProcessorConfig;
use crate::error::PageError;
use crate::model::VisionModel;
use crate::pipeline::encode;
use crate::prompts::VISION_PROMPT;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, warn};

/// Separator placed between page transcriptions.
pub const PAGE_BREAK: &str = "\n---PAGE BREAK---\n";

/// Result of transcribing one page.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// The model returned non-empty text.
    Text(String),
    /// The page contributes nothing to the assembled text.
    Skipped(PageError),
}

/// Aggregated transcription of a document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    /// Successful pages joined with [`PAGE_BREAK`], or `None` if every page
    /// was skipped.
    pub text: Option<String>,
    pub pages_total: usize,
    pub pages_skipped: usize,
    /// Why each skipped page was dropped, in page order.
    pub skipped: Vec<PageError>,
}

impl ExtractedText {
    /// Assemble page outcomes in page order.
    pub fn from_outcomes(outcomes: Vec<PageOutcome>) -> Self {
        let pages_total = outcomes.len();
        let mut texts = Vec::with_capacity(pages_total);
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                PageOutcome::Text(t) => texts.push(t),
                PageOutcome::Skipped(e) => skipped.push(e),
            }
        }

        Self {
            text: (!texts.is_empty()).then(|| texts.join(PAGE_BREAK)),
            pages_total,
            pages_skipped: skipped.len(),
            skipped,
        }
    }
}

/// Transcribe a single page (1-indexed `page_num`).
pub async fn transcribe_page(
    vision: &dyn VisionModel,
    page_num: usize,
    img: DynamicImage,
    config: &ProcessorConfig,
) -> PageOutcome {
    let start = Instant::now();
    let max_dimension = config.max_dimension;
    let quality = config.jpeg_quality;

    let encoded = match tokio::task::spawn_blocking(move || {
        encode::prepare_page(img, max_dimension, quality)
    })
    .await
    {
        Ok(Ok(encoded)) => encoded,
        Ok(Err(e)) => {
            return skip(PageError::EncodeFailed {
                page: page_num,
                detail: e.to_string(),
            })
        }
        Err(e) => {
            return skip(PageError::EncodeFailed {
                page: page_num,
                detail: format!("encode task panicked: {e}"),
            })
        }
    };

    match vision.transcribe(VISION_PROMPT, encoded).await {
        Ok(text) if !text.trim().is_empty() => {
            debug!(
                "Page {}: {} chars in {:?}",
                page_num,
                text.len(),
                start.elapsed()
            );
            PageOutcome::Text(text)
        }
        Ok(_) => skip(PageError::Empty { page: page_num }),
        Err(e) => skip(PageError::VisionFailed {
            page: page_num,
            detail: e.to_string(),
        }),
    }
}

/// Transcribe pages one at a time, in order.
pub async fn transcribe_pages(
    vision: &dyn VisionModel,
    pages: Vec<DynamicImage>,
    config: &ProcessorConfig,
) -> ExtractedText {
    let mut outcomes = Vec::with_capacity(pages.len());
    for (idx, img) in pages.into_iter().enumerate() {
        outcomes.push(transcribe_page(vision, idx + 1, img, config).await);
    }
    ExtractedText::from_outcomes(outcomes)
}

fn skip(err: PageError) -> PageOutcome {
    warn!("Skipping {}", err);
    PageOutcome::Skipped(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::EncodedImage;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers with the call index; fails on the listed calls.
    struct Scripted {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    #[async_trait]
    impl VisionModel for Scripted {
        async fn transcribe(
            &self,
            instruction: &str,
            image: EncodedImage,
        ) -> Result<String, ModelError> {
            assert_eq!(instruction, VISION_PROMPT);
            assert_eq!(image.mime_type, "image/jpeg");
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&n) {
                Err(ModelError::Api {
                    status: 500,
                    body: "boom".into(),
                })
            } else {
                Ok(format!("page {n}"))
            }
        }
    }

    fn pages(n: usize) -> Vec<DynamicImage> {
        (0..n)
            .map(|_| DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))))
            .collect()
    }

    #[tokio::test]
    async fn joins_pages_in_order_with_marker() {
        let vision = Scripted {
            calls: AtomicUsize::new(0),
            fail_on: vec![],
        };
        let out = transcribe_pages(&vision, pages(3), &ProcessorConfig::default()).await;
        assert_eq!(
            out.text.as_deref(),
            Some("page 1\n---PAGE BREAK---\npage 2\n---PAGE BREAK---\npage 3")
        );
        assert_eq!(out.pages_total, 3);
        assert_eq!(out.pages_skipped, 0);
    }

    #[tokio::test]
    async fn failed_page_is_skipped_not_fatal() {
        let vision = Scripted {
            calls: AtomicUsize::new(0),
            fail_on: vec![2],
        };
        let out = transcribe_pages(&vision, pages(3), &ProcessorConfig::default()).await;
        assert_eq!(
            out.text.as_deref(),
            Some("page 1\n---PAGE BREAK---\npage 3")
        );
        assert_eq!(out.pages_skipped, 1);
        assert!(matches!(
            out.skipped[0],
            PageError::VisionFailed { page: 2, .. }
        ));
    }

    #[tokio::test]
    async fn all_pages_failing_yields_no_text() {
        let vision = Scripted {
            calls: AtomicUsize::new(0),
            fail_on: vec![1, 2],
        };
        let out = transcribe_pages(&vision, pages(2), &ProcessorConfig::default()).await;
        assert!(out.text.is_none());
        assert_eq!(out.pages_skipped, 2);
        assert_eq!(vision.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn blank_transcription_counts_as_skipped() {
        let out = ExtractedText::from_outcomes(vec![
            PageOutcome::Skipped(PageError::Empty { page: 1 }),
            PageOutcome::Text("only".into()),
        ]);
        assert_eq!(out.text.as_deref(), Some("only"));
        assert_eq!(out.pages_skipped, 1);
    }
}
