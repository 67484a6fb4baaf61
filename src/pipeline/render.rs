//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! pdfium is CPU-bound and not async-safe, so rendering runs inside
//! `tokio::task::spawn_blocking`.
//!
//! Pages are rendered in colour at the configured DPI, never wider than
//! `target_width`. The longest-edge cap is applied afterwards by
//! [`crate::pipeline::encode::bound_size`].

use crate::config::ProcessorConfig;
use crate::error::InvoiceError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rasterise all pages of a PDF, in physical page order.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ProcessorConfig,
) -> Result<Vec<DynamicImage>, InvoiceError> {
    let path = pdf_path.to_path_buf();
    let dpi = config.dpi;
    let target_width = config.target_width;
    let lib_path = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&path, dpi, target_width, lib_path.as_deref())
    })
    .await
    .map_err(|e| InvoiceError::Internal(format!("Render task panicked: {e}")))?
}

/// Bind to pdfium, preferring an explicit library path.
fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, InvoiceError> {
    let bindings = match lib_path {
        Some(p) => Pdfium::bind_to_library(library_file(p)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| InvoiceError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// Accept either the library file itself or the directory containing it.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

/// Pixel width for a page `width_points` wide at `dpi`, capped at `target_width`.
fn render_width(width_points: f32, dpi: u32, target_width: u32) -> i32 {
    let at_dpi = (width_points * dpi as f32 / 72.0).round().max(1.0) as u32;
    at_dpi.min(target_width) as i32
}

fn render_pages_blocking(
    pdf_path: &Path,
    dpi: u32,
    target_width: u32,
    lib_path: Option<&Path>,
) -> Result<Vec<DynamicImage>, InvoiceError> {
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| InvoiceError::Pdf {
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut results = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let width = render_width(page.width().value, dpi, target_width);
        let render_config = PdfRenderConfig::new().set_target_width(width);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| InvoiceError::Pdf {
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(image);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_page_at_300_dpi_is_capped() {
        // 8.5in × 72pt = 612pt → 2550 px at 300 DPI, capped to 1800.
        assert_eq!(render_width(612.0, 300, 1800), 1800);
    }

    #[test]
    fn low_dpi_is_not_upscaled() {
        // 612pt at 72 DPI → 612 px, below the cap.
        assert_eq!(render_width(612.0, 72, 1800), 612);
    }

    #[test]
    fn degenerate_page_renders_at_least_one_pixel() {
        assert_eq!(render_width(0.0, 300, 1800), 1);
    }
}
