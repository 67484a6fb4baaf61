//! Image preparation: bound the size, convert to RGB, JPEG-encode, base64-wrap.
//!
//! Vision APIs accept images as base64 data-URIs inside the JSON request
//! body. JPEG keeps scanned invoices and photos small enough for one request
//! per page; the longest-edge cap keeps every page inside the model's
//! preferred input size regardless of the source resolution.

use crate::model::EncodedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

/// Downscale so the longest edge is at most `max_dimension`, preserving
/// aspect ratio with Lanczos3 resampling. Smaller images pass through.
pub fn bound_size(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let longest = w.max(h);
    if longest <= max_dimension {
        return img;
    }

    let scale = |edge: u32| {
        ((edge as f64 * max_dimension as f64 / longest as f64).round() as u32).max(1)
    };
    let (nw, nh) = if w >= h {
        (max_dimension, scale(h))
    } else {
        (scale(w), max_dimension)
    };
    debug!("Resizing {}x{} → {}x{}", w, h, nw, nh);
    img.resize_exact(nw, nh, FilterType::Lanczos3)
}

/// Encode a page bitmap as base64 JPEG ready for the vision API.
///
/// Alpha is dropped; JPEG has no transparency and the vision model only
/// needs the visible content.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<EncodedImage, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;

    let data = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes JPEG, {} bytes base64", buf.len(), data.len());

    Ok(EncodedImage {
        data,
        mime_type: "image/jpeg",
    })
}

/// Bound and encode in one step.
pub fn prepare_page(
    img: DynamicImage,
    max_dimension: u32,
    quality: u8,
) -> Result<EncodedImage, image::ImageError> {
    encode_jpeg(&bound_size(img, max_dimension), quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn small_image_is_untouched() {
        let img = bound_size(solid(100, 50), 2000);
        assert_eq!((img.width(), img.height()), (100, 50));
    }

    #[test]
    fn longest_edge_is_capped_preserving_aspect() {
        let img = bound_size(solid(4000, 2000), 2000);
        assert_eq!((img.width(), img.height()), (2000, 1000));

        let img = bound_size(solid(1000, 3000), 2000);
        assert_eq!((img.width(), img.height()), (667, 2000));
    }

    #[test]
    fn encode_small_image() {
        let data = encode_jpeg(&solid(10, 10), 90).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/jpeg");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        // JPEG SOI marker
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn prepare_page_round_trips_through_decoder() {
        let data = prepare_page(solid(3000, 300), 2000, 80).unwrap();
        let bytes = STANDARD.decode(&data.data).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (2000, 200));
    }
}
