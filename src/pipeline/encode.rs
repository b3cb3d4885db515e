//! Image encoding: drawing surface → JPEG → `data:image/jpeg;base64,...`.
//!
//! JPEG has no alpha channel, so the surface is flattened to RGB first.
//! pdfium paints an opaque white page background, which makes the flattening
//! lossless in practice.

use crate::error::Pdf2JpgError;
use crate::output::{RenderedImage, JPEG_DATA_URI_PREFIX};
use crate::pipeline::JPEG_QUALITY;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use tracing::debug;

/// Encode a rendered page as a JPEG data URI at [`JPEG_QUALITY`].
pub fn encode_page(
    page_num: usize,
    surface: &DynamicImage,
) -> Result<RenderedImage, Pdf2JpgError> {
    let rgb = surface.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| Pdf2JpgError::EncodeFailed {
            page: page_num,
            detail: e.to_string(),
        })?;

    let mut data_uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + buf.len() * 4 / 3 + 4);
    data_uri.push_str(JPEG_DATA_URI_PREFIX);
    STANDARD.encode_string(&buf, &mut data_uri);
    debug!(
        "Encoded page {} → {} bytes JPEG, {} bytes data URI",
        page_num,
        buf.len(),
        data_uri.len()
    );

    Ok(RenderedImage {
        page_num,
        width,
        height,
        data_uri,
    })
}
