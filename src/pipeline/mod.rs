//! Pipeline stages for PDF-to-JPEG conversion.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ render ──▶ encode
//! (file)    (pdfium)   (2× bitmap) (JPEG data URI)
//! ```
//!
//! 1. [`input`]  — the uploaded file, its declared MIME type and the check
//!    that only `application/pdf` gets through
//! 2. [`decode`] — open the document and hand out page handles; the
//!    [`decode::Decoder`] trait is the seam between the pipeline and pdfium
//! 3. [`render`] — size a viewport at [`RENDER_SCALE`] and draw the page
//! 4. [`encode`] — JPEG-encode the drawing surface at [`JPEG_QUALITY`] and
//!    wrap it in a data URI
//!
//! [`run_blocking`] strings the stages together for one document. It runs on
//! a blocking thread (see [`crate::convert`]) and visits pages strictly in
//! order; page N+1 is not touched until page N is encoded.

pub mod decode;
pub mod encode;
pub mod input;
pub mod render;

use crate::config::ConversionConfig;
use crate::error::Pdf2JpgError;
use crate::output::RenderedImage;
use decode::Decoder;
use render::Viewport;
use std::ops::ControlFlow;
use tracing::{debug, info};

/// Every page is rendered at twice its nominal size.
pub const RENDER_SCALE: f32 = 2.0;

/// JPEG quality (1–100). 100 is the encoder's maximum.
pub const JPEG_QUALITY: u8 = 100;

/// Run decode → render → encode for every page, handing each image to `emit`.
///
/// `emit` may return [`ControlFlow::Break`] to stop before the next page; the
/// return value is then the number of pages emitted so far. On a complete run
/// it equals the document's page count.
pub(crate) fn run_blocking<F>(
    decoder: &dyn Decoder,
    bytes: &[u8],
    config: &ConversionConfig,
    mut emit: F,
) -> Result<usize, Pdf2JpgError>
where
    F: FnMut(RenderedImage) -> ControlFlow<()>,
{
    let progress = config.progress();
    let result = (|| -> Result<usize, Pdf2JpgError> {
        let document = decoder.open(bytes, config.password.as_deref())?;
        let total = document.page_count();
        info!("PDF loaded: {} pages", total);
        if let Some(cb) = progress {
            cb.on_conversion_start(total);
        }

        for page_num in 1..=total {
            if let Some(cb) = progress {
                cb.on_page_start(page_num, total);
            }

            let page = document.page(page_num)?;
            let viewport = Viewport::for_page(page.size(), RENDER_SCALE);
            let surface = render::rasterize(page.as_ref(), page_num, &viewport)?;
            drop(page);
            let image = encode::encode_page(page_num, &surface)?;

            if let Some(cb) = progress {
                cb.on_page_complete(page_num, total, image.data_uri.len());
            }
            if emit(image).is_break() {
                debug!(
                    "Stopping after page {} of {}: consumer is gone",
                    page_num, total
                );
                return Ok(page_num);
            }
        }

        if let Some(cb) = progress {
            cb.on_conversion_complete(total);
        }
        Ok(total)
    })();

    if let (Err(e), Some(cb)) = (&result, progress) {
        cb.on_conversion_failed(&e.to_string());
    }
    result
}
