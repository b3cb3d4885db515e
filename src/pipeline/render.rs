//! Page rasterisation: size a viewport and draw one page onto it.
//!
//! A PDF page is measured in points. At scale 1 one point maps to one pixel;
//! the pipeline renders at [`super::RENDER_SCALE`] so every image is twice
//! the page's nominal resolution. Pixel dimensions are truncated, matching
//! how a fractional size is applied to a raster canvas.
//!
//! Each call allocates its own surface. Surfaces are never pooled: a page's
//! bitmap is encoded and dropped before the next page is touched.

use crate::error::Pdf2JpgError;
use crate::pipeline::decode::{Page, PageSize};
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The pixel rectangle a page is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl Viewport {
    /// Viewport for a page of `size` points at `scale`.
    ///
    /// Degenerate pages still get a 1×1 surface so the encoder always has
    /// something to work with.
    pub fn for_page(size: PageSize, scale: f32) -> Self {
        Self {
            width: to_pixels(size.width_pts, scale),
            height: to_pixels(size.height_pts, scale),
            scale,
        }
    }
}

fn to_pixels(points: f32, scale: f32) -> u32 {
    let px = (points * scale).floor();
    if px.is_finite() && px >= 1.0 {
        px as u32
    } else {
        1
    }
}

/// Draw `page` onto a new surface the size of `viewport`.
pub fn rasterize(
    page: &dyn Page,
    page_num: usize,
    viewport: &Viewport,
) -> Result<DynamicImage, Pdf2JpgError> {
    let surface = page
        .render(viewport)
        .map_err(|detail| Pdf2JpgError::RasterisationFailed {
            page: page_num,
            detail,
        })?;

    let (w, h) = surface.dimensions();
    if (w, h) != (viewport.width, viewport.height) {
        warn!(
            "Page {} rendered at {}x{} px, expected {}x{}",
            page_num, w, h, viewport.width, viewport.height
        );
    }
    debug!("Rendered page {} → {}x{} px", page_num, w, h);
    Ok(surface)
}
