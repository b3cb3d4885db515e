//! Result types produced by a conversion.

use crate::error::Pdf2JpgError;
use crate::pipeline::render::Viewport;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Prefix of every data URI this crate produces.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// One rendered page: a self-contained JPEG data URI and its 1-based page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedImage {
    /// 1-indexed page number in the source document.
    pub page_num: usize,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
    /// `data:image/jpeg;base64,...`
    pub data_uri: String,
}

impl RenderedImage {
    /// File name offered by the download link: `page-{N}.jpg`.
    pub fn download_filename(&self) -> String {
        download_filename(self.page_num)
    }

    /// Decode the data URI back into raw JPEG bytes.
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>, Pdf2JpgError> {
        let payload = self
            .data_uri
            .strip_prefix(JPEG_DATA_URI_PREFIX)
            .ok_or(Pdf2JpgError::CorruptImageData {
                page: self.page_num,
            })?;
        STANDARD.decode(payload).map_err(|_| Pdf2JpgError::CorruptImageData {
            page: self.page_num,
        })
    }
}

/// `page-{N}.jpg` for a 1-indexed page number.
pub fn download_filename(page_num: usize) -> String {
    format!("page-{page_num}.jpg")
}

/// Timing and size figures for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub page_count: usize,
    /// Sum of all data URI lengths.
    pub encoded_bytes: usize,
    /// Time spent inside the blocking render/encode loop.
    pub render_duration_ms: u64,
    /// Wall-clock time including the hop to the blocking pool.
    pub total_duration_ms: u64,
}

/// Everything an eager conversion returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// One image per page, in page order.
    pub images: Vec<RenderedImage>,
    pub stats: ConversionStats,
}

/// Geometry of a single page as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_num: usize,
    pub width_pts: f32,
    pub height_pts: f32,
    /// The viewport the page would be rendered into.
    pub viewport: Viewport,
}

/// What [`crate::inspect`] reports without rendering anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pages: Vec<PageGeometry>,
}
