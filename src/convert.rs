//! Eager (full-document) conversion entry points.
//!
//! These functions wait for every page, then return the complete, ordered
//! list of images. Use [`crate::stream::convert_stream`] instead to receive
//! pages as they are encoded.
//!
//! pdfium is not async-safe, so the whole decode → render → encode loop runs
//! inside `tokio::task::spawn_blocking` and the async caller simply awaits it.

use crate::config::ConversionConfig;
use crate::error::Pdf2JpgError;
use crate::output::{ConversionOutput, ConversionStats, DocumentInfo, PageGeometry, RenderedImage};
use crate::pipeline::decode::Decoder;
use crate::pipeline::input::UploadedFile;
use crate::pipeline::render::Viewport;
use crate::pipeline::{self, RENDER_SCALE};
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert PDF bytes into one JPEG data URI per page.
///
/// # Returns
/// `Ok(ConversionOutput)` with exactly one image per page, in page order.
///
/// # Errors
/// The first decode, render or encode failure aborts the conversion.
///
/// # Example
/// ```rust,no_run
/// use pdf2jpg::{convert, ConversionConfig, PdfiumDecoder};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let decoder = Arc::new(PdfiumDecoder::bind(None)?);
/// let bytes = std::fs::read("document.pdf")?;
/// let output = convert(decoder, bytes, &ConversionConfig::default()).await?;
/// for image in &output.images {
///     println!("{} → {}x{}", image.download_filename(), image.width, image.height);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    decoder: Arc<dyn Decoder>,
    bytes: Vec<u8>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2JpgError> {
    convert_while(decoder, bytes, config, || true)
        .await?
        .ok_or_else(|| Pdf2JpgError::Internal("conversion stopped without a consumer".into()))
}

/// Like [`convert`], but checks `keep_going` after each page and gives up
/// (returning `Ok(None)`) as soon as it reports `false`.
pub(crate) async fn convert_while<K>(
    decoder: Arc<dyn Decoder>,
    bytes: Vec<u8>,
    config: &ConversionConfig,
    keep_going: K,
) -> Result<Option<ConversionOutput>, Pdf2JpgError>
where
    K: Fn() -> bool + Send + 'static,
{
    let total_start = Instant::now();
    let config = config.clone();
    info!("Starting conversion of {} bytes", bytes.len());

    let (images, render_duration_ms, stopped) = tokio::task::spawn_blocking(move || {
        let render_start = Instant::now();
        let mut images: Vec<RenderedImage> = Vec::new();
        let mut stopped = false;
        pipeline::run_blocking(decoder.as_ref(), &bytes, &config, |image| {
            images.push(image);
            if keep_going() {
                ControlFlow::Continue(())
            } else {
                stopped = true;
                ControlFlow::Break(())
            }
        })?;
        let render_ms = render_start.elapsed().as_millis() as u64;
        Ok::<_, Pdf2JpgError>((images, render_ms, stopped))
    })
    .await
    .map_err(|e| Pdf2JpgError::Internal(format!("Render task panicked: {}", e)))??;

    if stopped {
        debug!("Conversion abandoned after {} pages", images.len());
        return Ok(None);
    }

    let stats = ConversionStats {
        page_count: images.len(),
        encoded_bytes: images.iter().map(|i| i.data_uri.len()).sum(),
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Conversion complete: {} pages, {}ms total",
        stats.page_count, stats.total_duration_ms
    );

    Ok(Some(ConversionOutput { images, stats }))
}

/// Convert a PDF file on disk.
///
/// The file goes through the same acceptance check as an upload: its
/// extension must declare it as `application/pdf`.
pub async fn convert_file(
    decoder: Arc<dyn Decoder>,
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2JpgError> {
    let file = UploadedFile::from_path(path)?;
    file.validate()?;
    let bytes = file.read_bytes().await?;
    convert(decoder, bytes, config).await
}

/// Synchronous wrapper around [`convert_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    decoder: Arc<dyn Decoder>,
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2JpgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2JpgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_file(decoder, path, config))
}

/// Report page count and per-page geometry without rendering.
pub async fn inspect(
    decoder: Arc<dyn Decoder>,
    bytes: Vec<u8>,
    password: Option<String>,
) -> Result<DocumentInfo, Pdf2JpgError> {
    tokio::task::spawn_blocking(move || -> Result<DocumentInfo, Pdf2JpgError> {
        let document = decoder.open(&bytes, password.as_deref())?;
        let page_count = document.page_count();
        let pages = (1..=page_count)
            .map(|page_num| -> Result<PageGeometry, Pdf2JpgError> {
                let size = document.page(page_num)?.size();
                Ok(PageGeometry {
                    page_num,
                    width_pts: size.width_pts,
                    height_pts: size.height_pts,
                    viewport: Viewport::for_page(size, RENDER_SCALE),
                })
            })
            .collect::<Result<Vec<_>, Pdf2JpgError>>()?;
        Ok(DocumentInfo { page_count, pages })
    })
    .await
    .map_err(|e| Pdf2JpgError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Write each image to `dir/page-N.jpg`.
///
/// Every file is written to a temporary name and renamed into place, so a
/// reader never sees a half-written JPEG. Returns the written paths in page
/// order.
pub async fn write_images(
    images: &[RenderedImage],
    dir: impl AsRef<Path>,
) -> Result<Vec<std::path::PathBuf>, Pdf2JpgError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Pdf2JpgError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::with_capacity(images.len());
    for image in images {
        let path = dir.join(image.download_filename());
        let bytes = image.jpeg_bytes()?;

        let tmp_path = path.with_extension("jpg.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| Pdf2JpgError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| Pdf2JpgError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        written.push(path);
    }
    Ok(written)
}
