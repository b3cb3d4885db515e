//! Document decoding: raw bytes → document handle → page handles.
//!
//! The pipeline never talks to pdfium directly. It goes through three small
//! traits so the render loop can be exercised without a native library:
//!
//! * [`Decoder`]  — opens a byte buffer (with an optional password)
//! * [`Document`] — reports its page count and hands out pages by number
//! * [`Page`]     — reports its size in points and draws itself
//!
//! [`PdfiumDecoder`] is the production implementation. It holds one bound
//! [`Pdfium`] instance for its whole lifetime; documents and pages borrow
//! from it and are dropped as soon as the render loop is done with them.

use crate::error::Pdf2JpgError;
use crate::pipeline::render::Viewport;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Size of a page in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pts: f32,
    pub height_pts: f32,
}

/// Opens PDF bytes into a [`Document`].
pub trait Decoder: Send + Sync {
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&str>,
    ) -> Result<Box<dyn Document + 'a>, Pdf2JpgError>;
}

/// An open document. Lives for one conversion.
pub trait Document {
    fn page_count(&self) -> usize;

    /// Fetch a page by its 1-indexed number.
    fn page(&self, page_num: usize) -> Result<Box<dyn Page + '_>, Pdf2JpgError>;
}

/// A single page, used once to render and then dropped.
pub trait Page {
    fn size(&self) -> PageSize;

    /// Draw the page onto a fresh surface exactly `viewport` pixels large.
    fn render(&self, viewport: &Viewport) -> Result<DynamicImage, String>;
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`Decoder`] backed by the pdfium C++ library.
pub struct PdfiumDecoder {
    pdfium: Pdfium,
}

impl PdfiumDecoder {
    /// Bind to a pdfium library.
    ///
    /// `library` may name the shared library itself or the directory holding
    /// it. When `None`, the usual locations are searched (see
    /// [`pdfium_locate::search_paths`]) before falling back to the system
    /// library.
    pub fn bind(library: Option<&Path>) -> Result<Self, Pdf2JpgError> {
        let pdfium = pdfium_locate::bind_pdfium(library)
            .map_err(|e| Pdf2JpgError::PdfiumBindingFailed(e.to_string()))?;
        info!("pdfium bound");
        Ok(Self { pdfium })
    }
}

impl Decoder for PdfiumDecoder {
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&str>,
    ) -> Result<Box<dyn Document + 'a>, Pdf2JpgError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| classify_open_error(e, password.is_some()))?;
        debug!("Opened {} byte PDF", bytes.len());
        Ok(Box::new(PdfiumDocument { document }))
    }
}

/// pdfium reports password problems through its generic error type; tell
/// them apart from a document that is simply broken.
fn classify_open_error(error: PdfiumError, had_password: bool) -> Pdf2JpgError {
    match error {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            if had_password {
                Pdf2JpgError::WrongPassword
            } else {
                Pdf2JpgError::PasswordRequired
            }
        }
        other => Pdf2JpgError::CorruptPdf {
            detail: format!("{:?}", other),
        },
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> Document for PdfiumDocument<'a> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, page_num: usize) -> Result<Box<dyn Page + '_>, Pdf2JpgError> {
        let total = self.page_count();
        if page_num == 0 || page_num > total {
            return Err(Pdf2JpgError::PageAccess {
                page: page_num,
                total,
                detail: "page number out of range".into(),
            });
        }
        let page = self
            .document
            .pages()
            .get((page_num - 1) as u16)
            .map_err(|e| Pdf2JpgError::PageAccess {
                page: page_num,
                total,
                detail: format!("{:?}", e),
            })?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

struct PdfiumPage<'a> {
    page: PdfPage<'a>,
}

impl<'a> Page for PdfiumPage<'a> {
    fn size(&self) -> PageSize {
        PageSize {
            width_pts: self.page.width().value,
            height_pts: self.page.height().value,
        }
    }

    fn render(&self, viewport: &Viewport) -> Result<DynamicImage, String> {
        let config = PdfRenderConfig::new()
            .set_target_size(viewport.width as i32, viewport.height as i32);
        let bitmap = self
            .page
            .render_with_config(&config)
            .map_err(|e| format!("{:?}", e))?;
        Ok(bitmap.as_image())
    }
}

// ── Test double ──────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::testing::FakeDecoder;
    use super::*;

    #[test]
    fn fake_document_reports_pages() {
        let decoder = FakeDecoder::with_sizes(vec![(10.0, 20.0), (30.0, 40.0)]);
        let doc = decoder.open(b"%PDF", None).unwrap();
        assert_eq!(doc.page_count(), 2);
        let size = doc.page(2).unwrap().size();
        assert_eq!(size.width_pts, 30.0);
        assert_eq!(size.height_pts, 40.0);
    }

    #[test]
    fn decoder_is_object_safe_and_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Decoder>();
        assert_send_sync::<PdfiumDecoder>();
    }

    #[test]
    fn password_errors_depend_on_whether_one_was_given() {
        let locked = || PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError);
        assert!(matches!(
            classify_open_error(locked(), false),
            Pdf2JpgError::PasswordRequired
        ));
        assert!(matches!(
            classify_open_error(locked(), true),
            Pdf2JpgError::WrongPassword
        ));
    }

    #[test]
    fn format_errors_are_corrupt_documents() {
        let err = classify_open_error(
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError),
            true,
        );
        match err {
            Pdf2JpgError::CorruptPdf { detail } => assert!(detail.contains("FormatError")),
            other => panic!("expected CorruptPdf, got {other:?}"),
        }
    }
}
