//! Shared fixtures for integration tests.
//!
//! [`GatedDecoder`] is an in-memory [`Decoder`] whose pages paint a flat
//! colour. Rendering can be held back behind a gate so tests can observe the
//! shell while a conversion is in flight.

#![allow(dead_code)]

use image::{DynamicImage, Rgba, RgbaImage};
use pdf2jpg::{Decoder, Document, Page, PageSize, Pdf2JpgError, UploadedFile, Viewport, PDF_MIME};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

pub struct GatedDecoder {
    sizes: Vec<(f32, f32)>,
    corrupt: bool,
    gate: Mutex<bool>,
    opened: Condvar,
    rendered: Mutex<Vec<usize>>,
}

impl GatedDecoder {
    /// `n` US-letter pages that render immediately.
    pub fn letter_pages(n: usize) -> Self {
        Self {
            sizes: vec![(612.0, 792.0); n],
            corrupt: false,
            gate: Mutex::new(true),
            opened: Condvar::new(),
            rendered: Mutex::new(Vec::new()),
        }
    }

    /// Pages block in `render` until [`GatedDecoder::open_gate`] is called.
    pub fn gated(mut self) -> Self {
        self.gate = Mutex::new(false);
        self
    }

    /// Every document fails to open as corrupt.
    pub fn corrupt(mut self) -> Self {
        self.corrupt = true;
        self
    }

    pub fn open_gate(&self) {
        *self.gate.lock().unwrap() = true;
        self.opened.notify_all();
    }

    pub fn rendered_pages(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }

    fn wait_for_gate(&self) {
        let guard = self.gate.lock().unwrap();
        let (_guard, timeout) = self
            .opened
            .wait_timeout_while(guard, Duration::from_secs(10), |open| !*open)
            .unwrap();
        assert!(!timeout.timed_out(), "gate was never opened");
    }
}

impl Decoder for GatedDecoder {
    fn open<'a>(
        &'a self,
        _bytes: &'a [u8],
        _password: Option<&str>,
    ) -> Result<Box<dyn Document + 'a>, Pdf2JpgError> {
        if self.corrupt {
            return Err(Pdf2JpgError::CorruptPdf {
                detail: "no trailer dictionary".into(),
            });
        }
        Ok(Box::new(GatedDocument { decoder: self }))
    }
}

struct GatedDocument<'a> {
    decoder: &'a GatedDecoder,
}

impl Document for GatedDocument<'_> {
    fn page_count(&self) -> usize {
        self.decoder.sizes.len()
    }

    fn page(&self, page_num: usize) -> Result<Box<dyn Page + '_>, Pdf2JpgError> {
        let (w, h) = self.decoder.sizes[page_num - 1];
        Ok(Box::new(GatedPage {
            decoder: self.decoder,
            page_num,
            size: PageSize {
                width_pts: w,
                height_pts: h,
            },
        }))
    }
}

struct GatedPage<'a> {
    decoder: &'a GatedDecoder,
    page_num: usize,
    size: PageSize,
}

impl Page for GatedPage<'_> {
    fn size(&self) -> PageSize {
        self.size
    }

    fn render(&self, viewport: &Viewport) -> Result<DynamicImage, String> {
        self.decoder.wait_for_gate();
        self.decoder.rendered.lock().unwrap().push(self.page_num);
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            viewport.width,
            viewport.height,
            Rgba([255, 255, 255, 255]),
        )))
    }
}

/// Route library logs through the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An in-memory upload declared as a PDF.
pub fn pdf_upload(name: &str) -> UploadedFile {
    UploadedFile::from_bytes(name, PDF_MIME, b"%PDF-1.7\n".to_vec())
}
