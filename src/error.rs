//! Error type for the pdf2jpg library.
//!
//! A conversion either produces an image for every page or it fails as a
//! whole, so there is a single error type. Variants are grouped by the stage
//! that raises them:
//!
//! * **Input**: the submitted file is missing, is not declared as a PDF, or
//!   cannot be read. These are the errors a user fixes by picking another
//!   file, and they display the same alert text ([`UPLOAD_ALERT`]).
//! * **Shell**: the shell refused a submission because one is already running.
//! * **PDF**: the decoder or rasterizer rejected the document or a page.
//! * **Output / config / binding**: everything around the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Alert shown when a submission is not a PDF (or there is no submission).
pub const UPLOAD_ALERT: &str = "Please upload a PDF file";

/// All errors returned by the pdf2jpg library.
#[derive(Debug, Error)]
pub enum Pdf2JpgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The drop or file picker delivered no file at all.
    #[error("Please upload a PDF file")]
    NoFileSelected,

    /// The file's declared MIME type is not exactly `application/pdf`.
    #[error("Please upload a PDF file")]
    InvalidFileType { name: String, declared: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the file's bytes failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Shell errors ──────────────────────────────────────────────────────
    /// A conversion is already in flight; new submissions are refused.
    #[error("A PDF is already being converted. Wait for it to finish or cancel it first.")]
    ConversionInProgress,

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The decoder could not open the document.
    #[error("Could not open the PDF: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error(
        "This PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>."
    )]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for this PDF")]
    WrongPassword,

    /// The decoder could not hand out a page it reported as present.
    #[error("Could not load page {page} of {total}: {detail}")]
    PageAccess {
        page: usize,
        total: usize,
        detail: String,
    },

    /// pdfium returned an error while drawing a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The drawing surface could not be encoded as JPEG.
    #[error("JPEG encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// A rendered image's data URI is not valid base64 JPEG data.
    #[error("Image data for page {page} is not a valid JPEG data URI")]
    CorruptImageData { page: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output image.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Pass --pdfium-lib /path/to/libpdfium.\n\
  • Place libpdfium next to the pdf2jpg binary.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2JpgError {
    /// Whether this error is the "not a PDF" alert rather than a failure of
    /// a conversion that actually started.
    pub fn is_rejected_upload(&self) -> bool {
        matches!(
            self,
            Pdf2JpgError::NoFileSelected | Pdf2JpgError::InvalidFileType { .. }
        )
    }
}
