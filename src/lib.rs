//! # pdf2jpg
//!
//! Convert every page of a PDF into a JPEG, entirely on the local machine.
//!
//! Each page is drawn at twice its nominal size, encoded as a maximum-quality
//! JPEG and returned as a self-contained `data:image/jpeg;base64,...` URI
//! together with its download name (`page-1.jpg`, `page-2.jpg`, ...).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   accept only files declared as application/pdf
//!  ├─ 2. Decode  open the document via pdfium (spawn_blocking)
//!  ├─ 3. Render  draw each page onto a 2× surface, strictly in page order
//!  ├─ 4. Encode  JPEG (quality 100) → base64 data URI
//!  └─ 5. Output  ordered images + stats, or the shell's Ready state
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2jpg::{convert_file, ConversionConfig, PdfiumDecoder};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let decoder = Arc::new(PdfiumDecoder::bind(None)?);
//!     let output = convert_file(decoder, "document.pdf", &ConversionConfig::default()).await?;
//!     for image in &output.images {
//!         println!("{} ({}x{})", image.download_filename(), image.width, image.height);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## The Shell
//!
//! [`Controller`] owns the interactive state (Idle → Loading → Ready, or
//! Error) and publishes it through a `watch` channel. Drops and file-picker
//! selections go through the same acceptance check; a second submission
//! while a conversion is running is refused, and [`Controller::cancel`]
//! abandons the running one. [`gallery::render_html`] draws any
//! [`ShellView`] as a standalone HTML page.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2jpg` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2jpg = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod gallery;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use controller::{ConversionHandle, Controller, Phase, ShellView};
pub use convert::{convert, convert_file, convert_sync, inspect, write_images};
pub use error::{Pdf2JpgError, UPLOAD_ALERT};
pub use output::{
    download_filename, ConversionOutput, ConversionStats, DocumentInfo, PageGeometry, RenderedImage,
};
pub use pipeline::decode::{Decoder, Document, Page, PageSize, PdfiumDecoder};
pub use pipeline::input::{FileSource, UploadedFile, PDF_MIME};
pub use pipeline::render::Viewport;
pub use pipeline::{JPEG_QUALITY, RENDER_SCALE};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, PageStream};
