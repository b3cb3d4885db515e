//! Uploaded files: name, declared MIME type and where the bytes come from.
//!
//! Acceptance is decided on the *declared* type alone, exactly as a browser
//! file input reports it. For files on disk the declared type is derived from
//! the extension; callers that know better (an HTTP upload, a drag payload)
//! construct the file with an explicit type. Bytes are only read after the
//! file has been accepted.

use crate::error::Pdf2JpgError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The only MIME type the converter accepts.
pub const PDF_MIME: &str = "application/pdf";

/// Where an uploaded file's bytes live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Already in memory.
    Bytes(Vec<u8>),
    /// On disk; read when the conversion starts.
    Path(PathBuf),
}

/// A file handed to the shell by a drop or the file picker.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// MIME type as declared by whoever supplied the file. Empty when unknown.
    pub declared_type: String,
    pub source: FileSource,
}

impl UploadedFile {
    /// An in-memory file with an explicit declared type.
    pub fn from_bytes(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// A file on disk, its type declared from the extension.
    ///
    /// Only existence and readability are checked here; the contents are read
    /// later by [`UploadedFile::read_bytes`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Pdf2JpgError> {
        let path = path.as_ref().to_path_buf();
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(Pdf2JpgError::FileNotFound { path }),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(Pdf2JpgError::PermissionDenied { path });
            }
            Err(_) => return Err(Pdf2JpgError::FileNotFound { path }),
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let declared_type = mime_for_path(&path).to_string();
        debug!("Declared type of '{}': {:?}", path.display(), declared_type);

        Ok(Self {
            name,
            declared_type,
            source: FileSource::Path(path),
        })
    }

    /// Replace the declared type.
    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    /// Accept the file only if it is declared as exactly `application/pdf`.
    pub fn validate(&self) -> Result<(), Pdf2JpgError> {
        if self.declared_type == PDF_MIME {
            Ok(())
        } else {
            Err(Pdf2JpgError::InvalidFileType {
                name: self.name.clone(),
                declared: self.declared_type.clone(),
            })
        }
    }

    /// Consume the file and return its bytes, reading from disk if needed.
    pub async fn read_bytes(self) -> Result<Vec<u8>, Pdf2JpgError> {
        match self.source {
            FileSource::Bytes(bytes) => Ok(bytes),
            FileSource::Path(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!("Read {} bytes from {}", bytes.len(), path.display());
                    Ok(bytes)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(Pdf2JpgError::FileNotFound { path })
                }
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    Err(Pdf2JpgError::PermissionDenied { path })
                }
                Err(source) => Err(Pdf2JpgError::ReadFailed { path, source }),
            },
        }
    }
}

/// Validate an optional submission: nothing at all is rejected the same way
/// as a file of the wrong type.
pub fn accept(file: Option<UploadedFile>) -> Result<UploadedFile, Pdf2JpgError> {
    let file = file.ok_or(Pdf2JpgError::NoFileSelected)?;
    file.validate()?;
    Ok(file)
}

/// MIME type a browser would declare for a file with this extension.
///
/// Unknown or missing extensions yield an empty string.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("report.pdf")), PDF_MIME);
        assert_eq!(mime_for_path(Path::new("REPORT.PDF")), PDF_MIME);
        assert_eq!(mime_for_path(Path::new("scan.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("notes")), "");
        assert_eq!(mime_for_path(Path::new("archive.pdf.gz")), "");
    }

    #[test]
    fn only_exact_pdf_type_is_accepted() {
        let ok = UploadedFile::from_bytes("a.pdf", "application/pdf", vec![]);
        assert!(ok.validate().is_ok());

        for declared in ["image/png", "", "application/pdf; charset=binary", "APPLICATION/PDF"] {
            let f = UploadedFile::from_bytes("a.pdf", declared, vec![]);
            let err = f.validate().unwrap_err();
            assert!(err.is_rejected_upload(), "{declared:?} should be rejected");
        }
    }

    #[test]
    fn missing_file_is_rejected_with_the_alert() {
        let err = accept(None).unwrap_err();
        assert!(matches!(err, Pdf2JpgError::NoFileSelected));
        assert_eq!(err.to_string(), "Please upload a PDF file");
    }

    #[test]
    fn from_path_reports_missing_files() {
        let err = UploadedFile::from_path("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Pdf2JpgError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn from_path_declares_and_reads_lazily() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.4 test").unwrap();

        let file = UploadedFile::from_path(tmp.path()).unwrap();
        assert_eq!(file.declared_type, PDF_MIME);
        assert!(matches!(file.source, FileSource::Path(_)));
        assert_eq!(file.read_bytes().await.unwrap(), b"%PDF-1.4 test");
    }

    #[test]
    fn declared_type_can_be_overridden() {
        let file = UploadedFile::from_bytes("upload", "", vec![1]).with_declared_type(PDF_MIME);
        assert!(file.validate().is_ok());
    }
}
