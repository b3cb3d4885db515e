//! Conversion configuration.
//!
//! Rendering parameters (2× scale, JPEG, maximum quality) are fixed and live
//! as constants in [`crate::pipeline`]. What remains configurable is what a
//! caller legitimately varies per document: the password for encrypted PDFs
//! and where progress events go.

use crate::error::Pdf2JpgError;
use crate::progress::{ConversionProgressCallback, ProgressCallback};
use std::fmt;
use std::sync::Arc;

/// Configuration for a PDF-to-JPEG conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2jpg::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .password("s3cret")
///     .build()
///     .unwrap();
/// assert_eq!(config.password.as_deref(), Some("s3cret"));
/// ```
#[derive(Clone, Default)]
pub struct ConversionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Receives page-level progress events. `None` means no reporting.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    pub(crate) fn progress(&self) -> Option<&dyn ConversionProgressCallback> {
        self.progress_callback.as_deref()
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ConversionProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2JpgError> {
        if let Some(ref pwd) = self.config.password {
            if pwd.is_empty() {
                return Err(Pdf2JpgError::InvalidConfig(
                    "password must not be empty; omit it for unencrypted PDFs".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgressCallback;

    #[test]
    fn default_has_no_password_or_callback() {
        let c = ConversionConfig::default();
        assert!(c.password.is_none());
        assert!(c.progress().is_none());
    }

    #[test]
    fn empty_password_is_rejected() {
        let err = ConversionConfig::builder()
            .password("")
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2JpgError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder()
            .password("hunter2")
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
        assert!(dbg.contains("<dyn ConversionProgressCallback>"));
    }
}
