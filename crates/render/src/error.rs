//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. The public conversion operations fold
//! these into a [`ConversionResult`](crate::ConversionResult); use the
//! `try_convert*` methods to receive them directly.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// The renderer process could not be started (missing binary, permissions).
    #[display("an error occurred: failed to launch renderer: {_0}")]
    Launch(IoError),
    /// Chrome was still running when the configured process timeout elapsed,
    /// and has been killed.
    #[display("an error occurred: renderer did not exit within {_0:?}")]
    ChromeTimeout(#[error(not(source))] std::time::Duration),
    /// Chrome exited but the expected PDF never appeared on disk.
    #[display("pdf file not found: {}", _0.display())]
    PdfNotFound(#[error(not(source))] PathBuf),
    /// The HTML file handed to the converter does not exist.
    #[display("an error occurred: html file not found: {}", _0.display())]
    InputNotFound(#[error(not(source))] PathBuf),
    /// Output directory is missing or is not a directory.
    #[display("an error occurred: invalid output directory: {}", _0.display())]
    InvalidOutputDir(#[error(not(source))] PathBuf),
    #[display("an error occurred: {_0}")]
    Io(IoError),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::PdfNotFound(_) | Self::ChromeTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind as IoErrorKind;
    use std::time::Duration;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::PdfNotFound(PathBuf::from("/tmp/abc.pdf")).to_string(), "pdf file not found: /tmp/abc.pdf");
        assert_eq!(
            ErrorKind::Io(IoError::new(IoErrorKind::Other, "disk on fire")).to_string(),
            "an error occurred: disk on fire"
        );
        assert!(ErrorKind::Launch(IoError::from(IoErrorKind::NotFound)).to_string().starts_with("an error occurred: failed to launch renderer"));
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::PdfNotFound(PathBuf::new()).is_retryable());
        assert!(ErrorKind::ChromeTimeout(Duration::from_secs(1)).is_retryable());
        assert!(!ErrorKind::ChromeNotFound.is_retryable());
        assert!(!ErrorKind::Launch(IoError::from(IoErrorKind::NotFound)).is_retryable());
        assert!(!ErrorKind::InvalidOutputDir(PathBuf::new()).is_retryable());
    }

    #[test]
    fn exn_derefs_to_kind() {
        let err: Error = ErrorKind::InputNotFound(PathBuf::from("missing.html")).into();
        assert!(matches!(&*err, ErrorKind::InputNotFound(_)));
    }
}
