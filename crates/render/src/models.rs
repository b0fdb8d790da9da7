use crate::error::Result;
use std::path::PathBuf;

pub(crate) const SUCCESS_MESSAGE: &str = "Pdf generated successfully";

/// What to convert: raw markup, or a file already on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// HTML text, written to a temporary `.html` file before rendering.
    Html(String),
    /// Path to an existing HTML file, handed to the renderer as-is.
    File(PathBuf),
}

/// A single conversion: an input and the directory that receives the
/// intermediate files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionRequest {
    pub output_dir: PathBuf,
    pub input: Input,
}
impl ConversionRequest {
    pub fn html(output_dir: impl Into<PathBuf>, html: impl Into<String>) -> Self {
        Self { output_dir: output_dir.into(), input: Input::Html(html.into()) }
    }

    pub fn file(output_dir: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), input: Input::File(path.into()) }
    }
}

/// Outcome of a conversion, returned instead of an error.
///
/// On success `data` holds the PDF bytes. On failure `data` is `None` and
/// `message` describes what went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionResult {
    pub success: bool,
    pub message: String,
    pub data: Option<Vec<u8>>,
}
impl ConversionResult {
    pub fn success(data: Vec<u8>) -> Self {
        Self { success: true, message: SUCCESS_MESSAGE.to_string(), data: Some(data) }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), data: None }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The PDF bytes, if the conversion succeeded.
    pub fn into_data(self) -> Option<Vec<u8>> {
        self.data
    }
}
impl From<Result<Vec<u8>>> for ConversionResult {
    fn from(result: Result<Vec<u8>>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failed((*err).to_string()),
        }
    }
}
