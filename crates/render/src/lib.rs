//! HTML to PDF conversion through a headless Chrome/Chromium process.
//!
//! [`PdfConverter`] writes the HTML to disk when needed, runs Chrome with
//! `--print-to-pdf`, waits (bounded by a [`PollPolicy`]) for the PDF to appear
//! and returns its bytes. Every conversion is independent; nothing is shared
//! between calls except the converter's configuration.
//!
//! ```no_run
//! use headless_pdf_render::PdfConverter;
//!
//! let converter = PdfConverter::new("/usr/bin/chromium");
//! let result = converter.convert_text("/tmp", "<h1>Hello</h1>");
//! if let Some(pdf) = result.data {
//!     assert!(pdf.starts_with(b"%PDF-"));
//! } else {
//!     eprintln!("{}", result.message);
//! }
//! ```

mod artifacts;
mod chrome;
mod convert;
pub mod error;
mod models;
pub mod wait;

pub use crate::chrome::Chrome;
pub use crate::models::{ConversionRequest, ConversionResult, Input};
pub use crate::wait::PollPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Tunables shared by every conversion a [`PdfConverter`] performs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConverterOptions {
    /// How long to wait for the PDF after Chrome exits.
    pub poll: PollPolicy,
    /// Kill Chrome if it runs longer than this. `None` waits indefinitely.
    pub process_timeout: Option<Duration>,
    /// Leave the intermediate `.html`/`.pdf` files in the output directory.
    pub keep_artifacts: bool,
    /// Additional arguments inserted before the input path (e.g. `--no-sandbox`).
    pub extra_args: Vec<String>,
}

pub struct PdfConverter {
    chrome: Chrome,
    options: ConverterOptions,
}
impl PdfConverter {
    /// Creates a converter for the Chrome executable at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_chrome(Chrome::binary(path))
    }

    pub fn with_chrome(chrome: Chrome) -> Self {
        Self { chrome, options: ConverterOptions::default() }
    }

    pub fn with_options(mut self, options: ConverterOptions) -> Self {
        self.options = options;
        self
    }
}
