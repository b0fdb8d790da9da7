//! CLI Error Types

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("no renderer available")]
    Renderer,
    #[display("failed to read HTML from stdin")]
    Stdin,
    #[display("failed to write PDF output")]
    Output,
    /// The converter reported failure; carries its message.
    #[display("{_0}")]
    Conversion(#[error(not(source))] String),
}
