use thiserror::Error;

/// Internal error type used by low-level string/text decoding helpers.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Errors produced while recoloring a PDF document.
#[derive(Error, Debug)]
pub enum PdfNoirError {
    /// The input could not be parsed as a well-formed PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The recolored document could not be serialized back to bytes.
    #[error("failed to serialize PDF: {0}")]
    Serialize(String),

    /// An unknown theme identifier was requested.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Processing was cancelled cooperatively (see [`crate::document::Cancellation`]).
    #[error("operation cancelled")]
    Cancelled,
}

impl From<crate::parser::ParseError> for PdfNoirError {
    fn from(err: crate::parser::ParseError) -> Self {
        PdfNoirError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfNoirError>;
