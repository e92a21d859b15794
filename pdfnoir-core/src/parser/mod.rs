//! PDF Parser Module
//! 
//! This module implements a native PDF parser for reading and parsing PDF files
//! according to the ISO 32000-1 (PDF 1.7) and ISO 32000-2 (PDF 2.0) specifications.

pub mod lexer;
pub mod objects;
pub mod header;
pub mod xref;
pub mod xref_types;
pub mod trailer;
pub mod encoding;
pub mod encryption_handler;
pub mod object_stream;
pub mod stack_safe;
pub mod reader;
pub mod filters;
pub mod page_tree;
pub mod document;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use self::reader::PdfReader;
pub use self::objects::{PdfObject, PdfDictionary, PdfArray, PdfName, PdfString};
pub use self::page_tree::ParsedPage;
pub use self::document::{PdfDocument, ResourceManager};

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// PDF Parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Invalid PDF header")]
    InvalidHeader,
    
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),
    
    #[error("Syntax error at position {position}: {message}")]
    SyntaxError {
        position: usize,
        message: String,
    },
    
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
    },
    
    #[error("Invalid object reference: {0} {1} R")]
    InvalidReference(u32, u16),
    
    #[error("Missing required key: {0}")]
    MissingKey(String),
    
    #[error("Invalid xref table")]
    InvalidXRef,
    
    #[error("Invalid trailer")]
    InvalidTrailer,
    
    #[error("Circular reference detected")]
    CircularReference,
    
    #[error("Stream decode error: {0}")]
    StreamDecodeError(String),
    
    #[error("Encryption not supported")]
    EncryptionNotSupported,

    #[error("Empty file")]
    EmptyFile,

    #[error("Character encoding error at position {position}: {message}")]
    CharacterEncodingError { position: usize, message: String },
}

/// Non-fatal condition recovered from during lenient parsing.
///
/// Collected rather than surfaced as an error so that a single malformed
/// token doesn't abort parsing of an otherwise-readable document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// A syntax error was recovered from by assuming a token boundary.
    SyntaxErrorRecovered {
        position: usize,
        expected: String,
        found: String,
        recovery_action: String,
    },
    /// A string or name contained bytes that didn't decode cleanly.
    InvalidEncoding {
        position: usize,
        recovered_text: String,
        encoding_used: Option<encoding::EncodingType>,
        replacement_count: usize,
    },
}

/// Controls how tolerant the parser is of malformed input.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Accept syntax that deviates from ISO 32000 when the intent is clear.
    pub lenient_syntax: bool,
    /// Record [`ParseWarning`]s instead of silently ignoring recovered errors.
    pub collect_warnings: bool,
    /// Fall back to heuristic encodings (e.g. Windows-1252) for strings that
    /// aren't valid PDFDocEncoding or UTF-16.
    pub lenient_encoding: bool,
    /// Encoding to try first when `lenient_encoding` is set.
    pub preferred_encoding: Option<encoding::EncodingType>,
    /// Attempt to recover partial content from a stream whose filter chain
    /// fails partway through, rather than discarding it entirely.
    pub recover_from_stream_errors: bool,
    /// Emit `tracing` debug events describing each recovery step taken.
    pub log_recovery_details: bool,
    /// Upper bound on recovery retries before giving up on a stream.
    pub max_recovery_attempts: usize,
    /// Return whatever bytes were decoded before a stream error, instead of
    /// an empty buffer.
    pub partial_content_allowed: bool,
    /// Treat a stream that fails to decode at all as empty rather than an
    /// error.
    pub ignore_corrupt_streams: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::strict()
    }
}

impl ParseOptions {
    /// Reject anything that doesn't strictly conform to ISO 32000.
    pub fn strict() -> Self {
        ParseOptions {
            lenient_syntax: false,
            collect_warnings: false,
            lenient_encoding: false,
            preferred_encoding: None,
            recover_from_stream_errors: false,
            log_recovery_details: false,
            max_recovery_attempts: 0,
            partial_content_allowed: false,
            ignore_corrupt_streams: false,
        }
    }

    /// Recover from the malformed PDFs commonly produced by real-world
    /// generators, at the cost of silently accepting some invalid syntax.
    pub fn lenient() -> Self {
        ParseOptions {
            lenient_syntax: true,
            collect_warnings: true,
            lenient_encoding: true,
            preferred_encoding: Some(encoding::EncodingType::Windows1252),
            recover_from_stream_errors: true,
            log_recovery_details: true,
            max_recovery_attempts: 3,
            partial_content_allowed: true,
            ignore_corrupt_streams: true,
        }
    }
}