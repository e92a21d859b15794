//! Content-stream rewriting: tokenize a page's drawing instructions, find
//! color-setting operators, push their operands through the theme's color
//! map, and reemit the stream. Also builds the background-fill prologue that
//! gets spliced in ahead of the page's own content.

pub mod background;
pub mod rewriter;
pub mod tokenizer;

pub use background::prologue_bytes;
pub use rewriter::{rewrite, ColorSpaceFamily, ColorSpaceTable, RewriteOutcome};
pub use tokenizer::{tokenize, Token, TokenKind};

use thiserror::Error;

/// Lexing failures from [`tokenizer`]. Content streams are generated by a
/// huge range of PDF producers; a malformed one here degrades a single
/// page's rewrite (see `document::PdfGraph::recolor_page`), it never aborts
/// the whole document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("unterminated string literal at byte {0}")]
    UnterminatedString(usize),
    #[error("unterminated hex string at byte {0}")]
    UnterminatedHexString(usize),
    #[error("invalid character in hex string at byte {0}: {1:#04x}")]
    InvalidHexDigit(usize, u8),
    #[error("invalid number literal at byte {0}")]
    InvalidNumber(usize),
    #[error("unexpected '>' at byte {0}")]
    UnexpectedCloseAngle(usize),
}

pub type ContentResult<T> = Result<T, ContentError>;

impl From<ContentError> for crate::error::PdfNoirError {
    fn from(err: ContentError) -> Self {
        crate::error::PdfNoirError::Parse(err.to_string())
    }
}
