//! # pdfnoir-core
//!
//! Content-stream color rewriting and dark-mode recoloring for PDF
//! documents: walk a document's drawing instructions, push every
//! color-setting operator's operands through a perceptual color map, and
//! reemit a PDF that keeps its original structure but reads light-on-dark
//! instead of dark-on-light.
//!
//! ## Features
//!
//! - **Perceptual color mapping**: near-white backgrounds become the
//!   theme's background color, near-black text becomes bright, everything
//!   else is remapped by luminance band rather than flatly inverted.
//! - **Byte-exact content-stream rewriting**: only the numeric operands of
//!   color operators are replaced; every other token (whitespace, names,
//!   comments, inline image data) round-trips untouched.
//! - **Six built-in themes**: `classic`, `claude`, `chatgpt`, `sepia`,
//!   `midnight`, `forest`.
//! - **Form XObject / tiling pattern traversal**: reachable form and
//!   pattern content is recolored too, deduplicated per document.
//! - **Pure Rust PDF parsing**: built on this crate's own zero-dependency
//!   parser (lexer, xref, object model, page tree) — no external PDF
//!   library.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfnoir_core::process;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = std::fs::read("document.pdf")?;
//! let recolored = process(&input, "midnight")?;
//! std::fs::write("document.dark.pdf", recolored)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Lower-level access
//!
//! ```rust,no_run
//! use pdfnoir_core::document::PdfGraph;
//! use pdfnoir_core::document::writer::GraphWriter;
//! use pdfnoir_core::theme::Theme;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = std::fs::read("document.pdf")?;
//! let mut graph = PdfGraph::load(&input)?;
//! let theme = Theme::lookup("claude");
//! graph.recolor_all_pages(theme)?;
//! let output = GraphWriter::write(&graph)?;
//! std::fs::write("document.dark.pdf", output)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! - Embedded raster images are left byte-for-byte untouched: this crate
//!   never decodes `/Subtype /Image` XObject streams, so a scanned page or
//!   an embedded photo keeps its original colors under any theme.
//! - Shading patterns (`/PatternType 2`) are not recolored; only tiling
//!   patterns (`/PatternType 1`), which have their own content stream, are
//!   reachable by the rewriter.
//! - Color spaces the rewriter can't resolve to a device-equivalent family
//!   (`Indexed`, `Separation`, `DeviceN`, an `ICCBased` space with an
//!   unrecognized component count) are left untouched rather than guessed
//!   at.
//!
//! These are scope decisions, not bugs: optical inversion of raster
//! images, OCR, reflow, accessibility-tag rewriting, and ICC color
//! management are out of scope for this crate.

pub mod color;
pub mod compression;
pub mod content;
pub mod document;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod theme;

pub use color::Color;
pub use document::PdfGraph;
pub use error::{PdfNoirError, Result};
pub use geometry::{Point, Rectangle};
pub use theme::Theme;

/// Recolor a PDF document for dark-mode viewing.
///
/// `theme_id` selects one of the six built-in themes; an unknown id
/// silently falls back to `classic` rather than erroring, matching
/// [`Theme::lookup`]'s contract. The output has the same page count and
/// page dimensions as the input.
pub fn process(input_bytes: &[u8], theme_id: &str) -> Result<Vec<u8>> {
    let theme = Theme::lookup(theme_id);
    let mut graph = document::PdfGraph::load(input_bytes)?;
    graph.recolor_all_pages(theme)?;
    document::writer::GraphWriter::write(&graph)
}

/// Current version of pdfnoir-core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
