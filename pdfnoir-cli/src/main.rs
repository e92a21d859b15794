//! # pdfnoir-cli
//!
//! Command-line interface for pdfnoir, a dark-mode recoloring tool for PDF
//! documents built on the `pdfnoir-core` content-stream rewriter.
//!
//! ## Quick Start
//!
//! ```bash
//! pdfnoir input.pdf output.pdf
//! pdfnoir input.pdf output.pdf midnight
//! ```
//!
//! An unrecognized theme id silently falls back to `classic` rather than
//! erroring, matching `pdfnoir_core::Theme::lookup`'s contract.
//!
//! ## Exit Codes
//!
//! - 0: Success
//! - 1: Error occurred (read, parse, or write failure; message on stderr)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Recolor a PDF for dark-mode viewing.
///
/// There is exactly one operation, so arguments are positional rather than
/// a subcommand tree.
#[derive(Parser)]
#[command(
    name = "pdfnoir",
    about = "Recolor a PDF for dark-mode viewing",
    version,
    author
)]
struct Cli {
    /// Path to the input PDF file
    input: PathBuf,

    /// Path for the recolored output PDF
    output: PathBuf,

    /// Theme id: classic, claude, chatgpt, sepia, midnight, forest
    /// (defaults to "classic"; unknown ids silently fall back to "classic")
    #[arg(default_value = "classic")]
    theme: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "pdfnoir_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let input_bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read input file: {}", cli.input.display()))?;

    let output_bytes = pdfnoir_core::process(&input_bytes, &cli.theme)
        .with_context(|| format!("failed to recolor {}", cli.input.display()))?;

    std::fs::write(&cli.output, output_bytes)
        .with_context(|| format!("failed to write output file: {}", cli.output.display()))?;

    println!(
        "✓ Recolored {} -> {} ({} theme)",
        cli.input.display(),
        cli.output.display(),
        cli.theme
    );

    Ok(())
}
