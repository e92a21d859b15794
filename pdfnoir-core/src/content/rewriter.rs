//! The operator rewriter.
//!
//! Walks the token stream accumulating operands onto a run, consuming and
//! clearing that run on every operator, the same operand-stack discipline a
//! content-stream interpreter uses. Operators are reemitted as raw bytes
//! rather than built into an AST, and a `q`/`Q` graphics-state-frame stack
//! tracks the active `cs`/`CS` color space so `sc`/`scn` can be resolved
//! against whichever space is current.

use std::collections::HashMap;

use super::tokenizer::{tokenize, Token, TokenKind};
use super::ContentResult;
use crate::color::Color;
use crate::theme::Theme;

/// The device color space family a named color space resolves to, as far as
/// this crate's rewriting policy cares. Anything else (`ICCBased` with no
/// known alternate, `Indexed`, `Separation`, `Pattern`, ...) is [`None`] at
/// the call site, and `sc`/`scn` against it is passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpaceFamily {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
}

impl ColorSpaceFamily {
    fn arity(self) -> usize {
        match self {
            ColorSpaceFamily::DeviceGray => 1,
            ColorSpaceFamily::DeviceRgb => 3,
            ColorSpaceFamily::DeviceCmyk => 4,
        }
    }

    pub fn from_literal_name(name: &str) -> Option<Self> {
        match name {
            "DeviceGray" | "CalGray" | "G" => Some(ColorSpaceFamily::DeviceGray),
            "DeviceRGB" | "CalRGB" | "RGB" => Some(ColorSpaceFamily::DeviceRgb),
            "DeviceCMYK" | "CMYK" => Some(ColorSpaceFamily::DeviceCmyk),
            _ => None,
        }
    }
}

/// Resolved `/ColorSpace` resource dictionary, mapping a page's local color
/// space names (e.g. `/Cs1`) to the device family they ultimately alias, as
/// computed by the document layer (which has the object graph needed to
/// chase `ICCBased`/`Indexed`/`Separation` references). Names not present
/// here are looked up against the three literal device-space names first;
/// anything still unresolved is treated as non-device and passed through.
pub type ColorSpaceTable = HashMap<String, ColorSpaceFamily>;

fn resolve_family(name: &str, table: &ColorSpaceTable) -> Option<ColorSpaceFamily> {
    ColorSpaceFamily::from_literal_name(name).or_else(|| table.get(name).copied())
}

/// Result of rewriting one content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteOutcome {
    Rewritten(Vec<u8>),
    /// Rewriting changed nothing (no color operators matched); the caller
    /// can skip writing a new stream object back if this is returned.
    Unchanged(Vec<u8>),
}

impl RewriteOutcome {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RewriteOutcome::Rewritten(b) | RewriteOutcome::Unchanged(b) => b,
        }
    }
}

/// Rewrites every recognized color-setting operator in `content`, leaving
/// everything else byte-for-byte identical.
pub fn rewrite(content: &[u8], theme: &Theme, color_spaces: &ColorSpaceTable) -> ContentResult<RewriteOutcome> {
    let tokens = tokenize(content)?;
    let mut out = Vec::with_capacity(content.len());
    let mut run: Vec<&Token<'_>> = Vec::new();
    let mut graphics_stack: Vec<(Option<ColorSpaceFamily>, Option<ColorSpaceFamily>)> = Vec::new();
    let mut stroke_space: Option<ColorSpaceFamily> = None;
    let mut nonstroke_space: Option<ColorSpaceFamily> = None;
    let mut any_rewritten = false;

    for token in &tokens {
        match &token.kind {
            TokenKind::Operator => {
                let op = std::str::from_utf8(token.raw).unwrap_or("");
                match op {
                    "BI" => {
                        flush_run(&run, &mut out);
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                    "q" => {
                        flush_run(&run, &mut out);
                        run.clear();
                        graphics_stack.push((stroke_space, nonstroke_space));
                        out.extend_from_slice(token.raw);
                    }
                    "Q" => {
                        flush_run(&run, &mut out);
                        run.clear();
                        if let Some((s, n)) = graphics_stack.pop() {
                            stroke_space = s;
                            nonstroke_space = n;
                        }
                        out.extend_from_slice(token.raw);
                    }
                    "cs" | "CS" => {
                        if let Some(name) = last_name(&run) {
                            let family = resolve_family(name, color_spaces);
                            if op == "cs" {
                                nonstroke_space = family;
                            } else {
                                stroke_space = family;
                            }
                        }
                        flush_run(&run, &mut out);
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                    "g" | "G" => {
                        if try_rewrite(
                            &run,
                            1,
                            theme,
                            |v| Color::gray(v[0]),
                            |c| match c {
                                Color::Gray(g) => vec![g],
                                _ => unreachable!(),
                            },
                            &mut out,
                        ) {
                            any_rewritten = true;
                        } else {
                            flush_run(&run, &mut out);
                        }
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                    "rg" | "RG" => {
                        if try_rewrite(
                            &run,
                            3,
                            theme,
                            |v| Color::rgb(v[0], v[1], v[2]),
                            |c| match c {
                                Color::Rgb(r, g, b) => vec![r, g, b],
                                _ => unreachable!(),
                            },
                            &mut out,
                        ) {
                            any_rewritten = true;
                        } else {
                            flush_run(&run, &mut out);
                        }
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                    "k" | "K" => {
                        if try_rewrite(
                            &run,
                            4,
                            theme,
                            |v| Color::cmyk(v[0], v[1], v[2], v[3]),
                            |c| match c {
                                Color::Cmyk(c, m, y, k) => vec![c, m, y, k],
                                _ => unreachable!(),
                            },
                            &mut out,
                        ) {
                            any_rewritten = true;
                        } else {
                            flush_run(&run, &mut out);
                        }
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                    "sc" | "scn" => {
                        if rewrite_sc(&run, nonstroke_space, theme, &mut out) {
                            any_rewritten = true;
                        } else {
                            flush_run(&run, &mut out);
                        }
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                    "SC" | "SCN" => {
                        if rewrite_sc(&run, stroke_space, theme, &mut out) {
                            any_rewritten = true;
                        } else {
                            flush_run(&run, &mut out);
                        }
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                    _ => {
                        flush_run(&run, &mut out);
                        run.clear();
                        out.extend_from_slice(token.raw);
                    }
                }
            }
            _ => run.push(token),
        }
    }
    flush_run(&run, &mut out);

    if any_rewritten {
        Ok(RewriteOutcome::Rewritten(out))
    } else {
        Ok(RewriteOutcome::Unchanged(out))
    }
}

/// Emits every token of a buffered run verbatim (whitespace, comments,
/// operands, inline image payloads) — the no-rewrite path.
fn flush_run(run: &[&Token<'_>], out: &mut Vec<u8>) {
    for token in run {
        out.extend_from_slice(token.raw);
    }
}

/// The last non-whitespace/comment token's name, if any — used by `cs`/`CS`
/// to read the color space name that precedes them.
fn last_name<'a>(run: &[&'a Token<'a>]) -> Option<&'a str> {
    run.iter()
        .rev()
        .find(|t| !t.is_insignificant())
        .and_then(|t| t.as_name())
}

/// Numeric operand tokens in a run, in order, ignoring whitespace/comments.
fn numbers_in_run(run: &[&Token<'_>]) -> Vec<f64> {
    run.iter().filter_map(|t| t.as_number()).collect()
}

/// Whether the run's final significant operand is a Name (the `scn`/`SCN`
/// pattern-reference case, which must always pass through untouched).
fn ends_with_pattern_name(run: &[&Token<'_>]) -> bool {
    run.iter()
        .rev()
        .find(|t| !t.is_insignificant())
        .map(|t| t.as_name().is_some())
        .unwrap_or(false)
}

/// Rewrites a fixed-arity color operator's numeric operands in place.
/// Returns `false` (and performs no emission) if the run doesn't contain
/// exactly `arity` numbers, in which case the caller falls back to
/// [`flush_run`].
fn try_rewrite<F, G>(
    run: &[&Token<'_>],
    arity: usize,
    theme: &Theme,
    build: F,
    extract: G,
    out: &mut Vec<u8>,
) -> bool
where
    F: Fn(&[f64]) -> Color,
    G: Fn(Color) -> Vec<f64>,
{
    let numbers = numbers_in_run(run);
    if numbers.len() != arity {
        return false;
    }
    let mapped = extract(build(&numbers).map(theme));
    emit_with_replaced_numbers(run, &mapped, out);
    true
}

fn rewrite_sc(run: &[&Token<'_>], space: Option<ColorSpaceFamily>, theme: &Theme, out: &mut Vec<u8>) -> bool {
    if ends_with_pattern_name(run) {
        return false;
    }
    let Some(family) = space else {
        tracing::debug!("sc/scn against a non-device color space, passing through unchanged");
        return false;
    };
    let numbers = numbers_in_run(run);
    if numbers.len() != family.arity() {
        return false;
    }
    let color = match family {
        ColorSpaceFamily::DeviceGray => Color::gray(numbers[0]),
        ColorSpaceFamily::DeviceRgb => Color::rgb(numbers[0], numbers[1], numbers[2]),
        ColorSpaceFamily::DeviceCmyk => Color::cmyk(numbers[0], numbers[1], numbers[2], numbers[3]),
    };
    let mapped = match color.map(theme) {
        Color::Gray(g) => vec![g],
        Color::Rgb(r, g, b) => vec![r, g, b],
        Color::Cmyk(c, m, y, k) => vec![c, m, y, k],
    };
    emit_with_replaced_numbers(run, &mapped, out);
    true
}

/// Emits a run, substituting each Number token's raw bytes (in order) with
/// freshly formatted values from `replacements`, leaving every other token
/// (whitespace, comments) exactly as it was.
fn emit_with_replaced_numbers(run: &[&Token<'_>], replacements: &[f64], out: &mut Vec<u8>) {
    let mut it = replacements.iter();
    for token in run {
        if matches!(token.kind, TokenKind::Number(_)) {
            if let Some(v) = it.next() {
                out.extend_from_slice(format_number(*v).as_bytes());
                continue;
            }
        }
        out.extend_from_slice(token.raw);
    }
}

/// Formats a color component with up to 6 fractional digits, trailing zeros
/// trimmed, and always at least one digit (per the arity/format invariant).
fn format_number(v: f64) -> String {
    let v = v.clamp(0.0, 1.0);
    let mut s = format!("{v:.6}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
