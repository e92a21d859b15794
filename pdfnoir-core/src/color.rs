//! The perceptual dark-mode color mapping.
//!
//! [`Color`] mirrors the tagged union PDF content streams use for `rg`/`g`/`k`
//! and their stroking counterparts. [`Color::map`] is the core of the
//! recoloring pipeline: it reads like HSV manipulation because that's what it
//! is — brightness gates which band a color falls into, then hue and
//! saturation are preserved while value is pushed toward the opposite end of
//! the brightness range.

use crate::theme::Theme;

/// A color in one of the three device color spaces PDF content streams use.
///
/// Components are always clamped to `0.0..=1.0` by the constructors, so a
/// `Color` value is always valid to emit back into a content stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
}

impl Color {
    pub fn gray(g: f64) -> Self {
        Color::Gray(g.clamp(0.0, 1.0))
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Color::Cmyk(
            c.clamp(0.0, 1.0),
            m.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            k.clamp(0.0, 1.0),
        )
    }

    /// Map this color into the given theme, preserving this color's own
    /// variant so downstream operator selection (`g` vs `rg` vs `k`) stays
    /// unchanged.
    pub fn map(self, theme: &Theme) -> Color {
        match self {
            Color::Gray(g) => Color::Gray(map_gray(g, theme)),
            Color::Rgb(r, g, b) => {
                let (nr, ng, nb) = map_rgb(r, g, b, theme);
                Color::rgb(nr, ng, nb)
            }
            Color::Cmyk(c, m, y, k) => {
                let (nc, nm, ny, nk) = map_cmyk(c, m, y, k, theme);
                Color::cmyk(nc, nm, ny, nk)
            }
        }
    }
}

/// Rec. 601 luma. Matches the brightness gate used throughout the mapping
/// table; not a colorimetric luminance.
fn luma(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Luma above which a color is treated as a light background and replaced
/// outright by the theme's background color.
const Y_NEAR_WHITE: f64 = 0.93;
/// Luma below which a color is treated as near-black text or ink.
const Y_NEAR_BLACK: f64 = 0.15;
const Y_DARK: f64 = 0.4;
const Y_MEDIUM_DARK: f64 = 0.6;

fn map_rgb(r: f64, g: f64, b: f64, theme: &Theme) -> (f64, f64, f64) {
    let y = luma(r, g, b);

    if y > Y_NEAR_WHITE {
        return theme.background_f64();
    }

    let (h, s, v) = rgb_to_hsv(r, g, b);

    if y < Y_NEAR_BLACK && s < 0.3 {
        return (0.98, 0.98, 0.98);
    }

    if y < Y_NEAR_BLACK {
        let v2 = 0.65 + (v / Y_NEAR_BLACK) * 0.2;
        let s2 = (s * 1.1).min(1.0);
        let (nr, ng, nb) = hsv_to_rgb(h, s2, v2);
        return (nr.clamp(0.0, 1.0), ng.clamp(0.0, 1.0), nb.clamp(0.0, 1.0));
    }

    if y < Y_DARK {
        let v2 = 0.75 + (v - Y_NEAR_BLACK) * 0.8;
        let s2 = s * 0.85;
        return hsv_to_rgb(h, s2, v2);
    }

    if y < Y_MEDIUM_DARK {
        let v2 = 0.65 + (v - Y_DARK) * 1.0;
        let s2 = s * 0.9;
        return hsv_to_rgb(h, s2, v2);
    }

    let v2 = 0.5 + v * 0.5;
    hsv_to_rgb(h, s, v2)
}

fn map_gray(gray: f64, theme: &Theme) -> f64 {
    if gray > Y_NEAR_WHITE {
        let (r, g, b) = theme.background_f64();
        return luma(r, g, b);
    }
    if gray < Y_NEAR_BLACK {
        return 0.98;
    }
    if gray < Y_DARK {
        return 0.75 + (gray - Y_NEAR_BLACK) * 0.8;
    }
    if gray < Y_MEDIUM_DARK {
        return 0.65 + (gray - Y_DARK) * 1.0;
    }
    0.5 + gray * 0.5
}

fn map_cmyk(c: f64, m: f64, y: f64, k: f64, theme: &Theme) -> (f64, f64, f64, f64) {
    let r = (1.0 - c) * (1.0 - k);
    let g = (1.0 - m) * (1.0 - k);
    let b = (1.0 - y) * (1.0 - k);

    let (nr, ng, nb) = map_rgb(r, g, b, theme);

    if nr == 0.0 && ng == 0.0 && nb == 0.0 {
        return (0.0, 0.0, 0.0, 1.0);
    }

    let nk = 1.0 - nr.max(ng).max(nb);
    if nk < 1.0 {
        (
            (1.0 - nr - nk) / (1.0 - nk),
            (1.0 - ng - nk) / (1.0 - nk),
            (1.0 - nb - nk) / (1.0 - nk),
            nk,
        )
    } else {
        (0.0, 0.0, 0.0, nk)
    }
}

fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;

    let h = if diff == 0.0 {
        0.0
    } else if max == r {
        (60.0 * ((g - b) / diff) + 360.0) % 360.0
    } else if max == g {
        (60.0 * ((b - r) / diff) + 120.0) % 360.0
    } else {
        (60.0 * ((r - g) / diff) + 240.0) % 360.0
    };

    let s = if max == 0.0 { 0.0 } else { diff / max };
    (h / 360.0, s, max)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let h = h * 360.0;
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}
