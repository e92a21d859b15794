//! The global theme table.
//!
//! Themes are plain compile-time data: no lazy initialization, no mutable
//! global state. [`Theme::lookup`] is the only configuration surface the
//! recoloring pipeline exposes.

/// An 8-bit-per-channel RGB color, matching how theme backgrounds are
/// specified and how PDF background-fill prologues round their operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb8 { r, g, b }
    }
}

/// A named dark-mode background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub background: Rgb8,
}

impl Theme {
    pub(crate) fn background_f64(&self) -> (f64, f64, f64) {
        (
            self.background.r as f64 / 255.0,
            self.background.g as f64 / 255.0,
            self.background.b as f64 / 255.0,
        )
    }

    /// Look up a built-in theme by id, falling back to `classic` for an
    /// unrecognized name the same way the reference implementation does.
    pub fn lookup(id: &str) -> &'static Theme {
        THEMES.iter().find(|t| t.id == id).unwrap_or(&THEMES[0])
    }

    /// Same as [`Theme::lookup`] but distinguishes "unknown id" from "found",
    /// for API callers that want to reject the former instead of silently
    /// falling back (`pdfnoir-api`'s `strict` mode).
    pub fn find(id: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|t| t.id == id)
    }

    /// `classic`, used when no theme is specified.
    pub fn default_theme() -> &'static Theme {
        &THEMES[0]
    }

    pub fn ids() -> impl Iterator<Item = &'static str> {
        THEMES.iter().map(|t| t.id)
    }
}

pub static THEMES: [Theme; 6] = [
    Theme {
        id: "classic",
        background: Rgb8::new(0, 0, 0),
    },
    Theme {
        id: "claude",
        background: Rgb8::new(42, 37, 34),
    },
    Theme {
        id: "chatgpt",
        background: Rgb8::new(52, 53, 65),
    },
    Theme {
        id: "sepia",
        background: Rgb8::new(40, 35, 25),
    },
    Theme {
        id: "midnight",
        background: Rgb8::new(25, 30, 45),
    },
    Theme {
        id: "forest",
        background: Rgb8::new(25, 35, 30),
    },
];
