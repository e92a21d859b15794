//! The background-fill prologue.
//!
//! Grounded on `original_source/backend/pdf_processor_pikepdf.py::_process_page`,
//! which builds a same-size background page with `reportlab` and overlays it
//! as an underlay. A full auxiliary PDF is unnecessary here: the same visual
//! effect is one literal content-stream fragment prepended to the page.

use crate::geometry::Rectangle;
use crate::theme::Theme;

/// Builds `q R G B rg x0 y0 W H re f Q` for the given theme and page size.
/// The save/restore pair isolates this fill's color and path state from
/// whatever the page's own content stream does next.
pub fn prologue_bytes(theme: &Theme, media_box: &Rectangle) -> Vec<u8> {
    let r = theme.background.r as f64 / 255.0;
    let g = theme.background.g as f64 / 255.0;
    let b = theme.background.b as f64 / 255.0;

    let x0 = media_box.lower_left.x;
    let y0 = media_box.lower_left.y;
    let w = media_box.width();
    let h = media_box.height();

    format!(
        "q {} {} {} rg {} {} {} {} re f Q\n",
        fmt_unit(r),
        fmt_unit(g),
        fmt_unit(b),
        fmt_coord(x0),
        fmt_coord(y0),
        fmt_coord(w),
        fmt_coord(h),
    )
    .into_bytes()
}

fn fmt_unit(v: f64) -> String {
    fmt_coord(v.clamp(0.0, 1.0))
}

fn fmt_coord(v: f64) -> String {
    let mut s = format!("{v:.6}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
