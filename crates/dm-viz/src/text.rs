//! Approximate text metrics for layout.
//!
//! Without a configured font file plots use a generic sans-serif stack, so
//! exact glyph advances are unknown at render time. Widths are then estimated
//! from per-glyph classes calibrated on Helvetica/Arial. With `font.file` set,
//! [`crate::font::FontHandle`] measures the real glyphs instead.

use crate::primitives::TextStyle;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Advance width of `ch` in em units.
fn advance_em(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.24,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '/' => 0.32,
        'm' | 'w' | 'M' | 'W' => 0.86,
        'A'..='Z' => 0.68,
        '0'..='9' | 'a'..='z' | '=' | '+' | '-' | '_' => 0.55,
        // Greek letters, superscripts and other symbols.
        _ => 0.6,
    }
}

/// Measure `text` rendered with `style`, in points.
pub fn measure_text(text: &str, style: &TextStyle) -> TextMetrics {
    let bold = if style.bold { 1.07 } else { 1.0 };
    let em: f64 = text.chars().map(advance_em).sum();
    TextMetrics {
        width: em * style.size * bold,
        height: style.size * 1.15,
        ascent: style.size * 0.93,
    }
}
