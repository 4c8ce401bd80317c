//! Optional user-supplied font: exact glyph metrics plus an embedded
//! `@font-face` so the SVG renders with the same face it was laid out with.

use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::RenderError;
use crate::text::TextMetrics;

/// Family name the embedded face is registered under.
pub const EMBEDDED_FAMILY: &str = "DimuonEmbedded";

/// A TrueType/OpenType face loaded from disk. Cheap to clone.
#[derive(Clone)]
pub struct FontHandle {
    font: Arc<FontVec>,
    bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle").field("bytes", &self.bytes.len()).finish()
    }
}

impl FontHandle {
    pub fn load(path: &Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> crate::Result<Self> {
        let font =
            FontVec::try_from_vec(bytes.clone()).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { font: Arc::new(font), bytes: Arc::new(bytes) })
    }

    /// Advance width (with kerning) and vertical extent of `text` at `size_pt`.
    pub fn measure(&self, text: &str, size_pt: f64) -> TextMetrics {
        let font: &FontVec = &self.font;
        let scaled = font.as_scaled(PxScale::from(size_pt as f32));

        let mut width: f32 = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        let ascent = scaled.ascent();
        TextMetrics {
            width: width as f64,
            height: (ascent - scaled.descent()) as f64,
            ascent: ascent as f64,
        }
    }

    /// `<style>` block declaring the face as [`EMBEDDED_FAMILY`].
    pub fn svg_font_style(&self) -> String {
        format!(
            "<style>@font-face {{ font-family: '{EMBEDDED_FAMILY}'; src: url('data:font/ttf;base64,{}') format('truetype'); }}</style>",
            STANDARD.encode(self.bytes.as_slice())
        )
    }
}
