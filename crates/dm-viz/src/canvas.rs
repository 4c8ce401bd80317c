use std::fmt::{self, Write as _};

use crate::color::Color;
use crate::font::{EMBEDDED_FAMILY, FontHandle};
use crate::primitives::*;
use crate::text::{TextMetrics, measure_text};

/// An SVG element stored for deferred rendering.
#[derive(Debug, Clone)]
enum SvgElement {
    Rect { x: f64, y: f64, w: f64, h: f64, style: Style },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, style: LineStyle },
    Polyline { points: Vec<(f64, f64)>, style: LineStyle },
    Path { d: String, style: Style },
    Text { x: f64, y: f64, content: String, style: TextStyle, rotate: Option<f64> },
    Group { clip_id: String, children: Vec<SvgElement> },
}

/// Immediate-mode SVG canvas. Coordinates in points (1pt = 1/72").
///
/// The document is produced by the [`fmt::Display`] impl (or
/// [`Canvas::finish_svg`]).
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub background: Color,
    font_family: String,
    font: Option<FontHandle>,
    elements: Vec<SvgElement>,
    defs: Vec<String>,
    // Open clip groups: (clip id, elements drawn while the clip is active).
    clip_stack: Vec<(String, Vec<SvgElement>)>,
    next_clip_id: usize,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Color::WHITE,
            font_family: "Helvetica, Arial, sans-serif".into(),
            font: None,
            elements: Vec::new(),
            defs: Vec::new(),
            clip_stack: Vec::new(),
            next_clip_id: 0,
        }
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Lay text out with `font` and embed it; the font family stack stays
    /// as the fallback.
    pub fn with_font(mut self, font: FontHandle) -> Self {
        self.font = Some(font);
        self
    }

    // --- Drawing primitives ---

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.push(SvgElement::Polyline { points: points.to_vec(), style: style.clone() });
    }

    /// Closed filled path through `points`.
    pub fn filled_path(&mut self, points: &[(f64, f64)], style: &Style) {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return;
        };
        let mut d = format!("M{x0:.2},{y0:.2}");
        for (x, y) in rest {
            let _ = write!(d, " L{x:.2},{y:.2}");
        }
        d.push('Z');
        self.push(SvgElement::Path { d, style: style.clone() });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: None,
        });
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: Some(angle),
        });
    }

    // --- Clip paths ---

    /// Clip everything drawn until the matching [`Canvas::pop_clip`] to the
    /// given rectangle.
    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.clip_stack.push((id.clone(), Vec::new()));
        id
    }

    pub fn pop_clip(&mut self) {
        if let Some((clip_id, children)) = self.clip_stack.pop() {
            self.push(SvgElement::Group { clip_id, children });
        }
    }

    // --- Text measurement ---

    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        match &self.font {
            Some(font) => font.measure(content, style.size),
            None => measure_text(content, style),
        }
    }

    // --- SVG output ---

    fn push(&mut self, elem: SvgElement) {
        match self.clip_stack.last_mut() {
            Some((_, children)) => children.push(elem),
            None => self.elements.push(elem),
        }
    }

    /// Number of top-level elements (open clip groups excluded).
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialise to an SVG document. Unclosed clip groups are closed first.
    pub fn finish_svg(mut self) -> String {
        while !self.clip_stack.is_empty() {
            self.pop_clip();
        }
        self.to_string()
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family=""#,
            w = self.width,
            h = self.height,
        )?;
        if self.font.is_some() {
            write!(f, "'{EMBEDDED_FAMILY}', ")?;
        }
        write_escaped(f, &self.font_family)?;
        f.write_str("\">\n")?;

        if self.font.is_some() || !self.defs.is_empty() {
            f.write_str("<defs>\n")?;
            if let Some(font) = &self.font {
                writeln!(f, "{}", font.svg_font_style())?;
            }
            for d in &self.defs {
                writeln!(f, "{d}")?;
            }
            f.write_str("</defs>\n")?;
        }

        writeln!(
            f,
            r#"<rect width="{}" height="{}" fill="{}" />"#,
            self.width,
            self.height,
            self.background.to_svg()
        )?;

        for elem in &self.elements {
            write_element(f, elem)?;
        }
        f.write_str("</svg>\n")
    }
}

fn write_element(f: &mut fmt::Formatter<'_>, elem: &SvgElement) -> fmt::Result {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            write!(f, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#)?;
            write_style_attrs(f, style)?;
            f.write_str(" />\n")
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            write!(f, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#)?;
            write_line_attrs(f, style)?;
            f.write_str(" />\n")
        }
        SvgElement::Polyline { points, style } => {
            f.write_str(r#"<polyline points=""#)?;
            for (i, (x, y)) in points.iter().enumerate() {
                if i > 0 {
                    f.write_char(' ')?;
                }
                write!(f, "{x:.2},{y:.2}")?;
            }
            f.write_str(r#"" fill="none""#)?;
            write_line_attrs(f, style)?;
            f.write_str(" />\n")
        }
        SvgElement::Path { d, style } => {
            write!(f, r#"<path d="{d}""#)?;
            write_style_attrs(f, style)?;
            f.write_str(" />\n")
        }
        SvgElement::Text { x, y, content, style, rotate } => {
            write!(f, r#"<text x="{x:.2}" y="{y:.2}" font-size="{:.1}""#, style.size)?;
            write!(f, r#" fill="{}""#, style.color.to_svg())?;
            write!(f, r#" text-anchor="{}""#, style.anchor.svg_value())?;
            write!(f, r#" dominant-baseline="{}""#, style.baseline.svg_value())?;
            if style.bold {
                f.write_str(r#" font-weight="bold""#)?;
            }
            if style.italic {
                f.write_str(r#" font-style="italic""#)?;
            }
            if let Some(angle) = rotate {
                write!(f, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#)?;
            }
            f.write_char('>')?;
            write_escaped(f, content)?;
            f.write_str("</text>\n")
        }
        SvgElement::Group { clip_id, children } => {
            writeln!(f, r#"<g clip-path="url(#{clip_id})">"#)?;
            for child in children {
                write_element(f, child)?;
            }
            f.write_str("</g>\n")
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, content: &str) -> fmt::Result {
    for ch in content.chars() {
        match ch {
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '&' => f.write_str("&amp;")?,
            '"' => f.write_str("&quot;")?,
            _ => f.write_char(ch)?,
        }
    }
    Ok(())
}

fn write_style_attrs(f: &mut fmt::Formatter<'_>, style: &Style) -> fmt::Result {
    match &style.fill {
        Some(fill) => write!(f, r#" fill="{}""#, fill.to_svg())?,
        None => f.write_str(r#" fill="none""#)?,
    }
    match &style.outline {
        Some(line) => write_line_attrs(f, line),
        None => Ok(()),
    }
}

fn write_line_attrs(f: &mut fmt::Formatter<'_>, style: &LineStyle) -> fmt::Result {
    write!(f, r#" stroke="{}" stroke-width="{:.2}""#, style.color.to_svg(), style.width)?;
    if let Some(dash) = style.dash.dasharray() {
        write!(f, r#" stroke-dasharray="{dash}""#)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas() {
        let svg = Canvas::new(100.0, 50.0).finish_svg();
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("height=\"50\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn text_is_escaped() {
        let mut c = Canvas::new(200.0, 100.0);
        c.text(10.0, 20.0, "a < b & c", &TextStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn clip_wraps_elements() {
        let mut c = Canvas::new(200.0, 100.0);
        let id = c.push_clip(10.0, 10.0, 50.0, 50.0);
        c.rect(0.0, 0.0, 100.0, 100.0, &Style::filled(Color::hex("#ff0000")));
        c.pop_clip();
        c.line(0.0, 0.0, 1.0, 1.0, &LineStyle::default());
        assert_eq!(c.len(), 2);

        let svg = c.finish_svg();
        assert!(svg.contains(&format!(r#"<clipPath id="{id}">"#)));
        let group = svg.find(&format!("url(#{id})")).unwrap();
        let rect = svg.find(r##"fill="#ff0000""##).unwrap();
        let close = svg.find("</g>").unwrap();
        assert!(group < rect && rect < close);
    }

    #[test]
    fn font_family_is_escaped() {
        let svg = Canvas::new(10.0, 10.0).with_font_family(r#""Fira Sans" & serif"#).finish_svg();
        assert!(svg.contains(r#"font-family="&quot;Fira Sans&quot; &amp; serif">"#), "{svg}");
    }

    #[test]
    fn embedded_font_drives_metrics() {
        let candidates =
            ["/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", "/usr/share/fonts/TTF/DejaVuSans.ttf"];
        let Some(path) = candidates.into_iter().map(std::path::Path::new).find(|p| p.exists())
        else {
            return;
        };
        let font = FontHandle::load(path).unwrap();
        let style = TextStyle { size: 12.0, ..Default::default() };
        let expected = font.measure("N_Events", 12.0).width;
        let c = Canvas::new(10.0, 10.0).with_font(font);
        assert_eq!(c.measure_text("N_Events", &style).width, expected);

        let svg = c.finish_svg();
        assert!(svg.contains(&format!(r#"font-family="'{EMBEDDED_FAMILY}', Helvetica"#)), "{svg}");
        assert!(svg.contains("<defs>\n<style>@font-face"));
    }

    #[test]
    fn outlined_rect_has_no_fill() {
        let mut c = Canvas::new(10.0, 10.0);
        c.rect(1.0, 1.0, 8.0, 8.0, &Style::outlined(LineStyle::dotted(Color::BLACK, 0.5)));
        let svg = c.finish_svg();
        assert!(svg.contains(r#"height="8.00" fill="none" stroke="#));
        assert!(svg.contains(r#"stroke-dasharray="3 3""#));
    }

    #[test]
    fn unclosed_clip_is_flushed() {
        let mut c = Canvas::new(10.0, 10.0);
        c.push_clip(0.0, 0.0, 5.0, 5.0);
        c.polyline(&[(0.0, 0.0), (1.0, 2.0)], &LineStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains("<polyline points=\"0.00,0.00 1.00,2.00\""));
        assert!(svg.contains("</g>"));
    }
}
