use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Header line above the frame, e.g. **CMS** *Open Data* on the left and
/// `√s = 8 TeV, L = 11.6 fb⁻¹` on the right.
pub fn draw_experiment_header(canvas: &mut Canvas, area: &PlotArea, config: &VizConfig) {
    let exp = &config.experiment;
    let y = area.top - 7.0;

    if !exp.name.is_empty() {
        let bold_style = TextStyle {
            size: config.font.label_size * 1.3,
            bold: true,
            ..Default::default()
        };
        canvas.text(area.left, y, &exp.name, &bold_style);

        if !exp.status.is_empty() {
            let name_w = canvas.measure_text(&exp.name, &bold_style).width;
            let italic_style = TextStyle {
                size: bold_style.size * 0.85,
                italic: true,
                ..Default::default()
            };
            canvas.text(area.left + name_w + 5.0, y, &exp.status, &italic_style);
        }
    }

    if let Some(info) = energy_lumi_label(config) {
        let info_style = TextStyle {
            size: config.font.size,
            color: crate::color::Color::rgb(60, 60, 60),
            anchor: TextAnchor::End,
            ..Default::default()
        };
        canvas.text(area.right(), y, &info, &info_style);
    }
}

/// `√s = 8 TeV, L = 11.6 fb⁻¹`, omitting zero entries.
pub fn energy_lumi_label(config: &VizConfig) -> Option<String> {
    let exp = &config.experiment;
    let mut parts = Vec::new();
    if exp.sqrt_s_tev > 0.0 {
        parts.push(format!("\u{221A}s = {} TeV", exp.sqrt_s_tev));
    }
    if exp.lumi_fb_inv > 0.0 {
        parts.push(format!("L = {} fb\u{207B}\u{00B9}", exp.lumi_fb_inv));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::BuiltinTheme;

    #[test]
    fn default_energy_and_lumi() {
        let label = energy_lumi_label(&VizConfig::default()).unwrap();
        assert_eq!(label, "\u{221A}s = 8 TeV, L = 11.6 fb\u{207B}\u{00B9}");
        assert!(energy_lumi_label(&BuiltinTheme::Minimal.base_config()).is_none());
    }

    #[test]
    fn header_text_drawn() {
        let config = BuiltinTheme::Cms.base_config();
        let mut canvas = Canvas::new(400.0, 300.0);
        let area = PlotArea { left: 50.0, top: 40.0, width: 300.0, height: 200.0 };
        draw_experiment_header(&mut canvas, &area, &config);
        let svg = canvas.finish_svg();
        assert!(svg.contains(">CMS</text>"));
        assert!(svg.contains("font-style=\"italic\">Open Data</text>"));
    }
}
