//! Log-log dimuon mass spectrum with resonance labels.

use crate::RenderError;
use crate::artifact::MassSpectrumArtifact;
use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::font::FontHandle;
use crate::header::draw_experiment_header;
use crate::layout::axes::{Axis, LogLabels};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::draw_axes;
use crate::primitives::*;

/// Headroom above the tallest bin (factor on a log axis) for the labels.
const Y_HEADROOM: f64 = 20.0;

pub fn render(artifact: &MassSpectrumArtifact, config: &VizConfig) -> crate::Result<String> {
    let edges = &artifact.bin_edges;
    let (Some(&first), Some(&last)) = (edges.first(), edges.last()) else {
        return Err(RenderError::Artifact("no bin edges".into()));
    };
    let x_min = config.spectrum.x_min.unwrap_or(first);
    let x_max = config.spectrum.x_max.unwrap_or(last);
    if !(x_min > 0.0 && x_min < x_max) {
        return Err(RenderError::Config(format!(
            "log mass axis needs 0 < x_min < x_max (got {x_min}, {x_max})"
        )));
    }

    let max_count = artifact.counts.iter().copied().max().unwrap_or(0);
    let x_axis = Axis::log_range(x_min, x_max, LogLabels::Decimal)
        .with_label(config.spectrum.x_label.as_str());
    let y_axis = Axis::auto_log(0.5, (max_count.max(1) as f64) * Y_HEADROOM, LogLabels::Power)
        .with_label(config.spectrum.y_label.as_str());

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)
        .with_font_family(config.font.family.as_str());
    if let Some(path) = &config.font.file {
        canvas = canvas.with_font(FontHandle::load(path)?);
        tracing::debug!(font = %path.display(), "embedding font");
    }
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, config);

    draw_experiment_header(&mut canvas, &area, config);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    let outline = step_outline(artifact, &x_axis, &y_axis, &area);
    if let Some(fill) = config.colors.fill {
        canvas.filled_path(&outline, &Style::filled(fill));
    }
    canvas.polyline(&outline, &LineStyle::solid(config.colors.histogram, 0.9));
    canvas.pop_clip();

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    if config.annotations.show {
        draw_resonance_labels(&mut canvas, artifact, &x_axis, &y_axis, &area, config);
    }
    if config.spectrum.show_dataset {
        draw_dataset_info(&mut canvas, artifact, &area, config);
    }

    tracing::debug!(
        bins = artifact.counts.len(),
        vertices = outline.len(),
        max_count,
        "mass spectrum rendered"
    );
    Ok(canvas.finish_svg())
}

/// Closed step outline in pixel space: up from the baseline at the first
/// edge, along the bin tops (runs of equal counts merged), down at the last
/// edge. Empty bins sit on the baseline.
fn step_outline(
    artifact: &MassSpectrumArtifact,
    x_axis: &Axis,
    y_axis: &Axis,
    area: &PlotArea,
) -> Vec<(f64, f64)> {
    let edges = &artifact.bin_edges;
    let counts = &artifact.counts;
    let x_px = |v: f64| x_axis.data_to_pixel(v, area.left, area.right());
    let y_px = |n: u64| {
        if n == 0 { area.bottom() } else { y_axis.data_to_pixel(n as f64, area.bottom(), area.top) }
    };

    let mut points = Vec::new();
    points.push((x_px(edges[0]), area.bottom()));
    let mut start = 0;
    while start < counts.len() {
        let n = counts[start];
        let mut end = start + 1;
        while end < counts.len() && counts[end] == n {
            end += 1;
        }
        let y = y_px(n);
        points.push((x_px(edges[start]), y));
        points.push((x_px(edges[end]), y));
        start = end;
    }
    points.push((x_px(edges[counts.len()]), area.bottom()));
    points
}

fn draw_resonance_labels(
    canvas: &mut Canvas,
    artifact: &MassSpectrumArtifact,
    x_axis: &Axis,
    y_axis: &Axis,
    area: &PlotArea,
    config: &VizConfig,
) {
    let style = TextStyle {
        size: config.annotations.size,
        color: config.colors.annotation,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };
    for res in artifact.annotations.iter().filter(|r| x_axis.contains(r.mass_gev)) {
        let peak = artifact
            .local_maximum(res.mass_gev, config.annotations.window)
            .map(|(_, n)| n)
            .unwrap_or(0);
        let py = if peak == 0 {
            area.bottom()
        } else {
            y_axis.data_to_pixel(peak as f64, area.bottom(), area.top)
        };
        let y = (py - config.annotations.offset).max(area.top + style.size + 2.0);
        let x = x_axis.data_to_pixel(res.mass_gev, area.left, area.right());
        canvas.text(x, y, &res.label, &style);
    }
}

fn draw_dataset_info(
    canvas: &mut Canvas,
    artifact: &MassSpectrumArtifact,
    area: &PlotArea,
    config: &VizConfig,
) {
    let style = TextStyle { size: config.font.size, ..Default::default() };
    let x = area.left + 10.0;
    let mut y = area.top + config.font.size + 8.0;
    if !artifact.meta.dataset.is_empty() {
        canvas.text(x, y, &artifact.meta.dataset, &style);
        y += config.font.size + 4.0;
    }
    let selected = artifact.selected().unwrap_or_else(|| artifact.entries());
    canvas.text(x, y, &format!("{selected} dimuon events"), &style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::{Cutflow, Histogram};

    #[test]
    fn outline_merges_equal_runs() {
        let mut h = Histogram::new(4, 1.0, 5.0).unwrap();
        h.observe(2.5);
        h.observe(3.5);
        let art = MassSpectrumArtifact::from_histogram(&h, &Cutflow::new().report(), "", 2);
        let x = Axis::log_range(1.0, 5.0, LogLabels::Decimal);
        let y = Axis::auto_log(0.5, 10.0, LogLabels::Power);
        let area = PlotArea { left: 0.0, top: 0.0, width: 100.0, height: 100.0 };
        let pts = step_outline(&art, &x, &y, &area);
        // baseline, [0] run, [1..3) run, [3] run, baseline
        assert_eq!(pts.len(), 2 + 3 * 2);
        assert_eq!(pts.first().unwrap().1, 100.0);
        assert_eq!(pts.last().unwrap().1, 100.0);
        assert!(pts[3].1 < 100.0);
    }

    #[test]
    fn rejects_bad_x_range() {
        let h = Histogram::new(4, 1.0, 5.0).unwrap();
        let art = MassSpectrumArtifact::from_histogram(&h, &Cutflow::new().report(), "", 0);
        let mut cfg = VizConfig::default();
        cfg.spectrum.x_min = Some(0.0);
        assert!(matches!(render(&art, &cfg), Err(RenderError::Config(_))));
    }

    #[test]
    fn unreadable_font_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("face.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let h = Histogram::new(4, 1.0, 5.0).unwrap();
        let art = MassSpectrumArtifact::from_histogram(&h, &Cutflow::new().report(), "", 0);
        let mut cfg = VizConfig::default();
        cfg.font.file = Some(bogus);
        assert!(matches!(render(&art, &cfg), Err(RenderError::Font(_))));

        cfg.font.file = Some(dir.path().join("missing.ttf"));
        let err = render(&art, &cfg).unwrap_err();
        assert!(err.to_string().contains("missing.ttf"), "{err}");
    }
}
