use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Which frame edge a tick sits on.
#[derive(Clone, Copy)]
enum Edge {
    Bottom,
    Top,
    Left,
    Right,
}

/// Draw the box frame with major/minor ticks, optional grid, tick labels and
/// axis titles.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &VizConfig,
) {
    let frame = Style::outlined(LineStyle::solid(Color::BLACK, 0.8));
    canvas.rect(area.left, area.top, area.width, area.height, &frame);

    let inward = config.axes.tick_direction == "in";
    let major = LineStyle::solid(Color::BLACK, 0.6);
    let minor = LineStyle::solid(Color::BLACK, 0.4);
    let grid = LineStyle::dotted(config.grid.color.with_alpha(config.grid.alpha), 0.5);

    let x_px = |v: f64| x_axis.data_to_pixel(v, area.left, area.right());
    let y_px = |v: f64| y_axis.data_to_pixel(v, area.bottom(), area.top);
    let in_x = |px: f64| px >= area.left - 0.5 && px <= area.right() + 0.5;
    let in_y = |py: f64| py >= area.top - 0.5 && py <= area.bottom() + 0.5;

    // --- X axis ---
    let x_label_style = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };
    let x_label_y = area.bottom() + if inward { 4.0 } else { config.axes.tick_length + 4.0 };
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_px(val);
        if !in_x(px) {
            continue;
        }
        if config.grid.show {
            canvas.line(px, area.top, px, area.bottom(), &grid);
        }
        tick(canvas, area, Edge::Bottom, px, config.axes.tick_length, inward, &major);
        if config.axes.show_top_ticks {
            tick(canvas, area, Edge::Top, px, config.axes.tick_length, inward, &major);
        }
        if let Some(label) = x_axis.tick_labels.get(i) {
            canvas.text(px, x_label_y, label, &x_label_style);
        }
    }
    for px in x_axis.minor_ticks.iter().map(|&v| x_px(v)).filter(|&px| in_x(px)) {
        tick(canvas, area, Edge::Bottom, px, config.axes.minor_tick_length, inward, &minor);
        if config.axes.show_top_ticks {
            tick(canvas, area, Edge::Top, px, config.axes.minor_tick_length, inward, &minor);
        }
    }

    // --- Y axis ---
    let y_label_style = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let y_label_x = area.left - if inward { 4.0 } else { config.axes.tick_length + 4.0 };
    let mut widest = 0.0_f64;
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_px(val);
        if !in_y(py) {
            continue;
        }
        if config.grid.show {
            canvas.line(area.left, py, area.right(), py, &grid);
        }
        tick(canvas, area, Edge::Left, py, config.axes.tick_length, inward, &major);
        if config.axes.show_right_ticks {
            tick(canvas, area, Edge::Right, py, config.axes.tick_length, inward, &major);
        }
        if let Some(label) = y_axis.tick_labels.get(i) {
            widest = widest.max(canvas.measure_text(label, &y_label_style).width);
            canvas.text(y_label_x, py, label, &y_label_style);
        }
    }
    for py in y_axis.minor_ticks.iter().map(|&v| y_px(v)).filter(|&py| in_y(py)) {
        tick(canvas, area, Edge::Left, py, config.axes.minor_tick_length, inward, &minor);
        if config.axes.show_right_ticks {
            tick(canvas, area, Edge::Right, py, config.axes.minor_tick_length, inward, &minor);
        }
    }

    // --- Axis titles (right/top aligned, ROOT style) ---
    let title_style = TextStyle {
        size: config.font.label_size,
        anchor: TextAnchor::End,
        ..Default::default()
    };
    if !x_axis.label.is_empty() {
        let y = x_label_y + config.font.tick_size + config.font.label_size + 4.0;
        canvas.text(area.right(), y, &x_axis.label, &title_style);
    }
    if !y_axis.label.is_empty() {
        let x = y_label_x - widest - 8.0;
        canvas.text_rotated(x, area.top, &y_axis.label, &title_style, -90.0);
    }
}

fn tick(
    canvas: &mut Canvas,
    area: &PlotArea,
    edge: Edge,
    pos: f64,
    len: f64,
    inward: bool,
    style: &LineStyle,
) {
    let len = if inward { len } else { -len };
    match edge {
        Edge::Bottom => canvas.line(pos, area.bottom(), pos, area.bottom() - len, style),
        Edge::Top => canvas.line(pos, area.top, pos, area.top + len, style),
        Edge::Left => canvas.line(area.left, pos, area.left + len, pos, style),
        Edge::Right => canvas.line(area.right(), pos, area.right() - len, pos, style),
    }
}
