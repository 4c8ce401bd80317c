/// How logarithmic tick labels are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLabels {
    /// `10⁻¹`, `10⁰`, `10¹` ...
    Power,
    /// `0.1`, `1`, `10` ...
    Decimal,
}

/// Logarithmic axis with decade ticks and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

impl Axis {
    /// Logarithmic axis widened outward to whole decades.
    pub fn auto_log(data_min: f64, data_max: f64, labels: LogLabels) -> Self {
        let lo = data_min.max(1e-20).log10().floor() as i32;
        let hi = data_max.max(data_min * 10.0).max(1e-20).log10().ceil() as i32;
        Self::log_range(decade_value(1.0, lo), decade_value(1.0, hi), labels)
    }

    /// Logarithmic axis spanning exactly `[min, max]`, with major ticks at
    /// the decades inside the range and minor ticks at 2..9 × decade.
    pub fn log_range(min: f64, max: f64, labels: LogLabels) -> Self {
        let min = min.max(1e-20);
        let max = max.max(min * 10.0);
        let lo = min.log10().floor() as i32;
        let hi = max.log10().ceil() as i32;
        let inside = |v: f64| v >= min * (1.0 - 1e-9) && v <= max * (1.0 + 1e-9);

        let mut ticks = Vec::new();
        let mut tick_labels = Vec::new();
        let mut minor = Vec::new();
        for exp in lo..=hi {
            let decade = decade_value(1.0, exp);
            if inside(decade) {
                ticks.push(decade);
                tick_labels.push(match labels {
                    LogLabels::Power => format!("10{}", superscript(exp)),
                    LogLabels::Decimal => format_decade(exp),
                });
            }
            for m in 2..=9 {
                let mv = decade_value(m as f64, exp);
                if inside(mv) {
                    minor.push(mv);
                }
            }
        }

        Self {
            min,
            max,
            label: String::new(),
            tick_positions: ticks,
            tick_labels,
            minor_ticks: minor,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Map a data value to pixel coordinate. Non-positive values map to the
    /// axis minimum.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let v = if value > 0.0 { value } else { self.min };
        let frac = (v.ln() - self.min.ln()) / (self.max.ln() - self.min.ln());
        px_min + frac * (px_max - px_min)
    }

    /// `true` if `value` lies inside the axis range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// `m × 10^exp`, rounded once so that e.g. `0.3` compares equal to the literal.
fn decade_value(m: f64, exp: i32) -> f64 {
    if exp < 0 { m / 10f64.powi(-exp) } else { m * 10f64.powi(exp) }
}

fn format_decade(exp: i32) -> String {
    if exp >= 0 {
        format!("{}", 10u64.pow(exp as u32))
    } else {
        format!("{:.*}", (-exp) as usize, decade_value(1.0, exp))
    }
}

fn superscript(n: i32) -> String {
    n.to_string()
        .chars()
        .map(|c| match c {
            '-' => '\u{207B}',
            '0' => '\u{2070}',
            '1' => '\u{00B9}',
            '2' => '\u{00B2}',
            '3' => '\u{00B3}',
            '4' => '\u{2074}',
            '5' => '\u{2075}',
            '6' => '\u{2076}',
            '7' => '\u{2077}',
            '8' => '\u{2078}',
            '9' => '\u{2079}',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn data_to_pixel_is_logarithmic() {
        let ax = Axis::log_range(1.0, 100.0, LogLabels::Decimal);
        assert_relative_eq!(ax.data_to_pixel(1.0, 0.0, 400.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(ax.data_to_pixel(10.0, 0.0, 400.0), 200.0, epsilon = 1e-9);
        assert_relative_eq!(ax.data_to_pixel(100.0, 0.0, 400.0), 400.0, epsilon = 1e-9);
        assert!(ax.contains(3.097));
        assert!(!ax.contains(0.5));
    }

    #[test]
    fn log_range_keeps_exact_limits() {
        let ax = Axis::log_range(0.25, 300.0, LogLabels::Decimal);
        assert_eq!(ax.min, 0.25);
        assert_eq!(ax.max, 300.0);
        assert_eq!(ax.tick_labels, ["1", "10", "100"]);
        assert!(ax.minor_ticks.contains(&0.3));
        assert!(ax.minor_ticks.contains(&300.0));
        assert!(!ax.minor_ticks.contains(&0.2));
    }

    #[test]
    fn auto_log_widens_to_decades() {
        let ax = Axis::auto_log(0.5, 4200.0, LogLabels::Power);
        assert_eq!(ax.min, 0.1);
        assert_eq!(ax.max, 10_000.0);
        assert_eq!(ax.tick_labels.first().map(String::as_str), Some("10\u{207B}\u{00B9}"));
        assert_eq!(ax.tick_labels.len(), 6);
        // log(0) is pinned to the bottom.
        assert_eq!(ax.data_to_pixel(0.0, 100.0, 0.0), 100.0);
    }

    #[test]
    fn decade_labels() {
        assert_eq!(format_decade(-2), "0.01");
        assert_eq!(format_decade(0), "1");
        assert_eq!(format_decade(3), "1000");
    }
}
