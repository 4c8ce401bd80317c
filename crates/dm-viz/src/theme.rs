use crate::color::Color;
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    /// Open-data style: "CMS Open Data" header, filled blue spectrum.
    Dimuon,
    /// Square CMS-style figure with a black outline.
    Cms,
    /// No header, outward ticks, light grid.
    Minimal,
}

impl BuiltinTheme {
    pub const ALL: [BuiltinTheme; 3] = [Self::Dimuon, Self::Cms, Self::Minimal];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name().eq_ignore_ascii_case(s.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dimuon => "dimuon",
            Self::Cms => "cms",
            Self::Minimal => "minimal",
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Dimuon => dimuon(),
            Self::Cms => cms(),
            Self::Minimal => minimal(),
        }
    }
}

fn dimuon() -> VizConfig {
    VizConfig {
        theme: "dimuon".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        experiment: ExperimentConfig::default(),
        colors: ColorsConfig::default(),
        annotations: AnnotationsConfig::default(),
        spectrum: SpectrumConfig::default(),
    }
}

fn cms() -> VizConfig {
    VizConfig {
        theme: "cms".into(),
        figure: FigureConfig { width: 600.0, height: 600.0 },
        font: FontConfig { size: 11.0, label_size: 13.0, tick_size: 10.0, ..FontConfig::default() },
        experiment: ExperimentConfig {
            name: "CMS".into(),
            status: "Open Data".into(),
            ..ExperimentConfig::default()
        },
        colors: ColorsConfig {
            histogram: Color::BLACK,
            fill: None,
            annotation: Color::BLACK,
        },
        ..dimuon()
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        figure: FigureConfig { width: 504.0, height: 360.0 },
        font: FontConfig { size: 9.0, label_size: 10.0, tick_size: 8.0, ..FontConfig::default() },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
        },
        grid: GridConfig { show: true, ..GridConfig::default() },
        experiment: ExperimentConfig {
            name: String::new(),
            status: String::new(),
            sqrt_s_tev: 0.0,
            lumi_fb_inv: 0.0,
        },
        colors: ColorsConfig { histogram: Color::hex("#374151"), ..ColorsConfig::default() },
        spectrum: SpectrumConfig { show_dataset: false, ..SpectrumConfig::default() },
        ..dimuon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        for t in BuiltinTheme::ALL {
            assert_eq!(BuiltinTheme::parse(t.name()), Some(t));
            assert_eq!(t.base_config().theme, t.name());
        }
        assert_eq!(BuiltinTheme::parse(" CMS "), Some(BuiltinTheme::Cms));
        assert_eq!(BuiltinTheme::parse("atlas"), None);
    }
}
