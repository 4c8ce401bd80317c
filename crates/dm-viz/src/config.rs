use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::RenderError;
use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level visualization configuration (YAML or programmatic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub experiment: ExperimentConfig,
    pub colors: ColorsConfig,
    pub annotations: AnnotationsConfig,
    pub spectrum: SpectrumConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Dimuon.base_config()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self { width: 576.0, height: 432.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    /// TrueType/OpenType file used for text metrics and embedded in the SVG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Helvetica, Arial, sans-serif".into(),
            file: None,
            size: 10.0,
            label_size: 12.0,
            tick_size: 9.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 6.0,
            minor_tick_length: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: false, color: Color::hex("#CBD5E1"), alpha: 0.55 }
    }
}

/// Experiment header: bold name, italic status, energy and luminosity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub name: String,
    pub status: String,
    pub sqrt_s_tev: f64,
    pub lumi_fb_inv: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { name: "CMS Open Data".into(), status: String::new(), sqrt_s_tev: 8.0, lumi_fb_inv: 11.6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Histogram outline.
    pub histogram: Color,
    /// Area under the histogram (`None` = unfilled).
    pub fill: Option<Color>,
    /// Resonance labels.
    pub annotation: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            histogram: Color::hex("#1D4ED8"),
            fill: Some(Color::hex("#1D4ED8").with_alpha(0.15)),
            annotation: Color::hex("#111827"),
        }
    }
}

/// Resonance labels drawn above the spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationsConfig {
    pub show: bool,
    /// Label font size (pt).
    pub size: f64,
    /// Gap between the local maximum and the label baseline (pt).
    pub offset: f64,
    /// Half-width of the local-maximum search window, relative to the mass.
    pub window: f64,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self { show: true, size: 10.0, offset: 6.0, window: 0.05 }
    }
}

/// Mass-spectrum specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    pub x_label: String,
    pub y_label: String,
    /// Override of the x range (defaults to the histogram range).
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    /// Print the dataset name and selected-event count inside the frame.
    pub show_dataset: bool,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            x_label: "m_\u{03BC}\u{03BC} (GeV)".into(),
            y_label: "N_Events".into(),
            x_min: None,
            x_max: None,
            show_dataset: true,
        }
    }
}

/// Resolve a [`VizConfig`]: built-in theme, then user YAML overrides.
///
/// The theme is `theme` if given, else the `theme:` key of `user_yaml`,
/// else `dimuon`. Keys present in `user_yaml` replace the theme's values;
/// nested sections are merged key by key.
pub fn resolve_config(theme: Option<&str>, user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    let overlay = match user_yaml {
        Some(yaml) => serde_yaml_ng::from_str::<Value>(yaml).map_err(config_err)?,
        None => Value::Null,
    };

    let theme_name = theme
        .or_else(|| overlay.get("theme").and_then(Value::as_str))
        .unwrap_or(BuiltinTheme::Dimuon.name());
    let builtin = BuiltinTheme::parse(theme_name)
        .ok_or_else(|| RenderError::Config(format!("unknown theme '{theme_name}'")))?;
    tracing::debug!(theme = builtin.name(), "resolving viz config");

    let base = builtin.base_config();
    if overlay.is_null() {
        return Ok(base);
    }
    let mut merged = serde_yaml_ng::to_value(base).map_err(config_err)?;
    merge_yaml(&mut merged, overlay);
    let mut config: VizConfig = serde_yaml_ng::from_value(merged).map_err(config_err)?;
    config.theme = builtin.name().into();
    Ok(config)
}

fn config_err(e: serde_yaml_ng::Error) -> RenderError {
    RenderError::Config(e.to_string())
}

fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (k, v) in overlay {
                if let Some(slot) = base.get_mut(&k) {
                    merge_yaml(slot, v);
                } else {
                    base.insert(k, v);
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_dimuon_theme() {
        let c = resolve_config(None, None).unwrap();
        assert_eq!(c, VizConfig::default());
        assert_eq!(c.theme, "dimuon");
        assert_eq!(c.experiment.name, "CMS Open Data");
        assert_eq!(c.experiment.sqrt_s_tev, 8.0);
    }

    #[test]
    fn yaml_overrides_single_keys() {
        let yaml = "theme: cms\nexperiment:\n  lumi_fb_inv: 2.0\nannotations:\n  show: false\n";
        let c = resolve_config(None, Some(yaml)).unwrap();
        assert_eq!(c.theme, "cms");
        assert_eq!(c.experiment.name, "CMS");
        assert_eq!(c.experiment.lumi_fb_inv, 2.0);
        assert!(!c.annotations.show);
        assert_eq!(c.figure, BuiltinTheme::Cms.base_config().figure);
    }

    #[test]
    fn explicit_theme_wins() {
        let c = resolve_config(Some("minimal"), Some("theme: cms\n")).unwrap();
        assert_eq!(c.theme, "minimal");
        assert!(c.experiment.name.is_empty());
    }

    #[test]
    fn font_file_from_yaml() {
        let c = resolve_config(None, Some("font:\n  file: /tmp/face.ttf\n")).unwrap();
        assert_eq!(c.font.file.as_deref(), Some(std::path::Path::new("/tmp/face.ttf")));
        assert_eq!(c.font.size, FontConfig::default().size);
    }

    #[test]
    fn errors_are_reported() {
        assert!(matches!(resolve_config(Some("atlas"), None), Err(RenderError::Config(_))));
        assert!(resolve_config(None, Some("colors:\n  histogram: not-a-colour\n")).is_err());
    }
}
