//! # dm-viz
//!
//! SVG rendering of dimuon invariant-mass spectra: a log-log step histogram
//! with an experiment header and labels for the known resonances.
//!
//! Rendering is driven by a [`artifact::MassSpectrumArtifact`], a plain
//! serializable snapshot of the histogram and cut-flow, and a
//! [`config::VizConfig`] resolved from a built-in theme plus YAML overrides.

pub mod artifact;
pub mod canvas;
pub mod color;
pub mod config;
pub mod font;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use std::path::Path;

pub use artifact::{MassSpectrumArtifact, Resonance, known_resonances};
pub use config::{VizConfig, resolve_config};
pub use theme::BuiltinTheme;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("invalid artifact: {0}")]
    Artifact(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render a mass-spectrum artifact to an SVG document.
pub fn render_svg(artifact: &MassSpectrumArtifact, config: &VizConfig) -> Result<String> {
    artifact.validate()?;
    plots::mass_spectrum::render(artifact, config)
}

/// Render artifact JSON (as written by `dimuon run --artifact`) to SVG.
pub fn render_json(artifact_json: &str, config: &VizConfig) -> Result<String> {
    let artifact = MassSpectrumArtifact::from_json(artifact_json)?;
    plots::mass_spectrum::render(&artifact, config)
}

/// Render to a file; the extension must be `.svg` (or absent).
pub fn render_to_file(
    artifact: &MassSpectrumArtifact,
    path: &Path,
    config: &VizConfig,
) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        None => {}
        Some(ext) if ext.eq_ignore_ascii_case("svg") => {}
        Some(other) => return Err(RenderError::UnsupportedFormat(other.to_string())),
    }
    let svg = render_svg(artifact, config)?;
    output::svg::save_svg(&svg, path)?;
    tracing::info!(path = %path.display(), bytes = svg.len(), "plot written");
    Ok(())
}
