use dm_core::{Cutflow, Histogram, Stage};
use dm_viz::{
    BuiltinTheme, MassSpectrumArtifact, RenderError, VizConfig, known_resonances, render_json,
    render_svg, render_to_file, resolve_config,
};

/// Spectrum with a peak at every resonance plus a falling continuum.
fn spectrum() -> MassSpectrumArtifact {
    let mut h = Histogram::new(30_000, 0.25, 300.0).unwrap();
    let mut cutflow = Cutflow::new();
    let mut n = 0u64;
    for r in known_resonances() {
        for k in 0..200 {
            h.observe(r.mass_gev * (1.0 + (k as f64 - 100.0) * 1e-4));
            n += 1;
        }
    }
    for k in 1..2000 {
        h.observe(0.3 * (1.0 + k as f64 * 0.05));
        n += 1;
    }
    for _ in 0..n {
        for stage in Stage::ALL {
            cutflow.record_stage(stage, true);
        }
    }
    MassSpectrumArtifact::from_histogram(&h, &cutflow.report(), "Run2012BC_DoubleMuParked_Muons", n)
}

#[test]
fn svg_has_labels_axes_and_header() {
    let svg = render_svg(&spectrum(), &VizConfig::default()).unwrap();
    assert!(svg.starts_with("<svg"));
    for label in ["J/\u{03C8}", "\u{03C8}'", "\u{03A5}(1,2,3S)", "Z</text>", "\u{03C6}</text>"] {
        assert!(svg.contains(label), "missing label {label}");
    }
    assert!(svg.contains(">m_\u{03BC}\u{03BC} (GeV)</text>"));
    assert!(svg.contains(">N_Events</text>"));
    assert!(svg.contains(">CMS Open Data</text>"));
    assert!(svg.contains("11.6 fb"));
    assert!(svg.contains(">Run2012BC_DoubleMuParked_Muons</text>"));
    // Decimal decades on the mass axis, powers of ten on the count axis.
    assert!(svg.contains(">10</text>") && svg.contains(">100</text>"));
    assert!(svg.contains(">10\u{00B9}</text>"));
    assert!(svg.contains("<polyline"));
    assert!(svg.contains("clip-path=\"url(#clip0)\""));
}

#[test]
fn annotations_can_be_disabled() {
    let config = resolve_config(None, Some("annotations:\n  show: false\n")).unwrap();
    let svg = render_svg(&spectrum(), &config).unwrap();
    assert!(!svg.contains("J/\u{03C8}"));
}

#[test]
fn themes_render() {
    for theme in BuiltinTheme::ALL {
        let svg = render_svg(&spectrum(), &theme.base_config()).unwrap();
        assert!(svg.contains(&format!("width=\"{}\"", theme.base_config().figure.width)));
    }
    let minimal = render_svg(&spectrum(), &BuiltinTheme::Minimal.base_config()).unwrap();
    assert!(!minimal.contains("CMS"));
}

#[test]
fn json_and_file_round_trip() {
    let art = spectrum();
    let json = art.to_json_pretty().unwrap();
    let from_json = render_json(&json, &VizConfig::default()).unwrap();
    assert!(from_json.contains("J/\u{03C8}"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plots").join("mass.svg");
    render_to_file(&art, &path, &VizConfig::default()).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("N_Events"));

    let err = render_to_file(&art, &dir.path().join("mass.png"), &VizConfig::default());
    assert!(matches!(err, Err(RenderError::UnsupportedFormat(ref f)) if f == "png"));
}

#[test]
fn malformed_json_is_an_error() {
    assert!(matches!(render_json("{", &VizConfig::default()), Err(RenderError::Deserialize(_))));
}
