//! Serializable mass-spectrum artifact (numbers-first, renderer-agnostic).
//!
//! `dimuon run --artifact` writes this as JSON; `dimuon render` turns it
//! back into an SVG without re-reading the dataset.

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use dm_core::{CutflowReport, Histogram};
use serde::{Deserialize, Serialize};

use crate::{RenderError, Result};

/// Current artifact schema identifier.
pub const SCHEMA_VERSION: &str = "dimuon_mass_spectrum_v1";

/// A known dimuon resonance to annotate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resonance {
    pub label: String,
    pub mass_gev: f64,
}

impl Resonance {
    pub fn new(label: impl Into<String>, mass_gev: f64) -> Self {
        Self { label: label.into(), mass_gev }
    }
}

/// η, ρ/ω, φ, J/ψ, ψ′, Υ(1,2,3S) and Z.
pub fn known_resonances() -> Vec<Resonance> {
    vec![
        Resonance::new("\u{03B7}", 0.548),
        Resonance::new("\u{03C1},\u{03C9}", 0.78),
        Resonance::new("\u{03C6}", 1.019),
        Resonance::new("J/\u{03C8}", 3.097),
        Resonance::new("\u{03C8}'", 3.686),
        Resonance::new("\u{03A5}(1,2,3S)", 10.0),
        Resonance::new("Z", 91.19),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumMeta {
    pub tool: String,
    pub tool_version: String,
    pub created_unix_ms: u64,
    pub dataset: String,
    pub events_processed: u64,
}

/// One cut-flow stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutflowRow {
    pub key: String,
    pub label: String,
    pub pass: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassSpectrumArtifact {
    pub schema_version: String,
    pub meta: SpectrumMeta,
    /// `counts.len() + 1` increasing edges (GeV).
    pub bin_edges: Vec<f64>,
    pub counts: Vec<u64>,
    #[serde(default)]
    pub underflow: u64,
    #[serde(default)]
    pub overflow: u64,
    #[serde(default)]
    pub nan: u64,
    pub cutflow: Vec<CutflowRow>,
    #[serde(default = "known_resonances")]
    pub annotations: Vec<Resonance>,
}

impl MassSpectrumArtifact {
    pub fn from_histogram(
        histogram: &Histogram,
        cutflow: &CutflowReport,
        dataset: &str,
        events_processed: u64,
    ) -> Self {
        let created_unix_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0);
        Self {
            schema_version: SCHEMA_VERSION.into(),
            meta: SpectrumMeta {
                tool: "dimuon".into(),
                tool_version: env!("CARGO_PKG_VERSION").into(),
                created_unix_ms,
                dataset: dataset.into(),
                events_processed,
            },
            bin_edges: histogram.bin_edges(),
            counts: histogram.counts().to_vec(),
            underflow: histogram.underflow(),
            overflow: histogram.overflow(),
            nan: histogram.nan(),
            cutflow: cutflow
                .entries
                .iter()
                .map(|e| CutflowRow { key: e.stage.key().into(), label: e.label.clone(), pass: e.pass })
                .collect(),
            annotations: known_resonances(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks needed for log-log rendering.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(RenderError::Artifact(format!(
                "unsupported schema_version '{}' (expected '{SCHEMA_VERSION}')",
                self.schema_version
            )));
        }
        if self.counts.is_empty() || self.bin_edges.len() != self.counts.len() + 1 {
            return Err(RenderError::Artifact(format!(
                "expected counts.len() + 1 bin edges, got {} edges for {} bins",
                self.bin_edges.len(),
                self.counts.len()
            )));
        }
        if self.bin_edges.windows(2).any(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less)) {
            return Err(RenderError::Artifact("bin edges must be strictly increasing".into()));
        }
        if self.bin_edges[0] <= 0.0 {
            return Err(RenderError::Artifact(format!(
                "log mass axis needs a positive lower edge, got {}",
                self.bin_edges[0]
            )));
        }
        Ok(())
    }

    /// Entries inside the histogram range.
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Events passing the final selection stage.
    pub fn selected(&self) -> Option<u64> {
        self.cutflow.last().map(|r| r.pass)
    }

    /// Bin index and count of the fullest bin whose centre lies within
    /// `mass · (1 ± window)`.
    pub fn local_maximum(&self, mass: f64, window: f64) -> Option<(usize, u64)> {
        let (lo, hi) = (mass * (1.0 - window), mass * (1.0 + window));
        self.bin_edges
            .windows(2)
            .zip(&self.counts)
            .enumerate()
            .filter(|(_, (w, _))| {
                let c = 0.5 * (w[0] + w[1]);
                c >= lo && c <= hi
            })
            .map(|(i, (_, &n))| (i, n))
            .max_by_key(|&(i, n)| (n, std::cmp::Reverse(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::{Cutflow, Stage};

    fn artifact() -> MassSpectrumArtifact {
        let mut h = Histogram::new(100, 0.5, 100.5).unwrap();
        for m in [3.0, 3.1, 3.1, 91.2, 200.0] {
            h.observe(m);
        }
        let mut c = Cutflow::new();
        for _ in 0..5 {
            c.record_stage(Stage::Loaded, true);
            c.record_stage(Stage::TwoMuons, true);
            c.record_stage(Stage::OppositeCharge, true);
        }
        MassSpectrumArtifact::from_histogram(&h, &c.report(), "test", 5)
    }

    #[test]
    fn built_from_histogram() {
        let a = artifact();
        a.validate().unwrap();
        assert_eq!(a.counts.len(), 100);
        assert_eq!(a.entries(), 4);
        assert_eq!(a.overflow, 1);
        assert_eq!(a.selected(), Some(5));
        assert_eq!(a.cutflow[1].key, "two_muons");
        assert_eq!(a.annotations.len(), 7);
    }

    #[test]
    fn json_round_trip_and_defaults() {
        let a = artifact();
        let back = MassSpectrumArtifact::from_json(&a.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, a);

        let mut v: serde_json::Value = serde_json::to_value(&a).unwrap();
        v.as_object_mut().unwrap().remove("annotations");
        let back: MassSpectrumArtifact = serde_json::from_value(v).unwrap();
        assert_eq!(back.annotations, known_resonances());
    }

    #[test]
    fn invalid_artifacts_rejected() {
        let mut a = artifact();
        a.bin_edges.pop();
        assert!(matches!(a.validate(), Err(RenderError::Artifact(_))));

        let mut a = artifact();
        a.bin_edges[0] = 0.0;
        assert!(a.validate().is_err());

        let mut a = artifact();
        a.schema_version = "v0".into();
        assert!(a.validate().is_err());
    }

    #[test]
    fn local_maximum_prefers_fullest_bin() {
        let a = artifact();
        // Bins are 1 GeV wide starting at 0.5: 3.0 and 3.1 both land in bin 2.
        assert_eq!(a.local_maximum(3.097, 0.2), Some((2, 3)));
        assert_eq!(a.local_maximum(91.19, 0.01), Some((90, 1)));
        assert_eq!(a.local_maximum(0.01, 0.01), None);
    }
}
