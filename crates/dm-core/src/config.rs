//! Analysis configuration (YAML or JSON, every section optional).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kinematics::MassPolicy;

/// Default dataset: the CMS 2012 DoubleMuParked NanoAOD skim.
pub const DEFAULT_DATASET_NAME: &str = "Run2012BC_DoubleMuParked_Muons";

/// Default tree name inside ROOT inputs.
pub const DEFAULT_TREE_NAME: &str = "Events";

/// Default event-count ceiling.
pub const DEFAULT_MAX_EVENTS: u64 = 1_000_000;

/// Top-level analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input dataset.
    pub dataset: DatasetConfig,
    /// Only the first `max_events` events are processed (`None` = all).
    pub max_events: Option<u64>,
    /// Mass histogram binning.
    pub histogram: HistogramConfig,
    /// Negative-radicand handling in the mass formula.
    pub mass_policy: MassPolicy,
    /// Worker threads: 0 runs on the ambient rayon pool, 1 is sequential,
    /// larger values run on a pool of exactly that size.
    pub threads: usize,
    /// Events per parallel work item.
    pub chunk_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            max_events: Some(DEFAULT_MAX_EVENTS),
            histogram: HistogramConfig::default(),
            mass_policy: MassPolicy::Clamp,
            threads: 0,
            chunk_size: 64 * 1024,
        }
    }
}

/// Dataset name and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Display name.
    pub name: String,
    /// Path or URI of the input file.
    pub locator: String,
    /// Tree name for ROOT inputs.
    pub tree: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DATASET_NAME.into(),
            locator: format!("{DEFAULT_DATASET_NAME}.parquet"),
            tree: DEFAULT_TREE_NAME.into(),
        }
    }
}

/// Uniform binning `{bins, low, up}` in GeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    /// Number of bins.
    pub bins: usize,
    /// Lower edge.
    pub low: f64,
    /// Upper edge.
    pub up: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self { bins: 30_000, low: 0.25, up: 300.0 }
    }
}

impl AnalysisConfig {
    /// Parse from a YAML string (JSON is valid YAML).
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: AnalysisConfig = serde_yaml_ng::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: AnalysisConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref()
        {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") | None => Self::from_yaml_str(&text),
            Some(other) => {
                Err(Error::Validation(format!("unsupported config extension '.{other}'")))
            }
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let h = &self.histogram;
        if h.bins == 0 {
            return Err(Error::Validation("histogram.bins must be > 0".into()));
        }
        if !(h.low.is_finite() && h.up.is_finite() && h.low < h.up) {
            return Err(Error::Validation(format!(
                "histogram range must satisfy low < up (got low={}, up={})",
                h.low, h.up
            )));
        }
        if self.chunk_size == 0 {
            return Err(Error::Validation("chunk_size must be > 0".into()));
        }
        Ok(())
    }
}
