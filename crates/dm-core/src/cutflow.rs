//! Cut-flow bookkeeping: how many events survive each selection stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Selection stages in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Every event read from the dataset (after the event-count ceiling).
    Loaded,
    /// Exactly two muons.
    TwoMuons,
    /// The two muons carry opposite charge.
    OppositeCharge,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Stage; 3] = [Stage::Loaded, Stage::TwoMuons, Stage::OppositeCharge];

    /// Stable machine-readable key.
    pub fn key(self) -> &'static str {
        match self {
            Stage::Loaded => "loaded",
            Stage::TwoMuons => "two_muons",
            Stage::OppositeCharge => "opposite_charge",
        }
    }

    /// Human-readable label used in printed reports.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Loaded => "All events",
            Stage::TwoMuons => "Events with exactly two muons",
            Stage::OppositeCharge => "Muons with opposite charge",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Mutable per-stage pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cutflow {
    counts: [u64; 3],
}

impl Cutflow {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event at `stage` if it passed.
    #[inline]
    pub fn record_stage(&mut self, stage: Stage, passed: bool) {
        if passed {
            self.counts[stage.index()] += 1;
        }
    }

    /// Current count for `stage`.
    pub fn count(&self, stage: Stage) -> u64 {
        self.counts[stage.index()]
    }

    /// Add another cut-flow's counters into this one.
    pub fn merge(&mut self, other: &Cutflow) {
        for (a, b) in self.counts.iter_mut().zip(other.counts) {
            *a += b;
        }
    }

    /// Immutable ordered report.
    pub fn report(&self) -> CutflowReport {
        let mut entries = Vec::with_capacity(Stage::ALL.len());
        let total = self.count(Stage::Loaded);
        let mut previous = total;
        for stage in Stage::ALL {
            let pass = self.count(stage);
            entries.push(CutflowEntry {
                stage,
                label: stage.label().to_string(),
                pass,
                all: previous,
                efficiency: ratio(pass, previous),
                cumulative_efficiency: ratio(pass, total),
            });
            previous = pass;
        }
        CutflowReport { entries }
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// One row of a cut-flow report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutflowEntry {
    /// Stage identifier.
    pub stage: Stage,
    /// Printed label.
    pub label: String,
    /// Events passing this stage.
    pub pass: u64,
    /// Events entering this stage (passing the previous one).
    pub all: u64,
    /// `pass / all`.
    pub efficiency: f64,
    /// `pass / loaded`.
    pub cumulative_efficiency: f64,
}

/// Ordered `(stage, passing count)` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutflowReport {
    /// Entries in stage order.
    pub entries: Vec<CutflowEntry>,
}

impl CutflowReport {
    /// Passing count for `stage`, if present.
    pub fn count(&self, stage: Stage) -> Option<u64> {
        self.entries.iter().find(|e| e.stage == stage).map(|e| e.pass)
    }

    /// `(key, count)` pairs in stage order.
    pub fn pairs(&self) -> Vec<(&'static str, u64)> {
        self.entries.iter().map(|e| (e.stage.key(), e.pass)).collect()
    }

    /// Check that counts never increase along the stage order.
    pub fn validate(&self) -> Result<()> {
        for w in self.entries.windows(2) {
            if w[1].pass > w[0].pass {
                return Err(Error::Validation(format!(
                    "cut-flow count increases from '{}' ({}) to '{}' ({})",
                    w[0].stage.key(),
                    w[0].pass,
                    w[1].stage.key(),
                    w[1].pass
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for CutflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The "loaded" row is the denominator, not a cut.
        for e in self.entries.iter().filter(|e| e.stage != Stage::Loaded) {
            writeln!(
                f,
                "{:<30}: pass={:<10} all={:<10} -- eff={:.2} % cumulative eff={:.2} %",
                e.label,
                e.pass,
                e.all,
                e.efficiency * 100.0,
                e.cumulative_efficiency * 100.0
            )?;
        }
        Ok(())
    }
}
