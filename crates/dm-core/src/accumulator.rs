//! Per-worker analysis state: histogram plus cut-flow.
//!
//! Accumulators are commutative monoids under [`Accumulator::merge`], so the
//! events can be split across workers in any way and the partial results
//! combined in any order.

use crate::cutflow::{Cutflow, CutflowReport, Stage};
use crate::error::Result;
use crate::event::EventView;
use crate::histogram::Histogram;
use crate::kinematics::{MassPolicy, invariant_mass};
use crate::selection::Selector;

/// Mergeable histogram + cut-flow state.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    histogram: Histogram,
    cutflow: Cutflow,
    selector: Selector,
    policy: MassPolicy,
}

impl Accumulator {
    /// Empty accumulator filling `histogram` (which should be empty).
    pub fn new(histogram: Histogram, policy: MassPolicy) -> Self {
        Self { histogram, cutflow: Cutflow::new(), selector: Selector::new(), policy }
    }

    /// Run one event through selection, reduction and aggregation.
    ///
    /// Returns the di-muon mass for accepted events.
    #[inline]
    pub fn observe_event(&mut self, event: &EventView<'_>) -> Option<f32> {
        let selection = self.selector.evaluate(event);
        for stage in Stage::ALL {
            self.cutflow.record_stage(stage, selection.passed(stage));
        }
        let pair = self.selector.pair(event)?;
        let mass = invariant_mass(&pair.first, &pair.second, self.policy);
        self.histogram.observe(mass as f64);
        Some(mass)
    }

    /// Count a mass value directly, bypassing selection.
    pub fn observe(&mut self, mass: f32) {
        self.histogram.observe(mass as f64);
    }

    /// Count one event at `stage`.
    pub fn record_stage(&mut self, stage: Stage, passed: bool) {
        self.cutflow.record_stage(stage, passed);
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: &Accumulator) -> Result<()> {
        self.histogram.merge(&other.histogram)?;
        self.cutflow.merge(&other.cutflow);
        Ok(())
    }

    /// Consuming merge, convenient inside `reduce`.
    pub fn merged(mut self, other: Accumulator) -> Result<Accumulator> {
        self.merge(&other)?;
        Ok(self)
    }

    /// Current histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Current cut-flow counters.
    pub fn cutflow(&self) -> &Cutflow {
        &self.cutflow
    }

    /// Final snapshot.
    pub fn finalize(self) -> (Histogram, CutflowReport) {
        let report = self.cutflow.report();
        (self.histogram, report)
    }
}
