//! Event selection: exactly two muons of opposite charge.

use crate::cutflow::Stage;
use crate::event::{EventView, Muon};

/// Outcome of evaluating the selection on one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Failed at the given stage; every earlier stage passed.
    Rejected(Stage),
    /// Passed every stage.
    Accepted,
}

impl Selection {
    /// `true` if the event passed `stage` (stages are evaluated in order).
    pub fn passed(&self, stage: Stage) -> bool {
        match self {
            Selection::Accepted => true,
            Selection::Rejected(failed) => stage < *failed,
        }
    }

    /// `true` if the event passed every stage.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Selection::Accepted)
    }
}

/// The two muons of an accepted event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedPair {
    /// Leading (first stored) muon.
    pub first: Muon,
    /// Second stored muon.
    pub second: Muon,
}

/// Two-stage dimuon event selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selector;

impl Selector {
    /// Create a selector.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every stage in order and report where the event stopped.
    #[inline]
    pub fn evaluate(&self, event: &EventView<'_>) -> Selection {
        if event.muon_count() != 2 {
            return Selection::Rejected(Stage::TwoMuons);
        }
        if event.charge[0] == event.charge[1] {
            return Selection::Rejected(Stage::OppositeCharge);
        }
        Selection::Accepted
    }

    /// `true` if the event passes the full selection.
    pub fn accept(&self, event: &EventView<'_>) -> bool {
        self.evaluate(event).is_accepted()
    }

    /// The selected muon pair, or `None` if the event is rejected.
    pub fn pair(&self, event: &EventView<'_>) -> Option<SelectedPair> {
        self.accept(event).then(|| SelectedPair { first: event.muon(0), second: event.muon(1) })
    }
}
