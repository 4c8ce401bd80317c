//! # dm-core
//!
//! Core of the dimuon analysis: the columnar muon event model, the
//! two-muon/opposite-charge selection, the invariant-mass reduction and the
//! mergeable histogram + cut-flow accumulator.
//!
//! ## Example
//!
//! ```
//! use dm_core::{AnalysisConfig, EventTable, Muon, run_pipeline};
//!
//! let mut events = EventTable::new();
//! events.push_event(&[
//!     Muon { pt: 20.0, eta: 0.0, phi: 0.0, mass: 0.105, charge: 1 },
//!     Muon { pt: 20.0, eta: 0.0, phi: 3.14159, mass: 0.105, charge: -1 },
//! ]);
//!
//! let out = run_pipeline(&events, &AnalysisConfig::default()).unwrap();
//! assert_eq!(out.histogram.entries(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod config;
pub mod cutflow;
pub mod error;
pub mod event;
pub mod histogram;
pub mod kinematics;
pub mod pipeline;
pub mod selection;

pub use accumulator::Accumulator;
pub use config::{AnalysisConfig, DatasetConfig, HistogramConfig};
pub use cutflow::{Cutflow, CutflowEntry, CutflowReport, Stage};
pub use error::{Error, Result};
pub use event::{EventTable, EventView, Muon};
pub use histogram::Histogram;
pub use kinematics::{LorentzVector, MassPolicy, invariant_mass};
pub use pipeline::{PipelineOutput, run_pipeline};
pub use selection::{SelectedPair, Selection, Selector};
