//! # dm-io
//!
//! Loads per-event muon records into a [`dm_core::EventTable`].
//!
//! Inputs are columnar files holding one row per event:
//!
//! | Column        | Type                       | Description              |
//! |---------------|----------------------------|--------------------------|
//! | `nMuon`       | `UInt32` (any integer)     | muon multiplicity        |
//! | `Muon_pt`     | `List<Float32 \| Float64>` | transverse momentum, GeV |
//! | `Muon_eta`    | `List<Float32 \| Float64>` | pseudorapidity           |
//! | `Muon_phi`    | `List<Float32 \| Float64>` | azimuth, rad             |
//! | `Muon_mass`   | `List<Float32 \| Float64>` | rest mass, GeV           |
//! | `Muon_charge` | `List<Int32>` (any int)    | charge, ±1               |
//!
//! Parquet is always available; ROOT TTrees with the same branch names are
//! read when the `root` feature is enabled.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
mod jagged;
pub mod loader;
pub mod locator;
pub mod parquet;
#[cfg(feature = "root")]
pub mod root;
pub mod schema;

pub use error::{LoadError, Result};
pub use loader::{DatasetSummary, inspect_dataset, load_dataset, load_events};
pub use locator::{DatasetFormat, DatasetLocator};
pub use parquet::{read_event_parquet, read_event_parquet_bytes, write_event_parquet};
