//! Dataset loading entry points: locator → format → reader.

use std::fmt;
use std::path::Path;

use dm_core::{DatasetConfig, EventTable};
use serde::Serialize;

use crate::error::{LoadError, Result};
use crate::locator::{DatasetFormat, DatasetLocator};

/// Name and type of one input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    /// Column (branch) name.
    pub name: String,
    /// Storage type as reported by the reader.
    pub data_type: String,
}

/// Schema and size of a dataset, read from metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    /// Locator the summary was read from.
    pub locator: String,
    /// Detected file format.
    pub format: DatasetFormat,
    /// Number of events (rows / tree entries).
    pub n_events: u64,
    /// Top-level columns.
    pub columns: Vec<ColumnSummary>,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}, {} events)", self.locator, self.format, self.n_events)?;
        let width = self.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
        for c in &self.columns {
            writeln!(f, "  {:<width$}  {}", c.name, c.data_type)?;
        }
        Ok(())
    }
}

/// Load every event of the dataset described by `config`.
pub fn load_dataset(config: &DatasetConfig) -> Result<EventTable> {
    load_events(&DatasetLocator::parse(&config.locator), &config.tree, None)
}

/// Load the first `max_events` events (all if `None`) from `locator`.
///
/// `tree` names the TTree for ROOT inputs and is ignored for Parquet.
pub fn load_events(
    locator: &DatasetLocator,
    tree: &str,
    max_events: Option<usize>,
) -> Result<EventTable> {
    let path = locator.local_path()?;
    let format = DatasetFormat::from_path(path)?;
    tracing::info!(locator = %locator, format = %format, "loading dataset");

    let table = match format {
        DatasetFormat::Parquet => crate::parquet::read_event_parquet(path, max_events)?,
        DatasetFormat::Root => read_root(path, tree, max_events)?,
    };

    tracing::info!(events = table.len(), muons = table.n_muons(), "dataset loaded");
    Ok(table)
}

/// Schema summary of the dataset at `locator`.
pub fn inspect_dataset(locator: &DatasetLocator, tree: &str) -> Result<DatasetSummary> {
    let path = locator.local_path()?;
    match DatasetFormat::from_path(path)? {
        DatasetFormat::Parquet => crate::parquet::inspect_parquet(path),
        DatasetFormat::Root => inspect_root(path, tree),
    }
}

#[cfg(feature = "root")]
fn read_root(path: &Path, tree: &str, max_events: Option<usize>) -> Result<EventTable> {
    crate::root::read_event_tree(path, tree, max_events)
}

#[cfg(not(feature = "root"))]
fn read_root(path: &Path, _tree: &str, _max_events: Option<usize>) -> Result<EventTable> {
    Err(root_disabled(path))
}

#[cfg(feature = "root")]
fn inspect_root(path: &Path, tree: &str) -> Result<DatasetSummary> {
    crate::root::inspect_tree(path, tree)
}

#[cfg(not(feature = "root"))]
fn inspect_root(path: &Path, _tree: &str) -> Result<DatasetSummary> {
    Err(root_disabled(path))
}

#[cfg(not(feature = "root"))]
fn root_disabled(path: &Path) -> LoadError {
    LoadError::UnsupportedFormat(format!(
        "'{}' is a ROOT file; rebuild with the `root` feature or convert it to Parquet",
        path.display()
    ))
}
