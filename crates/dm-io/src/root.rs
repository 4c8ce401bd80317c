//! ROOT TTree reading via `oxyroot` (feature `root`).

use std::path::Path;

use dm_core::EventTable;
use oxyroot::{Branch, Named, ReaderTree, RootFile, Slice};

use crate::error::{LoadError, Result};
use crate::jagged::{check_lengths, flatten_rows};
use crate::loader::{ColumnSummary, DatasetSummary};
use crate::locator::DatasetFormat;
use crate::schema::{MUON_CHARGE, MUON_ETA, MUON_MASS, MUON_PHI, MUON_PT, N_MUON};

// The oxyroot error type is not public; errors are carried as text.
fn root_err(what: &str, e: impl std::fmt::Display) -> LoadError {
    LoadError::Root(format!("{what}: {e}"))
}

fn open_tree(path: &Path, tree: &str) -> Result<ReaderTree> {
    let mut file = RootFile::open(path).map_err(|e| root_err(&path.display().to_string(), e))?;
    file.get_tree(tree).map_err(|e| root_err(&format!("tree '{tree}'"), e))
}

fn branch<'a>(tree: &'a ReaderTree, name: &str) -> Result<&'a Branch> {
    tree.branch(name).ok_or_else(|| LoadError::MissingColumn(name.into()))
}

fn read_counts(tree: &ReaderTree, name: &str, limit: usize) -> Result<Vec<u32>> {
    let iter = branch(tree, name)?
        .as_iter::<u32>()
        .map_err(|e| root_err(&format!("branch '{name}'"), e))?;
    Ok(iter.take(limit).collect())
}

fn read_jagged_f32(tree: &ReaderTree, name: &str, limit: usize) -> Result<(Vec<u32>, Vec<f32>)> {
    let iter = branch(tree, name)?
        .as_iter::<Slice<f32>>()
        .map_err(|e| root_err(&format!("branch '{name}'"), e))?;
    Ok(flatten_rows(iter.take(limit).map(Slice::into_vec)))
}

fn read_jagged_i32(tree: &ReaderTree, name: &str, limit: usize) -> Result<(Vec<u32>, Vec<i32>)> {
    let iter = branch(tree, name)?
        .as_iter::<Slice<i32>>()
        .map_err(|e| root_err(&format!("branch '{name}'"), e))?;
    Ok(flatten_rows(iter.take(limit).map(Slice::into_vec)))
}

/// Read the first `max_events` entries of `tree` in a ROOT file.
pub fn read_event_tree(path: &Path, tree: &str, max_events: Option<usize>) -> Result<EventTable> {
    let tree = open_tree(path, tree)?;
    let limit = max_events.unwrap_or(usize::MAX);

    let n_muon = read_counts(&tree, N_MUON, limit)?;
    let (pt_len, pt) = read_jagged_f32(&tree, MUON_PT, limit)?;
    let (eta_len, eta) = read_jagged_f32(&tree, MUON_ETA, limit)?;
    let (phi_len, phi) = read_jagged_f32(&tree, MUON_PHI, limit)?;
    let (mass_len, mass) = read_jagged_f32(&tree, MUON_MASS, limit)?;
    let (charge_len, charge) = read_jagged_i32(&tree, MUON_CHARGE, limit)?;

    for (name, lengths) in [
        (MUON_PT, &pt_len),
        (MUON_ETA, &eta_len),
        (MUON_PHI, &phi_len),
        (MUON_MASS, &mass_len),
        (MUON_CHARGE, &charge_len),
    ] {
        check_lengths(name, lengths, N_MUON, &n_muon)?;
    }

    tracing::debug!(events = n_muon.len(), "ROOT tree decoded");
    Ok(EventTable::from_columns(&n_muon, pt, eta, phi, mass, charge)?)
}

/// Branch names/types and entry count of `tree`.
pub fn inspect_tree(path: &Path, tree: &str) -> Result<DatasetSummary> {
    let t = open_tree(path, tree)?;
    let columns = t
        .branches()
        .map(|b| ColumnSummary { name: b.name().to_string(), data_type: b.item_type_name() })
        .collect();
    Ok(DatasetSummary {
        locator: path.display().to_string(),
        format: DatasetFormat::Root,
        n_events: t.entries().max(0) as u64,
        columns,
    })
}
