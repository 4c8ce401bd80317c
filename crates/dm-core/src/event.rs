//! Columnar muon event storage.
//!
//! Per-muon quantities are stored as flat columns; `offsets` delimits the
//! muons belonging to each event (`offsets.len() == n_events + 1`), the same
//! layout ROOT uses for `Muon_pt[nMuon]`-style array branches.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single reconstructed muon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Muon {
    /// Transverse momentum (GeV).
    pub pt: f32,
    /// Pseudorapidity.
    pub eta: f32,
    /// Azimuthal angle (rad).
    pub phi: f32,
    /// Rest mass (GeV).
    pub mass: f32,
    /// Electric charge (`-1` or `+1`).
    pub charge: i32,
}

/// Events stored as jagged per-muon columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    offsets: Vec<usize>,
    pt: Vec<f32>,
    eta: Vec<f32>,
    phi: Vec<f32>,
    mass: Vec<f32>,
    charge: Vec<i32>,
}

impl Default for EventTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            pt: Vec::new(),
            eta: Vec::new(),
            phi: Vec::new(),
            mass: Vec::new(),
            charge: Vec::new(),
        }
    }

    /// Create an empty table with room for `n_events` events and `n_muons` muons.
    pub fn with_capacity(n_events: usize, n_muons: usize) -> Self {
        let mut offsets = Vec::with_capacity(n_events + 1);
        offsets.push(0);
        Self {
            offsets,
            pt: Vec::with_capacity(n_muons),
            eta: Vec::with_capacity(n_muons),
            phi: Vec::with_capacity(n_muons),
            mass: Vec::with_capacity(n_muons),
            charge: Vec::with_capacity(n_muons),
        }
    }

    /// Build a table from already-flattened columns.
    ///
    /// `counts[i]` is the muon multiplicity (`nMuon`) of event `i`; the flat
    /// columns must hold `sum(counts)` values each.
    pub fn from_columns(
        counts: &[u32],
        pt: Vec<f32>,
        eta: Vec<f32>,
        phi: Vec<f32>,
        mass: Vec<f32>,
        charge: Vec<i32>,
    ) -> Result<Self> {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        offsets.push(0usize);
        let mut total = 0usize;
        for &n in counts {
            total += n as usize;
            offsets.push(total);
        }
        let table = Self { offsets, pt, eta, phi, mass, charge };
        table.validate()?;
        Ok(table)
    }

    /// Append one event.
    pub fn push_event(&mut self, muons: &[Muon]) {
        for m in muons {
            self.pt.push(m.pt);
            self.eta.push(m.eta);
            self.phi.push(m.phi);
            self.mass.push(m.mass);
            self.charge.push(m.charge);
        }
        self.offsets.push(self.pt.len());
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// `true` if the table holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of muons across all events.
    pub fn n_muons(&self) -> usize {
        self.pt.len()
    }

    /// Borrow event `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.len()`.
    pub fn event(&self, row: usize) -> EventView<'_> {
        let start = self.offsets[row];
        let end = self.offsets[row + 1];
        EventView {
            pt: &self.pt[start..end],
            eta: &self.eta[start..end],
            phi: &self.phi[start..end],
            mass: &self.mass[start..end],
            charge: &self.charge[start..end],
        }
    }

    /// Iterate over all events in stable order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = EventView<'_>> + '_ {
        (0..self.len()).map(move |row| self.event(row))
    }

    /// Keep only the first `n` events.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len() {
            return;
        }
        self.offsets.truncate(n + 1);
        let n_muons = self.offsets[n];
        self.pt.truncate(n_muons);
        self.eta.truncate(n_muons);
        self.phi.truncate(n_muons);
        self.mass.truncate(n_muons);
        self.charge.truncate(n_muons);
    }

    /// Append all events of `other`.
    pub fn extend_from(&mut self, other: &EventTable) {
        let base = self.pt.len();
        self.offsets.extend(other.offsets.iter().skip(1).map(|o| o + base));
        self.pt.extend_from_slice(&other.pt);
        self.eta.extend_from_slice(&other.eta);
        self.phi.extend_from_slice(&other.phi);
        self.mass.extend_from_slice(&other.mass);
        self.charge.extend_from_slice(&other.charge);
    }

    /// Per-event muon multiplicities.
    pub fn counts(&self) -> Vec<u32> {
        self.offsets.windows(2).map(|w| (w[1] - w[0]) as u32).collect()
    }

    /// Event boundaries into the flat columns.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Flat `pt` column.
    pub fn pt(&self) -> &[f32] {
        &self.pt
    }

    /// Flat `eta` column.
    pub fn eta(&self) -> &[f32] {
        &self.eta
    }

    /// Flat `phi` column.
    pub fn phi(&self) -> &[f32] {
        &self.phi
    }

    /// Flat `mass` column.
    pub fn mass(&self) -> &[f32] {
        &self.mass
    }

    /// Flat `charge` column.
    pub fn charge(&self) -> &[i32] {
        &self.charge
    }

    /// Check the table invariants: offsets start at zero, never decrease and
    /// end at the common length of every per-muon column.
    pub fn validate(&self) -> Result<()> {
        if self.offsets.first() != Some(&0) {
            return Err(Error::Validation("event offsets must start at 0".into()));
        }
        if let Some(w) = self.offsets.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::Validation(format!("event offsets decrease at event {w}")));
        }
        let n = *self.offsets.last().unwrap_or(&0);
        let lens = [
            ("pt", self.pt.len()),
            ("eta", self.eta.len()),
            ("phi", self.phi.len()),
            ("mass", self.mass.len()),
            ("charge", self.charge.len()),
        ];
        for (name, len) in lens {
            if len != n {
                return Err(Error::Validation(format!(
                    "column '{name}' has {len} values, muon counts sum to {n}"
                )));
            }
        }
        Ok(())
    }
}

/// Borrowed view of one event's muons (parallel slices of equal length).
#[derive(Debug, Clone, Copy)]
pub struct EventView<'a> {
    /// Transverse momenta.
    pub pt: &'a [f32],
    /// Pseudorapidities.
    pub eta: &'a [f32],
    /// Azimuthal angles.
    pub phi: &'a [f32],
    /// Rest masses.
    pub mass: &'a [f32],
    /// Charges.
    pub charge: &'a [i32],
}

impl EventView<'_> {
    /// Muon multiplicity (`nMuon`).
    pub fn muon_count(&self) -> usize {
        self.pt.len()
    }

    /// Muon `index` of this event.
    pub fn muon(&self, index: usize) -> Muon {
        Muon {
            pt: self.pt[index],
            eta: self.eta[index],
            phi: self.phi[index],
            mass: self.mass[index],
            charge: self.charge[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mu(pt: f32, charge: i32) -> Muon {
        Muon { pt, eta: 0.0, phi: 0.0, mass: 0.105, charge }
    }

    #[test]
    fn push_and_view() {
        let mut t = EventTable::new();
        t.push_event(&[mu(10.0, 1), mu(20.0, -1)]);
        t.push_event(&[]);
        t.push_event(&[mu(5.0, 1)]);

        assert_eq!(t.len(), 3);
        assert_eq!(t.n_muons(), 3);
        assert_eq!(t.counts(), vec![2, 0, 1]);
        assert_eq!(t.event(0).muon_count(), 2);
        assert_eq!(t.event(1).muon_count(), 0);
        assert_eq!(t.event(2).muon(0).pt, 5.0);
        t.validate().unwrap();
    }

    #[test]
    fn truncate_keeps_prefix() {
        let mut t = EventTable::new();
        t.push_event(&[mu(1.0, 1)]);
        t.push_event(&[mu(2.0, 1), mu(3.0, -1)]);
        t.push_event(&[mu(4.0, 1)]);
        t.truncate(2);
        assert_eq!(t.len(), 2);
        assert_eq!(t.pt(), &[1.0, 2.0, 3.0]);
        t.validate().unwrap();

        t.truncate(10);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn extend_rebases_offsets() {
        let mut a = EventTable::new();
        a.push_event(&[mu(1.0, 1)]);
        let mut b = EventTable::new();
        b.push_event(&[mu(2.0, 1), mu(3.0, -1)]);
        a.extend_from(&b);
        assert_eq!(a.offsets(), &[0, 1, 3]);
        assert_eq!(a.event(1).pt, &[2.0, 3.0]);
    }

    #[test]
    fn from_columns_rejects_length_mismatch() {
        let err = EventTable::from_columns(
            &[2, 1],
            vec![1.0, 2.0, 3.0],
            vec![0.0; 3],
            vec![0.0; 3],
            vec![0.1; 2],
            vec![1, -1, 1],
        )
        .unwrap_err();
        assert!(err.to_string().contains("'mass'"));
    }
}
