//! Column names of the NanoAOD-style muon schema.

/// Muon multiplicity per event.
pub const N_MUON: &str = "nMuon";
/// Transverse momentum (GeV).
pub const MUON_PT: &str = "Muon_pt";
/// Pseudorapidity.
pub const MUON_ETA: &str = "Muon_eta";
/// Azimuthal angle (rad).
pub const MUON_PHI: &str = "Muon_phi";
/// Rest mass (GeV).
pub const MUON_MASS: &str = "Muon_mass";
/// Electric charge (±1).
pub const MUON_CHARGE: &str = "Muon_charge";

/// The five per-muon list columns, in table order.
pub const MUON_COLUMNS: [&str; 5] = [MUON_PT, MUON_ETA, MUON_PHI, MUON_MASS, MUON_CHARGE];
