//! Four-momentum arithmetic and the di-muon invariant mass.
//!
//! Everything here is single precision: the muon columns are stored as
//! `float` and the reduction is meant to agree with a `float` evaluation of
//! the same formula.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::event::Muon;

/// What to do when `E² − |p|²` comes out negative through round-off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassPolicy {
    /// Floor the radicand at zero (mass = 0).
    #[default]
    Clamp,
    /// Take the square root as-is; a negative radicand yields NaN.
    Propagate,
}

/// Cartesian four-momentum `(px, py, pz, E)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LorentzVector {
    /// x momentum component.
    pub px: f32,
    /// y momentum component.
    pub py: f32,
    /// z momentum component (beam axis).
    pub pz: f32,
    /// Energy.
    pub e: f32,
}

impl LorentzVector {
    /// Build from collider coordinates `(pt, eta, phi, m)`.
    #[inline]
    pub fn from_pt_eta_phi_m(pt: f32, eta: f32, phi: f32, mass: f32) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + mass * mass).sqrt();
        Self { px, py, pz, e }
    }

    /// Four-momentum of a muon.
    #[inline]
    pub fn from_muon(m: &Muon) -> Self {
        Self::from_pt_eta_phi_m(m.pt, m.eta, m.phi, m.mass)
    }

    /// `E² − px² − py² − pz²`, unguarded.
    #[inline]
    pub fn mass_squared(&self) -> f32 {
        self.e * self.e - self.px * self.px - self.py * self.py - self.pz * self.pz
    }

    /// Invariant mass under the given radicand policy.
    #[inline]
    pub fn mass(&self, policy: MassPolicy) -> f32 {
        let m2 = self.mass_squared();
        match policy {
            MassPolicy::Clamp => m2.max(0.0).sqrt(),
            MassPolicy::Propagate => m2.sqrt(),
        }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f32 {
        self.px.hypot(self.py)
    }

    /// Magnitude of the three-momentum.
    pub fn p(&self) -> f32 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }
}

impl Add for LorentzVector {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self { px: self.px + rhs.px, py: self.py + rhs.py, pz: self.pz + rhs.pz, e: self.e + rhs.e }
    }
}

impl AddAssign for LorentzVector {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Invariant mass of the two-muon system.
#[inline]
pub fn invariant_mass(a: &Muon, b: &Muon, policy: MassPolicy) -> f32 {
    (LorentzVector::from_muon(a) + LorentzVector::from_muon(b)).mass(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn muon(pt: f32, eta: f32, phi: f32, charge: i32) -> Muon {
        Muon { pt, eta, phi, mass: 0.105, charge }
    }

    #[test]
    fn single_muon_recovers_its_mass() {
        let p = LorentzVector::from_pt_eta_phi_m(3.0, 0.4, 1.1, 0.105);
        assert_relative_eq!(p.mass(MassPolicy::Clamp), 0.105, epsilon = 2e-3);
        assert_relative_eq!(p.pt(), 3.0, epsilon = 1e-5);
    }

    #[test]
    fn collinear_equal_muons() {
        // Parallel momenta: m = m1 + m2.
        let a = muon(10.0, 0.0, 0.0, 1);
        let m = invariant_mass(&a, &a, MassPolicy::Clamp);
        assert_relative_eq!(m, 0.21, epsilon = 1e-3);
    }

    #[test]
    fn back_to_back_muons() {
        let a = muon(20.0, 0.0, 0.0, 1);
        let b = muon(20.0, 0.0, 3.14159, -1);
        let expected = 2.0 * (400.0f32 + 0.105 * 0.105).sqrt();
        assert_relative_eq!(invariant_mass(&a, &b, MassPolicy::Clamp), expected, epsilon = 1e-3);
    }

    #[test]
    fn symmetric_under_swap() {
        let a = muon(33.1, -1.2, 0.3, 1);
        let b = muon(41.7, 0.8, -2.6, -1);
        assert_eq!(
            invariant_mass(&a, &b, MassPolicy::Clamp),
            invariant_mass(&b, &a, MassPolicy::Clamp)
        );
    }

    #[test]
    fn negative_radicand_policies() {
        let v = LorentzVector { px: 1.0, py: 0.0, pz: 0.0, e: 0.5 };
        assert_eq!(v.mass(MassPolicy::Clamp), 0.0);
        assert!(v.mass(MassPolicy::Propagate).is_nan());
    }

    #[test]
    fn add_assign_matches_add() {
        let a = LorentzVector::from_pt_eta_phi_m(5.0, 0.1, 0.2, 0.105);
        let b = LorentzVector::from_pt_eta_phi_m(7.0, -0.3, 2.0, 0.105);
        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }
}
