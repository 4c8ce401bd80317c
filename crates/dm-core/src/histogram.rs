//! Fixed-range, uniformly binned counting histogram.
//!
//! Bins are half-open `[lo, hi)`; a value equal to the upper edge of the last
//! bin is overflow. Out-of-range values never touch the bins, they are
//! tallied in `underflow`/`overflow` (and NaN in `nan`).

use serde::Serialize;

use crate::config::HistogramConfig;
use crate::error::{Error, Result};

/// Uniform 1D histogram of event counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    n_bins: usize,
    low: f64,
    up: f64,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
    nan: u64,
}

impl Histogram {
    /// Create an empty histogram with `bins` uniform bins over `[low, up)`.
    pub fn new(bins: usize, low: f64, up: f64) -> Result<Self> {
        if bins == 0 {
            return Err(Error::Validation("histogram needs at least one bin".into()));
        }
        if !low.is_finite() || !up.is_finite() || low >= up {
            return Err(Error::Validation(format!(
                "invalid histogram range [{low}, {up}): bounds must be finite with low < up"
            )));
        }
        Ok(Self { n_bins: bins, low, up, counts: vec![0; bins], underflow: 0, overflow: 0, nan: 0 })
    }

    /// Create an empty histogram from configuration.
    pub fn from_config(cfg: &HistogramConfig) -> Result<Self> {
        Self::new(cfg.bins, cfg.low, cfg.up)
    }

    /// Bin index for `x`, or `None` for underflow/overflow/NaN.
    #[inline]
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if x.is_nan() || x < self.low || x >= self.up {
            return None;
        }
        let frac = (x - self.low) / (self.up - self.low);
        // `x < up` but round-off can still land on `n_bins`.
        let bin = (frac * self.n_bins as f64) as usize;
        Some(bin.min(self.n_bins - 1))
    }

    /// Count one value.
    #[inline]
    pub fn observe(&mut self, x: f64) {
        if x.is_nan() {
            self.nan += 1;
        } else if x < self.low {
            self.underflow += 1;
        } else if let Some(b) = self.find_bin(x) {
            self.counts[b] += 1;
        } else {
            self.overflow += 1;
        }
    }

    /// Add `other` into `self`. Both must share the same binning.
    pub fn merge(&mut self, other: &Histogram) -> Result<()> {
        if !self.same_binning(other) {
            return Err(Error::Computation(format!(
                "cannot merge histograms with different binning: ({}, {}, {}) vs ({}, {}, {})",
                self.n_bins, self.low, self.up, other.n_bins, other.low, other.up
            )));
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.nan += other.nan;
        Ok(())
    }

    /// `true` if both histograms have identical bin count and range.
    pub fn same_binning(&self, other: &Histogram) -> bool {
        self.n_bins == other.n_bins && self.low == other.low && self.up == other.up
    }

    /// Number of bins (excluding flows).
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Lower edge of the first bin.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper edge of the last bin.
    pub fn up(&self) -> f64 {
        self.up
    }

    /// Width of every bin.
    pub fn bin_width(&self) -> f64 {
        (self.up - self.low) / self.n_bins as f64
    }

    /// Bin edges (length `n_bins + 1`).
    pub fn bin_edges(&self) -> Vec<f64> {
        let w = self.bin_width();
        (0..=self.n_bins)
            .map(|i| if i == self.n_bins { self.up } else { self.low + i as f64 * w })
            .collect()
    }

    /// Bin centres (length `n_bins`).
    pub fn bin_centers(&self) -> Vec<f64> {
        let w = self.bin_width();
        (0..self.n_bins).map(|i| self.low + (i as f64 + 0.5) * w).collect()
    }

    /// Count in bin `i`.
    pub fn bin_content(&self, i: usize) -> u64 {
        self.counts[i]
    }

    /// All bin counts.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Entries inside the histogram range.
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Values below `low`.
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    /// Values at or above `up`.
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// NaN values.
    pub fn nan(&self) -> u64 {
        self.nan
    }

    /// Largest bin count.
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_binning() {
        assert!(Histogram::new(0, 0.0, 1.0).is_err());
        assert!(Histogram::new(10, 1.0, 1.0).is_err());
        assert!(Histogram::new(10, 2.0, 1.0).is_err());
        assert!(Histogram::new(10, f64::NEG_INFINITY, 1.0).is_err());
    }

    #[test]
    fn half_open_edges() {
        let mut h = Histogram::new(30000, 0.25, 300.0).unwrap();
        h.observe(0.25);
        assert_eq!(h.bin_content(0), 1);

        h.observe(300.0);
        assert_eq!(h.overflow(), 1);
        assert_eq!(h.entries(), 1);

        h.observe(0.2499);
        assert_eq!(h.underflow(), 1);

        h.observe(f64::NAN);
        assert_eq!(h.nan(), 1);
        assert_eq!(h.entries(), 1);
    }

    #[test]
    fn just_below_up_lands_in_last_bin() {
        let h = Histogram::new(30000, 0.25, 300.0).unwrap();
        let x = f64::from_bits(300.0_f64.to_bits() - 1);
        assert_eq!(h.find_bin(x), Some(29999));
    }

    #[test]
    fn interior_bins() {
        let mut h = Histogram::new(4, 0.0, 4.0).unwrap();
        for x in [0.5, 1.0, 1.5, 2.999, 3.0, 3.99] {
            h.observe(x);
        }
        assert_eq!(h.counts(), &[1, 2, 1, 2]);
        assert_eq!(h.bin_edges(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(h.bin_centers(), vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(h.max_count(), 2);
    }

    #[test]
    fn merge_requires_same_binning() {
        let mut a = Histogram::new(4, 0.0, 4.0).unwrap();
        let b = Histogram::new(5, 0.0, 4.0).unwrap();
        assert!(a.merge(&b).is_err());

        let mut c = Histogram::new(4, 0.0, 4.0).unwrap();
        c.observe(1.5);
        c.observe(-1.0);
        a.observe(1.2);
        a.merge(&c).unwrap();
        assert_eq!(a.bin_content(1), 2);
        assert_eq!(a.underflow(), 1);
    }
}
