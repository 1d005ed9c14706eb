//! Fixed-binning 1D histogram.

/// Equal-width histogram over `[lo, hi)` with under/overflow counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    lo: f64,
    hi: f64,
    counts: Vec<f64>,
    underflow: f64,
    overflow: f64,
}

impl Histogram1D {
    pub fn new(n_bins: usize, lo: f64, hi: f64) -> Self {
        assert!(n_bins > 0 && hi > lo, "invalid binning");
        Self {
            lo,
            hi,
            counts: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
        }
    }
    pub fn from_values(n_bins: usize, lo: f64, hi: f64, values: &[f64]) -> Self {
        let mut h = Self::new(n_bins, lo, hi);
        values.iter().for_each(|&x| h.fill(x));
        h
    }
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }
    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.n_bins() as f64
    }
    pub fn fill(&mut self, x: f64) {
        if x.is_nan() || x < self.lo {
            self.underflow += 1.0;
        } else if x >= self.hi {
            self.overflow += 1.0;
        } else {
            let idx = ((x - self.lo) / self.bin_width()) as usize;
            // rounding can push values just below `hi` onto the upper edge
            let idx = idx.min(self.n_bins() - 1);
            self.counts[idx] += 1.0;
        }
    }
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }
    pub fn underflow(&self) -> f64 {
        self.underflow
    }
    pub fn overflow(&self) -> f64 {
        self.overflow
    }
    pub fn range(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }
    /// Bin edges, `n_bins + 1` of them.
    pub fn bin_edges(&self) -> Vec<f64> {
        let w = self.bin_width();
        (0..=self.n_bins()).map(|i| self.lo + i as f64 * w).collect()
    }
    pub fn max_count(&self) -> f64 {
        self.counts.iter().copied().fold(0.0, f64::max)
    }
    pub fn in_range(&self) -> f64 {
        self.counts.iter().sum()
    }
}
