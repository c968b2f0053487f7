//! One-dimensional counting histogram with out-of-range tallies.

use crate::bins::{BinEdges, BinLocation};

/// Counts of samples per bin, plus tallies for everything that did not land
/// in a bin: below the first edge, at or above the last edge, or non-finite.
///
/// No sample is ever silently dropped; `recorded()` always equals the number
/// of calls to [`Hist1d::record`].
///
/// Merging two histograms built over the same edges adds their counts, so
/// partial histograms from disjoint data chunks combine associatively into
/// the same result a single pass would produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Hist1d {
    edges: BinEdges,
    counts: Vec<u64>,
    below: u64,
    above: u64,
    non_finite: u64,
}

impl Hist1d {
    /// An empty histogram over `edges`.
    pub fn new(edges: BinEdges) -> Self {
        let counts = vec![0; edges.n_bins()];
        Self {
            edges,
            counts,
            below: 0,
            above: 0,
            non_finite: 0,
        }
    }

    /// Records one sample.
    pub fn record(&mut self, v: f64) {
        match self.edges.find_bin(v) {
            BinLocation::Bin(i) => self.counts[i] += 1,
            BinLocation::Below => self.below += 1,
            BinLocation::Above => self.above += 1,
            BinLocation::NonFinite => self.non_finite += 1,
        }
    }

    /// Records every sample in `values`.
    pub fn record_all(&mut self, values: impl IntoIterator<Item = f64>) {
        for v in values {
            self.record(v);
        }
    }

    /// Adds `other`'s counts into `self`.
    ///
    /// # Panics
    ///
    /// Panics when the two histograms were built over different edges;
    /// partials that are meant to merge must share one `BinEdges` value.
    pub fn merge(mut self, other: Hist1d) -> Hist1d {
        assert_eq!(
            self.edges, other.edges,
            "merged histograms must share their bin edges"
        );
        for (a, b) in self.counts.iter_mut().zip(other.counts) {
            *a += b;
        }
        self.below += other.below;
        self.above += other.above;
        self.non_finite += other.non_finite;
        self
    }

    /// The edges this histogram counts into.
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    /// Per-bin counts.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Samples below the first edge.
    pub fn below(&self) -> u64 {
        self.below
    }

    /// Samples at or above the last edge.
    pub fn above(&self) -> u64 {
        self.above
    }

    /// NaN or infinite samples.
    pub fn non_finite(&self) -> u64 {
        self.non_finite
    }

    /// Samples that landed in a bin.
    pub fn binned(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Every sample ever recorded, in or out of range.
    pub fn recorded(&self) -> u64 {
        self.binned() + self.below + self.above + self.non_finite
    }

    /// Empirical probability mass per bin, normalized by the binned count.
    ///
    /// The masses sum to 1 whenever any sample landed in a bin; a histogram
    /// with nothing binned yields all zeros.
    pub fn pmf(&self) -> Vec<f64> {
        let total = self.binned();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }
}
