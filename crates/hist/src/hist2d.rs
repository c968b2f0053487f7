//! Two-dimensional joint counting histogram.

use ndarray::Array2;

use crate::bins::{BinEdges, BinLocation};

/// Where the samples that did not land in a 2D bin went.
///
/// A pair is dropped as a whole: when either member is out of range the
/// whole sample is tallied here and neither axis is counted. Non-finite
/// membership is checked first, then the x member, then the y member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DroppedTally {
    /// Pairs whose x member fell below the first x edge.
    pub x_below: u64,
    /// Pairs whose x member fell at or above the last x edge.
    pub x_above: u64,
    /// Pairs whose y member fell below the first y edge.
    pub y_below: u64,
    /// Pairs whose y member fell at or above the last y edge.
    pub y_above: u64,
    /// Pairs with a NaN or infinite member.
    pub non_finite: u64,
}

impl DroppedTally {
    /// All dropped pairs.
    pub fn total(&self) -> u64 {
        self.x_below + self.x_above + self.y_below + self.y_above + self.non_finite
    }

    fn add(&mut self, other: &DroppedTally) {
        self.x_below += other.x_below;
        self.x_above += other.x_above;
        self.y_below += other.y_below;
        self.y_above += other.y_above;
        self.non_finite += other.non_finite;
    }
}

/// Joint counts of `(x, y)` pairs over two independent edge vectors.
///
/// Counts have shape `[x bins, y bins]`. Like [`crate::Hist1d`], merging is
/// associative over histograms that share both edge vectors, and nothing is
/// silently dropped: `recorded()` equals the number of recorded pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Hist2d {
    x_edges: BinEdges,
    y_edges: BinEdges,
    counts: Array2<u64>,
    dropped: DroppedTally,
}

impl Hist2d {
    /// An empty joint histogram over the two edge vectors.
    pub fn new(x_edges: BinEdges, y_edges: BinEdges) -> Self {
        let counts = Array2::zeros((x_edges.n_bins(), y_edges.n_bins()));
        Self {
            x_edges,
            y_edges,
            counts,
            dropped: DroppedTally::default(),
        }
    }

    /// Records one pair.
    pub fn record(&mut self, x: f64, y: f64) {
        match (self.x_edges.find_bin(x), self.y_edges.find_bin(y)) {
            (BinLocation::Bin(i), BinLocation::Bin(j)) => self.counts[[i, j]] += 1,
            (BinLocation::NonFinite, _) | (_, BinLocation::NonFinite) => {
                self.dropped.non_finite += 1;
            }
            (BinLocation::Below, _) => self.dropped.x_below += 1,
            (BinLocation::Above, _) => self.dropped.x_above += 1,
            (_, BinLocation::Below) => self.dropped.y_below += 1,
            (_, BinLocation::Above) => self.dropped.y_above += 1,
        }
    }

    /// Adds `other`'s counts into `self`.
    ///
    /// # Panics
    ///
    /// Panics when the histograms were built over different edges; partials
    /// that are meant to merge must share both `BinEdges` values.
    pub fn merge(mut self, other: Hist2d) -> Hist2d {
        assert_eq!(
            (&self.x_edges, &self.y_edges),
            (&other.x_edges, &other.y_edges),
            "merged histograms must share their bin edges"
        );
        self.counts += &other.counts;
        self.dropped.add(&other.dropped);
        self
    }

    /// Edges of the x axis.
    pub fn x_edges(&self) -> &BinEdges {
        &self.x_edges
    }

    /// Edges of the y axis.
    pub fn y_edges(&self) -> &BinEdges {
        &self.y_edges
    }

    /// Joint counts, shape `[x bins, y bins]`.
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Tallies of dropped pairs.
    pub fn dropped(&self) -> &DroppedTally {
        &self.dropped
    }

    /// Pairs that landed in a bin.
    pub fn binned(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Every pair ever recorded, binned or dropped.
    pub fn recorded(&self) -> u64 {
        self.binned() + self.dropped.total()
    }

    /// Counts in y column `j`, summed over x.
    pub fn y_column_total(&self, j: usize) -> u64 {
        self.counts.column(j).iter().sum()
    }
}
