//! Conditional distributions derived from a joint histogram.

use ndarray::Array2;

use crate::bins::BinEdges;
use crate::error::HistError;
use crate::hist2d::Hist2d;

/// The cumulative distribution of x conditioned on each y bin.
///
/// Column `j` is the CDF of the x values whose paired y landed in y bin `j`:
/// non-decreasing in the x index and reaching 1 at the last x bin. Columns
/// whose y bin received no samples hold NaN throughout; NaN marks "no data"
/// and never pollutes neighboring columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalCdf {
    x_edges: BinEdges,
    y_edges: BinEdges,
    /// `values[[i, j]]` = P(x <= x upper edge i | y in bin j).
    values: Array2<f64>,
    /// Samples per y bin.
    y_totals: Vec<u64>,
}

impl ConditionalCdf {
    /// Derives the conditional CDF from joint counts.
    pub fn from_hist(hist: &Hist2d) -> Self {
        let n_x = hist.x_edges().n_bins();
        let n_y = hist.y_edges().n_bins();
        let mut values = Array2::from_elem((n_x, n_y), f64::NAN);
        let mut y_totals = Vec::with_capacity(n_y);
        for j in 0..n_y {
            let total = hist.y_column_total(j);
            y_totals.push(total);
            if total == 0 {
                continue;
            }
            let mut acc = 0u64;
            for i in 0..n_x {
                acc += hist.counts()[[i, j]];
                values[[i, j]] = acc as f64 / total as f64;
            }
        }
        Self {
            x_edges: hist.x_edges().clone(),
            y_edges: hist.y_edges().clone(),
            values,
            y_totals,
        }
    }

    /// Edges of the x axis.
    pub fn x_edges(&self) -> &BinEdges {
        &self.x_edges
    }

    /// Edges of the y axis.
    pub fn y_edges(&self) -> &BinEdges {
        &self.y_edges
    }

    /// Conditional CDF values, shape `[x bins, y bins]`.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Samples per y bin.
    pub fn y_totals(&self) -> &[u64] {
        &self.y_totals
    }

    /// The x value at quantile `q` of each conditional distribution.
    ///
    /// Columns with fewer than `min_samples` samples yield NaN rather than a
    /// noisy quantile. Within the crossing bin the quantile is interpolated
    /// respecting the x spacing, geometrically for log bins.
    ///
    /// # Errors
    ///
    /// Returns [`HistError::InvalidQuantile`] unless `0 < q < 1`.
    pub fn quantile_curve(&self, q: f64, min_samples: u64) -> Result<Vec<f64>, HistError> {
        if !(q > 0.0 && q < 1.0) {
            return Err(HistError::InvalidQuantile { q });
        }
        let n_x = self.x_edges.n_bins();
        let curve = (0..self.y_edges.n_bins())
            .map(|j| {
                if self.y_totals[j] < min_samples.max(1) {
                    return f64::NAN;
                }
                // First bin where the CDF reaches q.
                let k = (0..n_x).find(|&i| self.values[[i, j]] >= q);
                let Some(k) = k else {
                    // Numerically the last column entry is 1.0, so q < 1
                    // always crosses; guard anyway.
                    return f64::NAN;
                };
                let prev = if k == 0 { 0.0 } else { self.values[[k - 1, j]] };
                let step = self.values[[k, j]] - prev;
                let frac = if step > 0.0 { (q - prev) / step } else { 0.0 };
                self.x_edges.position_within(k, frac)
            })
            .collect();
        Ok(curve)
    }
}
