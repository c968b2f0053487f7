//! Bin edge construction and value-to-bin lookup.

use hyetos_grid::{LabeledArray, Unit};

use crate::error::HistError;

/// How bin edges are spaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    /// Equal width on the plain axis.
    Linear,
    /// Equal width in log10; all edges are positive.
    Log10,
}

/// Where a value lands relative to a set of edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinLocation {
    /// Inside bin `i`, i.e. `edges[i] <= v < edges[i + 1]`.
    Bin(usize),
    /// Below the first edge.
    Below,
    /// At or above the last edge.
    Above,
    /// NaN or infinite.
    NonFinite,
}

/// A strictly increasing edge vector with its spacing and the physical
/// [`Unit`] the edges are expressed in.
///
/// Bins are half-open: bin `i` covers `edges[i] <= v < edges[i + 1]`, so
/// every finite in-range value lands in exactly one bin. Carrying the unit
/// on the edges lets accumulators reject data in the wrong unit before a
/// single value is binned.
#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    edges: Vec<f64>,
    spacing: Spacing,
    units: Unit,
}

impl BinEdges {
    /// `n_bins` equally wide bins covering `[lo, hi]`.
    ///
    /// # Errors
    ///
    /// Returns [`HistError::InvalidEdges`] unless `lo < hi`, both finite, and
    /// `n_bins >= 1`.
    pub fn linear(lo: f64, hi: f64, n_bins: usize, units: Unit) -> Result<Self, HistError> {
        validate_span(lo, hi, n_bins)?;
        let width = (hi - lo) / n_bins as f64;
        let edges = (0..=n_bins)
            .map(|i| {
                if i == n_bins { hi } else { lo + width * i as f64 }
            })
            .collect();
        Ok(Self {
            edges,
            spacing: Spacing::Linear,
            units,
        })
    }

    /// `n_bins` bins covering `[lo, hi]` with edges equally spaced in log10.
    ///
    /// # Errors
    ///
    /// Returns [`HistError::InvalidEdges`] unless `0 < lo < hi`, both finite,
    /// and `n_bins >= 1`.
    pub fn log10(lo: f64, hi: f64, n_bins: usize, units: Unit) -> Result<Self, HistError> {
        validate_span(lo, hi, n_bins)?;
        if lo <= 0.0 {
            return Err(HistError::InvalidEdges {
                reason: format!("log bins need a positive lower edge, got {lo}"),
            });
        }
        let (log_lo, log_hi) = (lo.log10(), hi.log10());
        let width = (log_hi - log_lo) / n_bins as f64;
        let edges = (0..=n_bins)
            .map(|i| {
                if i == n_bins {
                    hi
                } else {
                    10f64.powf(log_lo + width * i as f64)
                }
            })
            .collect();
        Ok(Self {
            edges,
            spacing: Spacing::Log10,
            units,
        })
    }

    /// Builds edges from an explicit vector.
    ///
    /// # Errors
    ///
    /// Returns [`HistError::InvalidEdges`] unless the vector has at least two
    /// entries, is finite and strictly increasing, and (for log spacing) is
    /// entirely positive.
    pub fn from_edges(edges: Vec<f64>, spacing: Spacing, units: Unit) -> Result<Self, HistError> {
        if edges.len() < 2 {
            return Err(HistError::InvalidEdges {
                reason: format!("need at least 2 edges, got {}", edges.len()),
            });
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(HistError::InvalidEdges {
                reason: "edges must be finite".to_string(),
            });
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HistError::InvalidEdges {
                reason: "edges must be strictly increasing".to_string(),
            });
        }
        if spacing == Spacing::Log10 && edges[0] <= 0.0 {
            return Err(HistError::InvalidEdges {
                reason: format!("log bins need a positive lower edge, got {}", edges[0]),
            });
        }
        Ok(Self {
            edges,
            spacing,
            units,
        })
    }

    /// Number of bins (one less than the number of edges).
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// The edge vector.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// How the edges are spaced.
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Units the edges are expressed in.
    pub fn units(&self) -> &Unit {
        &self.units
    }

    /// Representative center of each bin: arithmetic midpoint for linear
    /// spacing, geometric midpoint for log spacing.
    pub fn centers(&self) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|w| match self.spacing {
                Spacing::Linear => 0.5 * (w[0] + w[1]),
                Spacing::Log10 => (w[0] * w[1]).sqrt(),
            })
            .collect()
    }

    /// Locates `v` among the bins.
    pub fn find_bin(&self, v: f64) -> BinLocation {
        if !v.is_finite() {
            return BinLocation::NonFinite;
        }
        if v < self.edges[0] {
            return BinLocation::Below;
        }
        if v >= self.edges[self.edges.len() - 1] {
            return BinLocation::Above;
        }
        // First edge strictly greater than v, minus one, is the owning bin.
        BinLocation::Bin(self.edges.partition_point(|&e| e <= v) - 1)
    }

    /// Interpolated position inside bin `bin` at fraction `frac` in [0, 1],
    /// respecting the spacing (geometric interpolation for log bins).
    pub fn position_within(&self, bin: usize, frac: f64) -> f64 {
        let (lo, hi) = (self.edges[bin], self.edges[bin + 1]);
        match self.spacing {
            Spacing::Linear => lo + frac * (hi - lo),
            Spacing::Log10 => lo * (hi / lo).powf(frac),
        }
    }
}

/// Rejects a field whose units disagree with the edges it is about to be
/// binned against. Called before any value is inspected.
pub(crate) fn check_units(var: &LabeledArray, edges: &BinEdges) -> Result<(), HistError> {
    if var.units() != edges.units() {
        return Err(HistError::UnitMismatch {
            variable: var.name().to_string(),
            expected: edges.units().to_string(),
            got: var.units().to_string(),
        });
    }
    Ok(())
}

fn validate_span(lo: f64, hi: f64, n_bins: usize) -> Result<(), HistError> {
    if n_bins == 0 {
        return Err(HistError::InvalidEdges {
            reason: "need at least 1 bin".to_string(),
        });
    }
    if !lo.is_finite() || !hi.is_finite() {
        return Err(HistError::InvalidEdges {
            reason: format!("bounds must be finite, got {lo}..{hi}"),
        });
    }
    if lo >= hi {
        return Err(HistError::InvalidEdges {
            reason: format!("lower bound {lo} must be below upper bound {hi}"),
        });
    }
    Ok(())
}
