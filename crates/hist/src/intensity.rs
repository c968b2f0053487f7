//! Per-year, per-latitude precipitation intensity spectra.

use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;
use tracing::debug;

use hyetos_exec::partition_by;
use hyetos_grid::{DIM_LAT, DIM_TIME, LabeledArray};
use hyetos_time::{TimeError, TimeGrid};

use crate::bins::{BinEdges, check_units};
use crate::error::HistError;
use crate::hist1d::Hist1d;

/// Empirical intensity distributions, one per `(year, latitude)` cell.
///
/// `pmf` holds the probability mass per intensity bin with shape
/// `[year, lat, bin]`, normalized within each cell by that cell's binned
/// count. The per-cell tallies record what the normalization excluded:
/// samples below the first edge (dry or near-dry time steps under log bins),
/// at or above the last edge, and non-finite samples.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensitySpectrum {
    edges: BinEdges,
    years: Vec<i32>,
    lats: Vec<f64>,
    pmf: Array3<f64>,
    binned: Array2<u64>,
    below: Array2<u64>,
    above: Array2<u64>,
    non_finite: Array2<u64>,
}

impl IntensitySpectrum {
    /// Intensity bin edges.
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    /// Calendar years with data, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Latitude coordinates, in grid order.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Probability mass per `[year, lat, bin]`.
    pub fn pmf(&self) -> &Array3<f64> {
        &self.pmf
    }

    /// Samples binned per `[year, lat]`.
    pub fn binned(&self) -> &Array2<u64> {
        &self.binned
    }

    /// Samples below the first edge per `[year, lat]`.
    pub fn below(&self) -> &Array2<u64> {
        &self.below
    }

    /// Samples at or above the last edge per `[year, lat]`.
    pub fn above(&self) -> &Array2<u64> {
        &self.above
    }

    /// Non-finite samples per `[year, lat]`.
    pub fn non_finite(&self) -> &Array2<u64> {
        &self.non_finite
    }
}

/// Builds the intensity spectrum of `var` grouped by calendar year and
/// latitude row.
///
/// All samples of a `(year, lat)` cell, across longitude and any further
/// dimensions, feed one histogram. The procedure only looks at the field and
/// its grid, so it applies unchanged to native-cadence model output, to
/// daily-resampled output, and to observational references once their units
/// and dimension names are normalized.
///
/// Years run in parallel; the per-year groups are disjoint, so no partial
/// result is shared between workers.
///
/// # Errors
///
/// Returns [`HistError::UnitMismatch`] when `var` does not carry the edge
/// units, [`HistError::Grid`] when `time` or `lat` is missing, and
/// [`HistError::Time`] when the grid disagrees with the time axis or its
/// labels cannot be resolved.
pub fn intensity_spectrum(
    var: &LabeledArray,
    grid: &TimeGrid,
    edges: &BinEdges,
) -> Result<IntensitySpectrum, HistError> {
    check_units(var, edges)?;
    let time_axis = var.axis_of(DIM_TIME)?;
    let lat_axis = var.axis_of(DIM_LAT)?;
    let axis_len = var.len_of(DIM_TIME)?;
    if axis_len != grid.len() {
        return Err(TimeError::LengthMismatch {
            axis_len,
            grid_len: grid.len(),
        }
        .into());
    }

    let year_keys: Vec<i32> = grid.labels()?.iter().map(|p| p.year).collect();
    let groups: Vec<(i32, Vec<usize>)> = partition_by(&year_keys).into_iter().collect();
    let lats = var.coord(DIM_LAT)?.to_vec();
    let n_lats = lats.len();
    debug!(
        variable = var.name(),
        years = groups.len(),
        lats = n_lats,
        "building intensity spectrum"
    );

    let rows: Vec<Vec<Hist1d>> = groups
        .par_iter()
        .map(|(_, indices)| {
            let sub = var.data().select(Axis(time_axis), indices);
            (0..n_lats)
                .map(|j| {
                    let mut hist = Hist1d::new(edges.clone());
                    hist.record_all(sub.index_axis(Axis(lat_axis), j).iter().copied());
                    hist
                })
                .collect()
        })
        .collect();

    let n_years = groups.len();
    let n_bins = edges.n_bins();
    let mut pmf = Array3::zeros((n_years, n_lats, n_bins));
    let mut binned = Array2::zeros((n_years, n_lats));
    let mut below = Array2::zeros((n_years, n_lats));
    let mut above = Array2::zeros((n_years, n_lats));
    let mut non_finite = Array2::zeros((n_years, n_lats));
    for (yi, year_rows) in rows.iter().enumerate() {
        for (j, hist) in year_rows.iter().enumerate() {
            for (b, mass) in hist.pmf().into_iter().enumerate() {
                pmf[[yi, j, b]] = mass;
            }
            binned[[yi, j]] = hist.binned();
            below[[yi, j]] = hist.below();
            above[[yi, j]] = hist.above();
            non_finite[[yi, j]] = hist.non_finite();
        }
    }

    Ok(IntensitySpectrum {
        edges: edges.clone(),
        years: groups.into_iter().map(|(year, _)| year).collect(),
        lats,
        pmf,
        binned,
        below,
        above,
        non_finite,
    })
}
