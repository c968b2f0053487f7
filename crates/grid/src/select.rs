//! Coordinate-based subsetting of labeled arrays.

use ndarray::Axis;

use crate::array::{LabeledArray, coords_close};
use crate::error::GridError;
use crate::schema::DIM_LON;

/// Full circle in degrees, used to unwrap longitudes across the dateline.
const LON_PERIOD: f64 = 360.0;

/// Indices of coordinate values inside `[lo, hi]`, boundary points included.
///
/// Works for ascending and descending coordinates; the returned indices are
/// always in axis order.
fn indices_in_range(coord: &[f64], lo: f64, hi: f64) -> Vec<usize> {
    coord
        .iter()
        .enumerate()
        .filter(|&(_, &v)| {
            (v > lo || coords_close(v, lo)) && (v < hi || coords_close(v, hi))
        })
        .map(|(i, _)| i)
        .collect()
}

impl LabeledArray {
    /// Keeps the grid points of `dim` whose coordinate lies in `[lo, hi]`.
    ///
    /// Boundary points are included. A request with `lo > hi` matches nothing
    /// and is reported as an empty selection; use
    /// [`LabeledArray::select_lon_range`] for ranges that cross the dateline.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when `dim` is absent and
    /// [`GridError::EmptySelection`] when no grid point falls in the range.
    pub fn select_range(&self, dim: &str, lo: f64, hi: f64) -> Result<Self, GridError> {
        let axis = self.axis_of(dim)?;
        let indices = indices_in_range(self.coord(dim)?, lo, hi);
        if indices.is_empty() {
            return Err(GridError::EmptySelection {
                dim: dim.to_string(),
                lo,
                hi,
            });
        }
        self.take_indices(axis, &indices, None)
    }

    /// Keeps the grid points whose longitude lies in `[lo, hi]`, where the
    /// range may wrap past the end of a 0-360 axis (`lo > hi`).
    ///
    /// For a wrapped range the western arc comes first and the eastern arc is
    /// unwrapped by adding 360 to its coordinates, so the result keeps a
    /// strictly increasing axis. Coordinate values are otherwise taken as
    /// stored; no convention remapping happens here.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array has no `lon`
    /// dimension, [`GridError::EmptySelection`] when no grid point falls in
    /// the range, and [`GridError::WrapDescending`] when a wrapped range is
    /// requested on a descending axis.
    pub fn select_lon_range(&self, lo: f64, hi: f64) -> Result<Self, GridError> {
        let dim = DIM_LON;
        if lo <= hi {
            return self.select_range(dim, lo, hi);
        }
        let axis = self.axis_of(dim)?;
        let coord = self.coord(dim)?;
        if coord.len() >= 2 && coord[0] > coord[coord.len() - 1] {
            return Err(GridError::WrapDescending {
                dim: dim.to_string(),
            });
        }
        let west = indices_in_range(coord, lo, f64::INFINITY);
        let east = indices_in_range(coord, f64::NEG_INFINITY, hi);
        if west.is_empty() && east.is_empty() {
            return Err(GridError::EmptySelection {
                dim: dim.to_string(),
                lo,
                hi,
            });
        }
        let mut new_coord = Vec::with_capacity(west.len() + east.len());
        new_coord.extend(west.iter().map(|&i| coord[i]));
        new_coord.extend(east.iter().map(|&i| coord[i] + LON_PERIOD));
        let mut indices = west;
        indices.extend(east);
        self.take_indices(axis, &indices, Some(new_coord))
    }

    /// Gathers `indices` along `axis` into an owned array, replacing the
    /// coordinate vector when the caller supplies one.
    fn take_indices(
        &self,
        axis: usize,
        indices: &[usize],
        coord_override: Option<Vec<f64>>,
    ) -> Result<Self, GridError> {
        let data = self.data().select(Axis(axis), indices);
        let mut dims = self.labeled_dims();
        let coord = match coord_override {
            Some(coord) => coord,
            None => indices.iter().map(|&i| dims[axis].1[i]).collect(),
        };
        dims[axis].1 = coord;
        LabeledArray::new(self.name(), self.units().clone(), dims, data)
    }
}
