//! A loaded variable paired with its decoded time grid.

use hyetos_grid::{DIM_TIME, GridError, LabeledArray, canonical_dim};
use hyetos_time::{TimeError, TimeGrid};

use crate::error::CatalogError;

/// Tolerance for agreement between the time coordinate and the grid offsets.
/// Both come from the same decoded values, so anything beyond float noise
/// means the caller mixed grids.
const TIME_COORD_TOL: f64 = 1e-9;

/// A [`LabeledArray`] together with the [`TimeGrid`] decoded from its time
/// coordinate. Construction checks the two agree, so downstream code can
/// index the array by labels resolved through the grid.
#[derive(Debug, Clone)]
pub struct Dataset {
    array: LabeledArray,
    time: TimeGrid,
}

impl Dataset {
    /// Pairs an array with its time grid.
    ///
    /// The time dimension is found by name, accepting alias spellings that
    /// [`normalize`](crate::normalize) has not renamed yet.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Grid`] when the array has no time dimension,
    /// [`CatalogError::Time`] when the lengths differ, and
    /// [`CatalogError::TimeCoordMismatch`] when the coordinate values drift
    /// from the grid offsets.
    pub fn new(array: LabeledArray, time: TimeGrid) -> Result<Self, CatalogError> {
        let time_dim = array
            .dims()
            .iter()
            .find(|d| canonical_dim(d.as_str()) == DIM_TIME)
            .ok_or_else(|| GridError::UnknownDimension {
                dim: DIM_TIME.to_string(),
                available: array.dims().join(", "),
            })?;
        let coord = array.coord(time_dim)?;
        if coord.len() != time.len() {
            return Err(TimeError::LengthMismatch {
                axis_len: coord.len(),
                grid_len: time.len(),
            }
            .into());
        }
        for (index, (&c, &o)) in coord.iter().zip(time.offsets().iter()).enumerate() {
            if (c - o).abs() > TIME_COORD_TOL {
                return Err(CatalogError::TimeCoordMismatch {
                    index,
                    coord: c,
                    offset: o,
                });
            }
        }
        Ok(Self { array, time })
    }

    /// The variable values with their labels.
    pub fn array(&self) -> &LabeledArray {
        &self.array
    }

    /// The decoded time axis.
    pub fn time(&self) -> &TimeGrid {
        &self.time
    }

    /// Consumes self and returns the array and grid.
    pub fn into_parts(self) -> (LabeledArray, TimeGrid) {
        (self.array, self.time)
    }
}
