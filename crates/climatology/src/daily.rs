//! Resampling sub-daily fields to daily means.

use ndarray::{ArrayD, Axis, IxDyn};
use rayon::prelude::*;
use tracing::debug;

use hyetos_exec::partition_by;
use hyetos_grid::{DIM_TIME, LabeledArray, nan_mean};
use hyetos_time::{TimeAlignment, TimeError, TimeGrid};

use crate::error::ClimatologyError;

/// Averages `var` over calendar days, returning the daily field and its grid.
///
/// Samples are grouped by the `(year, day-of-year)` labels of `grid`; each
/// day's mean skips NaN per spatial cell, and a day whose samples are all
/// NaN stays NaN. The returned grid stamps each day at its midpoint (noon),
/// with the input's epoch and calendar.
///
/// Resampling changes cadence only. The output feeds the same downstream
/// accumulators as native-cadence data.
///
/// # Errors
///
/// Returns [`ClimatologyError::Grid`] when `var` has no time dimension and
/// [`ClimatologyError::Time`] when the grid disagrees with the time axis or
/// its labels cannot be resolved.
pub fn daily_mean(
    var: &LabeledArray,
    grid: &TimeGrid,
) -> Result<(LabeledArray, TimeGrid), ClimatologyError> {
    let time_axis = var.axis_of(DIM_TIME)?;
    let axis_len = var.len_of(DIM_TIME)?;
    if axis_len != grid.len() {
        return Err(TimeError::LengthMismatch {
            axis_len,
            grid_len: grid.len(),
        }
        .into());
    }

    let keys: Vec<(i32, u16)> = grid
        .labels()?
        .iter()
        .map(|p| (p.year, p.doy))
        .collect();
    let groups: Vec<((i32, u16), Vec<usize>)> = partition_by(&keys).into_iter().collect();
    debug!(
        variable = var.name(),
        samples = axis_len,
        days = groups.len(),
        "resampling to daily means"
    );

    let day_means: Vec<ArrayD<f64>> = groups
        .par_iter()
        .map(|(_, indices)| {
            let sub = var.data().select(Axis(time_axis), indices);
            sub.map_axis(Axis(time_axis), |lane| nan_mean(lane.iter().copied()))
        })
        .collect();

    // Chronological keys give increasing day starts; stamp each day at noon.
    let offsets: Vec<f64> = groups
        .iter()
        .map(|(_, indices)| grid.offsets()[indices[0]].floor() + 0.5)
        .collect();
    let daily_grid = grid.with_offsets(offsets.clone(), TimeAlignment::Centered)?;

    let mut shape = var.shape().to_vec();
    shape[time_axis] = groups.len();
    let mut out = ArrayD::zeros(IxDyn(&shape));
    for (j, mean) in day_means.iter().enumerate() {
        out.index_axis_mut(Axis(time_axis), j).assign(mean);
    }

    let mut dims = var.labeled_dims();
    dims[time_axis].1 = offsets;
    let daily = LabeledArray::new(var.name(), var.units().clone(), dims, out)?;
    Ok((daily, daily_grid))
}
