//! Mean diurnal cycle per year, with amplitude and phase.

use ndarray::{Array2, ArrayD, Axis, IxDyn};
use rayon::prelude::*;
use tracing::debug;

use hyetos_exec::partition_by;
use hyetos_grid::{DIM_TIME, LabeledArray, Unit, nan_mean};
use hyetos_time::{TimeError, TimeGrid};

use crate::error::ClimatologyError;

/// Dimension name of the yearly axis in aggregated outputs.
pub const DIM_YEAR: &str = "year";
/// Dimension name of the hour-of-day axis in aggregated outputs.
pub const DIM_HOUR: &str = "hour";

/// The mean value per `(year, hour-of-day)` group, materialized eagerly.
///
/// `means` has dimensions `[year, hour, <spatial dims of the input>]`; the
/// hour coordinate holds the distinct hour labels seen in the data (for
/// centered 3-hourly CMIP output these are 1, 4, ..., 22). A group absent
/// from the data, such as hours of a partial first year, is NaN in `means`
/// and zero in `counts`.
#[derive(Debug, Clone)]
pub struct DiurnalCycle {
    means: LabeledArray,
    counts: Array2<u64>,
    years: Vec<i32>,
    hours: Vec<u8>,
}

impl DiurnalCycle {
    /// Group means, dimensions `[year, hour, ...]`.
    pub fn means(&self) -> &LabeledArray {
        &self.means
    }

    /// Time samples per `[year, hour]` group.
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Calendar years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Distinct hour-of-day labels, ascending.
    pub fn hours(&self) -> &[u8] {
        &self.hours
    }

    /// Diurnal amplitude per `[year, ...]`: the range of the mean cycle over
    /// the hour axis, skipping hours without data. Cells with no data in any
    /// hour are NaN.
    ///
    /// # Errors
    ///
    /// Propagates labeled-array errors; the hour dimension always exists, so
    /// failures indicate construction bugs upstream.
    pub fn amplitude(&self) -> Result<LabeledArray, ClimatologyError> {
        let max = self.means.max_over(DIM_HOUR)?;
        let min = self.means.min_over(DIM_HOUR)?;
        let range = max.data() - min.data();
        Ok(max.with_data(range)?.with_name("amplitude"))
    }

    /// Hour-of-day at which the mean cycle peaks, per `[year, ...]`,
    /// multiplied by `scale`.
    ///
    /// Ties take the earliest hour; cells with no data in any hour are NaN.
    /// `scale` converts hour labels into whatever phase convention a
    /// comparison needs (1.0 keeps plain hours).
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::InvalidPhaseScale`] unless `scale` is
    /// finite and positive.
    pub fn phase(&self, scale: f64) -> Result<LabeledArray, ClimatologyError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ClimatologyError::InvalidPhaseScale { scale });
        }
        let hours = &self.hours;
        let phase = self.means.reduce_over(DIM_HOUR, |lane| {
            let mut best: Option<(usize, f64)> = None;
            for (i, &v) in lane.iter().enumerate() {
                if v.is_finite() && best.is_none_or(|(_, b)| v > b) {
                    best = Some((i, v));
                }
            }
            match best {
                Some((i, _)) => f64::from(hours[i]) * scale,
                None => f64::NAN,
            }
        })?;
        Ok(phase
            .with_name("phase")
            .with_units(Unit::Other("hour".to_string())))
    }
}

/// Aggregates `var` into its mean diurnal cycle per calendar year.
///
/// Sample indices are partitioned by the `(year, hour)` labels of `grid`,
/// then each group is averaged over its time samples, per spatial cell and
/// skipping NaN. Groups are disjoint, so they aggregate in parallel without
/// shared state. The result is materialized eagerly; aggregation walks the
/// full input, and holding the finished cycle lets amplitude and phase read
/// it repeatedly without recomputation.
///
/// # Errors
///
/// Returns [`ClimatologyError::Grid`] when `var` has no time dimension and
/// [`ClimatologyError::Time`] when the grid disagrees with the time axis or
/// its labels cannot be resolved.
pub fn diurnal_cycle(
    var: &LabeledArray,
    grid: &TimeGrid,
) -> Result<DiurnalCycle, ClimatologyError> {
    let time_axis = var.axis_of(DIM_TIME)?;
    let axis_len = var.len_of(DIM_TIME)?;
    if axis_len != grid.len() {
        return Err(TimeError::LengthMismatch {
            axis_len,
            grid_len: grid.len(),
        }
        .into());
    }

    let keys: Vec<(i32, u8)> = grid
        .labels()?
        .iter()
        .map(|p| (p.year, p.hour))
        .collect();
    let groups: Vec<((i32, u8), Vec<usize>)> = partition_by(&keys).into_iter().collect();

    let mut years: Vec<i32> = groups.iter().map(|((y, _), _)| *y).collect();
    years.dedup();
    let mut hours: Vec<u8> = groups.iter().map(|((_, h), _)| *h).collect();
    hours.sort_unstable();
    hours.dedup();
    debug!(
        variable = var.name(),
        years = years.len(),
        hours = hours.len(),
        groups = groups.len(),
        "aggregating diurnal cycle"
    );

    // Disjoint groups: each one averages its own time samples.
    let group_means: Vec<((i32, u8), ArrayD<f64>, u64)> = groups
        .par_iter()
        .map(|(key, indices)| {
            let sub = var.data().select(Axis(time_axis), indices);
            let mean = sub.map_axis(Axis(time_axis), |lane| nan_mean(lane.iter().copied()));
            (*key, mean, indices.len() as u64)
        })
        .collect();

    let mut rest_dims = var.labeled_dims();
    rest_dims.remove(time_axis);
    let mut shape = vec![years.len(), hours.len()];
    shape.extend(rest_dims.iter().map(|(_, coord)| coord.len()));

    let mut means = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
    let mut counts = Array2::zeros((years.len(), hours.len()));
    for ((year, hour), mean, n) in group_means {
        let yi = years
            .binary_search(&year)
            .expect("group years come from the year list");
        let hi = hours
            .binary_search(&hour)
            .expect("group hours come from the hour list");
        let mut year_slot = means.index_axis_mut(Axis(0), yi);
        let mut slot = year_slot.index_axis_mut(Axis(0), hi);
        slot.assign(&mean);
        counts[[yi, hi]] = n;
    }

    let mut dims = vec![
        (DIM_YEAR.to_string(), years.iter().map(|&y| f64::from(y)).collect()),
        (DIM_HOUR.to_string(), hours.iter().map(|&h| f64::from(h)).collect()),
    ];
    dims.extend(rest_dims);
    let means = LabeledArray::new(var.name(), var.units().clone(), dims, means)?;

    Ok(DiurnalCycle {
        means,
        counts,
        years,
        hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hyetos_time::{Calendar, CivilDate, TimeAlignment};

    /// Two years of centered 3-hourly data over one cell, with a sinusoidal
    /// cycle peaking at hour 13 and an offset that differs between years.
    fn sample() -> (LabeledArray, TimeGrid) {
        let steps_per_day = 8;
        let n = 2 * 365 * steps_per_day;
        let offsets: Vec<f64> = (0..n).map(|i| (1.5 + 3.0 * i as f64) / 24.0).collect();
        let grid = TimeGrid::new(
            offsets.clone(),
            CivilDate::new(2000, 1, 1).expect("valid date"),
            Calendar::NoLeap,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        let values: Vec<f64> = offsets
            .iter()
            .map(|&t| {
                let hour = (t.fract() * 24.0).floor();
                let year_offset = if t >= 365.0 { 10.0 } else { 0.0 };
                // Peak at hour 13, trough at hour 1.
                year_offset + 5.0 + 5.0 * ((hour - 13.0) / 12.0 * std::f64::consts::PI).cos()
            })
            .collect();
        let data = ArrayD::from_shape_vec(IxDyn(&[n, 1, 1]), values).expect("shape matches");
        let var = LabeledArray::new(
            "pr",
            Unit::KgPerM2PerS,
            vec![
                ("time".to_string(), offsets),
                ("lat".to_string(), vec![0.0]),
                ("lon".to_string(), vec![0.0]),
            ],
            data,
        )
        .expect("valid labels");
        (var, grid)
    }

    #[test]
    fn output_axes_are_year_by_hour() {
        let (var, grid) = sample();
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        assert_eq!(cycle.years(), &[2000, 2001]);
        assert_eq!(cycle.hours(), &[1, 4, 7, 10, 13, 16, 19, 22]);
        assert_eq!(cycle.means().dims(), &["year", "hour", "lat", "lon"]);
        assert_eq!(cycle.means().shape(), &[2, 8, 1, 1]);
        // Every group of a full year holds 365 samples.
        assert!(cycle.counts().iter().all(|&n| n == 365));
    }

    #[test]
    fn means_reproduce_the_cycle() {
        let (var, grid) = sample();
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        // The synthetic value depends only on (year, hour), so the group
        // mean must reproduce it exactly.
        let hour13 = cycle.means().data()[[0, 4, 0, 0]];
        let hour1 = cycle.means().data()[[0, 0, 0, 0]];
        assert!(hour13 > hour1, "peak hour must exceed trough hour");
        let next_year = cycle.means().data()[[1, 4, 0, 0]];
        assert_relative_eq!(next_year - hour13, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn amplitude_is_max_minus_min() {
        let (var, grid) = sample();
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        let amplitude = cycle.amplitude().expect("hour axis exists");
        assert_eq!(amplitude.dims(), &["year", "lat", "lon"]);
        let by_hand: Vec<f64> = (0..8).map(|h| cycle.means().data()[[0, h, 0, 0]]).collect();
        let expected = by_hand.iter().cloned().fold(f64::MIN, f64::max)
            - by_hand.iter().cloned().fold(f64::MAX, f64::min);
        assert_relative_eq!(amplitude.data()[[0, 0, 0]], expected, epsilon = 1e-12);
        // The offset between years cancels in the range.
        assert_relative_eq!(
            amplitude.data()[[1, 0, 0]],
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn phase_finds_the_peak_hour() {
        let (var, grid) = sample();
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        let phase = cycle.phase(1.0).expect("valid scale");
        assert_relative_eq!(phase.data()[[0, 0, 0]], 13.0, epsilon = 1e-12);
        let scaled = cycle.phase(0.5).expect("valid scale");
        assert_relative_eq!(scaled.data()[[0, 0, 0]], 6.5, epsilon = 1e-12);
    }

    #[test]
    fn phase_ties_take_the_earliest_hour() {
        let offsets: Vec<f64> = (0..16).map(|i| (1.5 + 3.0 * i as f64) / 24.0).collect();
        let grid = TimeGrid::new(
            offsets.clone(),
            CivilDate::new(2000, 1, 1).expect("valid date"),
            Calendar::NoLeap,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        let data =
            ArrayD::from_shape_vec(IxDyn(&[16, 1]), vec![2.0; 16]).expect("shape matches");
        let var = LabeledArray::new(
            "pr",
            Unit::KgPerM2PerS,
            vec![
                ("time".to_string(), offsets),
                ("lat".to_string(), vec![0.0]),
            ],
            data,
        )
        .expect("valid labels");
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        let phase = cycle.phase(1.0).expect("valid scale");
        // All hours tie at 2.0: the earliest label (hour 1) wins.
        assert_relative_eq!(phase.data()[[0, 0]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn single_peak_hourly_series_pins_amplitude_and_phase() {
        // Hourly samples covering hours 0..=7 of one day, peaking at hour 3.
        let offsets: Vec<f64> = (0..8).map(|i| (0.5 + i as f64) / 24.0).collect();
        let grid = TimeGrid::new(
            offsets.clone(),
            CivilDate::new(2000, 1, 1).expect("valid date"),
            Calendar::NoLeap,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        let values = vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0];
        let data = ArrayD::from_shape_vec(IxDyn(&[8, 1]), values).expect("shape matches");
        let var = LabeledArray::new(
            "pr",
            Unit::KgPerM2PerS,
            vec![
                ("time".to_string(), offsets),
                ("lat".to_string(), vec![0.0]),
            ],
            data,
        )
        .expect("valid labels");
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        assert_eq!(cycle.hours(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        let amplitude = cycle.amplitude().expect("hour axis exists");
        assert_relative_eq!(amplitude.data()[[0, 0]], 10.0, epsilon = 1e-12);
        let phase = cycle.phase(1.0).expect("valid scale");
        assert_relative_eq!(phase.data()[[0, 0]], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_series_has_zero_amplitude() {
        let offsets: Vec<f64> = (0..24).map(|i| (0.5 + i as f64) / 24.0).collect();
        let grid = TimeGrid::new(
            offsets.clone(),
            CivilDate::new(2000, 1, 1).expect("valid date"),
            Calendar::NoLeap,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        let data =
            ArrayD::from_shape_vec(IxDyn(&[24, 2]), vec![3.5; 48]).expect("shape matches");
        let var = LabeledArray::new(
            "pr",
            Unit::KgPerM2PerS,
            vec![
                ("time".to_string(), offsets),
                ("lat".to_string(), vec![-5.0, 5.0]),
            ],
            data,
        )
        .expect("valid labels");
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        let amplitude = cycle.amplitude().expect("hour axis exists");
        for cell in amplitude.data().iter() {
            assert_relative_eq!(*cell, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_phase_scale_is_rejected() {
        let (var, grid) = sample();
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        assert!(matches!(
            cycle.phase(0.0),
            Err(ClimatologyError::InvalidPhaseScale { .. })
        ));
        assert!(matches!(
            cycle.phase(f64::NAN),
            Err(ClimatologyError::InvalidPhaseScale { .. })
        ));
    }

    #[test]
    fn partial_years_leave_nan_groups() {
        // One and a quarter days: hours 1..=22 of day one, 1..=4 of day two.
        let offsets: Vec<f64> = (0..10).map(|i| (1.5 + 3.0 * i as f64) / 24.0).collect();
        let grid = TimeGrid::new(
            offsets.clone(),
            CivilDate::new(2000, 12, 31).expect("valid date"),
            Calendar::NoLeap,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        let data = ArrayD::from_shape_vec(IxDyn(&[10, 1]), (0..10).map(f64::from).collect())
            .expect("shape matches");
        let var = LabeledArray::new(
            "pr",
            Unit::KgPerM2PerS,
            vec![
                ("time".to_string(), offsets),
                ("lat".to_string(), vec![0.0]),
            ],
            data,
        )
        .expect("valid labels");
        let cycle = diurnal_cycle(&var, &grid).expect("valid input");
        assert_eq!(cycle.years(), &[2000, 2001]);
        // Year 2000 only has hours 1..=22 of December 31; year 2001 only
        // hours 1 and 4 of January 1. Absent groups are NaN with count 0.
        assert_eq!(cycle.counts()[[1, 0]], 1);
        assert_eq!(cycle.counts()[[1, 2]], 0);
        assert!(cycle.means().data()[[1, 2, 0]].is_nan());
        assert!(cycle.means().data()[[0, 0, 0]].is_finite());
    }
}
