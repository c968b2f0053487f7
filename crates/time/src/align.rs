//! Linear interpolation of a field from one time grid onto another.
//!
//! CMIP6 writes interval-mean variables with centered timestamps and
//! instantaneous ones at interval ends, so `pr` and `tas` from the same run
//! sit on grids offset by half a step. Alignment resolves both grids to a
//! common epoch, then linearly interpolates the source field onto the
//! destination sample times.

use ndarray::{ArrayD, Axis, IxDyn, Zip};

use hyetos_grid::{DIM_TIME, LabeledArray};

use crate::error::TimeError;
use crate::grid::{SPACING_REL_TOL, TimeGrid};

/// Offsets closer than this (in days) are treated as the same instant.
const OFFSET_EQ_TOL: f64 = 1e-9;

/// How one destination sample is built from source samples.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SampleRule {
    /// Copy source sample `i` unchanged.
    Copy(usize),
    /// Blend source samples `lo` and `hi` with weight `w` toward `hi`.
    Blend { lo: usize, hi: usize, w: f64 },
}

/// Interpolates `var` from the grid `src` onto the grid `dst`.
///
/// Destination samples that coincide with a source sample (within a
/// nanosecond-scale tolerance) are copied bit-for-bit, so aligning a grid
/// onto itself returns the input unchanged. Samples outside the source range
/// are clamped to the nearest boundary sample. NaN in a contributing source
/// sample propagates into the destination sample.
///
/// The returned array carries `dst`'s offsets as its time coordinate; pair it
/// with `dst` downstream.
///
/// # Errors
///
/// Returns [`TimeError::LengthMismatch`] when `var`'s time axis disagrees
/// with `src`, [`TimeError::CalendarMismatch`] and [`TimeError::StepMismatch`]
/// when the grids are not alignable, [`TimeError::IrregularSpacing`] when
/// either grid has uneven spacing, and [`TimeError::Grid`] when `var` has no
/// time dimension.
pub fn align_to(
    var: &LabeledArray,
    src: &TimeGrid,
    dst: &TimeGrid,
) -> Result<LabeledArray, TimeError> {
    let axis = var.axis_of(DIM_TIME)?;
    let axis_len = var.len_of(DIM_TIME)?;
    if axis_len != src.len() {
        return Err(TimeError::LengthMismatch {
            axis_len,
            grid_len: src.len(),
        });
    }

    let src_step = src.step()?;
    let dst_step = dst.step()?;
    if (src_step - dst_step).abs() > SPACING_REL_TOL * dst_step {
        return Err(TimeError::StepMismatch {
            src: src_step,
            dst: dst_step,
        });
    }

    // Destination sample times expressed on the source epoch.
    let shift = src.offset_shift_from(dst)?;
    let rules: Vec<SampleRule> = dst
        .offsets()
        .iter()
        .map(|&t| sample_rule(src.offsets(), t + shift))
        .collect();

    let data = var.data();
    let mut out_shape = data.shape().to_vec();
    out_shape[axis] = dst.len();
    let mut out = ArrayD::<f64>::zeros(IxDyn(&out_shape));
    for (j, rule) in rules.iter().enumerate() {
        let mut slot = out.index_axis_mut(Axis(axis), j);
        match *rule {
            SampleRule::Copy(i) => slot.assign(&data.index_axis(Axis(axis), i)),
            SampleRule::Blend { lo, hi, w } => {
                let a = data.index_axis(Axis(axis), lo);
                let b = data.index_axis(Axis(axis), hi);
                Zip::from(&mut slot)
                    .and(&a)
                    .and(&b)
                    .for_each(|o, &x, &y| *o = x + (y - x) * w);
            }
        }
    }

    let mut dims = var.labeled_dims();
    dims[axis].1 = dst.offsets().to_vec();
    Ok(LabeledArray::new(var.name(), var.units().clone(), dims, out)?)
}

/// Decides how the destination sample at source-epoch time `t` is built.
///
/// `offsets` is strictly increasing, as guaranteed by [`TimeGrid`].
fn sample_rule(offsets: &[f64], t: f64) -> SampleRule {
    let n = offsets.len();
    let k = offsets.partition_point(|&o| o < t);
    if k < n && (offsets[k] - t).abs() <= OFFSET_EQ_TOL {
        return SampleRule::Copy(k);
    }
    if k > 0 && (offsets[k - 1] - t).abs() <= OFFSET_EQ_TOL {
        return SampleRule::Copy(k - 1);
    }
    if k == 0 {
        // Before the first source sample: clamp to the boundary.
        return SampleRule::Copy(0);
    }
    if k == n {
        return SampleRule::Copy(n - 1);
    }
    let (lo, hi) = (offsets[k - 1], offsets[k]);
    SampleRule::Blend {
        lo: k - 1,
        hi: k,
        w: (t - lo) / (hi - lo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Calendar, CivilDate};
    use crate::grid::TimeAlignment;
    use approx::assert_relative_eq;
    use hyetos_grid::Unit;

    fn epoch(y: i32, m: u8, d: u8) -> CivilDate {
        CivilDate::new(y, m, d).expect("valid test date")
    }

    fn grid_of(offsets: Vec<f64>, e: CivilDate, alignment: TimeAlignment) -> TimeGrid {
        TimeGrid::new(offsets, e, Calendar::NoLeap, alignment).expect("valid grid")
    }

    fn series(values: Vec<f64>, offsets: &[f64]) -> LabeledArray {
        let data = ArrayD::from_shape_vec(IxDyn(&[values.len()]), values).expect("shape matches");
        LabeledArray::new(
            "tas",
            Unit::Kelvin,
            vec![("time".to_string(), offsets.to_vec())],
            data,
        )
        .expect("valid labels")
    }

    #[test]
    fn aligning_onto_itself_is_identity() {
        let e = epoch(2000, 1, 1);
        let offsets: Vec<f64> = (0..8).map(|i| 0.0625 + 0.125 * i as f64).collect();
        let grid = grid_of(offsets.clone(), e, TimeAlignment::Centered);
        let var = series(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0], &offsets);
        let out = align_to(&var, &grid, &grid).expect("alignable");
        assert_eq!(
            out.data().as_slice().expect("contiguous"),
            var.data().as_slice().expect("contiguous"),
            "self-alignment must copy samples bit-for-bit"
        );
    }

    #[test]
    fn half_step_offset_blends_neighbors() {
        let e = epoch(2000, 1, 1);
        // Source stamped at interval ends, destination centered half a step
        // earlier: 0.125, 0.25, ... vs 0.0625, 0.1875, ...
        let src_off: Vec<f64> = (1..=8).map(|i| 0.125 * i as f64).collect();
        let dst_off: Vec<f64> = (0..8).map(|i| 0.0625 + 0.125 * i as f64).collect();
        let src = grid_of(src_off.clone(), e, TimeAlignment::End);
        let dst = grid_of(dst_off, e, TimeAlignment::Centered);
        let var = series((1..=8).map(f64::from).collect(), &src_off);
        let out = align_to(&var, &src, &dst).expect("alignable");
        // First destination sample precedes the source range: clamped.
        assert_relative_eq!(out.data()[[0]], 1.0, epsilon = 1e-12);
        // Interior samples are midpoints of consecutive source values.
        assert_relative_eq!(out.data()[[1]], 1.5, epsilon = 1e-12);
        assert_relative_eq!(out.data()[[4]], 4.5, epsilon = 1e-12);
    }

    #[test]
    fn epoch_difference_is_rebased() {
        let src_e = epoch(2000, 1, 1);
        let dst_e = epoch(2000, 1, 2); // one day later
        let src_off = vec![1.0, 2.0, 3.0, 4.0];
        let src = grid_of(src_off.clone(), src_e, TimeAlignment::End);
        // Offsets 0.5, 1.5, 2.5 on the later epoch are 1.5, 2.5, 3.5 on the
        // earlier one.
        let dst = grid_of(vec![0.5, 1.5, 2.5], dst_e, TimeAlignment::Centered);
        let var = series(vec![10.0, 20.0, 30.0, 40.0], &src_off);
        let out = align_to(&var, &src, &dst).expect("alignable");
        assert_relative_eq!(out.data()[[0]], 15.0, epsilon = 1e-12);
        assert_relative_eq!(out.data()[[1]], 25.0, epsilon = 1e-12);
        assert_relative_eq!(out.data()[[2]], 35.0, epsilon = 1e-12);
        assert_eq!(out.coord("time").expect("present"), &[0.5, 1.5, 2.5]);
    }

    #[test]
    fn step_mismatch_is_rejected() {
        let e = epoch(2000, 1, 1);
        let src = grid_of(vec![0.125, 0.25, 0.375, 0.5], e, TimeAlignment::End);
        let dst = grid_of(vec![0.25, 0.5, 0.75], e, TimeAlignment::Centered);
        let var = series(vec![1.0, 2.0, 3.0, 4.0], src.offsets());
        let err = align_to(&var, &src, &dst).expect_err("3-hourly vs 6-hourly");
        assert!(matches!(err, TimeError::StepMismatch { .. }));
    }

    #[test]
    fn calendar_mismatch_is_rejected() {
        let e = epoch(2000, 1, 1);
        let src = TimeGrid::new(
            vec![0.5, 1.5],
            e,
            Calendar::NoLeap,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        let dst = TimeGrid::new(
            vec![0.5, 1.5],
            e,
            Calendar::Gregorian,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        let var = series(vec![1.0, 2.0], src.offsets());
        let err = align_to(&var, &src, &dst).expect_err("calendars differ");
        assert!(matches!(err, TimeError::CalendarMismatch { .. }));
    }

    #[test]
    fn irregular_source_grid_is_rejected() {
        let e = epoch(2000, 1, 1);
        let src = grid_of(vec![0.0, 1.0, 2.5, 3.0], e, TimeAlignment::End);
        let dst = grid_of(vec![0.5, 1.5, 2.5], e, TimeAlignment::Centered);
        let var = series(vec![1.0, 2.0, 3.0, 4.0], src.offsets());
        let err = align_to(&var, &src, &dst).expect_err("uneven spacing");
        assert!(matches!(err, TimeError::IrregularSpacing { .. }));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let e = epoch(2000, 1, 1);
        let src = grid_of(vec![0.5, 1.5, 2.5], e, TimeAlignment::Centered);
        let var = series(vec![1.0, 2.0], &[0.5, 1.5]);
        let err = align_to(&var, &src, &src.clone()).expect_err("axis shorter than grid");
        assert!(matches!(err, TimeError::LengthMismatch { .. }));
    }

    #[test]
    fn nan_propagates_through_blending() {
        let e = epoch(2000, 1, 1);
        let src_off = vec![1.0, 2.0, 3.0];
        let src = grid_of(src_off.clone(), e, TimeAlignment::End);
        let dst = grid_of(vec![1.5, 2.5], e, TimeAlignment::Centered);
        let var = series(vec![1.0, f64::NAN, 3.0], &src_off);
        let out = align_to(&var, &src, &dst).expect("alignable");
        assert!(out.data()[[0]].is_nan());
        assert!(out.data()[[1]].is_nan());
    }

    #[test]
    fn multidimensional_fields_interpolate_along_time_only() {
        let e = epoch(2000, 1, 1);
        let src_off = vec![1.0, 2.0];
        let src = grid_of(src_off.clone(), e, TimeAlignment::End);
        let dst = grid_of(vec![1.5, 2.5], e, TimeAlignment::Centered);
        let data = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![0.0, 10.0, 4.0, 30.0])
            .expect("shape matches");
        let var = LabeledArray::new(
            "tas",
            Unit::Kelvin,
            vec![
                ("time".to_string(), src_off),
                ("lat".to_string(), vec![-5.0, 5.0]),
            ],
            data,
        )
        .expect("valid labels");
        let out = align_to(&var, &src, &dst).expect("alignable");
        assert_eq!(out.shape(), &[2, 2]);
        assert_relative_eq!(out.data()[[0, 0]], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out.data()[[0, 1]], 20.0, epsilon = 1e-12);
        // Past the last source sample: clamped per column.
        assert_relative_eq!(out.data()[[1, 0]], 4.0, epsilon = 1e-12);
        assert_relative_eq!(out.data()[[1, 1]], 30.0, epsilon = 1e-12);
    }
}
