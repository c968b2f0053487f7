//! Integration tests: the shared-grid workflow for staggered CMIP variables.
//!
//! Precipitation arrives interval-mean with centered timestamps while
//! temperature is instantaneous at interval ends. These tests walk the path
//! the pipelines take: build both grids, align temperature onto the
//! precipitation grid, and resolve the shared axis to calendar labels.

use approx::assert_relative_eq;
use ndarray::{ArrayD, IxDyn};

use hyetos_grid::{LabeledArray, Unit};
use hyetos_time::{Calendar, CivilDate, TimeAlignment, TimeError, TimeGrid, align_to};

fn epoch(y: i32, m: u8, d: u8) -> CivilDate {
    CivilDate::new(y, m, d).expect("valid test date")
}

/// Centered 3-hourly offsets in days: 01:30, 04:30, ...
fn centered_offsets(n: usize) -> Vec<f64> {
    (0..n).map(|i| (1.5 + 3.0 * i as f64) / 24.0).collect()
}

/// Matching end-of-interval offsets in days: 03:00, 06:00, ...
fn end_offsets(n: usize) -> Vec<f64> {
    (0..n).map(|i| (3.0 + 3.0 * i as f64) / 24.0).collect()
}

/// A `(time, lat)` temperature field linear in the time index, with the two
/// latitude rows 100 K apart so any column mixing would be obvious.
fn tas_field(offsets: &[f64]) -> LabeledArray {
    let n = offsets.len();
    let values: Vec<f64> = (0..n)
        .flat_map(|i| [280.0 + i as f64, 380.0 + i as f64])
        .collect();
    let data = ArrayD::from_shape_vec(IxDyn(&[n, 2]), values).expect("shape matches");
    LabeledArray::new(
        "tas",
        Unit::Kelvin,
        vec![
            ("time".to_string(), offsets.to_vec()),
            ("lat".to_string(), vec![-5.0, 5.0]),
        ],
        data,
    )
    .expect("valid labels")
}

#[test]
fn staggered_variable_lands_on_the_precipitation_grid() {
    let e = epoch(2000, 1, 1);
    let pr_grid = TimeGrid::new(
        centered_offsets(16),
        e,
        Calendar::NoLeap,
        TimeAlignment::Centered,
    )
    .expect("valid grid");
    let tas_grid = TimeGrid::new(end_offsets(16), e, Calendar::NoLeap, TimeAlignment::End)
        .expect("valid grid");
    let tas = tas_field(tas_grid.offsets());

    let aligned = align_to(&tas, &tas_grid, &pr_grid).expect("alignable");
    assert_eq!(aligned.shape(), &[16, 2]);
    assert_eq!(aligned.coord("time").expect("present"), pr_grid.offsets());

    // The first destination sample precedes every source sample: clamped.
    assert_relative_eq!(aligned.data()[[0, 0]], 280.0, epsilon = 1e-12);
    assert_relative_eq!(aligned.data()[[0, 1]], 380.0, epsilon = 1e-12);
    // Every later sample sits halfway between consecutive source samples.
    for j in 1..16 {
        let expected = 280.0 + (j - 1) as f64 + 0.5;
        assert_relative_eq!(aligned.data()[[j, 0]], expected, epsilon = 1e-12);
        assert_relative_eq!(aligned.data()[[j, 1]], expected + 100.0, epsilon = 1e-12);
    }
}

#[test]
fn aligned_output_realigns_to_itself_bit_for_bit() {
    let e = epoch(2000, 1, 1);
    let pr_grid = TimeGrid::new(
        centered_offsets(16),
        e,
        Calendar::NoLeap,
        TimeAlignment::Centered,
    )
    .expect("valid grid");
    let tas_grid = TimeGrid::new(end_offsets(16), e, Calendar::NoLeap, TimeAlignment::End)
        .expect("valid grid");
    let tas = tas_field(tas_grid.offsets());

    let aligned = align_to(&tas, &tas_grid, &pr_grid).expect("alignable");
    let again = align_to(&aligned, &pr_grid, &pr_grid).expect("alignable");
    let a = aligned.data().as_slice().expect("contiguous");
    let b = again.data().as_slice().expect("contiguous");
    for (x, y) in a.iter().zip(b) {
        assert_eq!(
            x.to_bits(),
            y.to_bits(),
            "re-alignment must not perturb samples"
        );
    }
}

#[test]
fn shared_grid_labels_group_by_day_and_hour() {
    let e = epoch(2000, 1, 1);
    let grid = TimeGrid::new(
        centered_offsets(16),
        e,
        Calendar::NoLeap,
        TimeAlignment::Centered,
    )
    .expect("valid grid");
    let labels = grid.labels().expect("resolvable");

    // Centered 3-hourly stamps read 01:30, 04:30, ...: hours 1, 4, ..., 22.
    let first_day: Vec<u8> = labels.iter().take(8).map(|p| p.hour).collect();
    assert_eq!(first_day, vec![1, 4, 7, 10, 13, 16, 19, 22]);
    assert!(labels[..8].iter().all(|p| p.year == 2000 && p.doy == 1));
    assert!(labels[8..].iter().all(|p| p.year == 2000 && p.doy == 2));
    // The second day repeats the same hour labels.
    let second_day: Vec<u8> = labels.iter().skip(8).map(|p| p.hour).collect();
    assert_eq!(first_day, second_day);
}

#[test]
fn year_end_labels_depend_on_the_calendar() {
    // 2000 is a Gregorian leap year, so day offset 365 from Jan 1 is still
    // Dec 31 2000; the no-leap calendar has already rolled into 2001.
    let e = epoch(2000, 1, 1);
    let offsets = vec![364.5, 365.5];
    let noleap = TimeGrid::new(offsets.clone(), e, Calendar::NoLeap, TimeAlignment::Centered)
        .expect("valid grid");
    let gregorian = TimeGrid::new(offsets, e, Calendar::Gregorian, TimeAlignment::Centered)
        .expect("valid grid");

    let nl = noleap.labels().expect("resolvable");
    assert_eq!((nl[0].year, nl[0].doy), (2000, 365));
    assert_eq!((nl[1].year, nl[1].doy), (2001, 1));

    let gr = gregorian.labels().expect("resolvable");
    assert_eq!((gr[0].year, gr[0].doy), (2000, 365));
    assert_eq!((gr[1].year, gr[1].doy), (2000, 366));
}

#[test]
fn sub_minute_noise_cannot_shift_an_hour_label() {
    let e = epoch(2000, 1, 1);
    // 03:00 written with float noise a hair below the exact value, and noise
    // just below midnight.
    let offsets = vec![0.124_999_999_999, 0.999_999_999_9];
    let grid =
        TimeGrid::new(offsets, e, Calendar::NoLeap, TimeAlignment::End).expect("valid grid");
    let labels = grid.labels().expect("resolvable");
    assert_eq!((labels[0].doy, labels[0].hour), (1, 3));
    // The near-midnight stamp rounds forward into the next day.
    assert_eq!((labels[1].doy, labels[1].hour), (2, 0));
}

#[test]
fn epoch_rebasing_matches_identical_instants() {
    // The same instants, one grid referenced to Jan 1 and one to Feb 1.
    let jan = epoch(2000, 1, 1);
    let feb = epoch(2000, 2, 1);
    let src = TimeGrid::new(
        vec![31.25, 31.5, 31.75],
        jan,
        Calendar::NoLeap,
        TimeAlignment::End,
    )
    .expect("valid grid");
    let dst = TimeGrid::new(vec![0.25, 0.5, 0.75], feb, Calendar::NoLeap, TimeAlignment::End)
        .expect("valid grid");

    let values = vec![1.0, 2.0, 3.0];
    let data = ArrayD::from_shape_vec(IxDyn(&[3]), values.clone()).expect("shape matches");
    let var = LabeledArray::new(
        "tas",
        Unit::Kelvin,
        vec![("time".to_string(), src.offsets().to_vec())],
        data,
    )
    .expect("valid labels");

    let out = align_to(&var, &src, &dst).expect("alignable");
    // Identical instants after rebasing: copied, not blended.
    for (i, v) in values.iter().enumerate() {
        assert_eq!(out.data()[[i]].to_bits(), v.to_bits());
    }
    assert_eq!(out.coord("time").expect("present"), &[0.25, 0.5, 0.75]);
}

#[test]
fn incompatible_grids_are_reported_not_guessed() {
    let e = epoch(2000, 1, 1);
    let three_hourly = TimeGrid::new(
        centered_offsets(8),
        e,
        Calendar::NoLeap,
        TimeAlignment::Centered,
    )
    .expect("valid grid");
    let six_offsets: Vec<f64> = (0..4).map(|i| (3.0 + 6.0 * i as f64) / 24.0).collect();
    let six_hourly = TimeGrid::new(six_offsets, e, Calendar::NoLeap, TimeAlignment::Centered)
        .expect("valid grid");
    let tas = tas_field(three_hourly.offsets());

    let err = align_to(&tas, &three_hourly, &six_hourly).expect_err("steps differ");
    assert!(matches!(err, TimeError::StepMismatch { .. }));

    let gregorian = TimeGrid::new(
        centered_offsets(8),
        e,
        Calendar::Gregorian,
        TimeAlignment::Centered,
    )
    .expect("valid grid");
    let err = align_to(&tas, &three_hourly, &gregorian).expect_err("calendars differ");
    assert!(matches!(err, TimeError::CalendarMismatch { .. }));
}
