//! Canonicalizing datasets from observational products.

use hyetos_grid::{Unit, canonicalize_dims};

use crate::dataset::Dataset;
use crate::error::CatalogError;

/// Brings a dataset into canonical form: aliased dimension names renamed
/// (`latitude` to `lat` and so on) and values converted to `target` units.
///
/// CMIP6 output is usually already canonical; reference products like GPCP
/// (mm/day values on `latitude`/`longitude` axes) go through here before any
/// code shared with model data sees them.
///
/// # Errors
///
/// Returns [`CatalogError::Grid`] when a rename collides with an existing
/// dimension or no conversion to `target` units is defined.
pub fn normalize(dataset: Dataset, target: &Unit) -> Result<Dataset, CatalogError> {
    let (array, time) = dataset.into_parts();
    let array = canonicalize_dims(array)?;
    let array = array.convert_units(target)?;
    Dataset::new(array, time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hyetos_grid::LabeledArray;
    use hyetos_time::{Calendar, CivilDate, TimeAlignment, TimeGrid};
    use ndarray::{ArrayD, IxDyn};

    fn gpcp_like() -> Dataset {
        let offsets = vec![0.5, 1.5];
        let data = ArrayD::from_shape_vec(IxDyn(&[2, 1, 1]), vec![8.64, 17.28])
            .expect("shape matches");
        let array = LabeledArray::new(
            "precip",
            Unit::MmPerDay,
            vec![
                ("time".to_string(), offsets.clone()),
                ("latitude".to_string(), vec![45.0]),
                ("longitude".to_string(), vec![10.0]),
            ],
            data,
        )
        .expect("valid labels");
        let grid = TimeGrid::new(
            offsets,
            CivilDate::new(1996, 10, 1).expect("valid date"),
            Calendar::Gregorian,
            TimeAlignment::Centered,
        )
        .expect("valid grid");
        Dataset::new(array, grid).expect("consistent")
    }

    #[test]
    fn renames_axes_and_converts_units() {
        let ds = normalize(gpcp_like(), &Unit::KgPerM2PerS).expect("convertible");
        let array = ds.array();
        assert_eq!(
            array.dims(),
            &["time".to_string(), "lat".to_string(), "lon".to_string()]
        );
        assert_eq!(*array.units(), Unit::KgPerM2PerS);
        // 8.64 mm/day is 1e-4 kg m-2 s-1.
        assert_relative_eq!(array.data()[[0, 0, 0]], 1.0e-4, epsilon = 1e-12);
        assert_relative_eq!(array.data()[[1, 0, 0]], 2.0e-4, epsilon = 1e-12);
        // The time grid passes through untouched.
        assert_eq!(ds.time().calendar(), Calendar::Gregorian);
    }

    #[test]
    fn normalizing_canonical_data_is_a_no_op() {
        let ds = normalize(gpcp_like(), &Unit::KgPerM2PerS).expect("convertible");
        let again = normalize(ds.clone(), &Unit::KgPerM2PerS).expect("still convertible");
        assert_eq!(again.array().dims(), ds.array().dims());
        assert_eq!(again.array().data(), ds.array().data());
    }

    #[test]
    fn impossible_conversion_is_rejected() {
        let err = normalize(gpcp_like(), &Unit::Kelvin).expect_err("precip is not a temperature");
        assert!(matches!(err, CatalogError::Grid { .. }));
        assert!(err.to_string().contains("mm day-1"));
    }
}
