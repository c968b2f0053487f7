//! Canonical dimension names and alias handling.
//!
//! Model output and observational products disagree on dimension naming
//! (`lat` vs `latitude` and so on). Everything downstream of the loaders
//! speaks the canonical names, so selection and aggregation code never has
//! to carry alias lists of its own.

use crate::array::LabeledArray;
use crate::error::GridError;

/// Canonical time dimension name.
pub const DIM_TIME: &str = "time";
/// Canonical latitude dimension name.
pub const DIM_LAT: &str = "lat";
/// Canonical longitude dimension name.
pub const DIM_LON: &str = "lon";

/// Alias spellings mapped onto canonical names.
const DIM_ALIASES: &[(&str, &str)] = &[
    ("latitude", DIM_LAT),
    ("Latitude", DIM_LAT),
    ("longitude", DIM_LON),
    ("Longitude", DIM_LON),
    ("Time", DIM_TIME),
    ("datetime", DIM_TIME),
];

/// Maps a dimension name onto its canonical spelling, or returns it unchanged.
pub fn canonical_dim(name: &str) -> &str {
    DIM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Renames every aliased dimension of `array` to its canonical spelling.
///
/// # Errors
///
/// Returns [`GridError::RenameCollision`] when an array carries both an alias
/// and the canonical name it maps to.
pub fn canonicalize_dims(array: LabeledArray) -> Result<LabeledArray, GridError> {
    let renames: Vec<(String, String)> = array
        .dims()
        .iter()
        .filter_map(|dim| {
            let canonical = canonical_dim(dim);
            (canonical != dim).then(|| (dim.clone(), canonical.to_string()))
        })
        .collect();
    let mut out = array;
    for (from, to) in renames {
        out = out.rename_dim(&from, &to)?;
    }
    Ok(out)
}
