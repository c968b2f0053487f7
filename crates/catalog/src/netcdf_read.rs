//! Low-level helpers for pulling variables and CF metadata out of NetCDF
//! files.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use netcdf::AttributeValue;

use hyetos_grid::{SECONDS_PER_DAY, Unit};
use hyetos_time::{Calendar, CivilDate, TimeAlignment};

use crate::error::CatalogError;

/// Open a NetCDF file at `path`, returning [`CatalogError::FileNotFound`] if
/// the path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Look up a variable, returning [`CatalogError::MissingVariable`] when the
/// file does not carry it.
pub(crate) fn lookup<'f>(
    file: &'f netcdf::File,
    name: &str,
    path: &Path,
) -> Result<netcdf::Variable<'f>, CatalogError> {
    file.variable(name)
        .ok_or_else(|| CatalogError::MissingVariable {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Read a variable's full data as `f64`, replacing `_FillValue` and
/// `missing_value` matches with NaN. Returns the data together with the
/// variable's dimension names in axis order.
pub(crate) fn variable_data(
    var: &netcdf::Variable<'_>,
) -> Result<(ArrayD<f64>, Vec<String>), CatalogError> {
    let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mut values = var.get_values::<f64, _>(..)?;
    for fill in fill_values(var) {
        for v in values.iter_mut() {
            if *v == fill {
                *v = f64::NAN;
            }
        }
    }
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| CatalogError::Netcdf {
        reason: e.to_string(),
    })?;
    Ok((data, dims))
}

/// The variable's `units` attribute parsed into a [`Unit`].
///
/// A missing attribute maps to `Unit::Other("unknown")` so that later unit
/// checks fail loudly instead of silently treating the data as dimensionless.
pub(crate) fn variable_units(var: &netcdf::Variable<'_>) -> Unit {
    match attr_string(var, "units") {
        Some(s) => Unit::parse(&s),
        None => Unit::Other("unknown".to_string()),
    }
}

/// Timestamp alignment implied by the variable's `cell_methods` attribute.
///
/// CF writes interval means as `time: mean` (centered timestamps) and
/// instantaneous samples as `time: point` (the sample closes its interval).
/// Anything else, including an absent attribute, yields `None`.
pub(crate) fn variable_alignment(var: &netcdf::Variable<'_>) -> Option<TimeAlignment> {
    alignment_from_cell_methods(&attr_string(var, "cell_methods")?)
}

pub(crate) fn alignment_from_cell_methods(methods: &str) -> Option<TimeAlignment> {
    let mut tokens = methods.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "time:" {
            return match tokens.next() {
                Some("mean") => Some(TimeAlignment::Centered),
                Some("point") => Some(TimeAlignment::End),
                _ => None,
            };
        }
    }
    None
}

/// Read a 1-D coordinate variable named after its dimension.
pub(crate) fn read_coord(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<f64>, CatalogError> {
    let var = file
        .variable(name)
        .ok_or_else(|| CatalogError::MissingCoordinate {
            dim: name.to_string(),
            path: path.to_path_buf(),
        })?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Read and decode a time coordinate: offsets rescaled to fractional days,
/// plus the epoch and calendar from the CF `units`/`calendar` attributes.
pub(crate) fn read_time(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<(Vec<f64>, CivilDate, Calendar), CatalogError> {
    let var = file
        .variable(name)
        .ok_or_else(|| CatalogError::MissingCoordinate {
            dim: name.to_string(),
            path: path.to_path_buf(),
        })?;
    let raw = var.get_values::<f64, _>(..)?;

    let units = attr_string(&var, "units").ok_or_else(|| CatalogError::InvalidTime {
        reason: format!("time variable '{name}' has no 'units' attribute"),
    })?;
    let (scale, epoch) = parse_time_units(&units)?;
    let offsets = raw.iter().map(|v| v * scale).collect();

    let calendar_name = attr_string(&var, "calendar").unwrap_or_else(|| "noleap".to_string());
    let calendar = Calendar::parse(&calendar_name)?;

    Ok((offsets, epoch, calendar))
}

/// Parse a CF time units string like `"days since 2000-01-01"` or
/// `"hours since 1979-10-01 00:00:00"` into a to-days scale factor and the
/// epoch date.
pub(crate) fn parse_time_units(units: &str) -> Result<(f64, CivilDate), CatalogError> {
    let parts: Vec<&str> = units.trim().splitn(3, ' ').collect();
    if parts.len() < 3 || parts[1] != "since" {
        return Err(CatalogError::InvalidTime {
            reason: format!("unexpected time units format: '{units}'"),
        });
    }

    let scale = match parts[0] {
        "days" | "day" => 1.0,
        "hours" | "hour" => 1.0 / 24.0,
        "minutes" | "minute" => 1.0 / 1440.0,
        "seconds" | "second" => 1.0 / SECONDS_PER_DAY,
        other => {
            return Err(CatalogError::InvalidTime {
                reason: format!("unsupported time unit '{other}' in '{units}'"),
            });
        }
    };

    // Take the date portion, dropping any trailing clock time.
    let end = parts[2].find([' ', 'T']).unwrap_or(parts[2].len());
    let epoch = CivilDate::parse(&parts[2][..end])?;

    Ok((scale, epoch))
}

/// Read a string attribute from a variable, or `None` when absent or
/// non-string.
fn attr_string(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    var.attribute_value(name)
        .and_then(|res| res.ok())
        .and_then(|av| match av {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        })
}

/// Fill markers declared on the variable, as `f64` for comparison against
/// the decoded data.
fn fill_values(var: &netcdf::Variable<'_>) -> Vec<f64> {
    ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| var.attribute_value(name))
        .filter_map(Result::ok)
        .filter_map(attr_f64)
        .collect()
}

fn attr_f64(value: AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().copied().map(f64::from),
        _ => None,
    }
}
