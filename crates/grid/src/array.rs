//! Dense n-dimensional arrays with named dimensions and coordinates.

use std::borrow::Cow;

use ndarray::{ArrayD, ArrayView1, Axis};

use crate::error::GridError;
use crate::units::Unit;

/// Tolerance used when comparing coordinate values across grids.
///
/// Coordinates are degrees or day offsets, so a relative tolerance anchored
/// at 1.0 absorbs float noise without hiding genuinely different grids.
pub(crate) const COORD_TOL: f64 = 1e-8;

pub(crate) fn coords_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= COORD_TOL * a.abs().max(b.abs()).max(1.0)
}

/// A dense array of `f64` values with one name and one coordinate vector per
/// dimension, plus a variable name and physical units.
///
/// Invariants, enforced at construction and preserved by every method:
/// the number of labels equals the rank of the data, dimension names are
/// unique, each coordinate vector matches the length of its axis, and each
/// coordinate vector is finite and strictly monotonic.
///
/// Missing samples are carried as NaN in the data itself; reductions skip
/// them rather than poisoning the result.
#[derive(Debug, Clone)]
pub struct LabeledArray {
    name: String,
    units: Unit,
    dims: Vec<String>,
    coords: Vec<Vec<f64>>,
    data: ArrayD<f64>,
}

impl LabeledArray {
    /// Builds a labeled array, validating every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RankMismatch`], [`GridError::DuplicateDimension`],
    /// [`GridError::CoordLength`] or [`GridError::NonMonotonicCoord`] when the
    /// labels do not describe the data.
    pub fn new(
        name: impl Into<String>,
        units: Unit,
        dims: Vec<(String, Vec<f64>)>,
        data: ArrayD<f64>,
    ) -> Result<Self, GridError> {
        if dims.len() != data.ndim() {
            return Err(GridError::RankMismatch {
                expected: data.ndim(),
                got: dims.len(),
            });
        }
        for (i, (dim, _)) in dims.iter().enumerate() {
            if dims[..i].iter().any(|(other, _)| other == dim) {
                return Err(GridError::DuplicateDimension { dim: dim.clone() });
            }
        }
        for (axis, (dim, coord)) in dims.iter().enumerate() {
            if coord.len() != data.len_of(Axis(axis)) {
                return Err(GridError::CoordLength {
                    dim: dim.clone(),
                    coord_len: coord.len(),
                    axis_len: data.len_of(Axis(axis)),
                });
            }
            validate_monotonic(dim, coord)?;
        }
        let (dims, coords) = dims.into_iter().unzip();
        Ok(Self {
            name: name.into(),
            units,
            dims,
            coords,
            data,
        })
    }

    /// Variable name, e.g. `pr` or `tas`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical units of the values.
    pub fn units(&self) -> &Unit {
        &self.units
    }

    /// Dimension names in axis order.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Shape of the underlying data.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The raw data array.
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Position of `dim` among the axes.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array does not carry `dim`.
    pub fn axis_of(&self, dim: &str) -> Result<usize, GridError> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| GridError::UnknownDimension {
                dim: dim.to_string(),
                available: self.dims.join(", "),
            })
    }

    /// Coordinate vector of `dim`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array does not carry `dim`.
    pub fn coord(&self, dim: &str) -> Result<&[f64], GridError> {
        let axis = self.axis_of(dim)?;
        Ok(&self.coords[axis])
    }

    /// Length of the axis named `dim`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array does not carry `dim`.
    pub fn len_of(&self, dim: &str) -> Result<usize, GridError> {
        let axis = self.axis_of(dim)?;
        Ok(self.data.len_of(Axis(axis)))
    }

    /// Dimension/coordinate pairs in axis order, for rebuilding derived arrays.
    pub fn labeled_dims(&self) -> Vec<(String, Vec<f64>)> {
        self.dims
            .iter()
            .cloned()
            .zip(self.coords.iter().cloned())
            .collect()
    }

    /// The values in row-major order, borrowing when the layout allows it.
    pub fn flat_values(&self) -> Cow<'_, [f64]> {
        match self.data.as_slice() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(self.data.iter().copied().collect()),
        }
    }

    /// Rebuilds the array with the same labels around new values.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] when `data` does not match the
    /// labeled shape.
    pub fn with_data(&self, data: ArrayD<f64>) -> Result<Self, GridError> {
        if data.shape() != self.data.shape() {
            return Err(GridError::ShapeMismatch {
                expected: self.data.shape().to_vec(),
                got: data.shape().to_vec(),
            });
        }
        Ok(Self {
            name: self.name.clone(),
            units: self.units.clone(),
            dims: self.dims.clone(),
            coords: self.coords.clone(),
            data,
        })
    }

    /// Returns a copy with a different variable name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.name = name.into();
        out
    }

    /// Returns a copy relabeled with `units`, leaving the values untouched.
    ///
    /// For derived quantities whose unit is established by construction;
    /// use [`LabeledArray::convert_units`] to change units of measured data.
    pub fn with_units(&self, units: Unit) -> Self {
        let mut out = self.clone();
        out.units = units;
        out
    }

    /// Applies `f` to every value, keeping labels and units.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = self.clone();
        out.data.mapv_inplace(f);
        out
    }

    /// Converts the values to `target` units.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnitConversion`] when no conversion between the
    /// current units and `target` is defined.
    pub fn convert_units(&self, target: &Unit) -> Result<Self, GridError> {
        let map = self.units.conversion_to(target).ok_or_else(|| {
            GridError::UnitConversion {
                from: self.units.to_string(),
                to: target.to_string(),
                variable: self.name.clone(),
            }
        })?;
        let mut out = self.clone();
        out.units = target.clone();
        if !map.is_identity() {
            out.data.mapv_inplace(|v| map.apply(v));
        }
        Ok(out)
    }

    /// Renames dimension `from` to `to`, keeping its coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when `from` is absent and
    /// [`GridError::RenameCollision`] when `to` is already taken.
    pub fn rename_dim(&self, from: &str, to: &str) -> Result<Self, GridError> {
        let axis = self.axis_of(from)?;
        if from != to && self.dims.iter().any(|d| d == to) {
            return Err(GridError::RenameCollision {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let mut out = self.clone();
        out.dims[axis] = to.to_string();
        Ok(out)
    }

    /// Checks that `other` lives on the same grid: same dimension names in the
    /// same order, same shape and matching coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LayoutMismatch`] or [`GridError::CoordMismatch`]
    /// describing the first disagreement found.
    pub fn same_layout(&self, other: &LabeledArray) -> Result<(), GridError> {
        if self.dims != other.dims || self.data.shape() != other.data.shape() {
            return Err(GridError::LayoutMismatch {
                left: layout_string(&self.dims, self.data.shape()),
                right: layout_string(&other.dims, other.data.shape()),
            });
        }
        for (axis, dim) in self.dims.iter().enumerate() {
            let (a, b) = (&self.coords[axis], &other.coords[axis]);
            if let Some(index) = (0..a.len()).find(|&i| !coords_close(a[i], b[i])) {
                return Err(GridError::CoordMismatch {
                    dim: dim.clone(),
                    index,
                    left: a[index],
                    right: b[index],
                });
            }
        }
        Ok(())
    }

    /// Reduces away `dim` by applying `f` to each lane along it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array does not carry `dim`.
    pub fn reduce_over(
        &self,
        dim: &str,
        f: impl Fn(ArrayView1<'_, f64>) -> f64,
    ) -> Result<Self, GridError> {
        let axis = self.axis_of(dim)?;
        let data = self.data.map_axis(Axis(axis), |lane| f(lane));
        let mut dims = self.dims.clone();
        let mut coords = self.coords.clone();
        dims.remove(axis);
        coords.remove(axis);
        Ok(Self {
            name: self.name.clone(),
            units: self.units.clone(),
            dims,
            coords,
            data,
        })
    }

    /// Mean over `dim`, skipping NaN. Lanes with no finite values yield NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array does not carry `dim`.
    pub fn mean_over(&self, dim: &str) -> Result<Self, GridError> {
        self.reduce_over(dim, |lane| nan_mean(lane.iter().copied()))
    }

    /// Maximum over `dim`, skipping NaN. Lanes with no finite values yield NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array does not carry `dim`.
    pub fn max_over(&self, dim: &str) -> Result<Self, GridError> {
        self.reduce_over(dim, |lane| nan_extreme(lane.iter().copied(), f64::max))
    }

    /// Minimum over `dim`, skipping NaN. Lanes with no finite values yield NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownDimension`] when the array does not carry `dim`.
    pub fn min_over(&self, dim: &str) -> Result<Self, GridError> {
        self.reduce_over(dim, |lane| nan_extreme(lane.iter().copied(), f64::min))
    }
}

fn layout_string(dims: &[String], shape: &[usize]) -> String {
    let parts: Vec<String> = dims
        .iter()
        .zip(shape.iter())
        .map(|(d, n)| format!("{d}={n}"))
        .collect();
    format!("[{}]", parts.join(", "))
}

fn validate_monotonic(dim: &str, coord: &[f64]) -> Result<(), GridError> {
    if coord.iter().any(|v| !v.is_finite()) {
        return Err(GridError::NonMonotonicCoord {
            dim: dim.to_string(),
        });
    }
    if coord.len() < 2 {
        return Ok(());
    }
    let increasing = coord.windows(2).all(|w| w[0] < w[1]);
    let decreasing = coord.windows(2).all(|w| w[0] > w[1]);
    if increasing || decreasing {
        Ok(())
    } else {
        Err(GridError::NonMonotonicCoord {
            dim: dim.to_string(),
        })
    }
}

/// Mean of the finite values in `iter`, or NaN when there are none.
pub fn nan_mean(iter: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in iter {
        if v.is_finite() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Extreme of the finite values in `iter` under `pick`, or NaN when there are none.
pub fn nan_extreme(iter: impl Iterator<Item = f64>, pick: impl Fn(f64, f64) -> f64) -> f64 {
    let mut acc = f64::NAN;
    for v in iter {
        if v.is_finite() {
            acc = if acc.is_nan() { v } else { pick(acc, v) };
        }
    }
    acc
}
