//! Error types for labeled-array construction and selection.

use thiserror::Error;

/// Errors raised by [`crate::LabeledArray`] construction, lookup and selection.
#[derive(Debug, Error)]
pub enum GridError {
    /// The number of dimension labels does not match the rank of the data.
    #[error("expected {expected} dimension labels for rank-{expected} data, got {got}")]
    RankMismatch {
        /// Rank of the data array.
        expected: usize,
        /// Number of labels supplied.
        got: usize,
    },

    /// The same dimension name was supplied more than once.
    #[error("duplicate dimension name '{dim}'")]
    DuplicateDimension {
        /// Offending dimension name.
        dim: String,
    },

    /// A coordinate vector does not match the length of its axis.
    #[error("coordinate '{dim}' has {coord_len} entries but the axis has length {axis_len}")]
    CoordLength {
        /// Dimension the coordinate belongs to.
        dim: String,
        /// Length of the coordinate vector.
        coord_len: usize,
        /// Length of the corresponding data axis.
        axis_len: usize,
    },

    /// A coordinate vector is not strictly monotonic or contains non-finite values.
    #[error("coordinate '{dim}' must be finite and strictly monotonic")]
    NonMonotonicCoord {
        /// Offending dimension name.
        dim: String,
    },

    /// A dimension name was requested that the array does not carry.
    #[error("unknown dimension '{dim}' (available: {available})")]
    UnknownDimension {
        /// Requested dimension name.
        dim: String,
        /// Comma-separated list of dimensions the array does carry.
        available: String,
    },

    /// A coordinate range selection matched no grid points.
    #[error("selection {lo}..={hi} on dimension '{dim}' matches no grid points")]
    EmptySelection {
        /// Dimension the selection was applied to.
        dim: String,
        /// Lower bound of the requested range.
        lo: f64,
        /// Upper bound of the requested range.
        hi: f64,
    },

    /// Two arrays that must share a grid have different shapes or dimensions.
    #[error("array layouts differ: {left} vs {right}")]
    LayoutMismatch {
        /// Description of the left-hand layout.
        left: String,
        /// Description of the right-hand layout.
        right: String,
    },

    /// Two arrays that must share a grid disagree on a coordinate value.
    #[error("coordinate '{dim}' differs at index {index}: {left} vs {right}")]
    CoordMismatch {
        /// Dimension the disagreement was found on.
        dim: String,
        /// Index of the first disagreeing entry.
        index: usize,
        /// Value on the left-hand grid.
        left: f64,
        /// Value on the right-hand grid.
        right: f64,
    },

    /// A physical-unit conversion was requested that is not defined.
    #[error("no conversion from '{from}' to '{to}' for variable '{variable}'")]
    UnitConversion {
        /// Unit the data currently carries.
        from: String,
        /// Unit that was requested.
        to: String,
        /// Variable name, for context in logs.
        variable: String,
    },

    /// A wraparound longitude selection needs a west-to-east axis.
    #[error("wraparound selection on '{dim}' requires an ascending axis")]
    WrapDescending {
        /// Dimension the selection was applied to.
        dim: String,
    },

    /// Renaming a dimension would collide with an existing name.
    #[error("cannot rename dimension '{from}' to '{to}': name already in use")]
    RenameCollision {
        /// Dimension being renamed.
        from: String,
        /// Requested new name.
        to: String,
    },

    /// Replacement data does not match the labeled shape.
    #[error("replacement data has shape {got:?}, expected {expected:?}")]
    ShapeMismatch {
        /// Shape implied by the existing labels.
        expected: Vec<usize>,
        /// Shape of the replacement data.
        got: Vec<usize>,
    },
}
