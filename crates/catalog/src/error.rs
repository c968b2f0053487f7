//! Error types for hyetos-catalog.

use std::path::PathBuf;

use hyetos_grid::GridError;
use hyetos_time::TimeError;

/// Error type for all fallible operations in the hyetos-catalog crate.
///
/// Covers manifest parsing, NetCDF extraction, metadata problems found while
/// assembling a dataset, and lookups of ids the catalog does not know.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Returned when a path named by the manifest does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Wraps a failure reported by the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// What the NetCDF layer reported.
        reason: String,
    },

    /// Returned when a dataset id is not four dot-separated parts.
    #[error("invalid dataset id '{value}': expected source.experiment.member.variable")]
    InvalidId {
        /// The string that failed to parse.
        value: String,
    },

    /// Returned when the catalog has no entry for the requested id.
    #[error("unknown dataset '{id}'")]
    UnknownDataset {
        /// The id that was requested.
        id: String,
    },

    /// Returned when a manifest cannot be read or parsed.
    #[error("manifest {}: {reason}", path.display())]
    Manifest {
        /// Path to the manifest file.
        path: PathBuf,
        /// Why it could not be loaded.
        reason: String,
    },

    /// Returned when the variable a manifest entry names is absent from its file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// The variable that was requested.
        name: String,
        /// File that was searched.
        path: PathBuf,
    },

    /// Returned when a dimension of a variable has no coordinate variable.
    #[error("no coordinate variable for dimension '{dim}' in {}", path.display())]
    MissingCoordinate {
        /// Dimension lacking a coordinate.
        dim: String,
        /// File that was inspected.
        path: PathBuf,
    },

    /// Returned when a time value or attribute cannot be interpreted.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time metadata issue.
        reason: String,
    },

    /// Returned when a dataset's time coordinate disagrees with its grid.
    #[error("time coordinate [{index}] is {coord}, but the grid offset is {offset}")]
    TimeCoordMismatch {
        /// Index of the first disagreeing sample.
        index: usize,
        /// Coordinate value carried by the array.
        coord: f64,
        /// Offset carried by the time grid.
        offset: f64,
    },

    /// Wraps an error originating from the hyetos-grid crate.
    #[error("grid error: {reason}")]
    Grid {
        /// Description of the underlying grid failure.
        reason: String,
    },

    /// Wraps an error originating from the hyetos-time crate.
    #[error("time error: {reason}")]
    Time {
        /// Description of the underlying time failure.
        reason: String,
    },
}

impl From<netcdf::Error> for CatalogError {
    fn from(e: netcdf::Error) -> Self {
        CatalogError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<GridError> for CatalogError {
    fn from(e: GridError) -> Self {
        CatalogError::Grid {
            reason: e.to_string(),
        }
    }
}

impl From<TimeError> for CatalogError {
    fn from(e: TimeError) -> Self {
        CatalogError::Time {
            reason: e.to_string(),
        }
    }
}
