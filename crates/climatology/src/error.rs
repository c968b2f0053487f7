//! Error types for climatological aggregation.

use thiserror::Error;

/// Error type for diurnal-cycle and resampling operations.
#[derive(Debug, Error)]
pub enum ClimatologyError {
    /// A labeled-array precondition failed.
    #[error("grid error: {reason}")]
    Grid {
        /// Underlying labeled-array error, flattened to a message.
        reason: String,
    },

    /// A time-grid precondition failed.
    #[error("time error: {reason}")]
    Time {
        /// Underlying time error, flattened to a message.
        reason: String,
    },

    /// A phase scale that cannot label anything.
    #[error("phase scale must be finite and positive, got {scale}")]
    InvalidPhaseScale {
        /// The rejected scale factor.
        scale: f64,
    },
}

impl From<hyetos_grid::GridError> for ClimatologyError {
    fn from(err: hyetos_grid::GridError) -> Self {
        ClimatologyError::Grid {
            reason: err.to_string(),
        }
    }
}

impl From<hyetos_time::TimeError> for ClimatologyError {
    fn from(err: hyetos_time::TimeError) -> Self {
        ClimatologyError::Time {
            reason: err.to_string(),
        }
    }
}
