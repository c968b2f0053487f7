//! Error types for histogram construction and accumulation.

use thiserror::Error;

/// Error type for bin construction, accumulation and derived statistics.
#[derive(Debug, Error)]
pub enum HistError {
    /// Bin edges that do not describe a usable partition.
    #[error("invalid bin edges: {reason}")]
    InvalidEdges {
        /// What was wrong with the requested edges.
        reason: String,
    },

    /// Data whose units disagree with the units the bins were built for.
    #[error("variable '{variable}' carries {got}, but the bins expect {expected}")]
    UnitMismatch {
        /// Variable whose values were about to be binned.
        variable: String,
        /// Units the bin edges carry.
        expected: String,
        /// Units the data carries.
        got: String,
    },

    /// A quantile outside the open interval (0, 1).
    #[error("quantile must be in (0, 1), got {q}")]
    InvalidQuantile {
        /// The rejected quantile.
        q: f64,
    },

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

    /// The chunked accumulation failed.
    #[error("compute error: {reason}")]
    Compute {
        /// Underlying execution error, flattened to a message.
        reason: String,
    },
}

impl From<hyetos_grid::GridError> for HistError {
    fn from(err: hyetos_grid::GridError) -> Self {
        HistError::Grid {
            reason: err.to_string(),
        }
    }
}

impl From<hyetos_time::TimeError> for HistError {
    fn from(err: hyetos_time::TimeError) -> Self {
        HistError::Time {
            reason: err.to_string(),
        }
    }
}

impl From<hyetos_exec::ExecError> for HistError {
    fn from(err: hyetos_exec::ExecError) -> Self {
        HistError::Compute {
            reason: err.to_string(),
        }
    }
}
