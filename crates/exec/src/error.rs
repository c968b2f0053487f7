//! Error types for chunked execution.

use thiserror::Error;

/// Failure reported by a chunk worker, split by whether retrying can help.
///
/// Workers classify their own failures: interruptions of the compute
/// substrate (worker evictions, I/O hiccups) are [`ChunkError::Transient`]
/// and eligible for retry; anything deterministic is [`ChunkError::Fatal`]
/// and fails the run on first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// A failure that may not recur; the chunk will be retried.
    #[error("transient: {reason}")]
    Transient {
        /// Human-readable cause, carried into logs and the final error.
        reason: String,
    },

    /// A deterministic failure; retrying cannot change the outcome.
    #[error("fatal: {reason}")]
    Fatal {
        /// Human-readable cause, carried into the final error.
        reason: String,
    },
}

impl ChunkError {
    /// Convenience constructor for transient failures.
    pub fn transient(reason: impl Into<String>) -> Self {
        ChunkError::Transient {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for fatal failures.
    pub fn fatal(reason: impl Into<String>) -> Self {
        ChunkError::Fatal {
            reason: reason.into(),
        }
    }
}

/// Error type for plan construction and chunked runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// A chunk length of zero cannot partition anything.
    #[error("chunk length must be at least 1")]
    InvalidChunkLen,

    /// A chunk failed after exhausting its retry budget, or failed fatally.
    #[error("chunk {chunk} failed after {attempts} attempt(s): {reason}")]
    ChunkFailed {
        /// Index of the failing chunk in the plan.
        chunk: usize,
        /// Number of attempts made, including the first.
        attempts: u32,
        /// Cause reported by the last attempt.
        reason: String,
    },
}
