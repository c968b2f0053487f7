//! Parallel chunked map-reduce with bounded retry.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::chunk::{Chunk, ChunkPlan};
use crate::error::{ChunkError, ExecError};
use crate::retry::RetryPolicy;

/// Runs `map` over every chunk of `plan` in parallel and folds the partial
/// results with `merge`, starting from `init`.
///
/// Each chunk failing with [`ChunkError::Transient`] is re-executed up to the
/// policy's retry budget; [`ChunkError::Fatal`] fails the run immediately.
/// `merge` must be associative and `init` must be its identity, in which case
/// the result is independent of worker count and merge order.
///
/// # Errors
///
/// Returns [`ExecError::ChunkFailed`] for the first chunk that exhausts its
/// budget or fails fatally.
pub fn map_reduce<T, I, F, M>(
    plan: &ChunkPlan,
    policy: &RetryPolicy,
    init: I,
    map: F,
    merge: M,
) -> Result<T, ExecError>
where
    T: Send,
    I: Fn() -> T + Sync + Send,
    F: Fn(Chunk) -> Result<T, ChunkError> + Sync + Send,
    M: Fn(T, T) -> T + Sync + Send,
{
    debug!(
        chunks = plan.n_chunks(),
        chunk_len = plan.chunk_len(),
        elements = plan.len(),
        "running chunked map-reduce"
    );
    plan.chunks()
        .into_par_iter()
        .map(|chunk| run_chunk(chunk, &map, policy))
        .try_reduce(&init, |a, b| Ok(merge(a, b)))
}

/// Executes one chunk under the retry policy.
fn run_chunk<T, F>(chunk: Chunk, map: &F, policy: &RetryPolicy) -> Result<T, ExecError>
where
    F: Fn(Chunk) -> Result<T, ChunkError>,
{
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match map(chunk) {
            Ok(value) => return Ok(value),
            Err(ChunkError::Fatal { reason }) => {
                return Err(ExecError::ChunkFailed {
                    chunk: chunk.index,
                    attempts,
                    reason,
                });
            }
            Err(ChunkError::Transient { reason }) => {
                if attempts >= policy.max_attempts() {
                    return Err(ExecError::ChunkFailed {
                        chunk: chunk.index,
                        attempts,
                        reason,
                    });
                }
                warn!(
                    chunk = chunk.index,
                    attempt = attempts,
                    reason = %reason,
                    "transient chunk failure, retrying"
                );
            }
        }
    }
}
