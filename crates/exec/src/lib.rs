//! Deterministic chunked execution for associative reductions.
//!
//! The model: split a flat index range into a [`ChunkPlan`], run a map
//! function over the chunks in parallel, and fold the partial results with an
//! associative merge. Because the partition depends only on input length and
//! chunk length, and the merge is associative with `init` as identity, the
//! result is identical no matter how many workers run or in which order
//! chunks finish.
//!
//! Workers distinguish transient failures (retried under a [`RetryPolicy`]
//! budget, 4 retries by default) from fatal ones (fail the run immediately).
//! [`partition_by`] covers the other execution shape in this workspace:
//! grouped reductions over disjoint index sets.

mod chunk;
mod error;
mod map_reduce;
mod partition;
mod retry;

pub use chunk::{Chunk, ChunkPlan};
pub use error::{ChunkError, ExecError};
pub use map_reduce::map_reduce;
pub use partition::partition_by;
pub use retry::{DEFAULT_MAX_RETRIES, RetryPolicy};
