//! Partitioning a flat index range into fixed-size chunks.

use crate::error::ExecError;

/// One contiguous slice of the input index range, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the plan.
    pub index: usize,
    /// First input index covered, inclusive.
    pub start: usize,
    /// One past the last input index covered.
    pub end: usize,
}

impl Chunk {
    /// Number of input elements in this chunk.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for a degenerate zero-length chunk; plans never produce these.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A fixed-size partition of `0..len` into [`Chunk`]s.
///
/// Every input index is covered exactly once; the final chunk absorbs the
/// remainder. The partition depends only on `len` and `chunk_len`, never on
/// worker count, so results that merge chunk outputs associatively do not
/// change when the plan runs on different machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    len: usize,
    chunk_len: usize,
}

impl ChunkPlan {
    /// Plans chunks of `chunk_len` elements over an input of `len` elements.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::InvalidChunkLen`] when `chunk_len` is zero.
    pub fn new(len: usize, chunk_len: usize) -> Result<Self, ExecError> {
        if chunk_len == 0 {
            return Err(ExecError::InvalidChunkLen);
        }
        Ok(Self { len, chunk_len })
    }

    /// Total number of input elements covered.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the plan covers no input at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nominal chunk length.
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Number of chunks in the plan.
    pub fn n_chunks(&self) -> usize {
        self.len.div_ceil(self.chunk_len)
    }

    /// Materializes the chunks in input order.
    pub fn chunks(&self) -> Vec<Chunk> {
        (0..self.n_chunks())
            .map(|index| {
                let start = index * self.chunk_len;
                Chunk {
                    index,
                    start,
                    end: (start + self.chunk_len).min(self.len),
                }
            })
            .collect()
    }
}
