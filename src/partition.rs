//! Shear - Size-bounded partitioning
//!
//! Walks the dataset once, emitting contiguous chunks whose exact serialized
//! size stays under the cap. Each boundary starts from the estimated
//! rows-per-chunk guess, is verified by an exact probe, and is then refined
//! by binary search: oversized guesses shrink toward the largest fitting
//! boundary, undersized guesses grow (gallop, then bisect) so every chunk is
//! maximal and the chunk count minimal.
//!
//! The refinement relies on serialized size being non-decreasing in row
//! count. That holds for the fixed-delimiter text encoding used here, where
//! a row's byte cost is independent of its neighbors; encodings with
//! range-level overhead (compressed or columnar) are not supported.

use tracing::debug;

use crate::data::Dataset;
use crate::error::Result;
use crate::serializer::CsvSerializer;

/// A contiguous half-open row range `[start, end)` designated for one
/// output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn row_count(&self) -> usize {
        self.end - self.start
    }
}

/// Sequential chunk-boundary discovery over an immutable dataset.
///
/// Boundaries are found strictly in order: the start of chunk `k + 1` is the
/// end of chunk `k`. Probe measurements are pure functions of the row range,
/// so the produced boundaries are fully deterministic for a fixed dataset,
/// cap and estimate.
pub struct Partitioner<'a> {
    dataset: &'a Dataset,
    serializer: &'a CsvSerializer,
    max_bytes: u64,
    guess_rows: usize,
    cursor: usize,
}

impl<'a> Partitioner<'a> {
    /// `max_bytes` is the hard cap per chunk; `bytes_per_row` is the
    /// estimator's starting guess (strictly positive).
    pub fn new(
        dataset: &'a Dataset,
        serializer: &'a CsvSerializer,
        max_bytes: u64,
        bytes_per_row: f64,
    ) -> Self {
        let guess_rows = ((max_bytes as f64 / bytes_per_row) as usize).max(1);
        Self {
            dataset,
            serializer,
            max_bytes,
            guess_rows,
            cursor: 0,
        }
    }

    /// Discover the next chunk boundary, or `None` once the dataset is
    /// exhausted.
    ///
    /// A single row whose serialized size alone exceeds the cap is emitted
    /// as an unavoidable oversized chunk; progress never stalls.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        let n = self.dataset.row_count();
        if self.cursor >= n {
            return Ok(None);
        }

        let start = self.cursor;
        let guess = (start + self.guess_rows).min(n);
        let size = self.probe(start, guess)?;

        let end = if size > self.max_bytes {
            if guess - start == 1 {
                // Unavoidable: the row by itself is over the cap.
                guess
            } else {
                let end = self.shrink(start, guess)?;
                debug!(start, guess, end, "shrunk oversized chunk guess");
                end
            }
        } else if guess == n {
            n
        } else {
            let end = self.grow(start, guess)?;
            if end != guess {
                debug!(start, guess, end, "grew undersized chunk guess");
            }
            end
        };

        self.cursor = end;
        Ok(Some(Chunk { start, end }))
    }

    /// Drain the partitioner into the full ordered chunk sequence.
    pub fn run(mut self) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk()? {
            chunks.push(chunk);
        }
        Ok(chunks)
    }

    fn probe(&self, start: usize, end: usize) -> Result<u64> {
        self.serializer
            .measure(self.dataset.headers(), self.dataset.slice(start..end))
    }

    /// Largest `end` in `[start+1, over)` whose serialization fits, with
    /// `start + 1` as the floor even when it alone does not fit.
    fn shrink(&self, start: usize, over: usize) -> Result<usize> {
        self.bisect(start, start + 1, over)
    }

    /// `fit` is a verified fitting boundary below the dataset end. Doubles
    /// the step forward until the cap is crossed (or the end of the dataset
    /// fits), then bisects inside the bracket.
    fn grow(&self, start: usize, fit: usize) -> Result<usize> {
        let n = self.dataset.row_count();
        let mut lo = fit;
        let mut step = 1usize;

        let hi = loop {
            let cand = (lo + step).min(n);
            if self.probe(start, cand)? <= self.max_bytes {
                if cand == n {
                    return Ok(n);
                }
                lo = cand;
                step *= 2;
            } else {
                break cand;
            }
        };

        self.bisect(start, lo, hi)
    }

    /// Binary search for the largest boundary that fits.
    ///
    /// Invariant: `[start, lo)` is accepted (verified fitting, or the
    /// single-row floor), `[start, hi)` is known not to fit.
    fn bisect(&self, start: usize, mut lo: usize, mut hi: usize) -> Result<usize> {
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.probe(start, mid)? <= self.max_bytes {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }
}
