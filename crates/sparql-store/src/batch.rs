//! Batched streaming upload.

use oxrdf::Triple;
use tracing::debug;

use cube_common::{CubeResult, ProgressExt};

use crate::client::{StoreConfig, UpdateConnection};

/// Iterator adapter chunking a sequence into fixed-size batches.
///
/// N items in batches of B yield ceil(N/B) batches, the final batch
/// possibly partial; concatenating all batches reproduces the input in
/// order.
pub struct Batches<I: Iterator> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.size);
        while batch.len() < self.size {
            match self.inner.next() {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

/// Extension trait attaching batching to any iterator.
pub trait BatchExt: Iterator + Sized {
    fn batches(self, size: usize) -> Batches<Self> {
        Batches {
            inner: self,
            size: size.max(1),
        }
    }
}

impl<I: Iterator> BatchExt for I {}

/// Counters reported after a completed upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadStats {
    pub statements: usize,
    pub batches: usize,
}

/// Consumes the assembled statement sequence and commits it to the store
/// in fixed-size batches, each through its own open/add/close cycle.
///
/// A failure while building or committing a batch aborts the run; batches
/// already committed remain in the store. There is no cross-batch
/// transaction and no retry.
pub struct BatchUploader {
    config: StoreConfig,
    batch_size: usize,
}

impl BatchUploader {
    pub fn new(config: StoreConfig, batch_size: usize) -> Self {
        Self {
            config,
            batch_size: batch_size.max(1),
        }
    }

    /// Realize the statement sequence exactly once, uploading as it goes.
    pub fn upload<I>(&self, statements: I) -> CubeResult<UploadStats>
    where
        I: Iterator<Item = CubeResult<Triple>>,
    {
        let mut stats = UploadStats::default();

        for batch in statements
            .batches(self.batch_size)
            .progress(500, "batches committed")
        {
            let batch: Vec<Triple> = batch.into_iter().collect::<CubeResult<_>>()?;

            let mut connection = UpdateConnection::open(&self.config)?;
            let size = batch.len();
            for statement in batch {
                connection.add(statement);
            }
            connection.close()?;

            stats.batches += 1;
            stats.statements += size;
            debug!(batch = stats.batches, size, "Committed batch");
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_division_batch_count() {
        let batches: Vec<Vec<u32>> = (0..10).batches(3).collect();
        assert_eq!(batches.len(), 4);
        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![3, 3, 3, 1]
        );
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let items: Vec<u32> = (0..10).collect();
        let rejoined: Vec<u32> = items.clone().into_iter().batches(4).flatten().collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_batch() {
        let batches: Vec<Vec<u32>> = (0..9).batches(3).collect();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 3));
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let batches: Vec<Vec<u32>> = std::iter::empty().batches(3).collect();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_batch_size_one() {
        let batches: Vec<Vec<u32>> = (0..3).batches(1).collect();
        assert_eq!(batches.len(), 3);
    }
}
