//! Progress reporting for slow lazy sequences.

use tracing::info;

/// Iterator adapter that logs a progress line every `every` items.
pub struct Progress<I> {
    inner: I,
    every: usize,
    seen: usize,
    label: &'static str,
}

impl<I: Iterator> Iterator for Progress<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let item = self.inner.next()?;
        if self.seen % self.every == 0 {
            info!(processed = self.seen, "{}", self.label);
        }
        self.seen += 1;
        Some(item)
    }
}

/// Extension trait attaching progress logging to any iterator.
pub trait ProgressExt: Iterator + Sized {
    /// Log a progress line through `tracing` every `every` yielded items.
    fn progress(self, every: usize, label: &'static str) -> Progress<Self> {
        Progress {
            inner: self,
            every: every.max(1),
            seen: 0,
            label,
        }
    }
}

impl<I: Iterator> ProgressExt for I {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_transparent() {
        let items: Vec<u32> = (0..10).progress(3, "items processed").collect();
        assert_eq!(items, (0..10).collect::<Vec<u32>>());
    }
}
