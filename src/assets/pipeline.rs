//! Sequential load queue
//!
//! A [`LoadPipeline`] runs one asynchronous step per queued item, strictly
//! one after another: the next step is not started until the previous one
//! has resolved. Progress consumers can therefore rely on a monotonic
//! `current` counter.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = LoadPipeline::new(paths);
//! let outcome = pipeline
//!     .drain(
//!         |path| async move { decode(path).await.ok() },
//!         |current, total, path| println!("{current}/{total} {path}"),
//!     )
//!     .await;
//! assert_eq!(outcome.current, outcome.total);
//! ```

use std::collections::VecDeque;
use std::future::Future;

/// Result of draining a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome<R> {
    /// Results of the steps that succeeded, in pipeline order
    pub succeeded: Vec<R>,
    /// Items processed; always equal to `total` once drained
    pub current: usize,
    /// Items queued
    pub total: usize,
}

impl<R> PipelineOutcome<R> {
    /// Number of items whose step failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total - self.succeeded.len()
    }
}

/// One-at-a-time asynchronous queue over a fixed batch of items.
#[derive(Debug)]
pub struct LoadPipeline<T> {
    queue: VecDeque<T>,
    total: usize,
}

impl<T> LoadPipeline<T> {
    /// Queue a batch of items
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let queue: VecDeque<T> = items.into_iter().collect();
        let total = queue.len();
        Self { queue, total }
    }

    /// Number of queued items
    #[must_use]
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the batch is empty
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Run `step` on every item in order.
    ///
    /// `step` returns `Some(result)` on success and `None` on failure; a
    /// failure never stops the batch. `on_item(current, total, &result)` is
    /// called once per success, right after its step resolves.
    pub async fn drain<R, F, Fut, P>(mut self, mut step: F, mut on_item: P) -> PipelineOutcome<R>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Option<R>>,
        P: FnMut(usize, usize, &R),
    {
        let mut succeeded = Vec::with_capacity(self.total);
        let mut current = 0;

        while let Some(item) = self.queue.pop_front() {
            current += 1;
            if let Some(result) = step(item).await {
                on_item(current, self.total, &result);
                succeeded.push(result);
            } else {
                log::trace!("Pipeline item {current}/{} failed", self.total);
            }
        }

        PipelineOutcome {
            succeeded,
            current,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_drain_in_order() {
        let pipeline = LoadPipeline::new([1, 2, 3]);
        let mut progress = Vec::new();

        let outcome = pollster::block_on(pipeline.drain(
            |n| async move { Some(n * 10) },
            |current, total, value| progress.push((current, total, *value)),
        ));

        assert_eq!(outcome.succeeded, vec![10, 20, 30]);
        assert_eq!(progress, vec![(1, 3, 10), (2, 3, 20), (3, 3, 30)]);
        assert_eq!(outcome.current, outcome.total);
    }

    #[test]
    fn test_failure_does_not_abort() {
        let pipeline = LoadPipeline::new(["a", "bad", "c"]);
        let mut currents = Vec::new();

        let outcome = pollster::block_on(pipeline.drain(
            |item| async move { (item != "bad").then_some(item) },
            |current, _, _| currents.push(current),
        ));

        assert_eq!(outcome.succeeded, vec!["a", "c"]);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(currents, vec![1, 3]);
        assert_eq!(outcome.current, 3);
    }

    #[test]
    fn test_steps_never_overlap() {
        let active = &RefCell::new(0_u32);
        let max_active = &RefCell::new(0_u32);
        let pipeline = LoadPipeline::new(0..4);

        pollster::block_on(pipeline.drain(
            move |_| async move {
                *active.borrow_mut() += 1;
                let now = *active.borrow();
                let mut max = max_active.borrow_mut();
                *max = (*max).max(now);
                drop(max);
                crate::test_support::yield_now().await;
                *active.borrow_mut() -= 1;
                Some(())
            },
            |_, _, _| {},
        ));

        assert_eq!(*max_active.borrow(), 1);
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline: LoadPipeline<u8> = LoadPipeline::new([]);
        assert!(pipeline.is_empty());

        let outcome = pollster::block_on(pipeline.drain(|n| async move { Some(n) }, |_, _, _| {}));
        assert_eq!(outcome.total, 0);
        assert!(outcome.succeeded.is_empty());
    }
}
