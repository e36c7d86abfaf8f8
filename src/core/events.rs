//! Resource Event Queue
//!
//! The cache and pool layers report loading progress and evictions as
//! [`ResourceEvent`]s on a double-buffered queue. UI and telemetry code reads
//! them at its own pace without being called back from inside a load.
//!
//! # Example
//!
//! ```ignore
//! // While loading, the cache pushes events
//! cache.load(&paths).await;
//!
//! // At the frame boundary, the loading screen reads them
//! cache.swap_events();
//! for event in cache.drain_events() {
//!     if let ResourceEvent::Loading { current, total, .. } = event {
//!         progress_bar.set(current as f32 / total as f32);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use crate::assets::PathId;

// ============================================================================
// Event Types
// ============================================================================

/// Notifications emitted by the cache and pool layers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResourceEvent {
    /// One item of a batch finished successfully.
    Loading {
        /// Items processed so far in the batch
        current: usize,
        /// Items in the batch
        total: usize,
        /// Path of the item that just finished
        path: PathId,
    },

    /// A batch drained.
    Loaded {
        /// Items processed, always equal to `total`
        current: usize,
        /// Items in the batch
        total: usize,
        /// Paths that succeeded, in pipeline order
        paths: Vec<PathId>,
    },

    /// A resident entry was evicted.
    Evicted {
        /// Evicted path
        path: PathId,
        /// Paths handed to the loader for release
        released: Vec<PathId>,
    },

    /// A pool ran dry and grew.
    PoolExtended {
        /// Template the pool instantiates
        template: PathId,
        /// Instances added by this round
        added: u32,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered queue of [`ResourceEvent`]s.
///
/// Events pushed now become readable after the next [`swap`](Self::swap).
#[derive(Debug)]
pub struct EventQueue {
    /// Events written since the last swap
    pending: VecDeque<ResourceEvent>,
    /// Events ready for reading
    processing: VecDeque<ResourceEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event; it becomes readable after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: ResourceEvent) {
        self.pending.push_back(event);
    }

    /// Make pending events readable and start a fresh pending buffer.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over readable events.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ResourceEvent> {
        self.processing.iter()
    }

    /// Take ownership of every readable event.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = ResourceEvent> + '_ {
        self.processing.drain(..)
    }

    /// Whether there are no readable events.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of readable events.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events waiting for the next swap.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop every event, pending or readable.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
