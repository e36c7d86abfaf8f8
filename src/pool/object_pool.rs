//! Template-backed object pool
//!
//! A [`Pool`] keeps ready-to-use instances of one template resource. Every
//! instance it hands out or holds corresponds to exactly one use taken on the
//! template through the [`AssetCache`], so the cache's use count for the
//! template always equals `ready + outstanding + forfeited`.
//!
//! # Example
//!
//! ```ignore
//! let pool = registry.pool("tpl/Enemy").unwrap();
//!
//! // Pops a ready instance, or extends the pool when it is empty
//! let mut enemy = pool.get().await?;
//! enemy.reset();
//!
//! // Hand it back for reuse
//! pool.put(enemy)?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::sync::Mutex;

use super::error::PoolError;
use super::lease::{Lease, LeaseLedger};
use crate::assets::{AssetCache, AssetLoader, AssetView, PathId};
use crate::core::ResourceEvent;

// ============================================================================
// Object Pool
// ============================================================================

/// Ready instances of a single template.
///
/// Instances are reused in LIFO order: the most recently returned instance
/// is handed out first.
pub struct Pool<L: AssetLoader> {
    template: PathId,
    cache: Rc<AssetCache<L>>,
    /// Instances waiting to be leased
    ready: RefCell<Vec<L::Instance>>,
    /// Target number of instances this pool manages
    capacity: Cell<u32>,
    extend_step: u32,
    ledger: Rc<LeaseLedger>,
    /// Serializes extensions so concurrent `get`s never over-extend
    extending: Mutex<()>,
}

impl<L: AssetLoader> Pool<L> {
    pub(crate) fn new(
        template: PathId,
        cache: Rc<AssetCache<L>>,
        capacity: u32,
        extend_step: u32,
    ) -> Self {
        Self {
            template,
            cache,
            ready: RefCell::new(Vec::with_capacity(capacity as usize)),
            capacity: Cell::new(capacity),
            extend_step: extend_step.max(1),
            ledger: Rc::new(LeaseLedger::default()),
            extending: Mutex::new(()),
        }
    }

    /// Template path this pool instantiates
    #[must_use]
    #[inline]
    pub fn template(&self) -> &PathId {
        &self.template
    }

    /// Short name of the pool, the template's last path segment
    #[must_use]
    pub fn name(&self) -> &str {
        self.template.basename()
    }

    /// Instances ready to be leased
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.ready.borrow().len()
    }

    /// Check if no instance is ready
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ready.borrow().is_empty()
    }

    /// Target number of managed instances, grown by each extension
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity.get()
    }

    /// Leases handed out and not yet returned
    #[must_use]
    #[inline]
    pub fn outstanding(&self) -> u32 {
        self.ledger.outstanding()
    }

    /// Leases dropped without being returned since the last `clear()`
    #[must_use]
    #[inline]
    pub fn forfeited(&self) -> u32 {
        self.ledger.forfeited()
    }

    /// Instances created per extension
    #[must_use]
    #[inline]
    pub fn extend_step(&self) -> u32 {
        self.extend_step
    }

    /// Borrow an instance, extending the pool first if none is ready.
    ///
    /// # Errors
    ///
    /// Fails if the pool is empty and no instance could be created.
    pub async fn get(&self) -> Result<Lease<L::Instance>, PoolError> {
        if let Some(instance) = self.pop() {
            return Ok(Lease::issue(instance, &self.ledger));
        }

        // Another caller may refill the pool while we wait for the lock
        let _guard = self.extending.lock().await;
        loop {
            if let Some(instance) = self.pop() {
                return Ok(Lease::issue(instance, &self.ledger));
            }
            self.extend().await?;
        }
    }

    /// Return a borrowed instance for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ForeignLease`] if the lease was issued by another
    /// pool. The rejected lease is then forfeited to the pool that issued it.
    pub fn put(&self, lease: Lease<L::Instance>) -> Result<(), PoolError> {
        if !lease.is_from(&self.ledger) {
            log::warn!("Rejected lease returned to the wrong pool `{}`", self.template);
            return Err(PoolError::ForeignLease(self.template.clone()));
        }
        let instance = lease.redeem();
        self.ready.borrow_mut().push(instance);
        Ok(())
    }

    /// Drop every ready instance and give their uses back to the cache.
    ///
    /// Forfeited leases are settled too. Outstanding leases are untouched and
    /// can still be returned afterwards. Returns the number of uses released.
    pub fn clear(&self) -> u32 {
        let dropped = {
            let mut ready = self.ready.borrow_mut();
            let dropped = ready.len() as u32;
            ready.clear();
            dropped
        };
        let released = dropped + self.ledger.settle_forfeited();

        if released > 0 {
            self.cache.un_use(&self.template, released);
        }
        log::debug!("Cleared pool `{}`, released {released} uses", self.template);
        released
    }

    /// Take one use on the template and keep the instance ready.
    ///
    /// Used while filling a freshly registered pool; does not grow capacity.
    pub(crate) async fn provision(&self) -> Result<(), PoolError> {
        let instance = self.instantiate().await?;
        self.ready.borrow_mut().push(instance);
        Ok(())
    }

    fn pop(&self) -> Option<L::Instance> {
        self.ready.borrow_mut().pop()
    }

    async fn instantiate(&self) -> Result<L::Instance, PoolError> {
        match self.cache.use_asset(&self.template).await? {
            AssetView::Instance(instance) => Ok(instance),
            AssetView::Shared(_) => {
                self.cache.un_use(&self.template, 1);
                Err(PoolError::NotTemplate(self.template.clone()))
            }
        }
    }

    /// Create `extend_step` instances. Partial success still counts.
    async fn extend(&self) -> Result<u32, PoolError> {
        let mut added = 0;
        let mut failure = None;

        for _ in 0..self.extend_step {
            match self.instantiate().await {
                Ok(instance) => {
                    self.ready.borrow_mut().push(instance);
                    added += 1;
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if added > 0 {
            self.capacity.set(self.capacity.get() + added);
            log::debug!(
                "Extended pool `{}` by {added} (capacity {})",
                self.template,
                self.capacity.get()
            );
            self.cache.emit(ResourceEvent::PoolExtended {
                template: self.template.clone(),
                added,
            });
        }

        match failure {
            Some(err) if added == 0 => {
                log::warn!("Could not extend pool `{}`: {err}", self.template);
                Err(err)
            }
            _ => Ok(added),
        }
    }
}

impl<L: AssetLoader> std::fmt::Debug for Pool<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("template", &self.template)
            .field("size", &self.size())
            .field("capacity", &self.capacity())
            .field("outstanding", &self.outstanding())
            .field("forfeited", &self.forfeited())
            .field("extend_step", &self.extend_step)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
