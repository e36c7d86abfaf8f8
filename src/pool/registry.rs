//! Pool registry
//!
//! Owns one [`Pool`] per template path and routes `get`/`put` by name.
//!
//! # Example
//!
//! ```ignore
//! let pools = PoolRegistry::new(Rc::clone(&cache), PoolConfig::default());
//!
//! pools.load(&[(PathId::new("tpl/Enemy"), 3)]).await;
//! let enemy = pools.get("tpl/Enemy").await?;
//! pools.put("tpl/Enemy", enemy)?;
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::error::PoolError;
use super::lease::Lease;
use super::object_pool::Pool;
use crate::assets::{AssetCache, AssetLoader, LoadPipeline, LoadProgress, PathId, ResourceKind};
use crate::core::{PoolConfig, ResourceEvent};

/// Every registered pool, keyed by template path.
pub struct PoolRegistry<L: AssetLoader> {
    cache: Rc<AssetCache<L>>,
    config: PoolConfig,
    pools: RefCell<FxHashMap<PathId, Rc<Pool<L>>>>,
}

impl<L: AssetLoader> PoolRegistry<L> {
    /// Create an empty registry backed by `cache`
    #[must_use]
    pub fn new(cache: Rc<AssetCache<L>>, config: PoolConfig) -> Self {
        Self {
            cache,
            config,
            pools: RefCell::new(FxHashMap::default()),
        }
    }

    /// Settings applied to pools created by this registry
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Check if a pool exists for `template`
    #[must_use]
    pub fn contains(&self, template: &str) -> bool {
        self.pools.borrow().contains_key(template)
    }

    /// Number of registered pools
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.borrow().len()
    }

    /// Check if no pool is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.borrow().is_empty()
    }

    /// The pool registered for `template`
    #[must_use]
    pub fn pool(&self, template: &str) -> Option<Rc<Pool<L>>> {
        self.pools.borrow().get(template).cloned()
    }

    /// Registered template paths, sorted
    #[must_use]
    pub fn templates(&self) -> Vec<PathId> {
        let mut templates: Vec<PathId> = self.pools.borrow().keys().cloned().collect();
        templates.sort();
        templates
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Register and fill pools, see [`load_with_progress`](Self::load_with_progress).
    pub async fn load(&self, entries: &[(PathId, u32)]) -> Vec<PathId> {
        self.load_with_progress(entries, |_| {}).await
    }

    /// Register a pool per `(template, size)` entry and fill it with `size`
    /// instances.
    ///
    /// Templates that already have a pool are left untouched; when a batch
    /// names a template twice the first size wins. Templates are made
    /// resident first; ones that fail to load or are not template kinds are
    /// skipped with a warning. Instance creation then runs one at a time,
    /// reporting progress per created instance.
    ///
    /// Resolves with the templates that got a pool.
    pub async fn load_with_progress<F>(
        &self,
        entries: &[(PathId, u32)],
        mut on_progress: F,
    ) -> Vec<PathId>
    where
        F: FnMut(&LoadProgress),
    {
        let requested = self.new_entries(entries);
        if requested.is_empty() {
            return Vec::new();
        }

        let templates: Vec<PathId> = requested.iter().map(|(path, _)| path.clone()).collect();
        self.cache.load(&templates).await;

        let mut registered = Vec::with_capacity(requested.len());
        let mut fill = Vec::new();
        for (template, size) in requested {
            if !self.cache.has(&template) {
                log::warn!("Skipping pool `{template}`: template failed to load");
                continue;
            }
            if !self
                .cache
                .kind_of(&template)
                .is_some_and(ResourceKind::is_template)
            {
                log::warn!("Skipping pool: {}", PoolError::NotTemplate(template));
                continue;
            }

            let pool = {
                let mut pools = self.pools.borrow_mut();
                // A concurrent load may have registered it while we awaited
                if pools.contains_key(&template) {
                    continue;
                }
                let pool = Rc::new(Pool::new(
                    template.clone(),
                    Rc::clone(&self.cache),
                    size.max(self.config.min_capacity),
                    self.config.effective_extend_step(),
                ));
                pools.insert(template.clone(), Rc::clone(&pool));
                pool
            };

            fill.extend((0..size).map(|_| Rc::clone(&pool)));
            registered.push(template);
        }

        let outcome = LoadPipeline::new(fill)
            .drain(
                |pool: Rc<Pool<L>>| async move {
                    match pool.provision().await {
                        Ok(()) => Some(pool.template().clone()),
                        Err(err) => {
                            log::warn!("Could not fill pool `{}`: {err}", pool.template());
                            None
                        }
                    }
                },
                |current, total, template: &PathId| {
                    self.cache.emit(ResourceEvent::Loading {
                        current,
                        total,
                        path: template.clone(),
                    });
                    on_progress(&LoadProgress {
                        current,
                        total,
                        path: template.clone(),
                    });
                },
            )
            .await;

        log::info!(
            "Registered {} pools with {} of {} instances",
            registered.len(),
            outcome.succeeded.len(),
            outcome.total
        );
        self.cache.emit(ResourceEvent::Loaded {
            current: outcome.current,
            total: outcome.total,
            paths: registered.clone(),
        });

        registered
    }

    /// Entries without a pool yet, first size winning for duplicates
    fn new_entries(&self, entries: &[(PathId, u32)]) -> Vec<(PathId, u32)> {
        let pools = self.pools.borrow();
        let mut requested: Vec<(PathId, u32)> = Vec::with_capacity(entries.len());

        for (template, size) in entries {
            if pools.contains_key(template) {
                log::debug!("Pool `{template}` already registered");
                continue;
            }
            if requested.iter().any(|(seen, _)| seen == template) {
                log::warn!("Pool `{template}` requested twice, keeping the first size");
                continue;
            }
            requested.push((template.clone(), *size));
        }

        requested
    }

    // ------------------------------------------------------------------------
    // Leasing
    // ------------------------------------------------------------------------

    /// Borrow an instance from the pool for `template`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PoolNotFound`] if no pool is registered, or the
    /// pool's error if it had to extend and failed.
    pub async fn get(&self, template: &str) -> Result<Lease<L::Instance>, PoolError> {
        let pool = self.require(template)?;
        pool.get().await
    }

    /// Return an instance to the pool for `template`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PoolNotFound`] if no pool is registered (the lease
    /// is then forfeited to its issuing pool) or [`PoolError::ForeignLease`].
    pub fn put(&self, template: &str, lease: Lease<L::Instance>) -> Result<(), PoolError> {
        self.require(template)?.put(lease)
    }

    /// Clear the pool for `template`, returning the uses released.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PoolNotFound`] if no pool is registered.
    pub fn clear(&self, template: &str) -> Result<u32, PoolError> {
        Ok(self.require(template)?.clear())
    }

    /// Clear and remove the pool for `template`, then evict the template.
    ///
    /// The pool is removed even if the cache then refuses the eviction,
    /// for example because the template is still used outside the pool.
    ///
    /// # Errors
    ///
    /// - [`PoolError::PoolNotFound`] if no pool is registered
    /// - [`PoolError::LeasesOutstanding`] while instances are borrowed
    /// - [`PoolError::Cache`] if the cache refuses the eviction
    pub fn unload(&self, template: &str) -> Result<Vec<PathId>, PoolError> {
        let pool = self.require(template)?;
        let count = pool.outstanding();
        if count > 0 {
            let err = PoolError::LeasesOutstanding {
                template: pool.template().clone(),
                count,
            };
            log::warn!("Unload refused: {err}");
            return Err(err);
        }

        pool.clear();
        self.pools.borrow_mut().remove(template);
        Ok(self.cache.unload(template)?)
    }

    fn require(&self, template: &str) -> Result<Rc<Pool<L>>, PoolError> {
        self.pool(template).ok_or_else(|| {
            log::warn!("No pool registered for `{template}`");
            PoolError::PoolNotFound(PathId::new(template))
        })
    }

    /// Log every pool's state at info level
    pub fn dump(&self) {
        log::info!("{} pools", self.len());
        for template in self.templates() {
            if let Some(pool) = self.pool(&template) {
                log::info!(
                    "  {template}: {} ready, {} leased, {} forfeited, capacity {}",
                    pool.size(),
                    pool.outstanding(),
                    pool.forfeited(),
                    pool.capacity()
                );
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
