//! Resource context
//!
//! Bundles the type registry, asset cache and pool registry that a host
//! creates once at startup.
//!
//! # Example
//!
//! ```ignore
//! let table = ResourceTable::load_ron("resources.ron")?;
//! let context = ResourceContext::new(ContextConfig::default(), &table, MyLoader::new());
//!
//! context.cache().load(&[PathId::new("Sound/Click")]).await;
//! context.pools().load(&[(PathId::new("tpl/Enemy"), 3)]).await;
//! ```

use std::rc::Rc;

use crate::assets::{AssetCache, AssetLoader, ResourceTable, TypeRegistry};
use crate::core::ContextConfig;
use crate::pool::PoolRegistry;

/// Cache and pools sharing one loader.
pub struct ResourceContext<L: AssetLoader> {
    config: ContextConfig,
    cache: Rc<AssetCache<L>>,
    pools: PoolRegistry<L>,
}

impl<L: AssetLoader> ResourceContext<L> {
    /// Link `table` and build the cache and pool registry on top of it
    #[must_use]
    pub fn new(config: ContextConfig, table: &ResourceTable, loader: L) -> Self {
        let registry = TypeRegistry::link(table);
        let cache = Rc::new(AssetCache::with_config(
            registry,
            loader,
            config.cache.clone(),
        ));
        let pools = PoolRegistry::new(Rc::clone(&cache), config.pool.clone());

        log::info!(
            "Resource context ready: {} paths, {} built-ins",
            cache.registry().len(),
            cache.registry().builtin_count()
        );

        Self {
            config,
            cache,
            pools,
        }
    }

    #[must_use]
    #[inline]
    pub fn cache(&self) -> &AssetCache<L> {
        &self.cache
    }

    /// Shared handle to the cache, for components that outlive a borrow
    #[must_use]
    pub fn cache_handle(&self) -> Rc<AssetCache<L>> {
        Rc::clone(&self.cache)
    }

    #[must_use]
    #[inline]
    pub fn pools(&self) -> &PoolRegistry<L> {
        &self.pools
    }

    #[must_use]
    #[inline]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Log the cache report and every pool at info level
    pub fn dump(&self) {
        self.cache.dump();
        self.pools.dump();
    }
}
