//! Asset cache and object pooling for game runtimes
//!
//! This crate provides:
//! - Path to kind resolution from a build-time resource table
//! - A reference-counted asset cache with coalesced, sequential loading
//! - Template instance pools that extend on demand
//!
//! Everything runs on a single cooperative executor; the host supplies the
//! decoding through an [`AssetLoader`](assets::AssetLoader).

pub mod assets;
mod context;
pub mod core;
pub mod pool;

#[cfg(test)]
mod test_support;

pub use context::ResourceContext;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::{
        AssetCache, AssetLoader, AssetView, CacheError, DecodeError, LoadProgress, PathId,
        ResourceKind, ResourceTable, TypeRegistry,
    };
    pub use crate::context::ResourceContext;
    pub use crate::core::{CacheConfig, ContextConfig, PoolConfig, ResourceEvent};
    pub use crate::pool::{Lease, Pool, PoolError, PoolRegistry};
}
