//! Pool error types

use thiserror::Error;

use crate::assets::{CacheError, PathId};

/// Errors surfaced by [`Pool`](super::Pool) and [`PoolRegistry`](super::PoolRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No pool is registered for the template
    #[error("pool `{0}` is not registered")]
    PoolNotFound(PathId),
    /// The template resolves to a shared (non-instantiable) kind
    #[error("`{0}` is not a template resource")]
    NotTemplate(PathId),
    /// The pool cannot be unloaded while instances are borrowed
    #[error("pool `{template}` still has {count} leases outstanding")]
    LeasesOutstanding {
        /// Template of the pool
        template: PathId,
        /// Leases not yet returned
        count: u32,
    },
    /// The lease was issued by a different pool
    #[error("lease was not issued by pool `{0}`")]
    ForeignLease(PathId),
    /// The underlying cache operation failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}
