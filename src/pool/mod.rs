//! Template instance pooling
//!
//! Pools hold ready instances of template resources. Each instance a pool
//! holds or lends is backed by one use on the template in the
//! [`AssetCache`](crate::assets::AssetCache).

mod error;
mod lease;
mod object_pool;
mod registry;

pub use error::PoolError;
pub use lease::Lease;
pub use object_pool::Pool;
pub use registry::PoolRegistry;
