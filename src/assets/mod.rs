//! Resource resolution, loading and caching
//!
//! - [`TypeRegistry`] maps every known path to exactly one [`ResourceKind`]
//! - [`AssetLoader`] is the host's decoder for the bytes behind a path
//! - [`AssetCache`] owns resident assets and their use counts
//! - [`LoadPipeline`] processes a batch strictly one item at a time

mod cache;
mod error;
mod kind;
mod loader;
mod path;
mod pipeline;
mod registry;

pub use cache::{AssetCache, CacheEntry, LoadProgress};
pub use error::{CacheError, DecodeError, ManifestError};
pub use kind::ResourceKind;
pub use loader::{AssetLoader, AssetView};
pub use path::PathId;
pub use pipeline::{LoadPipeline, PipelineOutcome};
pub use registry::{ResourceTable, TableRow, TypeRegistry};
