//! The engine-side loading capability
//!
//! The cache never decodes bytes itself. It drives an [`AssetLoader`]
//! supplied by the embedding engine, which owns decoding, instantiation and
//! the actual freeing of memory.

use async_trait::async_trait;

use super::error::DecodeError;
use super::kind::ResourceKind;
use super::path::PathId;

/// Capability the cache consumes to decode, inspect and free resources.
///
/// Futures returned by `decode` are polled on a single cooperative executor
/// and are therefore not required to be `Send`.
#[async_trait(?Send)]
pub trait AssetLoader {
    /// Decoded asset handle; cloning must be cheap (a handle, not the bytes)
    type Asset: Clone;
    /// Object produced by instantiating a template asset
    type Instance;

    /// Decode the resource at `path` as `kind`.
    async fn decode(&self, path: &PathId, kind: ResourceKind) -> Result<Self::Asset, DecodeError>;

    /// Full transitive dependency closure of a decoded asset.
    fn dependencies_of(&self, asset: &Self::Asset) -> Vec<PathId>;

    /// Produce a fresh instance of a template asset.
    fn instantiate(&self, template: &Self::Asset) -> Self::Instance;

    /// Free the decoded data behind `paths` in one call.
    fn release(&self, paths: &[PathId]);
}

/// What a single use of a resident asset hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetView<A, I> {
    /// The shared decoded asset (non-template kinds)
    Shared(A),
    /// A freshly instantiated object (template kinds)
    Instance(I),
}

impl<A, I> AssetView<A, I> {
    /// Take the instance, if this view holds one
    #[must_use]
    pub fn into_instance(self) -> Option<I> {
        match self {
            Self::Instance(instance) => Some(instance),
            Self::Shared(_) => None,
        }
    }

    /// Take the shared asset, if this view holds one
    #[must_use]
    pub fn into_shared(self) -> Option<A> {
        match self {
            Self::Shared(asset) => Some(asset),
            Self::Instance(_) => None,
        }
    }

    /// Whether this view holds an instance
    #[must_use]
    pub const fn is_instance(&self) -> bool {
        matches!(self, Self::Instance(_))
    }
}
