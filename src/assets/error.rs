//! Error types for the asset layer

use thiserror::Error;

use super::path::PathId;

/// Failure reported by an [`AssetLoader`](super::AssetLoader) while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode `{path}`: {reason}")]
pub struct DecodeError {
    /// Path that failed to decode
    pub path: PathId,
    /// Loader-provided description
    pub reason: String,
}

impl DecodeError {
    /// Create a new decode error
    #[must_use]
    pub fn new(path: impl Into<PathId>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by [`AssetCache`](super::AssetCache) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The path has no kind in the type registry
    #[error("no resource kind is registered for `{0}`")]
    UnresolvedKind(PathId),
    /// The loader failed to produce the asset
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The path is not resident and could not be made resident
    #[error("resource `{0}` is not resident")]
    NotFound(PathId),
    /// Eviction refused because leases are still held
    #[error("resource `{path}` is still in use ({uses} uses)")]
    StillInUse {
        /// Path that was asked to unload
        path: PathId,
        /// Use count at the time of the call
        uses: u32,
    },
    /// Eviction refused because a load for the path has not resolved yet
    #[error("resource `{0}` is still loading")]
    Loading(PathId),
}

/// Errors raised while reading a resource table or configuration file.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The RON document is malformed
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The JSON document is malformed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::StillInUse {
            path: PathId::new("tpl/Enemy"),
            uses: 2,
        };
        assert_eq!(err.to_string(), "resource `tpl/Enemy` is still in use (2 uses)");

        let decode: CacheError = DecodeError::new("Sound/Boom", "truncated").into();
        assert_eq!(decode.to_string(), "failed to decode `Sound/Boom`: truncated");
    }
}
