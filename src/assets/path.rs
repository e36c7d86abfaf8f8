//! Resource path identifiers
//!
//! Provides a cheap-to-clone, hashable identifier for resource paths so that
//! the cache, registry and pools never pass raw strings around.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque resource path such as `"tpl/Enemy"` or `"Sound/ButtonClick"`.
///
/// Cloning only bumps a reference count, so a `PathId` can be held by every
/// component that needs to name a resource without owning it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(Arc<str>);

impl PathId {
    /// Create a new path identifier
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(Arc::from(path.as_ref()))
    }

    /// Get the path as a string slice
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the path, e.g. `"Enemy"` for `"tpl/Enemy"`
    #[must_use]
    pub fn basename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for PathId {
    fn from(path: String) -> Self {
        Self(Arc::from(path))
    }
}

impl From<&PathId> for PathId {
    fn from(path: &PathId) -> Self {
        path.clone()
    }
}

impl Deref for PathId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for PathId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PathId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
