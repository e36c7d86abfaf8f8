//! Path to kind resolution
//!
//! The build tool scans the resource folder and emits a [`ResourceTable`]:
//! one row per (path, descriptors) pair plus the list of engine built-ins.
//! [`TypeRegistry::link`] folds that table into an immutable path→kind map.

use std::fs;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::error::ManifestError;
use super::kind::ResourceKind;
use super::path::PathId;

// ============================================================================
// Resource Table
// ============================================================================

/// A single row of the build-time resource scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Resource path relative to the resource root
    pub path: String,
    /// Class descriptors observed for the path, e.g. `["cc.Prefab"]`
    #[serde(default)]
    pub kinds: Vec<String>,
}

/// Raw output of the build-time resource scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTable {
    /// Scanned rows; the same path may appear more than once
    #[serde(default)]
    pub entries: Vec<TableRow>,
    /// Engine-owned paths that must never be released
    #[serde(default)]
    pub builtin: Vec<String>,
}

impl ResourceTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row (builder style)
    #[must_use]
    pub fn with_entry<S: Into<String>>(
        mut self,
        path: impl Into<String>,
        kinds: impl IntoIterator<Item = S>,
    ) -> Self {
        self.entries.push(TableRow {
            path: path.into(),
            kinds: kinds.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Mark a path as engine built-in (builder style)
    #[must_use]
    pub fn with_builtin(mut self, path: impl Into<String>) -> Self {
        self.builtin.push(path.into());
        self
    }

    /// Parse a table from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid table
    pub fn from_ron_str(source: &str) -> Result<Self, ManifestError> {
        Ok(ron::from_str(source)?)
    }

    /// Parse a table from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid table
    pub fn from_json_str(source: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a table from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Load a table from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

// ============================================================================
// Type Registry
// ============================================================================

/// Immutable path→kind map built once from a [`ResourceTable`].
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    kinds: FxHashMap<PathId, ResourceKind>,
    builtin: FxHashSet<PathId>,
    /// Every descriptor seen during linking, known or not, in first-seen order
    observed: Vec<String>,
}

impl TypeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from a raw scan table.
    ///
    /// Rows sharing a path are merged first; the surviving kind is the
    /// candidate that comes first in [`ResourceKind::FALLBACK_ORDER`].
    /// Paths whose descriptors are all unknown stay unbound.
    #[must_use]
    pub fn link(table: &ResourceTable) -> Self {
        let mut order: Vec<&str> = Vec::new();
        let mut candidates: FxHashMap<&str, SmallVec<[ResourceKind; 4]>> = FxHashMap::default();
        let mut observed: Vec<String> = Vec::new();
        let mut seen_descriptors: FxHashSet<&str> = FxHashSet::default();

        for row in &table.entries {
            let slot = candidates.entry(row.path.as_str()).or_insert_with(|| {
                order.push(row.path.as_str());
                SmallVec::new()
            });
            for descriptor in &row.kinds {
                if seen_descriptors.insert(descriptor.as_str()) {
                    observed.push(descriptor.clone());
                }
                if let Some(kind) = ResourceKind::from_descriptor(descriptor)
                    && !slot.contains(&kind)
                {
                    slot.push(kind);
                }
            }
        }

        let mut kinds = FxHashMap::default();
        for path in order {
            match ResourceKind::fallback(&candidates[path]) {
                Some(kind) => {
                    kinds.insert(PathId::new(path), kind);
                }
                None => log::warn!("No loadable kind for resource `{path}`, leaving it unbound"),
            }
        }

        let builtin: FxHashSet<PathId> = table.builtin.iter().map(PathId::new).collect();

        log::info!(
            "Linked {} resource paths ({} built-in), descriptors observed: {}",
            kinds.len(),
            builtin.len(),
            observed.join(", ")
        );

        Self {
            kinds,
            builtin,
            observed,
        }
    }

    /// Kind bound to `path`, if any
    #[must_use]
    #[inline]
    pub fn resolve(&self, path: &str) -> Option<ResourceKind> {
        self.kinds.get(path).copied()
    }

    /// Whether `path` is known to the registry
    #[must_use]
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.kinds.contains_key(path)
    }

    /// Whether `path` is bound to exactly `kind`
    #[must_use]
    pub fn is_kind(&self, path: &str, kind: ResourceKind) -> bool {
        self.resolve(path) == Some(kind)
    }

    /// Whether `path` is an engine built-in
    #[must_use]
    #[inline]
    pub fn is_builtin(&self, path: &str) -> bool {
        self.builtin.contains(path)
    }

    /// Number of built-in paths
    #[must_use]
    pub fn builtin_count(&self) -> usize {
        self.builtin.len()
    }

    /// Descriptors seen during linking, in first-seen order
    #[must_use]
    pub fn observed_descriptors(&self) -> &[String] {
        &self.observed
    }

    /// Number of bound paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no path is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterate over every (path, kind) binding
    pub fn iter(&self) -> impl Iterator<Item = (&PathId, ResourceKind)> {
        self.kinds.iter().map(|(path, kind)| (path, *kind))
    }
}
