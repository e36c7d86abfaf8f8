//! Debug reports for the resident set

use crate::assets::{PathId, ResourceKind};

/// One resident entry as seen by a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentInfo {
    /// Resident path
    pub path: PathId,
    /// Kind the path was loaded as
    pub kind: ResourceKind,
    /// Current use count
    pub use_count: u32,
}

/// Snapshot of the cache taken by [`AssetCache::report`](crate::assets::AssetCache::report)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// Resident entries, sorted by path
    pub resident: Vec<ResidentInfo>,
    /// Engine built-in paths known to the registry
    pub builtin_count: usize,
    /// Distinct non-built-in paths in the closures of resident entries
    pub dependency_count: usize,
    /// Loads currently in flight
    pub in_flight: usize,
}

impl CacheReport {
    /// Sum of all use counts
    #[must_use]
    pub fn total_uses(&self) -> u64 {
        self.resident.iter().map(|info| u64::from(info.use_count)).sum()
    }

    /// Get a formatted one-line summary
    #[must_use]
    pub fn format_summary(&self) -> String {
        format!(
            "Resident: {} | Uses: {} | Dependencies: {} | Built-in: {} | In flight: {}",
            self.resident.len(),
            self.total_uses(),
            self.dependency_count,
            self.builtin_count,
            self.in_flight
        )
    }

    /// Summary followed by one line per resident entry
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.format_summary()];
        lines.extend(
            self.resident
                .iter()
                .map(|info| format!("  {} [{}] uses={}", info.path, info.kind, info.use_count)),
        );
        lines
    }
}
