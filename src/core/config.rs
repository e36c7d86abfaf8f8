//! Cache and pool configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::ManifestError;
use crate::core::events::EventQueue;

/// Asset cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Initial capacity of the event queue
    pub event_capacity: usize,
    /// Push [`ResourceEvent`](crate::core::ResourceEvent)s while loading and evicting
    pub emit_events: bool,
    /// Log an info-level summary after each batch
    pub log_batches: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            event_capacity: EventQueue::DEFAULT_CAPACITY,
            emit_events: true,
            log_batches: true,
        }
    }
}

impl CacheConfig {
    /// Set the initial event queue capacity
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Enable or disable event emission
    #[must_use]
    pub fn with_events(mut self, emit: bool) -> Self {
        self.emit_events = emit;
        self
    }

    /// Enable or disable batch summaries
    #[must_use]
    pub fn with_batch_logging(mut self, log_batches: bool) -> Self {
        self.log_batches = log_batches;
        self
    }
}

/// Pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Instances added each time an empty pool is asked for one
    pub extend_step: u32,
    /// Floor for a pool's capacity target
    pub min_capacity: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            extend_step: 1,
            min_capacity: 1,
        }
    }
}

impl PoolConfig {
    /// Set the auto-extend step (floored at 1)
    #[must_use]
    pub fn with_extend_step(mut self, step: u32) -> Self {
        self.extend_step = step.max(1);
        self
    }

    /// Set the minimum capacity target
    #[must_use]
    pub fn with_min_capacity(mut self, capacity: u32) -> Self {
        self.min_capacity = capacity;
        self
    }

    /// Extend step as used at runtime, never zero
    #[must_use]
    #[inline]
    pub fn effective_extend_step(&self) -> u32 {
        self.extend_step.max(1)
    }
}

/// Configuration for a whole [`ResourceContext`](crate::ResourceContext)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Cache settings
    pub cache: CacheConfig,
    /// Pool settings
    pub pool: PoolConfig,
}

impl ContextConfig {
    /// Replace the cache settings
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the pool settings
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Parse a configuration from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed
    pub fn from_ron_str(source: &str) -> Result<Self, ManifestError> {
        Ok(ron::from_str(source)?)
    }

    /// Parse a configuration from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed
    pub fn from_json_str(source: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        Self::from_ron_str(&fs::read_to_string(path)?)
    }

    /// Render the configuration as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContextConfig::default();
        assert_eq!(config.pool.extend_step, 1);
        assert_eq!(config.pool.min_capacity, 1);
        assert!(config.cache.emit_events);
    }

    #[test]
    fn test_builder_floors_extend_step() {
        let pool = PoolConfig::default().with_extend_step(0);
        assert_eq!(pool.extend_step, 1);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = ContextConfig::from_ron_str("(pool: (extend_step: 5))").unwrap();
        assert_eq!(config.pool.extend_step, 5);
        assert_eq!(config.pool.min_capacity, 1);
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_zero_step_from_file_is_still_usable() {
        let config = ContextConfig::from_json_str(r#"{"pool":{"extend_step":0}}"#).unwrap();
        assert_eq!(config.pool.effective_extend_step(), 1);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = ContextConfig::default()
            .with_pool(PoolConfig::default().with_extend_step(3))
            .with_cache(CacheConfig::default().with_events(false));
        let text = config.to_ron_string().unwrap();
        assert_eq!(ContextConfig::from_ron_str(&text).unwrap(), config);
    }
}
