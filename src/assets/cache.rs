//! Reference-counted asset cache
//!
//! The [`AssetCache`] owns every resident asset together with its use count.
//! It is the only component that mutates use counts; pools and other callers
//! acquire and return leases exclusively through [`AssetCache::use_asset`]
//! and [`AssetCache::un_use`].
//!
//! # Lifecycle of a path
//!
//! ```text
//! Unregistered -> Loading -> Resident(0) <-> Resident(n > 0) -> Resident(0) -> Evicted
//! ```
//!
//! A path that is still loading can never be evicted: [`AssetCache::unload`]
//! rejects it with [`CacheError::Loading`].
//!
//! # Concurrency
//!
//! The cache is driven from a single cooperative executor. All state lives
//! behind a `RefCell` that is never borrowed across an `.await`, so the only
//! suspension points are the loader's `decode` calls. Concurrent loads of the
//! same path share one in-flight slot and therefore one decode.
//!
//! # Example
//!
//! ```ignore
//! let cache = AssetCache::new(registry, loader);
//!
//! let loaded = cache.load(&[PathId::new("tpl/Enemy")]).await;
//! let enemy = cache.use_asset(&PathId::new("tpl/Enemy")).await?;
//!
//! cache.un_use("tpl/Enemy", 1);
//! cache.unload("tpl/Enemy")?;
//! ```

use std::cell::RefCell;
use std::iter;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::OnceCell;

use super::error::{CacheError, DecodeError};
use super::kind::ResourceKind;
use super::loader::{AssetLoader, AssetView};
use super::path::PathId;
use super::pipeline::{LoadPipeline, PipelineOutcome};
use super::registry::TypeRegistry;
use crate::core::{CacheConfig, CacheReport, EventQueue, ResidentInfo, ResourceEvent};

/// Shared slot every caller waiting on the same path awaits.
type LoadSlot = Rc<OnceCell<Result<(), DecodeError>>>;

// ============================================================================
// Cache Entry
// ============================================================================

/// A resident asset and its lease count.
#[derive(Debug, Clone)]
pub struct CacheEntry<A> {
    path: PathId,
    kind: ResourceKind,
    asset: A,
    use_count: u32,
}

impl<A> CacheEntry<A> {
    /// Path the asset was loaded from
    #[must_use]
    pub fn path(&self) -> &PathId {
        &self.path
    }

    /// Kind the asset was decoded as
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Decoded asset handle
    #[must_use]
    pub fn asset(&self) -> &A {
        &self.asset
    }

    /// Outstanding uses
    #[must_use]
    pub fn use_count(&self) -> u32 {
        self.use_count
    }
}

/// Progress report for one successful item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    /// Items processed so far, starting at 1
    pub current: usize,
    /// Items in the batch
    pub total: usize,
    /// Path that just became resident
    pub path: PathId,
}

struct CacheState<A> {
    entries: FxHashMap<PathId, CacheEntry<A>>,
    in_flight: FxHashMap<PathId, LoadSlot>,
}

impl<A> Default for CacheState<A> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            in_flight: FxHashMap::default(),
        }
    }
}

/// Claim on an in-flight slot, retired when the awaiting caller finishes or
/// is cancelled.
///
/// The slot leaves the in-flight map once it is resolved, or once the last
/// waiter gives up before it resolved.
struct InFlight<'a, A> {
    state: &'a RefCell<CacheState<A>>,
    path: &'a PathId,
    slot: LoadSlot,
}

impl<A> Drop for InFlight<'_, A> {
    fn drop(&mut self) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return;
        };
        let is_current = state
            .in_flight
            .get(self.path)
            .is_some_and(|current| Rc::ptr_eq(current, &self.slot));
        // One reference is held by the map, one by this claim
        if is_current && (self.slot.initialized() || Rc::strong_count(&self.slot) <= 2) {
            state.in_flight.remove(self.path);
            if !self.slot.initialized() {
                log::debug!("Abandoned load of `{}`", self.path);
            }
        }
    }
}

// ============================================================================
// Asset Cache
// ============================================================================

/// Owner of every resident asset.
pub struct AssetCache<L: AssetLoader> {
    registry: TypeRegistry,
    loader: L,
    config: CacheConfig,
    state: RefCell<CacheState<L::Asset>>,
    events: RefCell<EventQueue>,
}

impl<L: AssetLoader> AssetCache<L> {
    /// Create a cache with the default configuration
    #[must_use]
    pub fn new(registry: TypeRegistry, loader: L) -> Self {
        Self::with_config(registry, loader, CacheConfig::default())
    }

    /// Create a cache with an explicit configuration
    #[must_use]
    pub fn with_config(registry: TypeRegistry, loader: L, config: CacheConfig) -> Self {
        let events = EventQueue::with_capacity(config.event_capacity);
        Self {
            registry,
            loader,
            config,
            state: RefCell::new(CacheState::default()),
            events: RefCell::new(events),
        }
    }

    /// Path→kind table used to filter loads
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The engine loader backing this cache
    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Whether `path` is resident
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        self.state.borrow().entries.contains_key(path)
    }

    /// Whether a decode for `path` is currently in flight
    #[must_use]
    pub fn is_loading(&self, path: &str) -> bool {
        self.state.borrow().in_flight.contains_key(path)
    }

    /// Declared kind of `path`, resident or not
    #[must_use]
    pub fn kind_of(&self, path: &str) -> Option<ResourceKind> {
        self.registry.resolve(path)
    }

    /// Peek at a resident asset without taking a lease
    #[must_use]
    pub fn get(&self, path: &str) -> Option<L::Asset> {
        self.state
            .borrow()
            .entries
            .get(path)
            .map(|entry| entry.asset.clone())
    }

    /// Use count of a resident path
    #[must_use]
    pub fn use_count(&self, path: &str) -> Option<u32> {
        self.state
            .borrow()
            .entries
            .get(path)
            .map(CacheEntry::use_count)
    }

    /// Every resident path, sorted
    #[must_use]
    pub fn resident_paths(&self) -> Vec<PathId> {
        let mut paths: Vec<PathId> = self.state.borrow().entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of resident entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Whether nothing is resident
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Load a batch of paths, see [`load_with_progress`](Self::load_with_progress).
    pub async fn load(&self, paths: &[PathId]) -> Vec<PathId> {
        self.load_with_progress(paths, |_| {}).await
    }

    /// Load a batch of paths one at a time.
    ///
    /// Resident, duplicate and unresolvable paths are dropped before the batch
    /// starts and do not count toward `total`. A path another batch is already
    /// loading is awaited rather than decoded again. Failed items are logged
    /// and left out of the result.
    ///
    /// `on_progress` runs once per successful item, in pipeline order.
    /// Resolves with the paths that became (or were confirmed) resident.
    pub async fn load_with_progress<F>(&self, paths: &[PathId], mut on_progress: F) -> Vec<PathId>
    where
        F: FnMut(&LoadProgress),
    {
        let ticket = self.ticket(paths);
        if ticket.is_empty() {
            return Vec::new();
        }

        let this = self;
        let outcome = LoadPipeline::new(ticket)
            .drain(
                move |(path, kind): (PathId, ResourceKind)| async move {
                    match this.load_one(&path, kind).await {
                        Ok(()) => Some(path),
                        Err(err) => {
                            log::warn!("Skipping `{path}`: {err}");
                            None
                        }
                    }
                },
                |current, total, path: &PathId| {
                    log::debug!("Loaded {current}/{total}: {path}");
                    self.emit(ResourceEvent::Loading {
                        current,
                        total,
                        path: path.clone(),
                    });
                    on_progress(&LoadProgress {
                        current,
                        total,
                        path: path.clone(),
                    });
                },
            )
            .await;

        self.finish_batch(outcome)
    }

    /// Filter a request down to the items the pipeline has to process.
    fn ticket(&self, paths: &[PathId]) -> Vec<(PathId, ResourceKind)> {
        let state = self.state.borrow();
        let mut seen: FxHashSet<&PathId> = FxHashSet::default();
        let mut ticket = Vec::with_capacity(paths.len());

        for path in paths {
            if state.entries.contains_key(path) || !seen.insert(path) {
                continue;
            }
            match self.registry.resolve(path) {
                Some(kind) => ticket.push((path.clone(), kind)),
                None => log::warn!("{}", CacheError::UnresolvedKind(path.clone())),
            }
        }

        ticket
    }

    /// Make a single path resident, joining any load already in flight.
    async fn load_one(&self, path: &PathId, kind: ResourceKind) -> Result<(), CacheError> {
        if self.has(path) {
            return Ok(());
        }

        let slot = {
            let mut state = self.state.borrow_mut();
            Rc::clone(
                state
                    .in_flight
                    .entry(path.clone())
                    .or_insert_with(|| Rc::new(OnceCell::new())),
            )
        };

        let in_flight = InFlight {
            state: &self.state,
            path,
            slot,
        };
        let result = in_flight
            .slot
            .get_or_init(|| self.decode_into_cache(path, kind))
            .await
            .clone();
        drop(in_flight);

        result.map_err(CacheError::from)
    }

    async fn decode_into_cache(&self, path: &PathId, kind: ResourceKind) -> Result<(), DecodeError> {
        log::trace!("Decoding `{path}` as {kind}");
        let asset = self.loader.decode(path, kind).await?;

        self.state
            .borrow_mut()
            .entries
            .entry(path.clone())
            .or_insert_with(|| CacheEntry {
                path: path.clone(),
                kind,
                asset,
                use_count: 0,
            });
        Ok(())
    }

    fn finish_batch(&self, outcome: PipelineOutcome<PathId>) -> Vec<PathId> {
        let PipelineOutcome {
            succeeded,
            current,
            total,
        } = outcome;

        if self.config.log_batches && !succeeded.is_empty() {
            let names: Vec<&str> = succeeded.iter().map(PathId::as_str).collect();
            log::info!(
                "Loaded {} of {} resources: {}",
                succeeded.len(),
                total,
                names.join(", ")
            );
        }

        self.emit(ResourceEvent::Loaded {
            current,
            total,
            paths: succeeded.clone(),
        });

        succeeded
    }

    // ------------------------------------------------------------------------
    // Leases
    // ------------------------------------------------------------------------

    /// Take one lease on `path`, loading it first if needed.
    ///
    /// Template kinds hand back a fresh instance per call, every other kind
    /// hands back the shared asset.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if the path is unknown or its load fails.
    pub async fn use_asset(
        &self,
        path: &PathId,
    ) -> Result<AssetView<L::Asset, L::Instance>, CacheError> {
        if !self.has(path) {
            if !self.registry.contains(path) {
                log::warn!("Cannot use unknown resource `{path}`");
                return Err(CacheError::NotFound(path.clone()));
            }
            self.load(std::slice::from_ref(path)).await;
        }

        let (asset, kind, uses) = {
            let mut state = self.state.borrow_mut();
            let entry = state
                .entries
                .get_mut(path)
                .ok_or_else(|| CacheError::NotFound(path.clone()))?;
            entry.use_count = entry.use_count.saturating_add(1);
            (entry.asset.clone(), entry.kind, entry.use_count)
        };
        log::trace!("Use `{path}` -> {uses}");

        if kind.is_template() {
            Ok(AssetView::Instance(self.loader.instantiate(&asset)))
        } else {
            Ok(AssetView::Shared(asset))
        }
    }

    /// Return `count` leases on `path` (at least one), flooring at zero.
    ///
    /// Never evicts. Returns the new use count, or `None` if the path is not
    /// resident.
    pub fn un_use(&self, path: &str, count: u32) -> Option<u32> {
        let count = count.max(1);
        let mut state = self.state.borrow_mut();
        let Some(entry) = state.entries.get_mut(path) else {
            log::debug!("Ignoring un-use of non-resident `{path}`");
            return None;
        };
        entry.use_count = entry.use_count.saturating_sub(count);
        log::trace!("Un-use `{path}` by {count} -> {}", entry.use_count);
        Some(entry.use_count)
    }

    // ------------------------------------------------------------------------
    // Eviction
    // ------------------------------------------------------------------------

    /// Evict `path` and release whatever nothing else still needs.
    ///
    /// The release set is the path itself plus its dependency closure, minus
    /// every path that another resident entry is, or depends on, and minus the
    /// engine built-ins. Returns the paths handed to the loader.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Loading`] while the path's load is in flight
    /// - [`CacheError::NotFound`] if the path is not resident
    /// - [`CacheError::StillInUse`] if leases are outstanding
    pub fn unload(&self, path: &str) -> Result<Vec<PathId>, CacheError> {
        let (target, asset, others) = {
            let state = self.state.borrow();
            let Some(entry) = state.entries.get(path) else {
                let err = if state.in_flight.contains_key(path) {
                    CacheError::Loading(PathId::new(path))
                } else {
                    CacheError::NotFound(PathId::new(path))
                };
                log::warn!("Unload refused: {err}");
                return Err(err);
            };
            if entry.use_count > 0 {
                let err = CacheError::StillInUse {
                    path: entry.path.clone(),
                    uses: entry.use_count,
                };
                log::warn!("Unload refused: {err}");
                return Err(err);
            }
            let others: Vec<(PathId, L::Asset)> = state
                .entries
                .values()
                .filter(|other| other.path.as_str() != path)
                .map(|other| (other.path.clone(), other.asset.clone()))
                .collect();
            (entry.path.clone(), entry.asset.clone(), others)
        };

        let released = self.releasable(&target, &asset, &others);
        self.state.borrow_mut().entries.remove(path);
        if !released.is_empty() {
            self.loader.release(&released);
        }

        log::debug!("Evicted `{target}`, released {} paths", released.len());
        self.emit(ResourceEvent::Evicted {
            path: target,
            released: released.clone(),
        });
        Ok(released)
    }

    /// Return one lease, then try to evict.
    ///
    /// Not atomic with respect to other callers: a `use_asset` that resolves
    /// in between makes the eviction fail with `StillInUse`.
    ///
    /// # Errors
    ///
    /// Same as [`unload`](Self::unload).
    pub fn un_use_then_unload(&self, path: &str) -> Result<Vec<PathId>, CacheError> {
        self.un_use(path, 1);
        self.unload(path)
    }

    fn releasable(
        &self,
        target: &PathId,
        asset: &L::Asset,
        others: &[(PathId, L::Asset)],
    ) -> Vec<PathId> {
        let mut protected: FxHashSet<PathId> = FxHashSet::default();
        for (other_path, other_asset) in others {
            protected.insert(other_path.clone());
            protected.extend(self.loader.dependencies_of(other_asset));
        }

        let mut seen: FxHashSet<PathId> = FxHashSet::default();
        iter::once(target.clone())
            .chain(self.loader.dependencies_of(asset))
            .filter(|candidate| seen.insert(candidate.clone()))
            .filter(|candidate| {
                !protected.contains(candidate) && !self.registry.is_builtin(candidate)
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Events and diagnostics
    // ------------------------------------------------------------------------

    pub(crate) fn emit(&self, event: ResourceEvent) {
        if self.config.emit_events {
            self.events.borrow_mut().push(event);
        }
    }

    /// Make events pushed since the last swap readable
    pub fn swap_events(&self) {
        self.events.borrow_mut().swap();
    }

    /// Take every readable event
    #[must_use]
    pub fn drain_events(&self) -> Vec<ResourceEvent> {
        self.events.borrow_mut().drain().collect()
    }

    /// Snapshot of the resident set
    #[must_use]
    pub fn report(&self) -> CacheReport {
        let (mut resident, assets, in_flight) = {
            let state = self.state.borrow();
            let resident: Vec<ResidentInfo> = state
                .entries
                .values()
                .map(|entry| ResidentInfo {
                    path: entry.path.clone(),
                    kind: entry.kind,
                    use_count: entry.use_count,
                })
                .collect();
            let assets: Vec<L::Asset> = state.entries.values().map(|e| e.asset.clone()).collect();
            (resident, assets, state.in_flight.len())
        };
        resident.sort_by(|a, b| a.path.cmp(&b.path));

        let dependencies: FxHashSet<PathId> = assets
            .iter()
            .flat_map(|asset| self.loader.dependencies_of(asset))
            .filter(|dep| !self.registry.is_builtin(dep))
            .collect();

        CacheReport {
            resident,
            builtin_count: self.registry.builtin_count(),
            dependency_count: dependencies.len(),
            in_flight,
        }
    }

    /// Log the current report at info level
    pub fn dump(&self) {
        for line in self.report().lines() {
            log::info!("{line}");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::task::{Context, Waker};

    use crate::test_support::{MockLoader, path, test_cache, yield_now};

    #[test]
    fn test_load_makes_paths_resident() {
        let cache = test_cache(MockLoader::new());

        let loaded = pollster::block_on(cache.load(&[path("tpl/Enemy"), path("Sound/Click")]));

        assert_eq!(loaded, vec![path("tpl/Enemy"), path("Sound/Click")]);
        assert!(cache.has("tpl/Enemy"));
        assert_eq!(cache.use_count("Sound/Click"), Some(0));
        assert_eq!(cache.kind_of("tpl/Enemy"), Some(ResourceKind::Prefab));
    }

    #[test]
    fn test_unresolved_path_is_filtered_before_pipeline() {
        let cache = test_cache(MockLoader::new());
        let mut calls = 0;

        let loaded = pollster::block_on(
            cache.load_with_progress(&[path("missing/path")], |_| calls += 1),
        );

        assert!(loaded.is_empty());
        assert_eq!(calls, 0);
        cache.swap_events();
        assert!(cache.drain_events().is_empty());
        assert_eq!(cache.loader().total_decodes(), 0);
    }

    #[test]
    fn test_duplicates_and_resident_paths_are_skipped() {
        let cache = test_cache(MockLoader::new());
        let enemy = path("tpl/Enemy");

        let first = pollster::block_on(cache.load(&[enemy.clone(), enemy.clone()]));
        let second = pollster::block_on(cache.load(&[enemy.clone()]));

        assert_eq!(first, vec![enemy]);
        assert!(second.is_empty());
        assert_eq!(cache.loader().decode_count("tpl/Enemy"), 1);
    }

    #[test]
    fn test_concurrent_loads_coalesce() {
        let cache = test_cache(MockLoader::new());
        let enemy = path("tpl/Enemy");

        let (a, b) = pollster::block_on(async {
            tokio::join!(
                cache.load(std::slice::from_ref(&enemy)),
                cache.load(std::slice::from_ref(&enemy))
            )
        });

        assert_eq!(cache.loader().decode_count("tpl/Enemy"), 1);
        assert_eq!(a, vec![enemy.clone()]);
        assert_eq!(b, vec![enemy]);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_loading("tpl/Enemy"));
    }

    #[test]
    fn test_use_during_load_coalesces() {
        let cache = test_cache(MockLoader::new());
        let hero = path("Texture/Hero");

        let (loaded, used) = pollster::block_on(async {
            tokio::join!(cache.load(std::slice::from_ref(&hero)), cache.use_asset(&hero))
        });

        assert_eq!(loaded, vec![hero.clone()]);
        assert!(matches!(used, Ok(AssetView::Shared(_))));
        assert_eq!(cache.loader().decode_count("Texture/Hero"), 1);
        assert_eq!(cache.use_count("Texture/Hero"), Some(1));
    }

    #[test]
    fn test_progress_is_monotonic() {
        let cache = test_cache(MockLoader::new());
        let mut seen = Vec::new();

        pollster::block_on(cache.load_with_progress(
            &[path("tpl/Enemy"), path("Sound/Click"), path("Texture/Hero")],
            |progress| seen.push((progress.current, progress.total)),
        ));

        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_decode_failure_keeps_batch_going() {
        let cache = test_cache(MockLoader::new().with_failure("Data/Broken"));

        let loaded = pollster::block_on(cache.load(&[
            path("Sound/Click"),
            path("Data/Broken"),
            path("Texture/Hero"),
        ]));

        assert_eq!(loaded, vec![path("Sound/Click"), path("Texture/Hero")]);
        assert!(!cache.has("Data/Broken"));

        cache.swap_events();
        let events = cache.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ResourceEvent::Loading { current: 1, total: 3, .. }));
        assert!(matches!(&events[1], ResourceEvent::Loading { current: 3, total: 3, .. }));
        assert!(matches!(
            &events[2],
            ResourceEvent::Loaded { current: 3, total: 3, paths } if paths.len() == 2
        ));
    }

    #[test]
    fn test_failed_load_can_be_retried() {
        let cache = test_cache(MockLoader::new().with_failure("Data/Broken"));

        pollster::block_on(cache.load(&[path("Data/Broken")]));
        pollster::block_on(cache.load(&[path("Data/Broken")]));

        assert_eq!(cache.loader().decode_count("Data/Broken"), 2);
        assert!(!cache.is_loading("Data/Broken"));
    }

    #[test]
    fn test_use_template_instantiates_each_time() {
        let cache = test_cache(MockLoader::new());
        let enemy = path("tpl/Enemy");

        let first = pollster::block_on(cache.use_asset(&enemy)).unwrap();
        let second = pollster::block_on(cache.use_asset(&enemy)).unwrap();

        let first = first.into_instance().unwrap();
        let second = second.into_instance().unwrap();
        assert_ne!(first.serial, second.serial);
        assert_eq!(cache.use_count("tpl/Enemy"), Some(2));
        assert_eq!(cache.loader().decode_count("tpl/Enemy"), 1);
    }

    #[test]
    fn test_use_shared_asset() {
        let cache = test_cache(MockLoader::new());

        let view = pollster::block_on(cache.use_asset(&path("Sound/Click"))).unwrap();

        let asset = view.into_shared().unwrap();
        assert_eq!(asset.path, path("Sound/Click"));
        assert_eq!(cache.get("Sound/Click"), Some(asset));
    }

    #[test]
    fn test_use_unknown_or_failing_path() {
        let cache = test_cache(MockLoader::new().with_failure("Data/Broken"));

        let unknown = pollster::block_on(cache.use_asset(&path("missing/path")));
        let broken = pollster::block_on(cache.use_asset(&path("Data/Broken")));

        assert_eq!(unknown.unwrap_err(), CacheError::NotFound(path("missing/path")));
        assert_eq!(broken.unwrap_err(), CacheError::NotFound(path("Data/Broken")));
    }

    #[test]
    fn test_use_count_never_goes_negative() {
        let cache = test_cache(MockLoader::new());
        let click = path("Sound/Click");

        pollster::block_on(cache.use_asset(&click)).unwrap();
        assert_eq!(cache.un_use("Sound/Click", 1), Some(0));
        assert_eq!(cache.un_use("Sound/Click", 5), Some(0));
        assert_eq!(cache.un_use("Sound/Click", 0), Some(0));
        assert_eq!(cache.un_use("missing/path", 1), None);
    }

    #[test]
    fn test_un_use_with_zero_count_returns_one() {
        let cache = test_cache(MockLoader::new());
        let click = path("Sound/Click");

        pollster::block_on(cache.use_asset(&click)).unwrap();
        pollster::block_on(cache.use_asset(&click)).unwrap();

        assert_eq!(cache.un_use("Sound/Click", 0), Some(1));
    }

    #[test]
    fn test_unload_refused_while_in_use() {
        let cache = test_cache(MockLoader::new());
        let enemy = path("tpl/Enemy");

        pollster::block_on(cache.use_asset(&enemy)).unwrap();

        assert_eq!(
            cache.unload("tpl/Enemy"),
            Err(CacheError::StillInUse {
                path: enemy.clone(),
                uses: 1
            })
        );
        assert!(cache.has("tpl/Enemy"));

        cache.un_use("tpl/Enemy", 1);
        assert!(cache.unload("tpl/Enemy").is_ok());
        assert!(!cache.has("tpl/Enemy"));
    }

    #[test]
    fn test_un_use_then_unload() {
        let cache = test_cache(MockLoader::new());
        pollster::block_on(cache.use_asset(&path("Sound/Click"))).unwrap();

        let released = cache.un_use_then_unload("Sound/Click").unwrap();

        assert_eq!(released, vec![path("Sound/Click")]);
        assert_eq!(cache.loader().released(), vec![path("Sound/Click")]);
    }

    #[test]
    fn test_unload_unknown_path() {
        let cache = test_cache(MockLoader::new());
        assert_eq!(
            cache.unload("tpl/Enemy"),
            Err(CacheError::NotFound(path("tpl/Enemy")))
        );
        assert!(cache.loader().released().is_empty());
    }

    #[test]
    fn test_unload_keeps_shared_dependencies() {
        let loader = MockLoader::new()
            .with_dependencies("tpl/Enemy", &["Texture/Shared", "Texture/EnemyOnly"])
            .with_dependencies("tpl/Bullet", &["Texture/Shared"]);
        let cache = test_cache(loader);
        pollster::block_on(cache.load(&[path("tpl/Enemy"), path("tpl/Bullet")]));

        let released = cache.unload("tpl/Enemy").unwrap();

        assert_eq!(released, vec![path("tpl/Enemy"), path("Texture/EnemyOnly")]);
        assert!(cache.has("tpl/Bullet"));

        let released = cache.unload("tpl/Bullet").unwrap();
        assert_eq!(released, vec![path("tpl/Bullet"), path("Texture/Shared")]);
    }

    #[test]
    fn test_unload_keeps_resident_and_builtin_dependencies() {
        let loader = MockLoader::new()
            .with_dependencies("tpl/Enemy", &["Texture/Hero", "builtin/sprite", "Texture/EnemyOnly"]);
        let cache = test_cache(loader);
        pollster::block_on(cache.load(&[path("tpl/Enemy"), path("Texture/Hero")]));

        let released = cache.unload("tpl/Enemy").unwrap();

        assert_eq!(released, vec![path("tpl/Enemy"), path("Texture/EnemyOnly")]);
        assert!(cache.has("Texture/Hero"));
    }

    #[test]
    fn test_unload_refused_while_loading() {
        let cache = test_cache(MockLoader::new());
        let enemy = path("tpl/Enemy");
        cache.loader().hold("tpl/Enemy");

        let (loaded, refused) = pollster::block_on(async {
            tokio::join!(cache.load(std::slice::from_ref(&enemy)), async {
                while !cache.is_loading("tpl/Enemy") {
                    yield_now().await;
                }
                let refused = cache.unload("tpl/Enemy");
                cache.loader().resume("tpl/Enemy");
                refused
            })
        });

        assert_eq!(refused, Err(CacheError::Loading(enemy.clone())));
        assert_eq!(loaded, vec![enemy]);
        assert!(cache.has("tpl/Enemy"));
    }

    #[test]
    fn test_cancelled_load_retires_in_flight_slot() {
        let cache = test_cache(MockLoader::new());
        let paths = [path("tpl/Enemy")];
        let mut cx = Context::from_waker(Waker::noop());
        cache.loader().hold("tpl/Enemy");

        let mut load = Box::pin(cache.load(&paths));
        assert!(load.as_mut().poll(&mut cx).is_pending());
        assert!(cache.is_loading("tpl/Enemy"));
        drop(load);
        cache.loader().resume("tpl/Enemy");

        assert!(!cache.is_loading("tpl/Enemy"));
        assert!(!cache.has("tpl/Enemy"));
        assert_eq!(
            cache.unload("tpl/Enemy"),
            Err(CacheError::NotFound(path("tpl/Enemy")))
        );

        let loaded = pollster::block_on(cache.load(&paths));
        assert_eq!(loaded, vec![path("tpl/Enemy")]);
        assert!(!cache.is_loading("tpl/Enemy"));
    }

    #[test]
    fn test_cancelled_waiter_leaves_other_waiter_loading() {
        let cache = test_cache(MockLoader::new());
        let paths = [path("tpl/Enemy")];
        let mut cx = Context::from_waker(Waker::noop());
        cache.loader().hold("tpl/Enemy");

        let mut first = Box::pin(cache.load(&paths));
        let mut second = Box::pin(cache.load(&paths));
        assert!(first.as_mut().poll(&mut cx).is_pending());
        assert!(second.as_mut().poll(&mut cx).is_pending());

        drop(first);
        assert!(cache.is_loading("tpl/Enemy"));

        cache.loader().resume("tpl/Enemy");
        let loaded = pollster::block_on(second);

        assert_eq!(loaded, vec![path("tpl/Enemy")]);
        assert!(cache.has("tpl/Enemy"));
        assert!(!cache.is_loading("tpl/Enemy"));
    }

    #[test]
    fn test_eviction_event() {
        let cache = test_cache(MockLoader::new());
        pollster::block_on(cache.load(&[path("Sound/Click")]));
        cache.swap_events();
        let _ = cache.drain_events();

        cache.unload("Sound/Click").unwrap();
        cache.swap_events();

        assert_eq!(
            cache.drain_events(),
            vec![ResourceEvent::Evicted {
                path: path("Sound/Click"),
                released: vec![path("Sound/Click")],
            }]
        );
    }

    #[test]
    fn test_report() {
        let loader = MockLoader::new()
            .with_dependencies("tpl/Enemy", &["Texture/Shared", "builtin/sprite"]);
        let cache = test_cache(loader);
        let enemy = path("tpl/Enemy");
        pollster::block_on(cache.load(&[enemy.clone(), path("Sound/Click")]));
        pollster::block_on(cache.use_asset(&enemy)).unwrap();

        let report = cache.report();

        assert_eq!(report.resident.len(), 2);
        assert_eq!(report.resident[1].path, enemy);
        assert_eq!(report.resident[1].use_count, 1);
        assert_eq!(report.dependency_count, 1);
        assert_eq!(report.builtin_count, 1);
        assert_eq!(report.total_uses(), 1);
        assert_eq!(cache.resident_paths(), vec![path("Sound/Click"), enemy]);
    }
}
