//! Scripted in-memory loader shared by unit tests

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::assets::{
    AssetCache, AssetLoader, DecodeError, PathId, ResourceKind, ResourceTable, TypeRegistry,
};

pub(crate) use tokio::task::yield_now;

pub(crate) fn path(path: &str) -> PathId {
    PathId::new(path)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MockAsset {
    pub path: PathId,
    pub kind: ResourceKind,
}

#[derive(Debug, PartialEq)]
pub(crate) struct MockInstance {
    pub template: PathId,
    pub serial: u32,
}

#[derive(Default)]
pub(crate) struct MockLoader {
    dependencies: FxHashMap<PathId, Vec<PathId>>,
    failing: FxHashSet<PathId>,
    held: RefCell<FxHashSet<PathId>>,
    decodes: RefCell<Vec<PathId>>,
    released: RefCell<Vec<PathId>>,
    instances: Cell<u32>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dependencies(mut self, asset: &str, deps: &[&str]) -> Self {
        self.dependencies
            .insert(path(asset), deps.iter().map(|dep| path(dep)).collect());
        self
    }

    pub fn with_failure(mut self, asset: &str) -> Self {
        self.failing.insert(path(asset));
        self
    }

    /// Keep decodes of `asset` pending until `resume` is called
    pub fn hold(&self, asset: &str) {
        self.held.borrow_mut().insert(path(asset));
    }

    pub fn resume(&self, asset: &str) {
        self.held.borrow_mut().remove(asset);
    }

    pub fn decode_count(&self, asset: &str) -> usize {
        self.decodes
            .borrow()
            .iter()
            .filter(|decoded| decoded.as_str() == asset)
            .count()
    }

    pub fn total_decodes(&self) -> usize {
        self.decodes.borrow().len()
    }

    pub fn released(&self) -> Vec<PathId> {
        self.released.borrow().clone()
    }

    pub fn instances_created(&self) -> u32 {
        self.instances.get()
    }
}

#[async_trait(?Send)]
impl AssetLoader for MockLoader {
    type Asset = MockAsset;
    type Instance = MockInstance;

    async fn decode(&self, path: &PathId, kind: ResourceKind) -> Result<MockAsset, DecodeError> {
        self.decodes.borrow_mut().push(path.clone());
        while self.held.borrow().contains(path) {
            yield_now().await;
        }
        yield_now().await;

        if self.failing.contains(path) {
            return Err(DecodeError::new(path, "scripted failure"));
        }
        Ok(MockAsset {
            path: path.clone(),
            kind,
        })
    }

    fn dependencies_of(&self, asset: &MockAsset) -> Vec<PathId> {
        self.dependencies
            .get(&asset.path)
            .cloned()
            .unwrap_or_default()
    }

    fn instantiate(&self, template: &MockAsset) -> MockInstance {
        let serial = self.instances.get() + 1;
        self.instances.set(serial);
        MockInstance {
            template: template.path.clone(),
            serial,
        }
    }

    fn release(&self, paths: &[PathId]) {
        self.released.borrow_mut().extend_from_slice(paths);
    }
}

pub(crate) fn test_table() -> ResourceTable {
    ResourceTable::new()
        .with_entry("tpl/Enemy", ["cc.Prefab", "cc.Asset"])
        .with_entry("tpl/Bullet", ["Template"])
        .with_entry("Sound/Click", ["cc.AudioClip"])
        .with_entry("Texture/Hero", ["cc.Texture2D", "cc.SpriteFrame"])
        .with_entry("Data/Broken", ["cc.JsonAsset"])
        .with_builtin("builtin/sprite")
}

pub(crate) fn test_cache(loader: MockLoader) -> AssetCache<MockLoader> {
    AssetCache::new(TypeRegistry::link(&test_table()), loader)
}
