//! Demo: link a resource table, warm a pool and cycle a wave of instances

use std::cell::Cell;

use asset_pool::prelude::*;
use async_trait::async_trait;

const RESOURCES: &str = r#"(
    entries: [
        (path: "tpl/Enemy", kinds: ["cc.Prefab"]),
        (path: "Texture/Hero", kinds: ["cc.Texture2D", "cc.SpriteFrame"]),
        (path: "Sound/Click", kinds: ["cc.AudioClip"]),
        (path: "builtin/sprite", kinds: ["cc.Material"]),
    ],
    builtin: ["builtin/sprite"],
)"#;

/// Decoded stand-in for a real asset
#[derive(Debug, Clone)]
struct DemoAsset {
    path: PathId,
    kind: ResourceKind,
    dependencies: Vec<PathId>,
}

/// Stand-in for a scene node
#[derive(Debug)]
struct DemoNode {
    name: String,
    id: u32,
}

/// In-memory loader that fabricates assets from their paths
#[derive(Default)]
struct DemoLoader {
    next_id: Cell<u32>,
}

#[async_trait(?Send)]
impl AssetLoader for DemoLoader {
    type Asset = DemoAsset;
    type Instance = DemoNode;

    async fn decode(&self, path: &PathId, kind: ResourceKind) -> Result<DemoAsset, DecodeError> {
        let dependencies = match path.as_str() {
            "tpl/Enemy" => vec![PathId::new("Texture/Hero"), PathId::new("builtin/sprite")],
            _ => Vec::new(),
        };
        Ok(DemoAsset {
            path: path.clone(),
            kind,
            dependencies,
        })
    }

    fn dependencies_of(&self, asset: &DemoAsset) -> Vec<PathId> {
        asset.dependencies.clone()
    }

    fn instantiate(&self, template: &DemoAsset) -> DemoNode {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        DemoNode {
            name: template.path.basename().to_string(),
            id,
        }
    }

    fn release(&self, paths: &[PathId]) {
        for path in paths {
            log::info!("Released {path}");
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let table = ResourceTable::from_ron_str(RESOURCES)?;
    let context = ResourceContext::new(ContextConfig::default(), &table, DemoLoader::default());

    context
        .cache()
        .load_with_progress(&[PathId::new("Sound/Click")], |progress| {
            log::info!(
                "Loading {}/{}: {}",
                progress.current,
                progress.total,
                progress.path
            );
        })
        .await;
    if let AssetView::Shared(click) = context.cache().use_asset(&PathId::new("Sound/Click")).await? {
        log::info!("Playing {} ({})", click.path, click.kind);
        context.cache().un_use(&click.path, 1);
    }

    context.pools().load(&[(PathId::new("tpl/Enemy"), 3)]).await;

    let mut wave = Vec::new();
    for _ in 0..4 {
        wave.push(context.pools().get("tpl/Enemy").await?);
    }
    for enemy in &wave {
        log::info!("Spawned {} #{}", enemy.name, enemy.id);
    }
    for enemy in wave {
        context.pools().put("tpl/Enemy", enemy)?;
    }

    context.dump();
    context.cache().swap_events();
    for event in context.cache().drain_events() {
        log::debug!("{event:?}");
    }

    let released = context.pools().unload("tpl/Enemy")?;
    log::info!("Unloaded tpl/Enemy, released {} paths", released.len());
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = pollster::block_on(run()) {
        eprintln!("Demo error: {}", e);
    }
}
