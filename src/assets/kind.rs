//! Resource kinds and their fallback priority
//!
//! A single engine resource may be described by several class descriptors
//! (a prefab is also a generic asset, a sprite frame also carries a texture).
//! The registry keeps exactly one kind per path, chosen by the fixed
//! priority order declared here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared kind of a resource.
///
/// Variants are declared in fallback order: when a path carries several
/// descriptors, the one declared first wins. The derived `Ord` follows the
/// same order, so `a < b` means `a` has the higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Model,
    Mesh,
    Material,
    Effect,
    DragonBones,
    DragonBonesAtlas,
    SkeletonData,
    SkeletonAnimationClip,
    Skeleton,
    AnimationClip,
    /// Instantiable template; every use produces a fresh instance
    Prefab,
    Buffer,
    Particle,
    AudioClip,
    TiledMap,
    TtfFont,
    BitmapFont,
    LabelAtlas,
    SpriteAtlas,
    SpriteFrame,
    Texture,
    Json,
    Text,
    /// Most generic opaque asset
    Asset,
}

impl ResourceKind {
    /// Every kind, highest priority first.
    pub const FALLBACK_ORDER: [Self; 24] = [
        Self::Model,
        Self::Mesh,
        Self::Material,
        Self::Effect,
        Self::DragonBones,
        Self::DragonBonesAtlas,
        Self::SkeletonData,
        Self::SkeletonAnimationClip,
        Self::Skeleton,
        Self::AnimationClip,
        Self::Prefab,
        Self::Buffer,
        Self::Particle,
        Self::AudioClip,
        Self::TiledMap,
        Self::TtfFont,
        Self::BitmapFont,
        Self::LabelAtlas,
        Self::SpriteAtlas,
        Self::SpriteFrame,
        Self::Texture,
        Self::Json,
        Self::Text,
        Self::Asset,
    ];

    /// Parse an engine class descriptor such as `"cc.Prefab"` or `"Texture2D"`.
    ///
    /// Only the last dot-separated segment is considered. Returns `None` for
    /// descriptors that do not name a loadable kind.
    #[must_use]
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        let class = descriptor.rsplit('.').next().unwrap_or(descriptor);
        let kind = match class {
            "Model" => Self::Model,
            "Mesh" => Self::Mesh,
            "Material" => Self::Material,
            "EffectAsset" | "Effect" => Self::Effect,
            "DragonBonesAsset" | "DragonBones" => Self::DragonBones,
            "DragonBonesAtlasAsset" | "DragonBonesAtlas" => Self::DragonBonesAtlas,
            "SkeletonData" => Self::SkeletonData,
            "SkeletonAnimationClip" => Self::SkeletonAnimationClip,
            "Skeleton" => Self::Skeleton,
            "AnimationClip" => Self::AnimationClip,
            "Prefab" | "Template" => Self::Prefab,
            "BufferAsset" | "Buffer" => Self::Buffer,
            "ParticleAsset" | "Particle" => Self::Particle,
            "AudioClip" => Self::AudioClip,
            "TiledMapAsset" | "TiledMap" => Self::TiledMap,
            "TTFFont" | "TtfFont" => Self::TtfFont,
            "BitmapFont" => Self::BitmapFont,
            "LabelAtlas" => Self::LabelAtlas,
            "SpriteAtlas" => Self::SpriteAtlas,
            "SpriteFrame" => Self::SpriteFrame,
            "Texture2D" | "Texture" => Self::Texture,
            "JsonAsset" | "Json" => Self::Json,
            "TextAsset" | "Text" => Self::Text,
            "Asset" => Self::Asset,
            _ => return None,
        };
        Some(kind)
    }

    /// Pick the highest-priority kind among `candidates`.
    ///
    /// Ties cannot occur since every kind has a distinct slot in
    /// [`Self::FALLBACK_ORDER`]; the result is therefore independent of the
    /// order candidates were observed in.
    #[must_use]
    pub fn fallback(candidates: &[Self]) -> Option<Self> {
        Self::FALLBACK_ORDER
            .iter()
            .copied()
            .find(|kind| candidates.contains(kind))
    }

    /// Whether each use must instantiate a fresh object
    #[must_use]
    #[inline]
    pub const fn is_template(self) -> bool {
        matches!(self, Self::Prefab)
    }

    /// Position in the fallback order (0 is the highest priority)
    #[must_use]
    #[inline]
    pub const fn priority(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
