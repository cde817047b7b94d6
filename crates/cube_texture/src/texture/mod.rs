//! Cube texture descriptors
//!
//! A cube texture goes through these stages:
//! 1. **Format resolution** - classify the source, derive face identifiers
//! 2. **Identity** - build the [`CacheKey`] shared by equivalent textures
//! 3. **Load strategy** - reuse, load now, or defer
//! 4. **Lifecycle** - materialize deferred textures on demand
//!
//! Reflection transform and local-cubemap state live on the descriptor;
//! [`CubeTextureRecord`] is its plain serialized form.

pub mod format;
pub mod identity;
pub mod pixel_format;
pub mod strategy;
mod descriptor;
mod lifecycle;
mod serialization;

pub use descriptor::{
    CubeTexture, CubeTextureOptions, DEFAULT_LOD_GENERATION_OFFSET, DEFAULT_LOD_GENERATION_SCALE,
};
pub use format::{ResolvedSource, SourceKind, DEFAULT_FACE_SUFFIXES};
pub use identity::CacheKey;
pub use lifecycle::LoadState;
pub use pixel_format::TextureFormat;
pub use serialization::{CubeTextureRecord, SerializationError};
pub use strategy::{LoadAction, LoadPath};
