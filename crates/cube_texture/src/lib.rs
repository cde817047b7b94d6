//! # Cube Texture
//!
//! Acquisition, deduplication and deferred materialization of cubemap
//! textures for a 3D rendering pipeline.
//!
//! ## Features
//!
//! - **Format Resolution**: `.dds` containers, `.env` environment harmonics and six-image skyboxes
//! - **Deduplication**: one backing resource per (root, mip policy), single-flight loads
//! - **Deferred Loading**: textures materialize on first use when the scene asks for it
//! - **Local Cubemaps**: reflection transform and bounding box for shading
//! - **Records**: flat JSON form for scene files and cloning
//!
//! ## Quick Start
//!
//! ```rust
//! use cube_texture::prelude::*;
//!
//! let scene = SceneManager::with_config(
//!     SceneConfig { use_delayed_texture_loading: true, ..SceneConfig::default() },
//!     RecordingLoader::new(),
//! )
//! .into_shared();
//! let context: ContextRef = scene.clone();
//!
//! let mut sky = CubeTexture::new("textures/skybox", Some(&context), CubeTextureOptions::default());
//! assert_eq!(sky.load_state(), LoadState::PendingDelayedLoad);
//!
//! sky.materialize_if_pending();
//! assert_eq!(sky.load_state(), LoadState::Loaded);
//! assert_eq!(scene.borrow().loader().request_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod animation;
pub mod config;
pub mod foundation;
pub mod scene;
pub mod texture;

#[cfg(test)]
mod tests;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        animation::Animation,
        config::{Config, ConfigError, SceneConfig},
        foundation::{
            collections::ResourceId,
            math::{Mat4, Mat4Ext, Vec3},
        },
        scene::{
            ContextRef, LoadError, LoadRequest, MaterialDirtyFlags, RecordingLoader, SceneManager,
            TaskQueue, TextureContext, TextureLoader,
        },
        texture::{
            CacheKey, CubeTexture, CubeTextureOptions, CubeTextureRecord, LoadState,
            SerializationError, SourceKind, TextureFormat,
        },
    };
}
