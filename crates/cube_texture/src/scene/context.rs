//! Interface the cube texture core consumes from its owning scene
//!
//! Everything GPU-facing lives behind [`TextureContext`]: the resource cache,
//! the loaders and the cooperative task queue. Textures only keep a weak
//! reference to the context, so a texture whose scene is gone degrades to a
//! detached descriptor instead of failing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bitflags::bitflags;

use crate::animation::Animation;
use crate::foundation::collections::ResourceId;
use crate::scene::loader::LoadError;
use crate::texture::{CacheKey, TextureFormat};

/// Shared handle to a texture context
pub type ContextRef = Rc<RefCell<dyn TextureContext>>;

/// Non-owning handle to a texture context
pub type WeakContextRef = Weak<RefCell<dyn TextureContext>>;

/// Deferred unit of work run by the task queue
pub type Task = Box<dyn FnOnce()>;

/// Success callback of a texture load
pub type OnLoad = Box<dyn FnOnce()>;

/// Failure callback of a texture load
pub type OnError = Box<dyn FnOnce(LoadError)>;

/// Callbacks attached to a load or to an already cached resource
#[derive(Default)]
pub struct LoadCallbacks {
    /// Called once the resource is ready
    pub on_load: Option<OnLoad>,
    /// Called once if the resource failed to load
    pub on_error: Option<OnError>,
}

impl LoadCallbacks {
    /// Callbacks with nothing attached
    pub fn none() -> Self {
        Self::default()
    }

    /// Only a success callback
    pub fn on_load(callback: OnLoad) -> Self {
        Self {
            on_load: Some(callback),
            on_error: None,
        }
    }

    /// Whether no callback is attached
    pub fn is_empty(&self) -> bool {
        self.on_load.is_none() && self.on_error.is_none()
    }
}

impl std::fmt::Debug for LoadCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCallbacks")
            .field("on_load", &self.on_load.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

bitflags! {
    /// Material configuration that must be rebuilt after a texture change
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialDirtyFlags: u32 {
        /// Texture bindings or texture-dependent defines
        const TEXTURE = 1 << 0;
        /// Light-dependent defines
        const LIGHT = 1 << 1;
        /// Fresnel parameters
        const FRESNEL = 1 << 2;
        /// Mesh attribute layout
        const ATTRIBUTE = 1 << 3;
        /// Anything else
        const MISC = 1 << 4;
        /// Every category
        const ALL = Self::TEXTURE.bits()
            | Self::LIGHT.bits()
            | Self::FRESNEL.bits()
            | Self::ATTRIBUTE.bits()
            | Self::MISC.bits();
    }
}

/// Request for the six-face entry point
///
/// An empty `files` list asks the loader to read the container at `root`
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub struct SixFaceRequest {
    /// Cache key the resource is registered under
    pub key: CacheKey,
    /// Root identifier of the source
    pub root: String,
    /// Face identifiers, or empty for a container source
    pub files: Vec<String>,
    /// Skip mip generation
    pub no_mipmap: bool,
    /// Requested pixel format
    pub format: TextureFormat,
    /// Extension override forwarded to the decoder
    pub forced_extension: Option<String>,
    /// LOD scale applied when the container carries a mip chain
    pub lod_generation_scale: f32,
    /// LOD offset applied when the container carries a mip chain
    pub lod_generation_offset: f32,
}

/// Request for the prefiltered container entry point
#[derive(Debug, Clone, PartialEq)]
pub struct PrefilteredRequest {
    /// Cache key the resource is registered under
    pub key: CacheKey,
    /// Root identifier of the container
    pub root: String,
    /// LOD scale of the prefiltered mip chain
    pub lod_generation_scale: f32,
    /// LOD offset of the prefiltered mip chain
    pub lod_generation_offset: f32,
    /// Requested pixel format
    pub format: TextureFormat,
    /// Extension override forwarded to the decoder
    pub forced_extension: Option<String>,
    /// Derive spherical polynomial harmonics from the prefiltered data
    pub generate_harmonics: bool,
}

/// Owning rendering context of cube textures
///
/// Implementations own the GPU resource cache and guarantee that at most one
/// load per [`CacheKey`] is in flight.
pub trait TextureContext {
    /// Find a resource previously registered under `key`
    fn lookup_cached_resource(&self, key: &CacheKey) -> Option<ResourceId>;

    /// Load six face images, or a container when `files` is empty
    ///
    /// The returned id already counts one reference for the caller.
    fn load_six_face_texture(&mut self, request: SixFaceRequest, callbacks: LoadCallbacks) -> ResourceId;

    /// Load a prefiltered container
    ///
    /// The returned id already counts one reference for the caller.
    fn load_container_as_prefiltered(
        &mut self,
        request: PrefilteredRequest,
        callbacks: LoadCallbacks,
    ) -> ResourceId;

    /// Run `task` at the next scheduling opportunity, never inline
    fn schedule_async(&mut self, task: Task);

    /// Invalidate material configuration depending on texture state
    fn mark_dependent_materials_stale(&mut self, flags: MaterialDirtyFlags);

    /// Whether cache-missing loads wait until the texture is first needed
    fn use_delayed_texture_loading(&self) -> bool;

    /// Whether the resource finished uploading
    fn is_resource_ready(&self, id: ResourceId) -> bool;

    /// Deliver callbacks for an existing resource
    ///
    /// Ready resources get `on_load` scheduled; loading resources keep the
    /// callbacks until completion; failed resources get `on_error` scheduled.
    fn on_resource_ready(&mut self, id: ResourceId, callbacks: LoadCallbacks);

    /// Add a holder to a resource
    fn retain_resource(&mut self, id: ResourceId);

    /// Drop a holder from a resource; the context decides when to free it
    fn release_resource(&mut self, id: ResourceId);

    /// Build an animation track from its serialized record
    fn parse_animation(&self, record: &serde_json::Value) -> Option<Animation>;
}
