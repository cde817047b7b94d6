//! Scene-side collaborators of cube textures
//!
//! ## Architecture
//!
//! ```text
//! CubeTexture (descriptor)
//!      ↓  TextureContext
//! SceneManager (cache, single-flight, refcounts)
//!      ↓  TextureLoader
//! Decoder / GPU upload
//! ```
//!
//! Completion flows back up through [`SceneManager::complete_load`] and the
//! [`TaskQueue`], never inline with the call that started the load.

pub mod context;
pub mod loader;
pub mod resource_table;
pub mod task_queue;
mod scene_manager;

pub use context::{
    ContextRef, LoadCallbacks, MaterialDirtyFlags, OnError, OnLoad, PrefilteredRequest,
    SixFaceRequest, Task, TextureContext, WeakContextRef,
};
pub use loader::{LoadError, LoadRequest, RecordingLoader, TextureLoader};
pub use resource_table::{CubeResource, ResourceState, ResourceTable};
pub use scene_manager::SceneManager;
pub use task_queue::TaskQueue;
