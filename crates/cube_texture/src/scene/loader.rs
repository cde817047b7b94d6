//! GPU-facing loader seam
//!
//! The scene hands every load it decides to issue to a [`TextureLoader`].
//! Loaders report completion later through
//! [`SceneManager::complete_load`](crate::scene::SceneManager::complete_load),
//! which keeps decoding and upload out of this crate.

use thiserror::Error;

use crate::foundation::collections::ResourceId;
use crate::scene::context::{PrefilteredRequest, SixFaceRequest};

/// Texture load failures reported by a loader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Source could not be found
    #[error("Texture source not found: {0}")]
    NotFound(String),

    /// Source data could not be decoded
    #[error("Failed to decode texture: {0}")]
    Decode(String),

    /// Decoded data could not be uploaded
    #[error("GPU upload failed: {0}")]
    Upload(String),
}

/// Load issued to a loader
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    /// Six discrete face images
    SixImage(SixFaceRequest),
    /// Single container read directly
    Container(SixFaceRequest),
    /// Prefiltered container with optional harmonics generation
    Prefiltered(PrefilteredRequest),
}

impl LoadRequest {
    /// Root identifier of the source being loaded
    pub fn root(&self) -> &str {
        match self {
            Self::SixImage(request) | Self::Container(request) => &request.root,
            Self::Prefiltered(request) => &request.root,
        }
    }
}

/// Decoder and uploader of cube texture sources
pub trait TextureLoader {
    /// Start loading `request` into the resource `id`
    fn begin_load(&mut self, id: ResourceId, request: &LoadRequest);

    /// Free the GPU data of an evicted resource
    fn release(&mut self, _id: ResourceId) {}
}

/// Loader that only records what it was asked to do
///
/// Used headless and in tests; completion is driven by the caller.
#[derive(Debug, Default)]
pub struct RecordingLoader {
    requests: Vec<(ResourceId, LoadRequest)>,
    released: Vec<ResourceId>,
}

impl RecordingLoader {
    /// Create an empty recording loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Every load started so far, in order
    pub fn requests(&self) -> &[(ResourceId, LoadRequest)] {
        &self.requests
    }

    /// Number of loads started so far
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Resources whose GPU data was freed
    pub fn released(&self) -> &[ResourceId] {
        &self.released
    }
}

impl TextureLoader for RecordingLoader {
    fn begin_load(&mut self, id: ResourceId, request: &LoadRequest) {
        log::trace!("Recording load of '{}' into {:?}", request.root(), id);
        self.requests.push((id, request.clone()));
    }

    fn release(&mut self, id: ResourceId) {
        self.released.push(id);
    }
}
