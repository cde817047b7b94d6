//! Resource table owning every cube resource of a scene
//!
//! Resources live in a slot map and are addressed by [`ResourceId`]; a
//! secondary index maps each [`CacheKey`] to its id. Textures hold ids only,
//! so the table stays the single owner of resource lifetime.

use std::collections::HashMap;

use crate::foundation::collections::{HandleMap, ResourceId};
use crate::scene::context::LoadCallbacks;
use crate::scene::loader::{LoadError, LoadRequest};
use crate::texture::CacheKey;

/// Upload state of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Load issued, not completed yet
    Loading,
    /// Uploaded and usable
    Ready,
    /// Loader reported a failure
    Failed(LoadError),
}

/// GPU cube resource tracked by the scene
#[derive(Debug)]
pub struct CubeResource {
    key: CacheKey,
    request: LoadRequest,
    state: ResourceState,
    listeners: Vec<LoadCallbacks>,
    ref_count: usize,
}

impl CubeResource {
    fn new(key: CacheKey, request: LoadRequest) -> Self {
        Self {
            key,
            request,
            state: ResourceState::Loading,
            listeners: Vec::new(),
            ref_count: 1,
        }
    }

    /// Key the resource is cached under
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Load that created the resource
    pub fn request(&self) -> &LoadRequest {
        &self.request
    }

    /// Current upload state
    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Whether the resource finished uploading
    pub fn is_ready(&self) -> bool {
        self.state == ResourceState::Ready
    }

    /// Number of holders
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    /// Number of callback sets waiting for completion
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn set_state(&mut self, state: ResourceState) {
        self.state = state;
    }

    pub(crate) fn add_listener(&mut self, callbacks: LoadCallbacks) {
        if !callbacks.is_empty() {
            self.listeners.push(callbacks);
        }
    }

    pub(crate) fn take_listeners(&mut self) -> Vec<LoadCallbacks> {
        std::mem::take(&mut self.listeners)
    }

    pub(crate) fn retain(&mut self) {
        self.ref_count += 1;
    }

    /// Drop one holder, returning the remaining count
    pub(crate) fn release(&mut self) -> usize {
        self.ref_count = self.ref_count.saturating_sub(1);
        self.ref_count
    }
}

/// Slot map of resources plus key index
#[derive(Debug, Default)]
pub struct ResourceTable {
    resources: HandleMap<CubeResource>,
    by_key: HashMap<CacheKey, ResourceId>,
}

impl ResourceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Id registered under `key`
    pub fn lookup(&self, key: &CacheKey) -> Option<ResourceId> {
        self.by_key.get(key).copied()
    }

    /// Resource behind `id`
    pub fn get(&self, id: ResourceId) -> Option<&CubeResource> {
        self.resources.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ResourceId) -> Option<&mut CubeResource> {
        self.resources.get_mut(id)
    }

    /// Register a new loading resource with one holder
    pub(crate) fn insert(&mut self, key: CacheKey, request: LoadRequest) -> ResourceId {
        let id = self.resources.insert(CubeResource::new(key.clone(), request));
        self.by_key.insert(key, id);
        id
    }

    /// Remove a resource and its key entry
    pub(crate) fn remove(&mut self, id: ResourceId) -> Option<CubeResource> {
        let resource = self.resources.remove(id)?;
        if self.by_key.get(&resource.key) == Some(&id) {
            self.by_key.remove(&resource.key);
        }
        Some(resource)
    }

    /// Number of resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
