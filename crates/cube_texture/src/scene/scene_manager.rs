//! Scene Manager - owner of cube texture resources
//!
//! The Scene Manager:
//! 1. Caches GPU cube resources by [`CacheKey`] in a [`ResourceTable`]
//! 2. Issues at most one load per key (single-flight)
//! 3. Delivers completion callbacks through its [`TaskQueue`]
//! 4. Counts holders and evicts resources nobody references
//! 5. Collects material staleness signals raised by textures

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::animation::Animation;
use crate::config::SceneConfig;
use crate::foundation::collections::ResourceId;
use crate::scene::context::{
    LoadCallbacks, MaterialDirtyFlags, PrefilteredRequest, SixFaceRequest, Task, TextureContext,
};
use crate::scene::loader::{LoadError, LoadRequest, TextureLoader};
use crate::scene::resource_table::{ResourceState, ResourceTable};
use crate::scene::task_queue::TaskQueue;
use crate::texture::CacheKey;

/// Scene Manager - coordinates the resource cache, loader and task queue
pub struct SceneManager<L: TextureLoader> {
    /// Configuration
    config: SceneConfig,

    /// GPU-facing loader
    loader: L,

    /// Every cube resource, keyed by id and by cache key
    resources: ResourceTable,

    /// Deferred callbacks
    tasks: TaskQueue,

    /// Staleness signals received per flag set
    stale_signals: HashMap<MaterialDirtyFlags, usize>,
}

impl<L: TextureLoader> SceneManager<L> {
    /// Create a scene manager with default configuration
    pub fn new(loader: L) -> Self {
        Self::with_config(SceneConfig::default(), loader)
    }

    /// Create a scene manager with custom configuration
    pub fn with_config(config: SceneConfig, loader: L) -> Self {
        log::info!("Creating SceneManager with config: {:?}", config);
        Self {
            config,
            loader,
            resources: ResourceTable::new(),
            tasks: TaskQueue::new(),
            stale_signals: HashMap::new(),
        }
    }

    /// Wrap the manager for sharing with textures
    pub fn into_shared(self) -> Rc<RefCell<Self>>
    where
        L: 'static,
    {
        Rc::new(RefCell::new(self))
    }

    /// Configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Switch the deferred-loading policy for textures created afterwards
    pub fn set_use_delayed_texture_loading(&mut self, enabled: bool) {
        self.config.use_delayed_texture_loading = enabled;
    }

    /// Loader
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Mutable loader
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Resource table
    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Handle to the task queue
    ///
    /// Run queued callbacks with [`TaskQueue::run_pending`] while the manager
    /// is not borrowed, so callbacks can reach the scene themselves.
    pub fn task_queue(&self) -> TaskQueue {
        self.tasks.clone()
    }

    /// Number of staleness signals raised with exactly `flags`
    pub fn stale_signal_count(&self, flags: MaterialDirtyFlags) -> usize {
        self.stale_signals.get(&flags).copied().unwrap_or(0)
    }

    /// Record the outcome of a load started by the loader
    ///
    /// Waiting callbacks are scheduled, not run. Completions for evicted or
    /// already completed resources are ignored.
    pub fn complete_load(&mut self, id: ResourceId, result: Result<(), LoadError>) {
        let Some(resource) = self.resources.get_mut(id) else {
            log::debug!("Ignoring completion for evicted resource {:?}", id);
            return;
        };
        if resource.state() != &ResourceState::Loading {
            log::warn!("Resource {} completed twice, ignoring", resource.key());
            return;
        }

        let listeners = resource.take_listeners();
        match result {
            Ok(()) => {
                log::debug!("Resource {} ready ({} listeners)", resource.key(), listeners.len());
                resource.set_state(ResourceState::Ready);
                for callbacks in listeners {
                    if let Some(on_load) = callbacks.on_load {
                        self.tasks.schedule(on_load);
                    }
                }
            }
            Err(error) => {
                log::warn!("Resource {} failed to load: {}", resource.key(), error);
                resource.set_state(ResourceState::Failed(error.clone()));
                for callbacks in listeners {
                    if let Some(on_error) = callbacks.on_error {
                        let error = error.clone();
                        self.tasks.schedule(Box::new(move || on_error(error)));
                    }
                }
            }
        }
    }

    /// Issue a load, or join the one already registered under the key
    fn load_or_join(&mut self, key: CacheKey, request: LoadRequest, callbacks: LoadCallbacks) -> ResourceId {
        if let Some(id) = self.resources.lookup(&key) {
            log::debug!("Joining existing resource {} instead of loading again", key);
            self.retain_resource(id);
            self.on_resource_ready(id, callbacks);
            return id;
        }

        let id = self.resources.insert(key, request);
        if let Some(resource) = self.resources.get_mut(id) {
            resource.add_listener(callbacks);
            log::info!("Loading cube texture '{}' as {:?}", resource.request().root(), id);
            self.loader.begin_load(id, resource.request());
        }
        id
    }
}

impl<L: TextureLoader> TextureContext for SceneManager<L> {
    fn lookup_cached_resource(&self, key: &CacheKey) -> Option<ResourceId> {
        self.resources.lookup(key)
    }

    fn load_six_face_texture(&mut self, request: SixFaceRequest, callbacks: LoadCallbacks) -> ResourceId {
        let key = request.key.clone();
        let request = if request.files.is_empty() {
            LoadRequest::Container(request)
        } else {
            LoadRequest::SixImage(request)
        };
        self.load_or_join(key, request, callbacks)
    }

    fn load_container_as_prefiltered(
        &mut self,
        request: PrefilteredRequest,
        callbacks: LoadCallbacks,
    ) -> ResourceId {
        let key = request.key.clone();
        self.load_or_join(key, LoadRequest::Prefiltered(request), callbacks)
    }

    fn schedule_async(&mut self, task: Task) {
        self.tasks.schedule(task);
    }

    fn mark_dependent_materials_stale(&mut self, flags: MaterialDirtyFlags) {
        log::debug!("Marking materials stale: {:?}", flags);
        *self.stale_signals.entry(flags).or_insert(0) += 1;
    }

    fn use_delayed_texture_loading(&self) -> bool {
        self.config.use_delayed_texture_loading
    }

    fn is_resource_ready(&self, id: ResourceId) -> bool {
        self.resources.get(id).is_some_and(|resource| resource.is_ready())
    }

    fn on_resource_ready(&mut self, id: ResourceId, callbacks: LoadCallbacks) {
        let Some(resource) = self.resources.get_mut(id) else {
            return;
        };
        match resource.state().clone() {
            ResourceState::Loading => resource.add_listener(callbacks),
            ResourceState::Ready => {
                if let Some(on_load) = callbacks.on_load {
                    self.tasks.schedule(on_load);
                }
            }
            ResourceState::Failed(error) => {
                if let Some(on_error) = callbacks.on_error {
                    self.tasks.schedule(Box::new(move || on_error(error)));
                }
            }
        }
    }

    fn retain_resource(&mut self, id: ResourceId) {
        if let Some(resource) = self.resources.get_mut(id) {
            resource.retain();
        }
    }

    fn release_resource(&mut self, id: ResourceId) {
        let Some(resource) = self.resources.get_mut(id) else {
            return;
        };
        if resource.release() == 0 && self.config.evict_unreferenced {
            if let Some(evicted) = self.resources.remove(id) {
                log::debug!("Evicting unreferenced resource {}", evicted.key());
                self.loader.release(id);
            }
        }
    }

    fn parse_animation(&self, record: &serde_json::Value) -> Option<Animation> {
        Animation::from_record(record)
    }
}

impl<L: TextureLoader> std::fmt::Debug for SceneManager<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("config", &self.config)
            .field("resources", &self.resources.len())
            .field("pending_tasks", &self.tasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::loader::RecordingLoader;
    use crate::texture::TextureFormat;
    use std::cell::Cell;

    fn six_face_request(root: &str, files: Vec<String>) -> SixFaceRequest {
        SixFaceRequest {
            key: CacheKey::new(root, false),
            root: root.to_string(),
            files,
            no_mipmap: false,
            format: TextureFormat::Rgba,
            forced_extension: None,
            lod_generation_scale: 0.8,
            lod_generation_offset: 0.0,
        }
    }

    fn counter() -> (Rc<Cell<usize>>, Box<dyn FnOnce()>) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, Box::new(move || inner.set(inner.get() + 1)))
    }

    #[test]
    fn test_empty_file_list_loads_container() {
        let mut scene = SceneManager::new(RecordingLoader::new());
        scene.load_six_face_texture(six_face_request("sky.dds", Vec::new()), LoadCallbacks::none());
        scene.load_six_face_texture(
            six_face_request("box", vec!["box_px.jpg".to_string(); 6]),
            LoadCallbacks::none(),
        );

        let requests = scene.loader().requests();
        assert!(matches!(requests[0].1, LoadRequest::Container(_)));
        assert!(matches!(requests[1].1, LoadRequest::SixImage(_)));
    }

    #[test]
    fn test_single_flight_per_key() {
        let mut scene = SceneManager::new(RecordingLoader::new());
        let (loaded, first) = counter();
        let second_loaded = Rc::new(Cell::new(0));
        let inner = Rc::clone(&second_loaded);

        let a = scene.load_six_face_texture(six_face_request("sky.dds", Vec::new()), LoadCallbacks::on_load(first));
        let b = scene.load_six_face_texture(
            six_face_request("sky.dds", Vec::new()),
            LoadCallbacks::on_load(Box::new(move || inner.set(inner.get() + 1))),
        );

        assert_eq!(a, b);
        assert_eq!(scene.loader().request_count(), 1);
        assert_eq!(scene.resources().get(a).unwrap().ref_count(), 2);

        scene.complete_load(a, Ok(()));
        assert_eq!(loaded.get(), 0);
        scene.task_queue().run_pending();
        assert_eq!(loaded.get(), 1);
        assert_eq!(second_loaded.get(), 1);
    }

    #[test]
    fn test_ready_resource_schedules_callback() {
        let mut scene = SceneManager::new(RecordingLoader::new());
        let id = scene.load_six_face_texture(six_face_request("sky.dds", Vec::new()), LoadCallbacks::none());
        scene.complete_load(id, Ok(()));
        assert!(scene.is_resource_ready(id));

        let (loaded, on_load) = counter();
        scene.on_resource_ready(id, LoadCallbacks::on_load(on_load));
        assert_eq!(loaded.get(), 0);
        assert_eq!(scene.task_queue().run_pending(), 1);
        assert_eq!(loaded.get(), 1);
    }

    #[test]
    fn test_failure_reaches_error_callbacks() {
        let mut scene = SceneManager::new(RecordingLoader::new());
        let failures = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&failures);
        let callbacks = LoadCallbacks {
            on_load: None,
            on_error: Some(Box::new(move |error| sink.borrow_mut().push(error))),
        };

        let id = scene.load_six_face_texture(six_face_request("missing.dds", Vec::new()), callbacks);
        scene.complete_load(id, Err(LoadError::NotFound("missing.dds".to_string())));
        scene.task_queue().run_pending();

        assert_eq!(*failures.borrow(), vec![LoadError::NotFound("missing.dds".to_string())]);
        assert!(!scene.is_resource_ready(id));
        assert_eq!(scene.loader().request_count(), 1);
    }

    #[test]
    fn test_release_evicts_at_zero() {
        let mut scene = SceneManager::new(RecordingLoader::new());
        let id = scene.load_six_face_texture(six_face_request("sky.dds", Vec::new()), LoadCallbacks::none());
        scene.retain_resource(id);

        scene.release_resource(id);
        assert!(scene.resources().get(id).is_some());
        scene.release_resource(id);
        assert!(scene.resources().get(id).is_none());
        assert_eq!(scene.loader().released(), &[id]);

        // Completion of an evicted load is ignored
        scene.complete_load(id, Ok(()));
        assert!(scene.task_queue().is_empty());
    }

    #[test]
    fn test_release_keeps_resource_when_eviction_disabled() {
        let config = SceneConfig {
            evict_unreferenced: false,
            ..Default::default()
        };
        let mut scene = SceneManager::with_config(config, RecordingLoader::new());
        let key = CacheKey::new("sky.dds", false);
        let id = scene.load_six_face_texture(six_face_request("sky.dds", Vec::new()), LoadCallbacks::none());

        scene.release_resource(id);
        assert_eq!(scene.lookup_cached_resource(&key), Some(id));
        assert!(scene.loader().released().is_empty());
    }

    #[test]
    fn test_stale_signals_are_counted() {
        let mut scene = SceneManager::new(RecordingLoader::new());
        scene.mark_dependent_materials_stale(MaterialDirtyFlags::TEXTURE);
        scene.mark_dependent_materials_stale(MaterialDirtyFlags::TEXTURE);
        assert_eq!(scene.stale_signal_count(MaterialDirtyFlags::TEXTURE), 2);
        assert_eq!(scene.stale_signal_count(MaterialDirtyFlags::LIGHT), 0);
    }
}
