//! Load strategy
//!
//! Decides at acquisition time whether a texture reuses a cached resource,
//! loads now or waits, and which loader entry point a load goes through.

use crate::foundation::collections::ResourceId;
use crate::scene::context::{
    ContextRef, LoadCallbacks, PrefilteredRequest, SixFaceRequest, TextureContext,
};
use crate::texture::descriptor::CubeTexture;
use crate::texture::format::ResolvedSource;

/// Loader entry point used for a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPath {
    /// Six-face entry point with a face list
    SixImage,
    /// Six-face entry point with an empty face list
    Container,
    /// Prefiltered container entry point
    Prefiltered,
}

impl LoadPath {
    /// Entry point for a resolved source
    pub fn for_source(source: &ResolvedSource) -> Self {
        if source.kind.is_prefiltered() {
            Self::Prefiltered
        } else if source.faces.is_empty() {
            Self::Container
        } else {
            Self::SixImage
        }
    }
}

/// What acquisition does for a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    /// Share the cached resource
    Reuse(ResourceId),
    /// Issue one load now
    LoadNow,
    /// Wait for [`CubeTexture::materialize_if_pending`]
    Defer,
}

impl LoadAction {
    /// Decide from the cache lookup and the deferred-loading policy
    pub fn decide(cached: Option<ResourceId>, delayed_loading: bool) -> Self {
        match cached {
            Some(id) => Self::Reuse(id),
            None if delayed_loading => Self::Defer,
            None => Self::LoadNow,
        }
    }
}

impl CubeTexture {
    /// Resolve the backing resource at construction time
    pub(super) fn acquire(&mut self, context: &ContextRef, callbacks: LoadCallbacks) {
        let key = self.cache_key();
        let mut context = context.borrow_mut();
        let cached = context.lookup_cached_resource(&key);

        match LoadAction::decide(cached, context.use_delayed_texture_loading()) {
            LoadAction::Reuse(id) => {
                log::debug!("Cube texture '{}' reuses cached resource {:?}", self.root, id);
                self.backing = Some(Self::share_cached(&mut *context, id, callbacks));
            }
            LoadAction::LoadNow => {
                self.backing = Some(self.issue_load(&mut *context, callbacks));
            }
            LoadAction::Defer => {
                log::debug!("Deferring load of cube texture '{}'", self.root);
                self.load_state = super::LoadState::PendingDelayedLoad;
            }
        }
    }

    /// Take a reference on a cached resource and attach callbacks to it
    ///
    /// A ready resource gets `on_load` scheduled right away; otherwise the
    /// callbacks wait for the load in flight.
    pub(super) fn share_cached(
        context: &mut dyn TextureContext,
        id: ResourceId,
        callbacks: LoadCallbacks,
    ) -> ResourceId {
        context.retain_resource(id);
        if context.is_resource_ready(id) {
            if let Some(on_load) = callbacks.on_load {
                context.schedule_async(on_load);
            }
        } else {
            context.on_resource_ready(id, callbacks);
        }
        id
    }

    /// Issue exactly one load through the entry point matching the source
    pub(super) fn issue_load(&self, context: &mut dyn TextureContext, callbacks: LoadCallbacks) -> ResourceId {
        let key = self.cache_key();
        match LoadPath::for_source(&self.source) {
            LoadPath::Prefiltered => context.load_container_as_prefiltered(
                PrefilteredRequest {
                    key,
                    root: self.root.clone(),
                    lod_generation_scale: self.lod_generation_scale,
                    lod_generation_offset: self.lod_generation_offset,
                    format: self.format,
                    forced_extension: self.forced_extension.clone(),
                    generate_harmonics: self.generate_harmonics,
                },
                callbacks,
            ),
            LoadPath::SixImage | LoadPath::Container => context.load_six_face_texture(
                SixFaceRequest {
                    key,
                    root: self.root.clone(),
                    files: self.source.faces.clone(),
                    no_mipmap: self.no_mipmap,
                    format: self.format,
                    forced_extension: self.forced_extension.clone(),
                    lod_generation_scale: self.lod_generation_scale,
                    lod_generation_offset: self.lod_generation_offset,
                },
                callbacks,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::format::{resolve, SourceRequest};

    fn path_of(root: &str, prefiltered: bool) -> LoadPath {
        LoadPath::for_source(&resolve(SourceRequest {
            root,
            prefiltered,
            ..Default::default()
        }))
    }

    #[test]
    fn test_paths_per_source() {
        assert_eq!(path_of("sky.dds", true), LoadPath::Prefiltered);
        assert_eq!(path_of("sky.dds", false), LoadPath::Container);
        assert_eq!(path_of("sky.env", true), LoadPath::Container);
        assert_eq!(path_of("sky", true), LoadPath::SixImage);
    }

    #[test]
    fn test_decide() {
        let mut table = slotmap::SlotMap::<ResourceId, ()>::with_key();
        let id = table.insert(());

        assert_eq!(LoadAction::decide(Some(id), true), LoadAction::Reuse(id));
        assert_eq!(LoadAction::decide(None, true), LoadAction::Defer);
        assert_eq!(LoadAction::decide(None, false), LoadAction::LoadNow);
    }
}
