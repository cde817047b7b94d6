//! Deferred-load lifecycle of a cube texture

use crate::scene::context::LoadCallbacks;
use crate::texture::descriptor::CubeTexture;

/// Whether the backing resource of a texture exists yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Loaded (or reused) at construction
    #[default]
    NotDelayed,
    /// Waiting for [`CubeTexture::materialize_if_pending`]
    PendingDelayedLoad,
    /// Materialized after a deferral
    Loaded,
}

impl CubeTexture {
    /// Current lifecycle state
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Materialize a deferred texture
    ///
    /// Does nothing unless the texture is pending and its scene is alive.
    /// Reuses a resource another texture loaded in the meantime, otherwise
    /// issues one load. Constructor callbacks are not replayed here.
    pub fn materialize_if_pending(&mut self) {
        if self.load_state != LoadState::PendingDelayedLoad {
            return;
        }
        let Some(context) = self.context() else {
            return;
        };

        self.load_state = LoadState::Loaded;
        let key = self.cache_key();
        let mut context = context.borrow_mut();
        let callbacks = LoadCallbacks {
            on_load: self.delayed_on_load.take(),
            on_error: None,
        };

        if let Some(id) = context.lookup_cached_resource(&key) {
            log::debug!("Deferred cube texture '{}' found {:?} in cache", self.root, id);
            self.backing = Some(Self::share_cached(&mut *context, id, callbacks));
            return;
        }

        self.backing = Some(self.issue_load(&mut *context, callbacks));
    }
}
