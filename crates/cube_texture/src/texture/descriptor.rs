//! Cube texture descriptor
//!
//! A [`CubeTexture`] describes a logical cube texture: where its faces come
//! from, how it is uploaded and how shading should orient and correct it.
//! The GPU resource itself belongs to the scene; the descriptor only keeps
//! its [`ResourceId`].
//!
//! # Example
//!
//! ```
//! use cube_texture::prelude::*;
//!
//! let scene = SceneManager::new(RecordingLoader::new()).into_shared();
//! let context: ContextRef = scene.clone();
//!
//! let sky = CubeTexture::new("textures/skybox", Some(&context), CubeTextureOptions::default());
//! assert_eq!(sky.face_identifiers().len(), 6);
//! assert_eq!(scene.borrow().loader().request_count(), 1);
//! ```

use std::rc::Rc;

use crate::animation::Animation;
use crate::foundation::collections::ResourceId;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::scene::context::{
    ContextRef, LoadCallbacks, MaterialDirtyFlags, OnError, OnLoad, WeakContextRef,
};
use crate::scene::loader::LoadError;
use crate::texture::format::{resolve, ResolvedSource, SourceKind, SourceRequest};
use crate::texture::identity::CacheKey;
use crate::texture::lifecycle::LoadState;
use crate::texture::pixel_format::TextureFormat;

/// Default LOD scale of container mip chains
pub const DEFAULT_LOD_GENERATION_SCALE: f32 = 0.8;

/// Default LOD offset of container mip chains
pub const DEFAULT_LOD_GENERATION_OFFSET: f32 = 0.0;

/// Construction parameters of a [`CubeTexture`] besides its root identifier
#[derive(Default)]
pub struct CubeTextureOptions {
    /// Face suffixes appended to the root for six-image sources
    pub extensions: Option<Vec<String>>,
    /// Skip mip generation
    pub no_mipmap: bool,
    /// Explicit face list, used verbatim
    pub files: Option<Vec<String>>,
    /// Called once the backing resource is ready
    pub on_load: Option<OnLoad>,
    /// Called if the backing resource fails to load
    pub on_error: Option<OnError>,
    /// Pixel format of the upload
    pub format: TextureFormat,
    /// Ask for prefiltered treatment (honoured for `.dds` only)
    pub prefiltered: bool,
    /// Extension override used for classification and decoding
    pub forced_extension: Option<String>,
    /// Derive spherical polynomial harmonics from prefiltered data
    pub generate_harmonics: bool,
}

impl CubeTextureOptions {
    /// Set face suffixes
    pub fn with_extensions<S: Into<String>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Set an explicit face list
    pub fn with_files<S: Into<String>>(mut self, files: impl IntoIterator<Item = S>) -> Self {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Set the mip policy
    pub fn with_no_mipmap(mut self, no_mipmap: bool) -> Self {
        self.no_mipmap = no_mipmap;
        self
    }

    /// Set the pixel format
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Request prefiltered treatment
    pub fn with_prefiltered(mut self, prefiltered: bool) -> Self {
        self.prefiltered = prefiltered;
        self
    }

    /// Override the extension
    pub fn with_forced_extension(mut self, extension: impl Into<String>) -> Self {
        self.forced_extension = Some(extension.into());
        self
    }

    /// Request harmonics generation
    pub fn with_generate_harmonics(mut self, generate: bool) -> Self {
        self.generate_harmonics = generate;
        self
    }

    /// Set the success callback
    pub fn with_on_load(mut self, on_load: impl FnOnce() + 'static) -> Self {
        self.on_load = Some(Box::new(on_load));
        self
    }

    /// Set the failure callback
    pub fn with_on_error(mut self, on_error: impl FnOnce(LoadError) + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

/// Logical cube texture
pub struct CubeTexture {
    pub(super) name: String,
    pub(super) root: String,
    pub(super) files: Option<Vec<String>>,
    pub(super) extensions: Option<Vec<String>>,
    pub(super) source: ResolvedSource,
    pub(super) no_mipmap: bool,
    pub(super) format: TextureFormat,
    pub(super) forced_extension: Option<String>,
    pub(super) generate_harmonics: bool,
    pub(super) gamma_space: bool,
    pub(super) level: f32,
    pub(super) lod_generation_scale: f32,
    pub(super) lod_generation_offset: f32,
    pub(super) texture_matrix: Mat4,
    pub(super) rotation_y: f32,
    pub(super) bounding_box_position: Vec3,
    pub(super) bounding_box_size: Option<Vec3>,
    pub(super) animations: Vec<Animation>,
    pub(super) load_state: LoadState,
    pub(super) backing: Option<ResourceId>,
    pub(super) delayed_on_load: Option<OnLoad>,
    pub(super) context: Option<WeakContextRef>,
}

impl CubeTexture {
    /// Create a cube texture and acquire its backing resource
    ///
    /// Without a root identifier or face list the texture stays inert.
    /// Without a context it is resolved but detached: nothing is loaded.
    pub fn new(root_url: impl Into<String>, context: Option<&ContextRef>, options: CubeTextureOptions) -> Self {
        let CubeTextureOptions {
            extensions,
            no_mipmap,
            files,
            on_load,
            on_error,
            format,
            prefiltered,
            forced_extension,
            generate_harmonics,
        } = options;

        let root = root_url.into();
        let source = resolve(SourceRequest {
            root: &root,
            forced_extension: forced_extension.as_deref(),
            files: files.as_deref(),
            suffixes: extensions.as_deref(),
            prefiltered,
        });

        let mut texture = Self {
            name: root.clone(),
            root,
            files,
            extensions,
            gamma_space: Self::default_gamma_space(source.kind, format),
            source,
            no_mipmap,
            format,
            forced_extension,
            generate_harmonics,
            level: 1.0,
            lod_generation_scale: DEFAULT_LOD_GENERATION_SCALE,
            lod_generation_offset: DEFAULT_LOD_GENERATION_OFFSET,
            texture_matrix: Mat4::identity(),
            rotation_y: 0.0,
            bounding_box_position: Vec3::zeros(),
            bounding_box_size: None,
            animations: Vec::new(),
            load_state: LoadState::NotDelayed,
            backing: None,
            delayed_on_load: None,
            context: context.map(Rc::downgrade),
        };

        if !texture.has_source() {
            log::debug!("Cube texture created without root or faces, nothing to load");
            return texture;
        }

        if let Some(context) = context {
            texture.acquire(context, LoadCallbacks { on_load, on_error });
        }
        texture
    }

    /// Create a six-image texture from an explicit face list
    pub fn create_from_images<S: Into<String>>(
        files: impl IntoIterator<Item = S>,
        context: Option<&ContextRef>,
    ) -> Self {
        Self::new("", context, CubeTextureOptions::default().with_files(files))
    }

    /// Create a texture from a prefiltered `.dds` container
    pub fn create_from_prefiltered_data(
        url: impl Into<String>,
        context: Option<&ContextRef>,
        forced_extension: Option<String>,
        generate_harmonics: bool,
    ) -> Self {
        let options = CubeTextureOptions {
            prefiltered: true,
            forced_extension,
            generate_harmonics,
            ..Default::default()
        };
        Self::new(url, context, options)
    }

    fn default_gamma_space(kind: SourceKind, format: TextureFormat) -> bool {
        !(kind == SourceKind::EnvironmentHarmonics || kind.is_prefiltered() || format.is_hdr())
    }

    pub(super) fn has_source(&self) -> bool {
        !self.root.is_empty() || self.files.as_ref().is_some_and(|files| !files.is_empty())
    }

    /// Live context, if the texture is attached to one
    pub(super) fn context(&self) -> Option<ContextRef> {
        self.context.as_ref().and_then(|weak| weak.upgrade())
    }

    /// Key the backing resource is cached under
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_source(&self.root, &self.source.faces, self.no_mipmap)
    }

    /// Display name, the root identifier unless renamed
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the texture
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Root identifier
    pub fn url(&self) -> &str {
        &self.root
    }

    /// Source classification
    pub fn source_kind(&self) -> SourceKind {
        self.source.kind
    }

    /// Resolved per-face identifiers; empty for single-file sources
    pub fn face_identifiers(&self) -> &[String] {
        &self.source.faces
    }

    /// Face suffixes supplied at construction
    pub fn extensions(&self) -> Option<&[String]> {
        self.extensions.as_deref()
    }

    /// Explicit face list supplied at construction
    pub fn files(&self) -> Option<&[String]> {
        self.files.as_deref()
    }

    /// Whether the source is a prefiltered container
    pub fn is_prefiltered(&self) -> bool {
        self.source.kind.is_prefiltered()
    }

    /// Mip policy
    pub fn no_mipmap(&self) -> bool {
        self.no_mipmap
    }

    /// Pixel format
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Extension override
    pub fn forced_extension(&self) -> Option<&str> {
        self.forced_extension.as_deref()
    }

    /// Whether harmonics are derived from prefiltered data
    pub fn generate_harmonics(&self) -> bool {
        self.generate_harmonics
    }

    /// Whether texel values are gamma encoded
    pub fn gamma_space(&self) -> bool {
        self.gamma_space
    }

    /// Override the colour-space flag
    pub fn set_gamma_space(&mut self, gamma_space: bool) {
        self.gamma_space = gamma_space;
    }

    /// Intensity multiplier applied by shading
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Set the intensity multiplier
    pub fn set_level(&mut self, level: f32) {
        self.level = level;
    }

    /// LOD scale forwarded to container loads
    pub fn lod_generation_scale(&self) -> f32 {
        self.lod_generation_scale
    }

    /// Set the LOD scale used by subsequent loads
    pub fn set_lod_generation_scale(&mut self, scale: f32) {
        self.lod_generation_scale = scale;
    }

    /// LOD offset forwarded to container loads
    pub fn lod_generation_offset(&self) -> f32 {
        self.lod_generation_offset
    }

    /// Set the LOD offset used by subsequent loads
    pub fn set_lod_generation_offset(&mut self, offset: f32) {
        self.lod_generation_offset = offset;
    }

    /// Backing resource id
    pub fn backing_resource(&self) -> Option<ResourceId> {
        self.backing
    }

    /// Whether the backing resource exists and finished uploading
    pub fn is_ready(&self) -> bool {
        match (self.backing, self.context()) {
            (Some(id), Some(context)) => context.borrow().is_resource_ready(id),
            _ => false,
        }
    }

    /// Animation tracks attached to the texture
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Attach an animation track
    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    /// Reflection transform used when sampling
    pub fn reflection_transform(&self) -> &Mat4 {
        &self.texture_matrix
    }

    /// Replace the reflection transform
    pub fn set_reflection_transform(&mut self, matrix: Mat4) {
        self.texture_matrix = matrix;
    }

    /// Rotation around Y in radians
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Set the rotation around Y, replacing the reflection transform
    pub fn set_rotation_y(&mut self, radians: f32) {
        self.rotation_y = radians;
        self.set_reflection_transform(Mat4::rotation_y(radians));
    }

    /// Centre of the local-cubemap bounding box
    pub fn bounding_box_position(&self) -> &Vec3 {
        &self.bounding_box_position
    }

    /// Move the local-cubemap bounding box
    pub fn set_bounding_box_position(&mut self, position: Vec3) {
        self.bounding_box_position = position;
    }

    /// Extent of the local-cubemap bounding box; set means the texture
    /// needs parallax-corrected shading
    pub fn bounding_box_size(&self) -> Option<&Vec3> {
        self.bounding_box_size.as_ref()
    }

    /// Set the local-cubemap extent
    ///
    /// An equal value is ignored. A change marks dependent materials stale.
    pub fn set_bounding_box_size(&mut self, size: Option<Vec3>) {
        if self.bounding_box_size == size {
            return;
        }
        self.bounding_box_size = size;
        if let Some(context) = self.context() {
            context
                .borrow_mut()
                .mark_dependent_materials_stale(MaterialDirtyFlags::TEXTURE);
        }
    }

    /// Point the texture at a new source and load it
    ///
    /// The current resource is released and dependent materials are marked
    /// stale. An explicit face list is dropped, so faces derive from the new
    /// url. The new source loads right away, regardless of the deferred
    /// loading policy; `on_load` fires once it is ready. An empty url leaves
    /// the texture untouched.
    pub fn update_url(
        &mut self,
        url: impl Into<String>,
        forced_extension: Option<String>,
        on_load: Option<OnLoad>,
        prefiltered: bool,
    ) {
        let url = url.into();
        if url.is_empty() {
            log::debug!("Ignoring empty url for cube texture '{}'", self.name);
            return;
        }

        let had_source = self.has_source();
        self.release_backing();
        if had_source {
            if let Some(context) = self.context() {
                context
                    .borrow_mut()
                    .mark_dependent_materials_stale(MaterialDirtyFlags::TEXTURE);
            }
        }

        if self.name == self.root {
            self.name = url.clone();
        }
        self.root = url;
        self.files = None;
        self.forced_extension = forced_extension;
        self.source = resolve(SourceRequest {
            root: &self.root,
            forced_extension: self.forced_extension.as_deref(),
            files: self.files.as_deref(),
            suffixes: self.extensions.as_deref(),
            prefiltered,
        });
        self.gamma_space = Self::default_gamma_space(self.source.kind, self.format);

        self.delayed_on_load = on_load;
        self.load_state = LoadState::PendingDelayedLoad;
        self.materialize_if_pending();
    }

    /// Give the backing resource back to the scene
    ///
    /// The scene decides when the GPU data is freed; other textures sharing
    /// the resource keep it alive. A disposed texture is detached from its
    /// resource and never materializes again.
    pub fn dispose(&mut self) {
        self.release_backing();
        self.delayed_on_load = None;
        self.load_state = LoadState::NotDelayed;
    }

    fn release_backing(&mut self) {
        if let Some(id) = self.backing.take() {
            if let Some(context) = self.context() {
                context.borrow_mut().release_resource(id);
            }
        }
    }
}

impl std::fmt::Debug for CubeTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CubeTexture")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("source", &self.source)
            .field("no_mipmap", &self.no_mipmap)
            .field("format", &self.format)
            .field("load_state", &self.load_state)
            .field("backing", &self.backing)
            .field("attached", &self.context().is_some())
            .finish_non_exhaustive()
    }
}
