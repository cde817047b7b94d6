//! Plain-record serialization and cloning of cube textures
//!
//! The record is a flat JSON object:
//!
//! ```json
//! {
//!   "name": "textures/skybox",
//!   "extensions": ["_px.png", "_py.png", "_pz.png", "_nx.png", "_ny.png", "_nz.png"],
//!   "boundingBoxPosition": [0.0, 0.0, 0.0],
//!   "boundingBoxSize": [50.0, 20.0, 50.0],
//!   "prefiltered": false,
//!   "rotationY": 1.57,
//!   "animations": []
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::Animation;
use crate::foundation::math::{vec3_from_array, vec3_to_array};
use crate::scene::context::ContextRef;
use crate::texture::descriptor::{CubeTexture, CubeTextureOptions};

/// Record (de)serialization errors
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Malformed or mistyped JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a [`CubeTexture`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeTextureRecord {
    /// Texture name, joined to the root prefix when parsing
    pub name: String,
    /// Face suffixes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    /// Explicit face list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Mip policy
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_mipmap: bool,
    /// Local-cubemap centre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box_position: Option<[f32; 3]>,
    /// Local-cubemap extent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box_size: Option<[f32; 3]>,
    /// Prefiltered container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefiltered: Option<bool>,
    /// Rotation around Y in radians
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_y: Option<f32>,
    /// Intensity multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f32>,
    /// Colour-space flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma_space: Option<bool>,
    /// Animation track records
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<serde_json::Value>,
}

impl CubeTextureRecord {
    /// Parse a record from JSON text
    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Print the record as JSON text
    pub fn to_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl CubeTexture {
    /// Serialize into a plain record
    pub fn serialize(&self) -> CubeTextureRecord {
        CubeTextureRecord {
            name: self.name.clone(),
            extensions: self.extensions.clone(),
            files: self.files.clone(),
            no_mipmap: self.no_mipmap,
            bounding_box_position: Some(vec3_to_array(&self.bounding_box_position)),
            bounding_box_size: self.bounding_box_size.as_ref().map(vec3_to_array),
            prefiltered: Some(self.is_prefiltered()),
            rotation_y: Some(self.rotation_y),
            level: Some(self.level),
            gamma_space: Some(self.gamma_space),
            animations: self.animations.iter().map(Animation::to_record).collect(),
        }
    }

    /// Rebuild a texture from a record
    ///
    /// The source is `root_prefix` joined with the record name. Animation
    /// records are replayed through the context and dropped when detached.
    pub fn parse(record: &CubeTextureRecord, context: Option<&ContextRef>, root_prefix: &str) -> Self {
        let options = CubeTextureOptions {
            extensions: record.extensions.clone(),
            files: record.files.clone(),
            no_mipmap: record.no_mipmap,
            prefiltered: record.prefiltered.unwrap_or(false),
            ..Default::default()
        };
        let mut texture = Self::new(format!("{}{}", root_prefix, record.name), context, options);

        texture.name = record.name.clone();
        if let Some(level) = record.level {
            texture.level = level;
        }
        if let Some(gamma_space) = record.gamma_space {
            texture.gamma_space = gamma_space;
        }
        if let Some(rotation_y) = record.rotation_y {
            texture.set_rotation_y(rotation_y);
        }
        if let Some(position) = record.bounding_box_position {
            texture.set_bounding_box_position(vec3_from_array(position));
        }
        if let Some(size) = record.bounding_box_size {
            texture.set_bounding_box_size(Some(vec3_from_array(size)));
        }

        if !record.animations.is_empty() {
            match texture.context() {
                Some(context) => {
                    let context = context.borrow();
                    texture
                        .animations
                        .extend(record.animations.iter().filter_map(|raw| context.parse_animation(raw)));
                }
                None => log::debug!(
                    "Dropping {} animation records of detached texture '{}'",
                    record.animations.len(),
                    texture.name
                ),
            }
        }
        texture
    }

    /// Clone into a new texture of the same scene
    ///
    /// Returns `None` when the scene is gone; callers then keep using this
    /// texture as its own clone.
    pub fn clone_in_context(&self) -> Option<Self> {
        let context = self.context()?;
        let options = CubeTextureOptions {
            extensions: self.extensions.clone(),
            no_mipmap: self.no_mipmap,
            files: self.files.clone(),
            format: self.format,
            prefiltered: self.is_prefiltered(),
            forced_extension: self.forced_extension.clone(),
            generate_harmonics: self.generate_harmonics,
            ..Default::default()
        };
        let mut clone = Self::new(self.root.clone(), Some(&context), options);
        clone.copy_annotated_from(self);
        Some(clone)
    }

    fn copy_annotated_from(&mut self, other: &Self) {
        self.name = other.name.clone();
        self.level = other.level;
        self.gamma_space = other.gamma_space;
        self.lod_generation_scale = other.lod_generation_scale;
        self.lod_generation_offset = other.lod_generation_offset;
        self.set_rotation_y(other.rotation_y);
        self.bounding_box_position = other.bounding_box_position;
        self.set_bounding_box_size(other.bounding_box_size);
        self.animations = other.animations.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::{MaterialDirtyFlags, RecordingLoader, SceneManager};
    use crate::texture::{LoadState, SourceKind};
    use approx::assert_relative_eq;
    use serde_json::json;

    fn context() -> (std::rc::Rc<std::cell::RefCell<SceneManager<RecordingLoader>>>, ContextRef) {
        let scene = SceneManager::new(RecordingLoader::new()).into_shared();
        let context: ContextRef = scene.clone();
        (scene, context)
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let (_scene, context) = context();
        let mut texture = CubeTexture::new(
            "textures/skybox",
            Some(&context),
            CubeTextureOptions::default().with_extensions(["_r.png", "_u.png", "_f.png", "_l.png", "_d.png", "_b.png"]),
        );
        texture.set_rotation_y(1.25);
        texture.set_bounding_box_position(Vec3::new(1.0, 2.0, 3.0));
        texture.set_bounding_box_size(Some(Vec3::new(40.0, 10.0, 40.0)));

        let json = texture.serialize().to_json().unwrap();
        let record = CubeTextureRecord::from_json(&json).unwrap();
        let parsed = CubeTexture::parse(&record, Some(&context), "");

        assert_eq!(parsed.url(), "textures/skybox");
        assert_eq!(parsed.extensions(), texture.extensions());
        assert_eq!(parsed.face_identifiers(), texture.face_identifiers());
        assert_eq!(parsed.bounding_box_position(), &Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(parsed.bounding_box_size(), Some(&Vec3::new(40.0, 10.0, 40.0)));
        assert_relative_eq!(parsed.rotation_y(), 1.25);
        assert_relative_eq!(*parsed.reflection_transform(), *texture.reflection_transform());
    }

    #[test]
    fn test_record_field_names() {
        let mut texture = CubeTexture::new("sky.dds", None, CubeTextureOptions::default().with_prefiltered(true));
        texture.set_bounding_box_size(Some(Vec3::new(1.0, 1.0, 1.0)));
        let value = serde_json::to_value(texture.serialize()).unwrap();

        assert_eq!(value["name"], json!("sky.dds"));
        assert_eq!(value["prefiltered"], json!(true));
        assert_eq!(value["boundingBoxSize"], json!([1.0, 1.0, 1.0]));
        assert!(value.get("rotationY").is_some());
        assert!(value.get("extensions").is_none());
        assert!(value.get("noMipmap").is_none());
    }

    #[test]
    fn test_parse_minimal_record_with_prefix() {
        let (scene, context) = context();
        let record = CubeTextureRecord::from_json(r#"{"name": "studio.env"}"#).unwrap();
        let texture = CubeTexture::parse(&record, Some(&context), "assets/env/");

        assert_eq!(texture.url(), "assets/env/studio.env");
        assert_eq!(texture.name(), "studio.env");
        assert_eq!(texture.source_kind(), SourceKind::EnvironmentHarmonics);
        assert!(texture.bounding_box_size().is_none());
        assert_eq!(scene.borrow().stale_signal_count(MaterialDirtyFlags::TEXTURE), 0);
    }

    #[test]
    fn test_parse_rejects_mistyped_record() {
        let result = CubeTextureRecord::from_json(r#"{"name": "sky", "rotationY": "fast"}"#);
        assert!(matches!(result, Err(SerializationError::Json(_))));
    }

    #[test]
    fn test_parse_replays_animations() {
        let (_scene, context) = context();
        let record = CubeTextureRecord {
            name: "sky".to_string(),
            animations: vec![
                json!({ "name": "spin", "property": "rotationY" }),
                json!({ "property": "level" }),
            ],
            ..Default::default()
        };

        let texture = CubeTexture::parse(&record, Some(&context), "");
        assert_eq!(texture.animations().len(), 1);
        assert_eq!(texture.animations()[0].name(), "spin");
        assert_eq!(texture.serialize().animations, vec![json!({ "name": "spin", "property": "rotationY" })]);

        let detached = CubeTexture::parse(&record, None, "");
        assert!(detached.animations().is_empty());
    }

    #[test]
    fn test_clone_env_texture() {
        let (scene, context) = context();
        let original = CubeTexture::new("env.env", Some(&context), CubeTextureOptions::default().with_prefiltered(true));
        let clone = original.clone_in_context().unwrap();

        assert_eq!(clone.url(), "env.env");
        assert_eq!(clone.is_prefiltered(), original.is_prefiltered());
        assert!(clone.face_identifiers().is_empty());
        assert_eq!(clone.backing_resource(), original.backing_resource());
        assert_eq!(scene.borrow().loader().request_count(), 1);
    }

    #[test]
    fn test_clone_copies_annotated_fields() {
        let (_scene, context) = context();
        let mut original = CubeTexture::new("sky.dds", Some(&context), CubeTextureOptions::default().with_no_mipmap(true));
        original.set_name("Sky");
        original.set_level(0.5);
        original.set_rotation_y(0.3);
        original.set_bounding_box_size(Some(Vec3::new(2.0, 2.0, 2.0)));

        let clone = original.clone_in_context().unwrap();
        assert_eq!(clone.name(), "Sky");
        assert!(clone.no_mipmap());
        assert_relative_eq!(clone.level(), 0.5);
        assert_relative_eq!(clone.rotation_y(), 0.3);
        assert_eq!(clone.bounding_box_size(), original.bounding_box_size());
        assert_eq!(clone.load_state(), LoadState::NotDelayed);
    }

    #[test]
    fn test_clone_without_context() {
        let texture = CubeTexture::new("sky", None, CubeTextureOptions::default());
        assert!(texture.clone_in_context().is_none());
    }
}
