//! Animation tracks attached to a texture
//!
//! Tracks are evaluated elsewhere; a texture only keeps them so they survive
//! serialization and cloning. The serialized record is kept as-is.

use serde_json::Value;

/// Animation track targeting a texture property
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    target_property: String,
    record: Value,
}

impl Animation {
    /// Build a track from its serialized record
    ///
    /// Returns `None` when the record has no `name`.
    pub fn from_record(record: &Value) -> Option<Self> {
        let name = record.get("name")?.as_str()?.to_string();
        let target_property = record
            .get("property")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self {
            name,
            target_property,
            record: record.clone(),
        })
    }

    /// Track name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Animated property path, e.g. `rotationY`
    pub fn target_property(&self) -> &str {
        &self.target_property
    }

    /// Serialized form of the track
    pub fn to_record(&self) -> Value {
        self.record.clone()
    }
}
