//! Resource identity used to deduplicate cube texture loads

use std::fmt;

/// Cache key of a GPU cube resource
///
/// Two textures with the same identifier and mip policy share one resource
/// even when their suffixes or formats differ; callers that need distinct
/// resources must use distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    identifier: String,
    no_mipmap: bool,
}

impl CacheKey {
    /// Create a key from an identifier and mip policy
    pub fn new(identifier: impl Into<String>, no_mipmap: bool) -> Self {
        Self {
            identifier: identifier.into(),
            no_mipmap,
        }
    }

    /// Key of a texture source
    ///
    /// Textures built from an explicit face list and no root are keyed by
    /// their joined face identifiers.
    pub fn for_source(root: &str, faces: &[String], no_mipmap: bool) -> Self {
        if root.is_empty() {
            Self::new(faces.join("|"), no_mipmap)
        } else {
            Self::new(root, no_mipmap)
        }
    }

    /// Identifier part of the key
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Mip policy part of the key
    pub fn no_mipmap(&self) -> bool {
        self.no_mipmap
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.identifier, if self.no_mipmap { "nomip" } else { "mip" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mip_policy_is_part_of_identity() {
        let mut keys = HashSet::new();
        keys.insert(CacheKey::new("sky.dds", false));
        keys.insert(CacheKey::new("sky.dds", true));
        keys.insert(CacheKey::new("sky.dds", false));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_face_list_key_when_root_empty() {
        let faces = vec!["a.png".to_string(), "b.png".to_string()];
        let key = CacheKey::for_source("", &faces, false);
        assert_eq!(key.identifier(), "a.png|b.png");
        assert_eq!(CacheKey::for_source("root", &faces, false).identifier(), "root");
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheKey::new("sky", true).to_string(), "sky#nomip");
    }
}
