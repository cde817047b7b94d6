//! Source format resolution
//!
//! Classifies a cube texture source from its root identifier and derives the
//! per-face identifiers the six-image loader needs.

use serde::{Deserialize, Serialize};

/// Extension of the single-file container carrying all faces and mips
pub const CONTAINER_EXTENSION: &str = ".dds";

/// Extension of the prefiltered environment-harmonics container
pub const ENVIRONMENT_EXTENSION: &str = ".env";

/// Face suffixes used when a six-image source names none
///
/// The order is the face assignment the upload routine expects:
/// +X, +Y, +Z, -X, -Y, -Z.
pub const DEFAULT_FACE_SUFFIXES: [&str; 6] = [
    "_px.jpg", "_py.jpg", "_pz.jpg", "_nx.jpg", "_ny.jpg", "_nz.jpg",
];

/// Number of faces in a cube texture
pub const CUBE_FACE_COUNT: usize = 6;

/// Encoding of a cube texture source
///
/// Only the container variant can carry prefiltered data, so a prefiltered
/// six-image or harmonics source cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Single multi-face container (`.dds`), optionally prefiltered
    MultiFaceContainer {
        /// Mip chain holds prefiltered radiance levels
        prefiltered: bool,
    },
    /// Environment-harmonics container (`.env`)
    EnvironmentHarmonics,
    /// Six discrete face images
    LegacySixImage,
}

impl SourceKind {
    /// Classify a lower-cased extension, downgrading a prefiltered request
    /// the format cannot honour
    pub fn classify(extension: &str, prefiltered: bool) -> Self {
        match extension {
            CONTAINER_EXTENSION => Self::MultiFaceContainer { prefiltered },
            ENVIRONMENT_EXTENSION => Self::EnvironmentHarmonics,
            _ => Self::LegacySixImage,
        }
    }

    /// Whether the source holds prefiltered mip levels
    pub fn is_prefiltered(self) -> bool {
        matches!(self, Self::MultiFaceContainer { prefiltered: true })
    }

    /// Whether all faces come from a single file
    pub fn is_single_file(self) -> bool {
        !matches!(self, Self::LegacySixImage)
    }
}

/// Inputs of a resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceRequest<'a> {
    /// Root identifier (URL or path, possibly empty)
    pub root: &'a str,
    /// Extension override, e.g. for URLs without a file extension
    pub forced_extension: Option<&'a str>,
    /// Explicit face list, used verbatim
    pub files: Option<&'a [String]>,
    /// Face suffixes appended to the root for six-image sources
    pub suffixes: Option<&'a [String]>,
    /// Caller asked for prefiltered treatment
    pub prefiltered: bool,
}

/// Result of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Source classification
    pub kind: SourceKind,
    /// Lower-cased extension used for the classification
    pub extension: String,
    /// Per-face identifiers; empty for single-file sources
    pub faces: Vec<String>,
}

/// Determine the extension of a root identifier
///
/// The override wins; otherwise everything from the last `.` of the root,
/// lower-cased, or an empty string when the root has no `.`.
pub fn extension_of(root: &str, forced_extension: Option<&str>) -> String {
    match forced_extension {
        Some(forced) => forced.to_lowercase(),
        None => root
            .rfind('.')
            .map(|dot| root[dot..].to_lowercase())
            .unwrap_or_default(),
    }
}

/// Resolve a source into its classification and face list
pub fn resolve(request: SourceRequest<'_>) -> ResolvedSource {
    let extension = extension_of(request.root, request.forced_extension);
    let kind = SourceKind::classify(&extension, request.prefiltered);

    if request.prefiltered && !kind.is_prefiltered() {
        log::debug!(
            "Prefiltered data needs a {} container, loading '{}' as {:?}",
            CONTAINER_EXTENSION,
            request.root,
            kind
        );
    }

    let faces = match request.files {
        Some(files) if !files.is_empty() => files.to_vec(),
        _ if kind.is_single_file() || request.root.is_empty() => Vec::new(),
        _ => face_identifiers(request.root, request.suffixes),
    };

    ResolvedSource { kind, extension, faces }
}

/// Build the six face identifiers of a six-image source
fn face_identifiers(root: &str, suffixes: Option<&[String]>) -> Vec<String> {
    match suffixes {
        Some(suffixes) => {
            if suffixes.len() != CUBE_FACE_COUNT {
                log::warn!(
                    "Cube texture '{}' has {} face suffixes, expected {}",
                    root,
                    suffixes.len(),
                    CUBE_FACE_COUNT
                );
            }
            suffixes
                .iter()
                .map(|suffix| format!("{}{}", root, suffix))
                .collect()
        }
        None => DEFAULT_FACE_SUFFIXES
            .iter()
            .map(|suffix| format!("{}{}", root, suffix))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_root(root: &str, prefiltered: bool) -> ResolvedSource {
        resolve(SourceRequest {
            root,
            prefiltered,
            ..Default::default()
        })
    }

    #[test]
    fn test_extension_from_root() {
        assert_eq!(extension_of("textures/sky.DDS", None), ".dds");
        assert_eq!(extension_of("textures/skybox", None), "");
        assert_eq!(extension_of("a.b/c.env", None), ".env");
    }

    #[test]
    fn test_forced_extension_wins() {
        assert_eq!(extension_of("https://cdn/sky?id=4", Some(".DDS")), ".dds");
    }

    #[test]
    fn test_dds_keeps_prefiltered_request() {
        for prefiltered in [true, false] {
            let resolved = resolve_root("sky.dds", prefiltered);
            assert_eq!(resolved.kind.is_prefiltered(), prefiltered);
            assert!(resolved.faces.is_empty());
        }
    }

    #[test]
    fn test_other_extensions_force_prefiltered_off() {
        for root in ["sky.env", "sky.png", "sky", "sky.ktx", "sky.dds.jpg"] {
            let resolved = resolve_root(root, true);
            assert!(!resolved.kind.is_prefiltered(), "{} must not be prefiltered", root);
        }
    }

    #[test]
    fn test_env_classification() {
        let resolved = resolve_root("studio.env", false);
        assert_eq!(resolved.kind, SourceKind::EnvironmentHarmonics);
        assert!(resolved.faces.is_empty());
    }

    #[test]
    fn test_default_face_suffixes_in_order() {
        let resolved = resolve_root("textures/skybox", false);
        assert_eq!(resolved.kind, SourceKind::LegacySixImage);
        assert_eq!(
            resolved.faces,
            vec![
                "textures/skybox_px.jpg",
                "textures/skybox_py.jpg",
                "textures/skybox_pz.jpg",
                "textures/skybox_nx.jpg",
                "textures/skybox_ny.jpg",
                "textures/skybox_nz.jpg",
            ]
        );
    }

    #[test]
    fn test_custom_suffixes_keep_order() {
        let suffixes: Vec<String> = ["_r.png", "_u.png", "_f.png", "_l.png", "_d.png", "_b.png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let resolved = resolve(SourceRequest {
            root: "sky",
            suffixes: Some(&suffixes),
            ..Default::default()
        });
        assert_eq!(resolved.faces[0], "sky_r.png");
        assert_eq!(resolved.faces[5], "sky_b.png");
        assert_eq!(resolved.faces.len(), CUBE_FACE_COUNT);
    }

    #[test]
    fn test_empty_root_without_files_has_no_faces() {
        let resolved = resolve_root("", false);
        assert_eq!(resolved.kind, SourceKind::LegacySixImage);
        assert!(resolved.faces.is_empty());
    }

    #[test]
    fn test_suffix_count_mismatch_keeps_given_suffixes() {
        crate::foundation::logging::try_init();
        let suffixes: Vec<String> = ["_a.png", "_b.png"].iter().map(|s| s.to_string()).collect();
        let resolved = resolve(SourceRequest {
            root: "sky",
            suffixes: Some(&suffixes),
            ..Default::default()
        });
        assert_eq!(resolved.faces, vec!["sky_a.png", "sky_b.png"]);
    }

    #[test]
    fn test_explicit_files_used_verbatim() {
        let files: Vec<String> = (0..6).map(|i| format!("face{}.png", i)).collect();
        let resolved = resolve(SourceRequest {
            root: "",
            files: Some(&files),
            ..Default::default()
        });
        assert_eq!(resolved.faces, files);
        assert_eq!(resolved.kind, SourceKind::LegacySixImage);
    }

    #[test]
    fn test_explicit_files_still_classified_by_forced_extension() {
        let files: Vec<String> = (0..6).map(|i| format!("face{}", i)).collect();
        let resolved = resolve(SourceRequest {
            root: "bundle",
            forced_extension: Some(".dds"),
            files: Some(&files),
            prefiltered: true,
            ..Default::default()
        });
        assert!(resolved.kind.is_prefiltered());
        assert_eq!(resolved.faces, files);
    }

    #[test]
    fn test_suffixes_ignored_for_containers() {
        let suffixes = vec!["_a".to_string(); 6];
        let resolved = resolve(SourceRequest {
            root: "sky.dds",
            suffixes: Some(&suffixes),
            ..Default::default()
        });
        assert!(resolved.faces.is_empty());
    }
}
