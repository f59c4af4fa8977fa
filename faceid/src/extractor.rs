use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FaceIdError, Result};

/// A face embedding as produced by a recognition model.
pub type Embedding = Vec<f32>;

/// Detects faces in an image and returns one embedding per face.
///
/// Faces whose detection confidence is below `detection_threshold` are
/// dropped. An image with no face yields an empty list, not an error.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
pub trait FaceExtractor: Send + Sync {
    fn extract(&self, path: &Path, detection_threshold: f32) -> Result<Vec<Embedding>>;
}

/// One detected face in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detector confidence in [0, 1].
    pub score: f32,
    pub embedding: Embedding,
}

/// [`FaceExtractor`] backed by detections computed ahead of time.
///
/// The manifest is a JSON object keyed by image file name:
///
/// ```json
/// { "cut(1).jpg": [ { "score": 0.92, "embedding": [0.1, 0.3, ...] } ] }
/// ```
///
/// Lookups use the file name only, so the same manifest works wherever the
/// images are copied. Images missing from the manifest have no faces.
#[derive(Debug, Clone, Default)]
pub struct ManifestExtractor {
    faces: HashMap<String, Vec<Detection>>,
}

impl ManifestExtractor {
    pub fn new(faces: HashMap<String, Vec<Detection>>) -> Self {
        Self { faces }
    }

    /// Loads a manifest file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FaceIdError::io(path, e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let faces: HashMap<String, Vec<Detection>> =
            serde_json::from_str(content).map_err(|e| FaceIdError::Manifest(e.to_string()))?;
        Ok(Self { faces })
    }

    /// Number of images listed in the manifest.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl FaceExtractor for ManifestExtractor {
    fn extract(&self, path: &Path, detection_threshold: f32) -> Result<Vec<Embedding>> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FaceIdError::Extract(format!("no file name in {}", path.display())))?;
        Ok(self
            .faces
            .get(name)
            .map(|dets| {
                dets.iter()
                    .filter(|d| d.score >= detection_threshold)
                    .map(|d| d.embedding.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "a.jpg": [
            { "score": 0.9, "embedding": [1.0, 0.0] },
            { "score": 0.4, "embedding": [0.0, 1.0] }
        ],
        "b.png": []
    }"#;

    #[test]
    fn filters_by_detection_score() {
        let ex = ManifestExtractor::from_json(MANIFEST).unwrap();
        assert_eq!(ex.len(), 2);

        let faces = ex.extract(Path::new("/frames/a.jpg"), 0.65).unwrap();
        assert_eq!(faces, vec![vec![1.0, 0.0]]);

        let faces = ex.extract(Path::new("a.jpg"), 0.3).unwrap();
        assert_eq!(faces.len(), 2);
    }

    #[test]
    fn unknown_and_empty_images_have_no_faces() {
        let ex = ManifestExtractor::from_json(MANIFEST).unwrap();
        assert!(ex.extract(Path::new("b.png"), 0.0).unwrap().is_empty());
        assert!(ex.extract(Path::new("c.jpg"), 0.0).unwrap().is_empty());
    }

    #[test]
    fn malformed_manifest_is_rejected() {
        let err = ManifestExtractor::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, FaceIdError::Manifest(_)));
    }

    #[test]
    fn open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.json");
        std::fs::write(&path, MANIFEST).unwrap();
        let ex = ManifestExtractor::open(&path).unwrap();
        assert!(!ex.is_empty());

        let err = ManifestExtractor::open(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, FaceIdError::Io { .. }));
    }
}
