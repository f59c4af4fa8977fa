use std::path::Path;

use crate::error::{FaceIdError, Result};

/// File extensions accepted as input images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Returns true if `name` ends in one of [`IMAGE_EXTENSIONS`].
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Lists image files directly inside `dir`, sorted by file name.
///
/// Sorting makes a run reproducible: identity creation in the first pass
/// depends on the order images are seen.
pub fn list_images(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| FaceIdError::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FaceIdError::io(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_image_name(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
