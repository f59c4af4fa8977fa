use std::path::Path;

use tracing::{debug, info};

use crate::error::{FaceIdError, Result};
use crate::grouping::RoleImages;
use crate::label::role_dir_name;

/// Counts from one [`export_roles`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub copied: usize,
    /// Destinations that already existed and were left untouched.
    pub skipped: usize,
}

/// Copies every role's images into `output_root/role_<label>/`.
///
/// Existing destination files are never overwritten, so repeating an export
/// is harmless. It also never removes files left from an earlier grouping.
pub fn export_roles(
    input_dir: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    roles: &RoleImages,
) -> Result<ExportSummary> {
    let input_dir = input_dir.as_ref();
    let output_root = output_root.as_ref();
    std::fs::create_dir_all(output_root).map_err(|e| FaceIdError::io(output_root, e))?;

    let mut summary = ExportSummary::default();
    for (label, images) in roles.iter() {
        let role_dir = output_root.join(role_dir_name(label));
        std::fs::create_dir_all(&role_dir).map_err(|e| FaceIdError::io(&role_dir, e))?;

        for name in images {
            let dst = role_dir.join(name);
            if dst.exists() {
                summary.skipped += 1;
                continue;
            }
            let src = input_dir.join(name);
            std::fs::copy(&src, &dst).map_err(|e| FaceIdError::io(&src, e))?;
            debug!(role = %label, image = %name, "copied");
            summary.copied += 1;
        }
    }

    info!(
        roles = roles.len(),
        copied = summary.copied,
        skipped = summary.skipped,
        "export done"
    );
    Ok(summary)
}

/// Removes `output_root/role_<label>/` and everything in it.
/// Returns false if the folder did not exist.
pub fn delete_role(output_root: impl AsRef<Path>, label: &str) -> Result<bool> {
    let role_dir = output_root.as_ref().join(role_dir_name(label));
    if !role_dir.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(&role_dir).map_err(|e| FaceIdError::io(&role_dir, e))?;
    info!(role = %label, "role folder deleted");
    Ok(true)
}
