//! The delete command: remove one role folder from the output root.

use std::path::PathBuf;

use clap::Args;
use rolecut_faceid::{delete_role, role_dir_name, OTHER_LABEL, ROLE_DIR_PREFIX};

use super::{open_defaults, print_success, print_warning, KEY_OUTPUT_DIR};
use crate::Cli;

/// Delete a role folder and everything in it.
#[derive(Args)]
pub struct DeleteCommand {
    /// Role label ("A", "other") or folder name ("role_A")
    label: String,

    /// Folder holding the role folders (default: last used)
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,
}

impl DeleteCommand {
    pub fn run(&self, _cli: &Cli) -> anyhow::Result<()> {
        let label = parse_label(&self.label)?;

        let output_dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => match open_defaults()?.get_or::<Option<PathBuf>>(KEY_OUTPUT_DIR, None) {
                Some(dir) => dir,
                None => anyhow::bail!("no output directory given and none remembered"),
            },
        };

        let folder = output_dir.join(role_dir_name(label));
        if delete_role(&output_dir, label)? {
            print_success(&format!("Deleted {}", folder.display()));
        } else {
            print_warning(&format!("{} does not exist", folder.display()));
        }
        Ok(())
    }
}

/// Accepts a bare label or a role folder name. Anything else could name a
/// path outside the output root.
fn parse_label(raw: &str) -> anyhow::Result<&str> {
    let label = raw.strip_prefix(ROLE_DIR_PREFIX).unwrap_or(raw);
    let valid = label == OTHER_LABEL
        || (!label.is_empty() && label.chars().all(|c| c.is_ascii_uppercase()));
    if !valid {
        anyhow::bail!("invalid role label '{}'", raw);
    }
    Ok(label)
}
