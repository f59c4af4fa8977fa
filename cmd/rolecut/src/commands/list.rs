//! The list command.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use rolecut_faceid::list_images;

use super::{open_defaults, output, print_info, KEY_INPUT_DIR};
use crate::Cli;

/// List the images of a folder in the order grouping visits them.
#[derive(Args)]
pub struct ListCommand {
    /// Folder to list (default: last used input folder)
    dir: Option<PathBuf>,
}

impl ListCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => match open_defaults()?.get_or::<Option<PathBuf>>(KEY_INPUT_DIR, None) {
                Some(dir) => dir,
                None => anyhow::bail!("no directory given and none remembered"),
            },
        };

        let images = list_images(&dir).with_context(|| format!("list {}", dir.display()))?;
        print_info(&format!("{} images in {}", images.len(), dir.display()));
        output(cli).write(&images)
    }
}
