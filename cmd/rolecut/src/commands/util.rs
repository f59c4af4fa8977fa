//! Utility functions for CLI commands.

use std::sync::Arc;

use anyhow::Context as _;
use rolecut_cli::{load_config, Config, Output, OutputFormat, Paths, Profile};
use rolecut_kv::{PageCache, RedbStore};

use crate::Cli;

pub const APP_NAME: &str = "rolecut";

/// Page of the defaults store owned by the group command.
pub const DEFAULTS_PAGE: &str = "group";

pub const KEY_INPUT_DIR: &str = "input_dir";
pub const KEY_OUTPUT_DIR: &str = "output_dir";
pub const KEY_EMBEDDINGS: &str = "embeddings";
pub const KEY_BASE_THRESHOLD: &str = "base_threshold";
pub const KEY_DETECTION_THRESHOLD: &str = "detection_threshold";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the profile selected by -p, or the current one.
///
/// Running without any profile is allowed; an unknown -p name is not.
pub fn get_profile(cli: &Cli) -> anyhow::Result<Option<Profile>> {
    let cfg = get_config(cli)?;
    Ok(cfg.resolve_profile(cli.profile.as_deref())?.cloned())
}

/// Opens the remembered defaults of the group command.
pub fn open_defaults() -> anyhow::Result<PageCache> {
    let paths = Paths::new(APP_NAME)?;
    paths.ensure_cache_dir()?;
    let db = paths.defaults_db();
    let store = RedbStore::open(&db)
        .with_context(|| format!("open defaults store {}", db.display()))?;
    Ok(PageCache::new(Arc::new(store), DEFAULTS_PAGE))
}

/// Builds the output writer from the global flags.
pub fn output(cli: &Cli) -> Output {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, cli.output.clone())
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}

/// Prints warning message.
pub fn print_warning(msg: &str) {
    eprintln!("\x1b[33m⚠\x1b[0m {}", msg);
}
