//! Per-app locations under ~/.rolecut.

use std::io;
use std::path::PathBuf;

const BASE_DIR: &str = ".rolecut";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULTS_DB_FILE: &str = "defaults.redb";

/// Files of one rolecut app, rooted at `<home>/.rolecut/<app>`.
#[derive(Debug, Clone)]
pub struct Paths {
    app_dir: PathBuf,
}

impl Paths {
    /// Paths for `app_name` under the user's home directory.
    pub fn new(app_name: &str) -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self::with_home(app_name, home_dir))
    }

    /// Paths rooted at an explicit home directory.
    pub fn with_home(app_name: &str, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: home_dir.into().join(BASE_DIR).join(app_name),
        }
    }

    /// `~/.rolecut/<app>/config.yaml`
    pub fn config_file(&self) -> PathBuf {
        self.app_dir.join(CONFIG_FILE)
    }

    /// `~/.rolecut/<app>/cache`
    pub fn cache_dir(&self) -> PathBuf {
        self.app_dir.join("cache")
    }

    /// Remembered command defaults, `~/.rolecut/<app>/cache/defaults.redb`.
    pub fn defaults_db(&self) -> PathBuf {
        self.cache_dir().join(DEFAULTS_DB_FILE)
    }

    /// Creates the cache directory if it doesn't exist.
    pub fn ensure_cache_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.cache_dir())
    }
}
