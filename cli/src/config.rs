//! Configuration management for CLI tools.
//!
//! Configuration is stored in ~/.rolecut/{app_name}/config.yaml and holds
//! named grouping profiles, one of which can be current.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rolecut_faceid::{ClarityConfig, GroupingConfig, ThresholdPolicy};
use serde::{Deserialize, Serialize};

use crate::paths::Paths;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Name of the currently active profile.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_profile: String,

    /// Map of profile name to grouping parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Profile>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Named set of grouping parameters.
///
/// Unset fields fall back to the engine defaults. Zero is a real value:
/// `clarity_range: 0` turns the clarity adjustment off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Similarity floor before the clarity adjustment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_threshold: Option<f32>,

    /// Minimum face detection confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_threshold: Option<f32>,

    /// Threshold multiplier at zero clarity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity_floor: Option<f32>,

    /// Threshold multiplier added per unit of clarity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity_range: Option<f32>,

    /// Laplacian variance that counts as fully sharp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity_scale: Option<f64>,
}

impl Profile {
    /// Grouping parameters with unset fields filled from the defaults.
    pub fn grouping_config(&self) -> GroupingConfig {
        let d = GroupingConfig::default();
        GroupingConfig {
            threshold: ThresholdPolicy {
                base: self.base_threshold.unwrap_or(d.threshold.base),
                floor: self.clarity_floor.unwrap_or(d.threshold.floor),
                range: self.clarity_range.unwrap_or(d.threshold.range),
            },
            detection_threshold: self.detection_threshold.unwrap_or(d.detection_threshold),
        }
    }

    /// Clarity scorer parameters with unset fields filled from the defaults.
    pub fn clarity_config(&self) -> ClarityConfig {
        let d = ClarityConfig::default();
        ClarityConfig {
            scale: self.clarity_scale.unwrap_or(d.scale),
            ..d
        }
    }
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Paths::new(app_name).ok().map(|p| p.config_file())
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Adds or replaces a profile.
    pub fn set_profile(&mut self, name: &str, mut profile: Profile) -> anyhow::Result<()> {
        profile.name = name.to_string();
        self.profiles.insert(name.to_string(), profile);
        self.save()
    }

    /// Deletes a profile.
    pub fn delete_profile(&mut self, name: &str) -> anyhow::Result<()> {
        if self.profiles.remove(name).is_none() {
            anyhow::bail!("profile '{}' not found", name);
        }
        if self.current_profile == name {
            self.current_profile.clear();
        }
        self.save()
    }

    /// Sets the current profile.
    pub fn use_profile(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.profiles.contains_key(name) {
            anyhow::bail!("profile '{}' not found", name);
        }
        self.current_profile = name.to_string();
        self.save()
    }

    /// Gets a specific profile.
    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Gets the current profile.
    pub fn get_current_profile(&self) -> Option<&Profile> {
        if self.current_profile.is_empty() {
            return None;
        }
        self.profiles.get(&self.current_profile)
    }

    /// Resolves the profile by name, or the current profile if no name is given.
    ///
    /// An explicit name that does not exist is an error; having no current
    /// profile is not.
    pub fn resolve_profile(&self, name: Option<&str>) -> anyhow::Result<Option<&Profile>> {
        match name {
            Some(n) if !n.is_empty() => match self.get_profile(n) {
                Some(p) => Ok(Some(p)),
                None => anyhow::bail!("profile '{}' not found", n),
            },
            _ => Ok(self.get_current_profile()),
        }
    }

    /// Lists all profile names in sorted order.
    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(|s| s.as_str()).collect()
    }
}

/// Loads configuration for the specified app, creating an empty file when
/// none exists.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        serde_yaml::from_str::<Option<Config>>(&content)?.unwrap_or_default()
    } else {
        let cfg = Config::default();
        std::fs::write(&config_path, serde_yaml::to_string(&cfg)?)?;
        cfg
    };

    cfg.config_path = config_path;

    Ok(cfg)
}
