//! Config Locator - find the YAML configuration the CLI should load
//!
//! An explicit `--config` path always wins. Otherwise a per-user file is
//! picked up from the platform config directory when it exists, and the
//! built-in profile is used as the last resort.

use anyhow::{anyhow, Result};
use docqc_core::{ConfigProfile, QcConfig};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    User(PathBuf),
    BuiltIn(ConfigProfile),
}

pub struct ConfigLocator {
    /// Base directory for docqc settings (e.g., ~/.config/docqc)
    config_dir: Option<PathBuf>,
}

impl ConfigLocator {
    /// Locator rooted at the platform config directory
    pub fn new() -> Self {
        Self {
            config_dir: Self::get_config_dir().ok(),
        }
    }

    /// Locator rooted at an explicit directory, mainly for tests
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: Some(dir.into()),
        }
    }

    fn get_config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(base.join("docqc"))
    }

    /// Path of the per-user config file, whether or not it exists
    pub fn user_config_path(&self) -> Option<PathBuf> {
        self.config_dir
            .as_ref()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    pub fn locate(&self, explicit: Option<&str>, profile: ConfigProfile) -> ConfigSource {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
        match self.user_config_path() {
            Some(path) if path.is_file() => ConfigSource::User(path),
            _ => ConfigSource::BuiltIn(profile),
        }
    }

    /// Load the located config. An explicit file that fails to load is an
    /// error; a broken per-user file falls back to the built-in profile.
    pub fn load(&self, explicit: Option<&str>, profile: ConfigProfile) -> Result<(QcConfig, ConfigSource)> {
        let source = self.locate(explicit, profile);
        let config = match &source {
            ConfigSource::Explicit(path) => QcConfig::load_from_file(&path_str(path)?)?,
            ConfigSource::User(path) => {
                QcConfig::load_with_fallback(Some(&path_str(path)?), profile)
            }
            ConfigSource::BuiltIn(profile) => QcConfig::for_profile(*profile),
        };
        Ok((config, source))
    }
}

impl Default for ConfigLocator {
    fn default() -> Self {
        Self::new()
    }
}

fn path_str(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Config path is not valid UTF-8: {}", path.display()))
}
