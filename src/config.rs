// Configuration: optional YAML file plus environment overrides

use crate::view::FALLBACK_TITLE;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV_VAR: &str = "TASKWIDGET_CONFIG";
pub const STORE_PATH_ENV_VAR: &str = "TASKWIDGET_STORE_PATH";
const APP_DIR_NAME: &str = "taskwidget";
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the store's keys
    pub store_path: Option<PathBuf>,
    /// Widget title when the selected list has no name
    pub fallback_title: Option<String>,
}

impl Config {
    /// Load from an explicit path, `TASKWIDGET_CONFIG`, or the user config dir
    ///
    /// A missing file means defaults; a file that exists but does not parse is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => env_path(CONFIG_ENV_VAR).or_else(default_config_path),
        };

        match path {
            Some(path) if path.exists() => Self::load_from_path(&path),
            Some(path) if explicit.is_some() => Err(eyre!("Config file not found: {}", path.display())),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    /// Store directory: flag, then env, then config file, then the user data dir
    pub fn resolve_store_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = env_path(STORE_PATH_ENV_VAR) {
            return Ok(path);
        }
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| eyre!("Cannot determine data directory; pass --store-path"))
    }

    pub fn fallback_title(&self) -> &str {
        self.fallback_title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(FALLBACK_TITLE)
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
