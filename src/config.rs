use crate::error::{Error, Result};
use crate::history::DEFAULT_MAX_DEPTH;
use crate::storage::default_data_path;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Calendar file; the platform data directory when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_history_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_file: None,
            history_depth: default_history_depth(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "daybook")
            .ok_or_else(|| Error::Config("locating config directory".into()))?;
        Ok(dirs.config_dir().join("config.yml"))
    }

    /// Reads settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            return Ok(Settings::default());
        }
        let settings: Settings = serde_yaml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        if settings.history_depth == 0 {
            return Err(Error::Config("history_depth must be at least 1".into()));
        }
        Ok(settings)
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.data_file {
            Some(path) => Ok(path.clone()),
            None => default_data_path(),
        }
    }
}
