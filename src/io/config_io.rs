use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::PlannerConfig;

/// Error type for reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Default config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("planner").join("config.toml")
}

/// Default data directory, respecting XDG_DATA_HOME
pub fn default_data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_dir.join("planner")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read the config from a specific path. A missing file yields defaults.
pub fn read_config_from(path: &Path) -> Result<PlannerConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PlannerConfig::default()),
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the config from `path`, or from the default location.
pub fn read_config(path: Option<&Path>) -> Result<PlannerConfig, ConfigError> {
    match path {
        Some(p) => read_config_from(p),
        None => read_config_from(&config_path()),
    }
}

impl PlannerConfig {
    /// Data directory: explicit override, then config, then the XDG default.
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.storage.data_dir.clone())
            .unwrap_or_else(default_data_dir)
    }

    /// Where remote documents live; defaults to `remote/` under the data dir.
    pub fn resolve_remote_dir(&self, data_dir: &Path) -> PathBuf {
        self.sync
            .remote_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("remote"))
    }
}
