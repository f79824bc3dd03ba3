//! TOML config loading

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

/// Errors that can occur while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{0}': {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config '{0}': {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Read and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let value = toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    debug!("Loaded config from {}", path.display());
    Ok(value)
}
