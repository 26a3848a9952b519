//! Configuration for sharedstore
//!
//! Reads the same `turntalk.yml` as the chat client; keys it does not know
//! about are ignored.

use eyre::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::APP_DIR;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding one file per key
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

/// Default store directory: `{data_local_dir}/turntalk/store`
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("store")
}

/// Config files tried when no explicit path is given, in order
pub fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join(APP_DIR).join("turntalk.yml")),
        Some(PathBuf::from("turntalk.yml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        for path in default_config_paths() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }
}
