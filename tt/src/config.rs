//! Configuration for turntalk

use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use serde::Deserialize;
use sharedstore::config::{default_config_paths, default_store_path};
use tracing::debug;

use crate::protocol::{DEFAULT_CONNECTION_LIMIT, DEFAULT_POLL_INTERVAL, ProtocolConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory of the shared file store
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Delay between store polls, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Written into the session at reset
    #[serde(default = "default_connection_limit")]
    pub connection_limit: usize,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_connection_limit() -> usize {
    DEFAULT_CONNECTION_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            poll_interval_ms: default_poll_interval_ms(),
            connection_limit: default_connection_limit(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let config = match Self::find(path) {
            Some(config_path) => {
                debug!(?config_path, "Config::load: reading");
                let content = std::fs::read_to_string(&config_path)?;
                serde_yaml::from_str::<Config>(&content)?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read only `log_level`, before logging is set up; errors are ignored
    pub fn load_log_level(path: Option<&PathBuf>) -> Option<String> {
        let content = std::fs::read_to_string(Self::find(path)?).ok()?;
        serde_yaml::from_str::<Config>(&content).ok()?.log_level
    }

    fn find(path: Option<&PathBuf>) -> Option<PathBuf> {
        match path {
            Some(path) => Some(path.clone()),
            None => default_config_paths().into_iter().find(|p| p.exists()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(eyre::eyre!("poll_interval_ms must be greater than 0"));
        }
        // Turn handoff is defined for exactly two participants
        if self.connection_limit != DEFAULT_CONNECTION_LIMIT {
            return Err(eyre::eyre!(
                "connection_limit must be {} (got {})",
                DEFAULT_CONNECTION_LIMIT,
                self.connection_limit
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn protocol(&self) -> ProtocolConfig {
        ProtocolConfig {
            poll_interval: self.poll_interval(),
            connection_limit: self.connection_limit,
        }
    }
}
