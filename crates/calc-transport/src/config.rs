//! Host configuration.

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for a host serving calculator components.
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Address the host listens on.
    pub bind: SocketAddr,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Largest `count` or `max_count` a single request may ask for.
    pub max_batch: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            log_filter: "info".to_string(),
            max_batch: Self::DEFAULT_MAX_BATCH,
        }
    }
}

impl HostConfig {
    /// Environment variable naming a JSON config file.
    pub const ENV_VAR: &'static str = "CALC_HOST_CONFIG";

    /// Batch limit when the config does not set one.
    pub const DEFAULT_MAX_BATCH: u32 = 10_000;

    /// Parse a JSON config.
    ///
    /// # Errors
    /// Returns error if the text is not a valid config.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a JSON config file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load from the file named by [`Self::ENV_VAR`], or use defaults.
    ///
    /// # Errors
    /// Returns error if the variable is set and the file is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(Self::ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}
