//! Server configuration loaded from `sparring.toml`.
//!
//! Every field has a default, so an absent file or a partial one is fine:
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 5000
//! default_tier = "weakest"
//!
//! [engine]
//! path = "/usr/games/stockfish"
//! grace_ms = 500
//! threads = 1
//! ```

use serde::{Deserialize, Serialize};
use sparring_core::{DifficultyTier, UciOracleConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tier a new server starts at.
    pub default_tier: DifficultyTier,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            default_tier: DifficultyTier::Weakest,
            engine: EngineConfig::default(),
        }
    }
}

/// The UCI engine used as the opponent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Set to false to play without replies.
    pub enabled: bool,
    /// Engine command line. Defaults to `stockfish` on the PATH.
    pub path: String,
    /// Extra wait beyond the think time before a search is abandoned.
    pub grace_ms: u64,
    pub startup_timeout_ms: u64,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            enabled: true,
            path: "stockfish".to_string(),
            grace_ms: 500,
            startup_timeout_ms: 5000,
            threads: None,
            hash_mb: None,
        }
    }
}

impl EngineConfig {
    pub fn oracle_config(&self) -> UciOracleConfig {
        UciOracleConfig {
            command: self.path.clone(),
            startup_timeout: Duration::from_millis(self.startup_timeout_ms),
            grace: Duration::from_millis(self.grace_ms),
            threads: self.threads,
            hash_mb: self.hash_mb,
        }
    }
}

impl ServerConfig {
    /// Loads the configuration at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
