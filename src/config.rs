//! Configuration for the car client.
//!
//! Everything lives in one TOML file so the two usual deployments (simulator
//! on localhost, car on the LAN) are a config swap instead of a code edit.
//! Missing sections fall back to the simulator defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::Deserialize;
use tracing::info;

use crate::command::CommandVariant;

/// Connection settings for the car's WebSocket endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            path: "/ws".to_string(),
            connect_timeout_secs: 5,
            read_timeout_secs: 5,
        }
    }
}

impl CarConfig {
    /// Full WebSocket URL of the car.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Operator console settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Which firmware command table to use.
    pub variant: CommandVariant,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub car: CarConfig,
    pub console: ConsoleConfig,
}

impl Config {
    /// Parse a configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML: {}", e))
    }

    /// Load a configuration file. A missing file means the default
    /// simulator deployment, not an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::parse(&content)
    }
}
