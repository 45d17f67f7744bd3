//! Configuration for the mocked responses server.
//!
//! Everything has a default, so the server runs without a config file. A YAML
//! file can set the same values, and the CLI overrides both.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minutes of inactivity after which a mock is removed (0 = never)
    #[serde(default)]
    pub mock_expiry_minutes: i64,

    /// Logging settings
    #[serde(default)]
    pub settings: LogSettings,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9191
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            mock_expiry_minutes: 0,
            settings: LogSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }
        self.socket_addr()?;
        Ok(())
    }

    /// The address the server listens on.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", self.bind_address, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Whether mocks expire at all.
    pub fn expiry_enabled(&self) -> bool {
        self.mock_expiry_minutes > 0
    }
}

/// Logging settings for activation requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    /// Log requests answered by a mock
    #[serde(default = "default_true")]
    pub log_matches: bool,

    /// Log requests no mock answered
    #[serde(default = "default_true")]
    pub log_unmatched: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_matches: true,
            log_unmatched: true,
        }
    }
}
