//! Server configuration.
//!
//! Configuration comes from an optional YAML file named by `PINSERVE_CONFIG`.
//! Every field has a default, so an empty document (or no file at all) gives a
//! server listening on `127.0.0.1:8080` driving BCM pin 21. The `LISTEN`
//! environment variable always wins over the file for the listen address.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::hardware::{PinId, SensorId};
use crate::router::Action;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub hardware: HardwareConfig,
    pub routes: RoutesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Pending connections the OS may queue while one is being served.
    pub backlog: u32,
    /// Upper bound of the single read performed per connection.
    pub max_request_bytes: usize,
    /// No timeout when unset.
    pub read_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareBackend {
    Sysfs,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub backend: HardwareBackend,
    pub output_pin: PinId,
    pub sensor: SensorId,
    pub sysfs_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    pub path: String,
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub table: Vec<RouteConfig>,
    /// Action for paths not in the table.
    pub fallback: Action,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            backlog: 1,
            max_request_bytes: 1024,
            read_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            backend: HardwareBackend::Sysfs,
            output_pin: PinId(21),
            sensor: SensorId(0),
            sysfs_root: PathBuf::from("/sys/class"),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            table: vec![
                RouteConfig { path: "/on".to_string(), action: Action::TurnOn },
                RouteConfig { path: "/off".to_string(), action: Action::TurnOff },
                RouteConfig { path: "/temp".to_string(), action: Action::ReadSensor },
            ],
            fallback: Action::Unknown,
        }
    }
}

impl Config {
    /// Loads configuration from `PINSERVE_CONFIG` (if set) and applies the
    /// `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("PINSERVE_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path))?;
                Self::from_yaml_str(&text)
                    .with_context(|| format!("invalid config file {}", path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    /// Parses a YAML document. Does not consult the environment.
    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(text).context("failed to parse YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values that would leave the server unable to serve requests.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.max_request_bytes > 0,
            "server.max_request_bytes must be greater than 0"
        );
        anyhow::ensure!(self.server.backlog > 0, "server.backlog must be greater than 0");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_workshop_setup() {
        let cfg = Config::default();
        assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
        assert_eq!(cfg.server.backlog, 1);
        assert_eq!(cfg.server.max_request_bytes, 1024);
        assert!(cfg.server.read_timeout().is_none());
        assert_eq!(cfg.hardware.output_pin, PinId(21));
        assert!(cfg.validate().is_ok());
    }
}
