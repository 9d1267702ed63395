//! Process-level wiring: hardware backend selection and the accept loop.

pub mod listener;

pub use listener::Server;

use anyhow::Context;

use crate::config::{Config, HardwareBackend, HardwareConfig};
use crate::control::{Controller, Targets};
use crate::hardware::{Hardware, MemoryHardware, SysfsHardware};
use crate::router::RouteTable;

/// Instantiates the configured hardware backend.
pub fn open_hardware(cfg: &HardwareConfig) -> Box<dyn Hardware> {
    match cfg.backend {
        HardwareBackend::Sysfs => Box::new(SysfsHardware::new(&cfg.sysfs_root)),
        HardwareBackend::Memory => {
            tracing::warn!("Using in-memory hardware; no pins will be driven");
            Box::new(MemoryHardware::new().with_sensor(cfg.sensor, 0.0))
        }
    }
}

/// Builds everything from `cfg` and serves until a fatal error.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let routes = RouteTable::from_config(&cfg.routes);
    let controller = Controller::new(
        routes,
        Targets::from_config(&cfg.hardware),
        open_hardware(&cfg.hardware),
    )
    .with_context(|| format!("failed to configure output pin {}", cfg.hardware.output_pin))?;

    Server::bind(&cfg.server, controller).await?.run().await
}
