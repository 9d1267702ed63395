//! Hardware access.
//!
//! The server never touches GPIO or sensors directly. It is handed a value
//! implementing [`Hardware`] at construction time and calls it from a single
//! task, one request at a time.
//!
//! - **`sysfs`**: Linux `/sys/class/gpio` and `/sys/class/thermal` backend
//! - **`memory`**: in-memory board with call recording and fault injection

pub mod memory;
pub mod sysfs;

use std::fmt;

use serde::Deserialize;

pub use memory::{HardwareCall, MemoryHardware};
pub use sysfs::SysfsHardware;

/// Broadcom (BCM) pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub u32);

/// Sensor index. For the sysfs backend this is the thermal zone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SensorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hardware call that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareFault {
    /// The pin could not be configured or driven.
    #[error("pin {pin}: {reason}")]
    Pin { pin: PinId, reason: String },

    /// The sensor could not be read or produced an unparsable value.
    #[error("sensor {sensor}: {reason}")]
    Sensor { sensor: SensorId, reason: String },

    #[error("hardware I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for HardwareFault {
    fn from(e: std::io::Error) -> Self {
        HardwareFault::Io(e.to_string())
    }
}

/// The operations the server needs from the board.
///
/// Implementations are driven from one task at a time and must leave a pin
/// unchanged when a call on it fails. `set_output` must be idempotent.
pub trait Hardware: Send {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), HardwareFault>;

    fn set_output(&mut self, pin: PinId, level: bool) -> Result<(), HardwareFault>;

    fn read_input(&mut self, pin: PinId) -> Result<bool, HardwareFault>;

    /// Returns the reading in the sensor's natural unit (degrees Celsius for
    /// thermal zones).
    fn read_sensor(&mut self, id: SensorId) -> Result<f64, HardwareFault>;
}

impl<H: Hardware + ?Sized> Hardware for Box<H> {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), HardwareFault> {
        (**self).set_mode(pin, mode)
    }

    fn set_output(&mut self, pin: PinId, level: bool) -> Result<(), HardwareFault> {
        (**self).set_output(pin, level)
    }

    fn read_input(&mut self, pin: PinId) -> Result<bool, HardwareFault> {
        (**self).read_input(pin)
    }

    fn read_sensor(&mut self, id: SensorId) -> Result<f64, HardwareFault> {
        (**self).read_sensor(id)
    }
}
