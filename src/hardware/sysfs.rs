//! Linux sysfs backend.
//!
//! GPIO lines live under `<root>/gpio`, thermal sensors under
//! `<root>/thermal/thermal_zone<N>/temp` (millidegrees Celsius). The root is
//! `/sys/class` on a real board.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::{Hardware, HardwareFault, PinId, PinMode, SensorId};

/// udev creates `gpioN/` and fixes its permissions some time after the export.
const DIRECTION_ATTEMPTS: u32 = 10;
const DIRECTION_RETRY_DELAY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct SysfsHardware {
    root: PathBuf,
}

impl SysfsHardware {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pin_dir(&self, pin: PinId) -> PathBuf {
        self.root.join("gpio").join(format!("gpio{}", pin.0))
    }

    fn thermal_file(&self, id: SensorId) -> PathBuf {
        self.root
            .join("thermal")
            .join(format!("thermal_zone{}", id.0))
            .join("temp")
    }

    /// Returns `true` when the line was exported by this call.
    fn export(&self, pin: PinId) -> Result<bool, HardwareFault> {
        if self.pin_dir(pin).exists() {
            return Ok(false);
        }
        write_attr(&self.root.join("gpio").join("export"), &pin.0.to_string())
            .map_err(|e| pin_fault(pin, "export", e))?;
        tracing::debug!(pin = %pin, "Exported GPIO line");
        Ok(true)
    }
}

impl Hardware for SysfsHardware {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), HardwareFault> {
        let fresh = self.export(pin)?;
        let direction = match mode {
            PinMode::Input => "in",
            PinMode::Output => "out",
        };
        let path = self.pin_dir(pin).join("direction");

        let mut attempt = 1;
        loop {
            match write_attr(&path, direction) {
                Ok(()) => return Ok(()),
                Err(e)
                    if fresh
                        && attempt < DIRECTION_ATTEMPTS
                        && matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) =>
                {
                    tracing::debug!(pin = %pin, attempt, error = %e, "GPIO line not ready yet");
                    attempt += 1;
                    thread::sleep(DIRECTION_RETRY_DELAY);
                }
                Err(e) => return Err(pin_fault(pin, "direction", e)),
            }
        }
    }

    fn set_output(&mut self, pin: PinId, level: bool) -> Result<(), HardwareFault> {
        let value = if level { "1" } else { "0" };
        write_attr(&self.pin_dir(pin).join("value"), value)
            .map_err(|e| pin_fault(pin, "value", e))
    }

    fn read_input(&mut self, pin: PinId) -> Result<bool, HardwareFault> {
        let raw = fs::read_to_string(self.pin_dir(pin).join("value"))
            .map_err(|e| pin_fault(pin, "value", e))?;
        match raw.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(HardwareFault::Pin {
                pin,
                reason: format!("unexpected value {:?}", other),
            }),
        }
    }

    fn read_sensor(&mut self, id: SensorId) -> Result<f64, HardwareFault> {
        let path = self.thermal_file(id);
        let raw = fs::read_to_string(&path).map_err(|e| HardwareFault::Sensor {
            sensor: id,
            reason: format!("{}: {}", path.display(), e),
        })?;
        let millidegrees: i64 = raw.trim().parse().map_err(|_| HardwareFault::Sensor {
            sensor: id,
            reason: format!("unparsable reading {:?}", raw.trim()),
        })?;
        Ok(millidegrees as f64 / 1e3)
    }
}

fn write_attr(path: &Path, value: &str) -> std::io::Result<()> {
    fs::write(path, value)
}

fn pin_fault(pin: PinId, attr: &str, e: std::io::Error) -> HardwareFault {
    HardwareFault::Pin {
        pin,
        reason: format!("{}: {}", attr, e),
    }
}
