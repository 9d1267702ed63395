//! In-memory board.
//!
//! Keeps pin levels and sensor readings in maps and records every call. Faults
//! can be injected per pin or per sensor. Clones share the same board, so a
//! test can hand one clone to the server and inspect the other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Hardware, HardwareFault, PinId, PinMode, SensorId};

/// A call made against a [`MemoryHardware`].
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCall {
    SetMode(PinId, PinMode),
    SetOutput(PinId, bool),
    ReadInput(PinId),
    ReadSensor(SensorId),
}

#[derive(Debug, Default)]
struct Board {
    modes: HashMap<PinId, PinMode>,
    levels: HashMap<PinId, bool>,
    sensors: HashMap<SensorId, f64>,
    failing_pins: HashMap<PinId, String>,
    failing_sensors: HashMap<SensorId, String>,
    calls: Vec<HardwareCall>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHardware {
    board: Arc<Mutex<Board>>,
}

impl MemoryHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor(self, id: SensorId, value: f64) -> Self {
        self.board().sensors.insert(id, value);
        self
    }

    pub fn set_sensor(&self, id: SensorId, value: f64) {
        self.board().sensors.insert(id, value);
    }

    /// Makes every later call on `pin` fail with `reason`.
    pub fn fail_pin(&self, pin: PinId, reason: impl Into<String>) {
        self.board().failing_pins.insert(pin, reason.into());
    }

    /// Makes every later read of `id` fail with `reason`.
    pub fn fail_sensor(&self, id: SensorId, reason: impl Into<String>) {
        self.board().failing_sensors.insert(id, reason.into());
    }

    /// Undoes every `fail_pin` and `fail_sensor`.
    pub fn clear_faults(&self) {
        let mut board = self.board();
        board.failing_pins.clear();
        board.failing_sensors.clear();
    }

    /// Current level of `pin`, `None` if it was never driven.
    pub fn level(&self, pin: PinId) -> Option<bool> {
        self.board().levels.get(&pin).copied()
    }

    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.board().modes.get(&pin).copied()
    }

    pub fn calls(&self) -> Vec<HardwareCall> {
        self.board().calls.clone()
    }

    /// Calls that changed or queried state after startup (everything but `SetMode`).
    pub fn action_calls(&self) -> Vec<HardwareCall> {
        self.board()
            .calls
            .iter()
            .filter(|c| !matches!(c, HardwareCall::SetMode(..)))
            .cloned()
            .collect()
    }

    fn board(&self) -> MutexGuard<'_, Board> {
        // A panicking test thread must not hide the board from the others.
        self.board.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_pin(board: &Board, pin: PinId) -> Result<(), HardwareFault> {
        match board.failing_pins.get(&pin) {
            Some(reason) => Err(HardwareFault::Pin { pin, reason: reason.clone() }),
            None => Ok(()),
        }
    }
}

impl Hardware for MemoryHardware {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), HardwareFault> {
        let mut board = self.board();
        board.calls.push(HardwareCall::SetMode(pin, mode));
        Self::check_pin(&board, pin)?;
        board.modes.insert(pin, mode);
        Ok(())
    }

    fn set_output(&mut self, pin: PinId, level: bool) -> Result<(), HardwareFault> {
        let mut board = self.board();
        board.calls.push(HardwareCall::SetOutput(pin, level));
        Self::check_pin(&board, pin)?;
        if board.modes.get(&pin) != Some(&PinMode::Output) {
            return Err(HardwareFault::Pin {
                pin,
                reason: "not configured as output".to_string(),
            });
        }
        board.levels.insert(pin, level);
        Ok(())
    }

    fn read_input(&mut self, pin: PinId) -> Result<bool, HardwareFault> {
        let mut board = self.board();
        board.calls.push(HardwareCall::ReadInput(pin));
        Self::check_pin(&board, pin)?;
        Ok(board.levels.get(&pin).copied().unwrap_or(false))
    }

    fn read_sensor(&mut self, id: SensorId) -> Result<f64, HardwareFault> {
        let mut board = self.board();
        board.calls.push(HardwareCall::ReadSensor(id));
        if let Some(reason) = board.failing_sensors.get(&id) {
            return Err(HardwareFault::Sensor { sensor: id, reason: reason.clone() });
        }
        board.sensors.get(&id).copied().ok_or_else(|| HardwareFault::Sensor {
            sensor: id,
            reason: "no such sensor".to_string(),
        })
    }
}
