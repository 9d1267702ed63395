//! Carrying out routed actions against the hardware.

use crate::config::HardwareConfig;
use crate::hardware::{Hardware, HardwareFault, PinId, PinMode, SensorId};
use crate::http::request::ParsedRequest;
use crate::router::{Action, RouteTable};

/// What happened when an action was carried out.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub action: Action,
    pub succeeded: bool,
    /// Rendered value for actions that produce data (the sensor reading).
    pub payload: Option<String>,
    pub fault: Option<HardwareFault>,
}

impl ActionResult {
    pub fn success(action: Action, payload: Option<String>) -> Self {
        Self {
            action,
            succeeded: true,
            payload,
            fault: None,
        }
    }

    pub fn failure(action: Action, fault: HardwareFault) -> Self {
        Self {
            action,
            succeeded: false,
            payload: None,
            fault: Some(fault),
        }
    }

    pub fn unknown() -> Self {
        Self {
            action: Action::Unknown,
            succeeded: false,
            payload: None,
            fault: None,
        }
    }

    pub fn is_hardware_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// The pin and sensor the routes act on.
#[derive(Debug, Clone, Copy)]
pub struct Targets {
    pub output_pin: PinId,
    pub sensor: SensorId,
}

/// Performs `action` on `hw`. `Unknown` touches no hardware.
pub fn perform<H: Hardware + ?Sized>(action: Action, hw: &mut H, targets: Targets) -> ActionResult {
    let outcome = match action {
        Action::TurnOn => hw.set_output(targets.output_pin, true).map(|()| None),
        Action::TurnOff => hw.set_output(targets.output_pin, false).map(|()| None),
        Action::ReadSensor => hw
            .read_sensor(targets.sensor)
            .map(|value| Some(format_reading(value))),
        Action::Unknown => return ActionResult::unknown(),
    };

    match outcome {
        Ok(payload) => {
            tracing::info!(action = ?action, payload = ?payload, "Hardware action performed");
            ActionResult::success(action, payload)
        }
        Err(fault) => {
            tracing::warn!(action = ?action, error = %fault, "Hardware action failed");
            ActionResult::failure(action, fault)
        }
    }
}

/// Routes requests and performs their actions on the hardware it owns.
#[derive(Debug)]
pub struct Controller<H: ?Sized> {
    routes: RouteTable,
    targets: Targets,
    hardware: H,
}

impl<H: Hardware> Controller<H> {
    /// Puts the output pin in output mode and takes ownership of `hardware`.
    pub fn new(routes: RouteTable, targets: Targets, mut hardware: H) -> Result<Self, HardwareFault> {
        hardware.set_mode(targets.output_pin, PinMode::Output)?;
        Ok(Self {
            routes,
            targets,
            hardware,
        })
    }
}

impl<H: Hardware + ?Sized> Controller<H> {
    pub fn handle(&mut self, req: &ParsedRequest) -> ActionResult {
        let action = self.routes.route(req);
        tracing::debug!(
            method = req.method.as_str(),
            path = %req.path,
            action = ?action,
            "Request routed"
        );
        perform(action, &mut self.hardware, self.targets)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

impl Targets {
    pub fn from_config(cfg: &HardwareConfig) -> Self {
        Self {
            output_pin: cfg.output_pin,
            sensor: cfg.sensor,
        }
    }
}

/// Always keeps a fractional part, so 48000 millidegrees renders as `48.0`.
fn format_reading(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{HardwareCall, MemoryHardware};
    use crate::http::parser::parse_request_line;

    const TARGETS: Targets = Targets {
        output_pin: PinId(21),
        sensor: SensorId(0),
    };

    fn board() -> MemoryHardware {
        let mut hw = MemoryHardware::new().with_sensor(SensorId(0), 51.5);
        hw.set_mode(PinId(21), PinMode::Output).unwrap();
        hw
    }

    #[test]
    fn turn_on_drives_pin_high() {
        let mut hw = board();
        let result = perform(Action::TurnOn, &mut hw, TARGETS);

        assert!(result.succeeded);
        assert_eq!(result.payload, None);
        assert_eq!(hw.level(PinId(21)), Some(true));
    }

    #[test]
    fn read_sensor_renders_payload() {
        let mut hw = board();
        let result = perform(Action::ReadSensor, &mut hw, TARGETS);

        assert!(result.succeeded);
        assert_eq!(result.payload.as_deref(), Some("51.5"));
    }

    #[test]
    fn whole_degree_reading_keeps_fraction() {
        let mut hw = board();
        hw.set_sensor(SensorId(0), 48.0);

        let result = perform(Action::ReadSensor, &mut hw, TARGETS);
        assert_eq!(result.payload.as_deref(), Some("48.0"));
    }

    #[test]
    fn unknown_touches_nothing() {
        let mut hw = board();
        let result = perform(Action::Unknown, &mut hw, TARGETS);

        assert!(!result.succeeded);
        assert!(!result.is_hardware_fault());
        assert!(hw.action_calls().is_empty());
    }

    #[test]
    fn sensor_fault_has_no_payload() {
        let mut hw = board();
        assert!(perform(Action::ReadSensor, &mut hw, TARGETS).succeeded);

        hw.fail_sensor(SensorId(0), "i2c timeout");
        let result = perform(Action::ReadSensor, &mut hw, TARGETS);

        assert!(!result.succeeded);
        assert!(result.is_hardware_fault());
        assert_eq!(result.payload, None);
        assert_eq!(
            hw.action_calls(),
            vec![
                HardwareCall::ReadSensor(SensorId(0)),
                HardwareCall::ReadSensor(SensorId(0)),
            ]
        );
    }

    #[test]
    fn controller_configures_output_pin() {
        let hw = MemoryHardware::new();
        let controller = Controller::new(RouteTable::default(), TARGETS, hw.clone()).unwrap();

        assert_eq!(hw.mode(PinId(21)), Some(PinMode::Output));
        assert_eq!(controller.routes().routes().len(), 3);
    }

    #[test]
    fn controller_routes_then_acts() {
        let hw = MemoryHardware::new();
        let mut controller = Controller::new(RouteTable::default(), TARGETS, hw.clone()).unwrap();

        let result = controller.handle(&parse_request_line(b"GET /off HTTP/1.1\r\n\r\n"));

        assert_eq!(result.action, Action::TurnOff);
        assert!(result.succeeded);
        assert_eq!(hw.action_calls(), vec![HardwareCall::SetOutput(PinId(21), false)]);
    }

    #[test]
    fn controller_fails_when_pin_cannot_be_configured() {
        let hw = MemoryHardware::new();
        hw.fail_pin(PinId(21), "no such line");

        assert!(Controller::new(RouteTable::default(), TARGETS, hw).is_err());
    }
}
