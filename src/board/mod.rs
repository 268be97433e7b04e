//! Gate array and PWM model: the H-bridge abstraction the physics
//! integrator reads and the controllers write.

pub mod gate;
pub mod pwm;

pub use gate::{Actual, Commanded, GateState};
pub use pwm::PwmState;

use crate::error::ParamError;

/// Default minimum current magnitude below which the OFF-state pole
/// voltage is indeterminate (§7, §9 Open Questions).
pub const DEFAULT_DIODE_ACTIVE_CURRENT_THRESHOLD: f32 = 1e-6;

/// Board-wide electrical constants plus the gate and PWM state they drive.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    bus_voltage: f32,
    diode_active_voltage: f32,
    diode_active_current_threshold: f32,
    pub gate: GateState,
    pub pwm: PwmState,
}

impl BoardState {
    pub fn new(bus_voltage: f32, dead_time: f32, carrier_freq: f32, resolution: f32) -> Self {
        Self {
            bus_voltage,
            diode_active_voltage: 0.7,
            diode_active_current_threshold: DEFAULT_DIODE_ACTIVE_CURRENT_THRESHOLD,
            gate: GateState::new(dead_time),
            pwm: PwmState::new(carrier_freq, resolution),
        }
    }

    pub fn bus_voltage(&self) -> f32 {
        self.bus_voltage
    }

    pub fn set_bus_voltage(&mut self, bus_voltage: f32) -> Result<(), ParamError> {
        if bus_voltage <= 0.0 {
            return Err(ParamError::NonPositiveBusVoltage(bus_voltage));
        }
        self.bus_voltage = bus_voltage;
        Ok(())
    }

    pub fn diode_active_voltage(&self) -> f32 {
        self.diode_active_voltage
    }

    pub fn set_diode_active_voltage(&mut self, voltage: f32) {
        self.diode_active_voltage = voltage.max(0.0);
    }

    pub fn diode_active_current_threshold(&self) -> f32 {
        self.diode_active_current_threshold
    }

    pub fn set_diode_active_current_threshold(&mut self, threshold: f32) {
        self.diode_active_current_threshold = threshold.max(0.0);
    }

    pub fn set_dead_time(&mut self, dead_time: f32) -> Result<(), ParamError> {
        if dead_time < 0.0 {
            return Err(ParamError::NegativeDeadTime(dead_time));
        }
        self.gate.dead_time = dead_time;
        Ok(())
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new(24.0, 0.0, 20_000.0, 0.0)
    }
}
