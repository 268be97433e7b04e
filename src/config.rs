//! A serializable snapshot of everything editable in a [`crate::scheduler::SimState`],
//! applied through the same validated setters the live simulation uses.

use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::control::CommutationMode;
use crate::error::ParamError;
use crate::motor::{CoggingMap, MotorParams};
use crate::scheduler::SimState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommutationModeConfig {
    Manual,
    SixStep,
    Foc,
}

impl From<CommutationModeConfig> for CommutationMode {
    fn from(mode: CommutationModeConfig) -> Self {
        match mode {
            CommutationModeConfig::Manual => CommutationMode::Manual,
            CommutationModeConfig::SixStep => CommutationMode::SixStep,
            CommutationModeConfig::Foc => CommutationMode::Foc,
        }
    }
}

impl From<CommutationMode> for CommutationModeConfig {
    fn from(mode: CommutationMode) -> Self {
        match mode {
            CommutationMode::Manual => CommutationModeConfig::Manual,
            CommutationMode::SixStep => CommutationModeConfig::SixStep,
            CommutationMode::Foc => CommutationModeConfig::Foc,
        }
    }
}

/// Motor constants, mirroring [`MotorParams`]'s validated fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotorConfig {
    pub num_pole_pairs: u8,
    pub rotor_inertia: f32,
    pub phase_resistance: f32,
    pub phase_inductance: f32,
    pub normed_bemf_coeffs: [f32; 5],
    pub cogging_torque_samples: Vec<f32>,
    pub recenter_cogging: bool,
}

impl From<&MotorParams> for MotorConfig {
    fn from(params: &MotorParams) -> Self {
        Self {
            num_pole_pairs: params.num_pole_pairs(),
            rotor_inertia: params.rotor_inertia(),
            phase_resistance: params.phase_resistance(),
            phase_inductance: params.phase_inductance(),
            normed_bemf_coeffs: params.normed_bemf_coeffs(),
            cogging_torque_samples: params.cogging_torque_map().samples().to_vec(),
            recenter_cogging: true,
        }
    }
}

/// Board constants, mirroring [`BoardState`]'s validated fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    pub bus_voltage: f32,
    pub dead_time: f32,
    pub carrier_freq: f32,
    pub pwm_resolution: f32,
    pub diode_active_voltage: f32,
    pub diode_active_current_threshold: f32,
}

impl From<&BoardState> for BoardConfig {
    fn from(board: &BoardState) -> Self {
        Self {
            bus_voltage: board.bus_voltage(),
            dead_time: board.gate.dead_time,
            carrier_freq: board.pwm.carrier_freq,
            pwm_resolution: board.pwm.resolution,
            diode_active_voltage: board.diode_active_voltage(),
            diode_active_current_threshold: board.diode_active_current_threshold(),
        }
    }
}

/// A full, serializable snapshot of a simulation's editable state, per §6 of
/// the specification. Round-trips through TOML via `toml::to_string` /
/// `toml::from_str`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub dt: f32,
    pub foc_period: f32,
    pub step_multiplier: u32,
    pub mode: CommutationModeConfig,
    pub six_step_phase_advance: f32,
    pub foc_desired_torque: f32,
    pub load_torque: f32,
    pub motor: MotorConfig,
    pub board: BoardConfig,
}

impl SimConfig {
    pub fn from_sim(sim: &SimState) -> Self {
        Self {
            dt: sim.dt(),
            foc_period: sim.foc.period(),
            step_multiplier: sim.step_multiplier(),
            mode: sim.mode.into(),
            six_step_phase_advance: sim.six_step_phase_advance,
            foc_desired_torque: sim.foc_desired_torque,
            load_torque: sim.load_torque,
            motor: MotorConfig::from(&sim.params),
            board: BoardConfig::from(&sim.board),
        }
    }

    /// Apply this snapshot to `sim` through the same validated setters the
    /// live simulation uses; rejects on the first invalid field.
    pub fn apply(&self, sim: &mut SimState) -> Result<(), ParamError> {
        sim.set_dt(self.dt)?;
        sim.foc.set_period(self.foc_period)?;
        sim.set_step_multiplier(self.step_multiplier)?;
        sim.mode = self.mode.into();
        sim.six_step_phase_advance = self.six_step_phase_advance;
        sim.foc_desired_torque = self.foc_desired_torque;
        sim.load_torque = self.load_torque;

        sim.params.set_num_pole_pairs(self.motor.num_pole_pairs);
        sim.params.set_rotor_inertia(self.motor.rotor_inertia)?;
        sim.params.set_phase_resistance(self.motor.phase_resistance)?;
        sim.params.set_phase_inductance(self.motor.phase_inductance)?;
        sim.params.set_normed_bemf_coeffs(self.motor.normed_bemf_coeffs);
        let cogging = CoggingMap::from_samples(self.motor.cogging_torque_samples.clone())?;
        sim.params.set_cogging_torque_map(cogging, self.motor.recenter_cogging);

        sim.board.set_bus_voltage(self.board.bus_voltage)?;
        sim.board.set_dead_time(self.board.dead_time)?;
        sim.board.pwm.carrier_freq = self.board.carrier_freq;
        sim.board.pwm.set_resolution(self.board.pwm_resolution)?;
        sim.board.set_diode_active_voltage(self.board.diode_active_voltage);
        sim.board
            .set_diode_active_current_threshold(self.board.diode_active_current_threshold);

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardState;
    use crate::motor::COGGING_MAP_LEN;

    fn sample_sim() -> SimState {
        let board = BoardState::new(24.0, 1e-7, 20_000.0, 1.0 / 256.0);
        let mut sim = SimState::new(1e-6, board, 1e-4);
        sim.params.set_normed_bemf_coeffs([0.04, 0.01, 0.0, 0.0, 0.0]);
        sim.mode = CommutationMode::Foc;
        sim.foc_desired_torque = 0.3;
        sim
    }

    #[test]
    fn round_trips_through_toml_text() {
        let sim = sample_sim();
        let config = SimConfig::from_sim(&sim);
        let text = config.to_toml().expect("serializes");
        let parsed = SimConfig::from_toml(&text).expect("parses");
        assert_eq!(config, parsed);
    }

    #[test]
    fn apply_round_trips_into_a_fresh_simulation() {
        let sim = sample_sim();
        let config = SimConfig::from_sim(&sim);

        let board = BoardState::default();
        let mut fresh = SimState::new(1.0, board, 1.0);
        config.apply(&mut fresh).expect("valid config applies");

        assert_eq!(fresh.board.bus_voltage(), sim.board.bus_voltage());
        assert_eq!(fresh.params.normed_bemf_coeffs(), sim.params.normed_bemf_coeffs());
        assert_eq!(fresh.mode, CommutationMode::Foc);
    }

    #[test]
    fn rejects_invalid_cogging_map_length() {
        let mut sim = sample_sim();
        let mut config = SimConfig::from_sim(&sim);
        config.motor.cogging_torque_samples = vec![0.0; COGGING_MAP_LEN - 1];
        assert!(config.apply(&mut sim).is_err());
    }
}
