//! Motor parameters and state: kinematics, electrical quantities, and the
//! back-EMF / cogging helpers that drive them.

mod cogging;

pub use cogging::{CoggingMap, COGGING_MAP_LEN};

use crate::error::ParamError;
use crate::math::{self, NUM_BEMF_HARMONICS};
use core::f32::consts::PI;

/// The three phase angular offsets, in electrical radians.
pub const PHASE_OFFSETS: [f32; 3] = [0.0, 2.0 * PI / 3.0, -2.0 * PI / 3.0];

/// Constants for one motor. Constructed and mutated only through the
/// validated setters, so the physics integrator never observes an invalid
/// parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorParams {
    num_pole_pairs: u8,
    rotor_inertia: f32,
    phase_resistance: f32,
    phase_inductance: f32,
    normed_bemf_coeffs: [f32; NUM_BEMF_HARMONICS],
    cogging_torque_map: CoggingMap,
    /// Cached at install time so the physics integrator can check this once
    /// per tick without re-summing the whole cogging map (§7's
    /// energy-non-conserving degeneracy is surfaced through
    /// [`crate::integrator::Diagnostics`], not logged here).
    cogging_energy_non_conserving: bool,
}

impl Default for MotorParams {
    fn default() -> Self {
        Self {
            num_pole_pairs: 4,
            rotor_inertia: 0.01,
            phase_resistance: 0.1,
            phase_inductance: 1e-4,
            normed_bemf_coeffs: [0.05, 0.0, 0.0, 0.0, 0.0],
            cogging_torque_map: CoggingMap::zero(),
            cogging_energy_non_conserving: false,
        }
    }
}

impl MotorParams {
    pub fn num_pole_pairs(&self) -> u8 {
        self.num_pole_pairs
    }

    /// Clamped into `1..=8` rather than rejected, per the Open Question
    /// resolution in DESIGN.md.
    pub fn set_num_pole_pairs(&mut self, pairs: u8) {
        self.num_pole_pairs = pairs.clamp(1, 8);
    }

    pub fn rotor_inertia(&self) -> f32 {
        self.rotor_inertia
    }

    pub fn set_rotor_inertia(&mut self, inertia: f32) -> Result<(), ParamError> {
        if inertia <= 0.0 {
            return Err(ParamError::NonPositiveInertia(inertia));
        }
        self.rotor_inertia = inertia;
        Ok(())
    }

    pub fn phase_resistance(&self) -> f32 {
        self.phase_resistance
    }

    pub fn set_phase_resistance(&mut self, resistance: f32) -> Result<(), ParamError> {
        if resistance <= 0.0 {
            return Err(ParamError::NonPositiveResistance(resistance));
        }
        self.phase_resistance = resistance;
        Ok(())
    }

    pub fn phase_inductance(&self) -> f32 {
        self.phase_inductance
    }

    pub fn set_phase_inductance(&mut self, inductance: f32) -> Result<(), ParamError> {
        if inductance <= 0.0 {
            return Err(ParamError::NonPositiveInductance(inductance));
        }
        self.phase_inductance = inductance;
        Ok(())
    }

    pub fn normed_bemf_coeffs(&self) -> [f32; NUM_BEMF_HARMONICS] {
        self.normed_bemf_coeffs
    }

    /// The fundamental amplitude (`a1`). No sign/magnitude restriction is
    /// imposed beyond the type itself; a degenerate all-zero bEMF is a
    /// legitimate (if inert) motor.
    pub fn set_normed_bemf_coeffs(&mut self, coeffs: [f32; NUM_BEMF_HARMONICS]) {
        self.normed_bemf_coeffs = coeffs;
    }

    pub fn cogging_torque_map(&self) -> &CoggingMap {
        &self.cogging_torque_map
    }

    /// Install a new cogging map. Recenters it by default (Open Question
    /// resolution: enforce energy conservation unless asked otherwise). If
    /// `recenter` is false and the map still fails the energy check, the
    /// degeneracy is flagged here but not logged directly: the physics
    /// integrator surfaces it once per run through
    /// [`crate::integrator::Diagnostics`] so the warning path matches the
    /// diode-indeterminate degeneracy's.
    pub fn set_cogging_torque_map(&mut self, mut map: CoggingMap, recenter: bool) {
        if recenter {
            map.recenter();
        }
        self.cogging_energy_non_conserving = map.is_energy_non_conserving();
        self.cogging_torque_map = map;
    }

    /// Whether the installed cogging map failed the energy-conservation
    /// check at install time (cached, so the integrator can test this every
    /// tick without re-summing the map).
    pub fn cogging_energy_non_conserving(&self) -> bool {
        self.cogging_energy_non_conserving
    }

    /// The odd-harmonic bEMF waveform at ω = 1 (i.e. normalized), evaluated
    /// at electrical angle `theta_e`.
    pub fn normed_bemf(&self, theta_e: f32) -> f32 {
        let series = math::odd_sine_series(theta_e);
        self.normed_bemf_coeffs
            .iter()
            .zip(series.iter())
            .map(|(coeff, harmonic)| coeff * harmonic)
            .sum()
    }

    /// Torque-per-amp curve `κ(θ_e)` used to invert desired torque into a
    /// desired `iq` in both sinusoidal and non-sinusoidal drive modes.
    pub fn torque_per_amp(&self, theta_e: f32) -> f32 {
        self.normed_bemf(theta_e) * self.num_pole_pairs as f32 * 1.5
    }

    /// `κ` evaluated purely from the fundamental, used for the sinusoidal
    /// drive mode's constant-denominator inversion.
    pub fn fundamental_torque_per_amp(&self) -> f32 {
        self.normed_bemf_coeffs[0] * self.num_pole_pairs as f32 * 1.5
    }
}

/// Angle, velocity, acceleration, and net torque of the rotor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorKinematic {
    pub rotor_angle: f32,
    pub rotor_angular_vel: f32,
    pub rotor_angular_accel: f32,
    pub torque: f32,
}

/// Per-phase electrical quantities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorElectrical {
    pub phase_currents: [f32; 3],
    pub bemfs: [f32; 3],
    pub normed_bemfs: [f32; 3],
}

/// Combined kinematic and electrical motor state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorState {
    pub kinematic: MotorKinematic,
    pub electrical: MotorElectrical,
}

impl MotorState {
    /// Flux-aligned electrical angle at the current rotor position.
    pub fn flux_electrical_angle(&self, params: &MotorParams) -> f32 {
        math::flux_electrical_angle(params.num_pole_pairs(), self.kinematic.rotor_angle)
    }

    /// q-axis electrical angle at the current rotor position.
    pub fn q_axis_electrical_angle(&self, params: &MotorParams) -> f32 {
        math::q_axis_electrical_angle(params.num_pole_pairs(), self.kinematic.rotor_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_physical_constants() {
        let mut params = MotorParams::default();
        assert!(params.set_rotor_inertia(0.0).is_err());
        assert!(params.set_rotor_inertia(-1.0).is_err());
        assert!(params.set_phase_resistance(0.0).is_err());
        assert!(params.set_phase_inductance(-1e-6).is_err());
        assert!(params.set_rotor_inertia(0.02).is_ok());
    }

    #[test]
    fn pole_pairs_clamp_instead_of_reject() {
        let mut params = MotorParams::default();
        params.set_num_pole_pairs(0);
        assert_eq!(params.num_pole_pairs(), 1);
        params.set_num_pole_pairs(200);
        assert_eq!(params.num_pole_pairs(), 8);
    }

    #[test]
    fn normed_bemf_matches_fundamental_for_pure_sine() {
        let mut params = MotorParams::default();
        params.set_normed_bemf_coeffs([0.1, 0.0, 0.0, 0.0, 0.0]);
        for i in 0..10 {
            let theta = i as f32 * 0.2;
            let expected = 0.1 * theta.sin();
            assert!((params.normed_bemf(theta) - expected).abs() < 1e-5);
        }
    }
}
