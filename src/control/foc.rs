//! Field-Oriented Control: Clarke/Park transforms, PI regulation of qd
//! currents, qd decoupling, cogging feed-forward, non-sinusoidal drive
//! compensation, and space-vector modulation.

use crate::control::pi::PiController;
use crate::error::ParamError;
use crate::math;
use crate::motor::{MotorParams, MotorState};
use num_complex::Complex32;

/// Floor below which the non-sinusoidal torque-per-amp curve is not
/// inverted directly, avoiding a singular `iq_desired` near its zero
/// crossings (§4.5 step 3).
const MIN_TORQUE_PER_AMP_FRACTION: f32 = 1e-3;

/// Feedforward/compensation toggles and the controller's own clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocState {
    period: f32,
    last_tick_time: f32,
    pub iq_controller: PiController,
    pub id_controller: PiController,
    /// Last commanded voltage vector in the rotor frame (q = real, d =
    /// imag).
    pub voltage_qd: Complex32,
    pub non_sinusoidal_drive_mode: bool,
    pub use_cogging_compensation: bool,
    pub use_qd_decoupling: bool,
}

impl FocState {
    pub fn new(period: f32, bus_voltage: f32) -> Self {
        let sat_limit = bus_voltage / 3f32.sqrt();
        Self {
            period,
            last_tick_time: f32::NEG_INFINITY,
            iq_controller: PiController::new(0.0, 0.0, sat_limit),
            id_controller: PiController::new(0.0, 0.0, sat_limit),
            voltage_qd: Complex32::new(0.0, 0.0),
            non_sinusoidal_drive_mode: false,
            use_cogging_compensation: false,
            use_qd_decoupling: false,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn set_period(&mut self, period: f32) -> Result<(), ParamError> {
        if period <= 0.0 {
            return Err(ParamError::NonPositivePeriod(period));
        }
        self.period = period;
        Ok(())
    }

    /// Whether `time` has advanced far enough past the last tick for a new
    /// FOC update to run.
    pub fn is_due(&self, time: f32) -> bool {
        time - self.last_tick_time >= self.period
    }

    /// Apply the §4.5 automatic PI tuning to both axes from the motor's own
    /// R/L.
    pub fn auto_tune(&mut self, bandwidth: f32, params: &MotorParams) {
        self.iq_controller
            .auto_tune(bandwidth, params.phase_resistance(), params.phase_inductance());
        self.id_controller
            .auto_tune(bandwidth, params.phase_resistance(), params.phase_inductance());
    }

    /// Desired `(iq, id)` for a commanded torque, honoring the sinusoidal /
    /// non-sinusoidal drive mode toggle.
    fn desired_currents(&self, params: &MotorParams, theta_e_flux: f32, desired_torque: f32) -> (f32, f32) {
        let kappa = if self.non_sinusoidal_drive_mode {
            params.torque_per_amp(theta_e_flux)
        } else {
            params.fundamental_torque_per_amp()
        };
        let kappa_min = MIN_TORQUE_PER_AMP_FRACTION * params.fundamental_torque_per_amp().abs();
        let kappa_clamped = if kappa.abs() < kappa_min {
            kappa_min.copysign(kappa)
        } else {
            kappa
        };
        (desired_torque / kappa_clamped, 0.0)
    }

    /// Run one FOC update. Returns the three PWM duty ratios (not yet
    /// quantized to the board's PWM resolution — the caller quantizes and
    /// writes them into [`crate::board::PwmState`]).
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        params: &MotorParams,
        motor: &MotorState,
        bus_voltage: f32,
        desired_torque: f32,
        time: f32,
    ) -> [f32; 3] {
        self.last_tick_time = time;

        let theta_e_flux = motor.flux_electrical_angle(params);
        let theta_e_q = motor.q_axis_electrical_angle(params);
        let omega_e = params.num_pole_pairs() as f32 * motor.kinematic.rotor_angular_vel;

        let i_ab = math::clarke(motor.electrical.phase_currents);
        let i_qd = math::park(i_ab, theta_e_q);
        let (iq_meas, id_meas) = (i_qd.re, i_qd.im);

        let (mut iq_desired, id_desired) = self.desired_currents(params, theta_e_flux, desired_torque);

        if self.use_cogging_compensation {
            let kappa_ff = params.fundamental_torque_per_amp();
            let cogging_torque = params.cogging_torque_map().torque_at(motor.kinematic.rotor_angle);
            iq_desired += cogging_torque / kappa_ff;
        }

        let mut u_q = self.iq_controller.update(iq_desired, iq_meas, self.period);
        let mut u_d = self.id_controller.update(id_desired, id_meas, self.period);

        if self.use_qd_decoupling {
            u_q += omega_e * params.phase_inductance() * id_meas;
            u_d -= omega_e * params.phase_inductance() * iq_meas;
        }

        let v_qd = Complex32::new(u_q, u_d);
        self.voltage_qd = v_qd;
        let v_ab = math::inverse_park(v_qd, theta_e_q);

        svm_duties(v_ab, bus_voltage)
    }
}

/// Space-vector modulation via inverse Clarke plus min/max (zero-sequence)
/// centering, with a minimum-phase-error overmodulation rescale.
pub fn svm_duties(v_ab: Complex32, bus_voltage: f32) -> [f32; 3] {
    let mut v_abc = math::inverse_clarke(v_ab);

    let vmax = v_abc.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let vmin = v_abc.iter().cloned().fold(f32::INFINITY, f32::min);
    let v0 = 0.5 * (vmax + vmin);
    for v in v_abc.iter_mut() {
        *v -= v0;
    }

    let peak = v_abc.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let modulation_index = (2.0 / bus_voltage) * peak;
    if modulation_index > 1.0 {
        for v in v_abc.iter_mut() {
            *v /= modulation_index;
        }
    }

    let mut duties = [0.0; 3];
    for (slot, v) in duties.iter_mut().zip(v_abc) {
        *slot = (v / bus_voltage + 0.5).clamp(0.0, 1.0);
    }
    duties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardState;
    use crate::integrator;

    #[test]
    fn svm_duties_stay_within_unit_interval() {
        for i in 0..32 {
            let angle = i as f32 * core::f32::consts::TAU / 32.0;
            let v = Complex32::new(10.0 * angle.cos(), 10.0 * angle.sin());
            let duties = svm_duties(v, 24.0);
            for d in duties {
                assert!((0.0..=1.0).contains(&d), "duty {d} out of range");
            }
        }
    }

    #[test]
    fn one_bit_resolution_emits_only_three_levels_under_foc() {
        let mut params = MotorParams::default();
        params.set_normed_bemf_coeffs([0.05, 0.0, 0.0, 0.0, 0.0]);
        let board = BoardState::new(24.0, 0.0, 20_000.0, 0.5);
        let mut motor = MotorState::default();
        motor.kinematic.rotor_angular_vel = 50.0;
        let mut foc = FocState::new(1e-5, board.bus_voltage());
        foc.auto_tune(1000.0, &params);

        let duties = foc.tick(&params, &motor, board.bus_voltage(), 0.1, 0.0);
        let quantized: Vec<f32> = duties
            .iter()
            .map(|d| crate::board::PwmState::quantize(d.clamp(0.0, 1.0), 0.5))
            .collect();
        for d in quantized {
            assert!(d == 0.0 || d == 0.5 || d == 1.0);
        }
    }

    #[test]
    fn torque_tracks_desired_setpoint_under_load() {
        let mut params = MotorParams::default();
        params.set_normed_bemf_coeffs([0.05, 0.0, 0.0, 0.0, 0.0]);
        params.set_num_pole_pairs(4);
        let mut board = BoardState::new(24.0, 0.0, 20_000.0, 0.0);
        let mut motor = MotorState::default();
        let mut foc = FocState::new(1e-4, board.bus_voltage());
        foc.auto_tune(1000.0, &params);

        let dt = 1e-6;
        let desired_torque = 0.2;
        let load_torque = -0.2;
        let mut diag = integrator::Diagnostics::default();
        let mut time = 0.0;

        for _ in 0..500_000 {
            if foc.is_due(time) {
                let duties = foc.tick(&params, &motor, board.bus_voltage(), desired_torque, time);
                board.pwm.set_duties(duties);
            }
            board.pwm.advance(dt);
            let commands = board.pwm.gate_commands();
            for phase in 0..3 {
                board.gate.set_commanded(phase, commands[phase]);
            }
            board.gate.advance(dt);
            integrator::step(&params, &board, &mut motor, load_torque, dt, &mut diag);
            time += dt;
        }

        assert!(
            (motor.kinematic.torque - desired_torque).abs() < 0.05,
            "torque {} did not track {desired_torque}",
            motor.kinematic.torque
        );
    }
}
