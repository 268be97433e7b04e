//! One forward-Euler step of the electromechanical model: gate → pole
//! voltages, neutral voltage, phase voltages, `di/dt`, torque, rotor update.
//!
//! Order is fixed and load-bearing (§4.4 of the specification): gate→pole
//! happens before the neutral voltage is formed; the neutral voltage is
//! formed before `di/dt`; torque is computed before the rotor is advanced.
//! This implementation does not substitute a higher-order integration
//! scheme — see DESIGN.md's Open Questions.

use crate::board::{Actual, BoardState};
use crate::math;
use crate::motor::{CoggingMap, MotorParams, MotorState, PHASE_OFFSETS};

/// Counters for the two documented non-fatal degeneracies, plus a
/// rate-limiting flag so the logger only fires once per run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    pub diode_indeterminate_count: u64,
    diode_warning_logged: bool,
    pub cogging_energy_warnings: u64,
    cogging_warning_logged: bool,
}

impl Diagnostics {
    fn note_diode_indeterminate(&mut self) {
        self.diode_indeterminate_count += 1;
        if !self.diode_warning_logged {
            log::warn!(
                "OFF-state pole voltage indeterminate (|i| below diode_active_current_threshold); \
                 resolving to 0 V deterministically"
            );
            self.diode_warning_logged = true;
        }
    }

    fn note_cogging_energy_non_conserving(&mut self, cogging_map: &CoggingMap) {
        self.cogging_energy_warnings += 1;
        if !self.cogging_warning_logged {
            log::warn!(
                "cogging torque map integral {:.3e} exceeds the energy-conservation threshold; \
                 recentering was not requested",
                cogging_map.integral()
            );
            self.cogging_warning_logged = true;
        }
    }
}

/// Resolve the pole voltage for one phase given the board's bus/diode
/// constants, the phase's actual gate state, and its current.
fn pole_voltage(board: &BoardState, actual: Actual, current: f32, diag: &mut Diagnostics) -> f32 {
    match actual {
        Actual::High => board.bus_voltage(),
        Actual::Low => 0.0,
        Actual::Off => {
            let threshold = board.diode_active_current_threshold();
            if current > threshold {
                -board.diode_active_voltage()
            } else if current < -threshold {
                board.bus_voltage() + board.diode_active_voltage()
            } else {
                diag.note_diode_indeterminate();
                0.0
            }
        }
    }
}

/// Advance `motor` by one tick of length `dt` under `board`'s gate/bus
/// state and the given mechanical load torque.
pub fn step(
    params: &MotorParams,
    board: &BoardState,
    motor: &mut MotorState,
    load_torque: f32,
    dt: f32,
    diag: &mut Diagnostics,
) {
    let theta_e_flux = motor.flux_electrical_angle(params);
    let omega = motor.kinematic.rotor_angular_vel;

    // 1. Pole voltages.
    let mut v_pole = [0.0; 3];
    for phase in 0..3 {
        v_pole[phase] = pole_voltage(
            board,
            board.gate.actual[phase],
            motor.electrical.phase_currents[phase],
            diag,
        );
    }

    // 2. Back-EMFs.
    let mut normed_bemfs = [0.0; 3];
    let mut bemfs = [0.0; 3];
    for phase in 0..3 {
        normed_bemfs[phase] = params.normed_bemf(theta_e_flux + PHASE_OFFSETS[phase]);
        bemfs[phase] = normed_bemfs[phase] * omega;
    }

    // 3. Neutral voltage (isolated wye neutral).
    let v_neutral = (v_pole.iter().sum::<f32>() - bemfs.iter().sum::<f32>()) / 3.0;

    // 4. Phase voltages.
    let mut v_phase = [0.0; 3];
    for phase in 0..3 {
        v_phase[phase] = v_pole[phase] - v_neutral;
    }

    // 5-6. Current derivative and update.
    for phase in 0..3 {
        let di_dt = (v_phase[phase] - bemfs[phase]
            - params.phase_resistance() * motor.electrical.phase_currents[phase])
            / params.phase_inductance();
        motor.electrical.phase_currents[phase] += di_dt * dt;
    }

    // 7-8. Torque: electromagnetic + cogging - load.
    let torque_em: f32 = (0..3)
        .map(|phase| motor.electrical.phase_currents[phase] * normed_bemfs[phase])
        .sum();
    let torque_cogging = params.cogging_torque_map().torque_at(motor.kinematic.rotor_angle);
    let torque = torque_em + torque_cogging - load_torque;

    if params.cogging_energy_non_conserving() {
        diag.note_cogging_energy_non_conserving(params.cogging_torque_map());
    }

    // 9. Rotor update.
    let alpha = torque / params.rotor_inertia();
    motor.kinematic.rotor_angular_accel = alpha;
    motor.kinematic.rotor_angular_vel += alpha * dt;
    motor.kinematic.rotor_angle =
        math::wrap_2pi(motor.kinematic.rotor_angle + motor.kinematic.rotor_angular_vel * dt);
    motor.kinematic.torque = torque;
    motor.electrical.bemfs = bemfs;
    motor.electrical.normed_bemfs = normed_bemfs;
}
