//! Controllers that turn a commanded intent (gate states, six-step spin, or
//! a desired torque) into the board's gate commands for one tick.

pub mod foc;
pub mod manual;
pub mod pi;
pub mod six_step;

use crate::board::{BoardState, Commanded};
use crate::motor::{MotorParams, MotorState};
use foc::FocState;

/// Which of the three drive strategies is currently in charge of the gate
/// array. A tagged enum rather than a trait object, since the set of modes
/// is closed and the per-tick dispatch is on a hot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommutationMode {
    /// The caller writes gate states directly; no commutation logic runs.
    Manual,
    /// Open-loop trapezoidal six-step commutation, synced to the rotor's
    /// flux electrical angle.
    SixStep,
    /// Closed-loop field-oriented control driving toward a commanded
    /// torque.
    Foc,
}

/// Per-tick inputs the dispatcher needs regardless of mode; the unused
/// fields for a given mode are simply ignored.
pub struct CommutationInputs {
    pub mode: CommutationMode,
    pub manual_commanded: [Commanded; 3],
    pub six_step_phase_advance: f32,
    pub foc_desired_torque: f32,
}

/// Run the controller selected by `inputs.mode` for this tick, writing gate
/// commands into `board.gate` (and, for FOC, `board.pwm`'s duties). `time`
/// is the simulation clock used to decide whether an FOC update is due.
pub fn dispatch(
    inputs: &CommutationInputs,
    foc: &mut FocState,
    params: &MotorParams,
    motor: &MotorState,
    board: &mut BoardState,
    time: f32,
) {
    match inputs.mode {
        CommutationMode::Manual => {
            manual::drive(&mut board.gate, inputs.manual_commanded);
        }
        CommutationMode::SixStep => {
            let theta_e = motor.flux_electrical_angle(params);
            let gates = six_step::six_step_gates(theta_e, inputs.six_step_phase_advance);
            for phase in 0..3 {
                let commanded = gates[phase].unwrap_or(Commanded::Low);
                board.gate.set_commanded(phase, commanded);
            }
        }
        CommutationMode::Foc => {
            if foc.is_due(time) {
                let duties = foc.tick(
                    params,
                    motor,
                    board.bus_voltage(),
                    inputs.foc_desired_torque,
                    time,
                );
                board.pwm.set_duties(duties);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardState;

    #[test]
    fn manual_mode_ignores_foc_and_six_step_fields() {
        let params = MotorParams::default();
        let motor = MotorState::default();
        let mut board = BoardState::default();
        let mut foc = FocState::new(1e-4, board.bus_voltage());
        let inputs = CommutationInputs {
            mode: CommutationMode::Manual,
            manual_commanded: [Commanded::High, Commanded::High, Commanded::Low],
            six_step_phase_advance: 0.0,
            foc_desired_torque: 0.0,
        };

        dispatch(&inputs, &mut foc, &params, &motor, &mut board, 0.0);

        assert_eq!(
            board.gate.commanded,
            [Commanded::High, Commanded::High, Commanded::Low]
        );
    }

    #[test]
    fn six_step_mode_drives_two_phases_from_rotor_angle() {
        let params = MotorParams::default();
        let motor = MotorState::default();
        let mut board = BoardState::default();
        let mut foc = FocState::new(1e-4, board.bus_voltage());
        let inputs = CommutationInputs {
            mode: CommutationMode::SixStep,
            manual_commanded: [Commanded::Low; 3],
            six_step_phase_advance: 0.0,
            foc_desired_torque: 0.0,
        };

        dispatch(&inputs, &mut foc, &params, &motor, &mut board, 0.0);

        let driven_high = board
            .gate
            .commanded
            .iter()
            .filter(|c| **c == Commanded::High)
            .count();
        assert_eq!(driven_high, 1);
    }
}
