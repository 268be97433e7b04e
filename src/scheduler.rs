//! The host-loop scheduler: owns the whole simulation and advances it one
//! physics tick (or a burst of `step_multiplier` ticks) per call.

use crate::board::{BoardState, Commanded};
use crate::control::foc::FocState;
use crate::control::{self, CommutationInputs, CommutationMode};
use crate::error::ParamError;
use crate::integrator::{self, Diagnostics};
use crate::motor::{MotorParams, MotorState};
use crate::observer::Observer;

/// The complete, exclusively-owned simulation state. Nothing here needs a
/// lock: edits only happen between `tick()` calls, and `tick()` itself
/// never fails — invalid edits are rejected at the setter, never here.
pub struct SimState {
    pub time: f32,
    pub params: MotorParams,
    pub motor: MotorState,
    pub board: BoardState,
    pub foc: FocState,
    pub mode: CommutationMode,
    pub manual_commanded: [Commanded; 3],
    pub six_step_phase_advance: f32,
    pub foc_desired_torque: f32,
    pub load_torque: f32,
    step_multiplier: u32,
    pub paused: bool,
    pub diagnostics: Diagnostics,
    pub observer: Observer,
    dt: f32,
}

impl SimState {
    /// Build a fresh simulation. `dt` is the fixed physics timestep; `foc`
    /// gets its own (typically coarser) update period via
    /// [`FocState::new`].
    pub fn new(dt: f32, board: BoardState, foc_period: f32) -> Self {
        let bus_voltage = board.bus_voltage();
        Self {
            time: 0.0,
            params: MotorParams::default(),
            motor: MotorState::default(),
            board,
            foc: FocState::new(foc_period, bus_voltage),
            mode: CommutationMode::Manual,
            manual_commanded: [Commanded::Low; 3],
            six_step_phase_advance: 0.0,
            foc_desired_torque: 0.0,
            load_torque: 0.0,
            step_multiplier: 1,
            paused: false,
            diagnostics: Diagnostics::default(),
            observer: Observer::new(),
            dt,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn set_dt(&mut self, dt: f32) -> Result<(), ParamError> {
        if dt <= 0.0 {
            return Err(ParamError::NonPositivePeriod(dt));
        }
        self.dt = dt;
        Ok(())
    }

    pub fn step_multiplier(&self) -> u32 {
        self.step_multiplier
    }

    /// Number of physics ticks run per [`SimState::tick`] call. Bounded so a
    /// runaway UI request can't stall the host loop indefinitely.
    pub fn set_step_multiplier(&mut self, multiplier: u32) -> Result<(), ParamError> {
        if multiplier == 0 || multiplier > 5000 {
            return Err(ParamError::StepMultiplierOutOfRange(multiplier));
        }
        self.step_multiplier = multiplier;
        Ok(())
    }

    /// Advance the simulation by `step_multiplier` physics ticks, in the
    /// fixed per-tick order: controller dispatch, gate/PWM advance, physics
    /// integration.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        for _ in 0..self.step_multiplier {
            self.tick_once();
        }
    }

    fn tick_once(&mut self) {
        let inputs = CommutationInputs {
            mode: self.mode,
            manual_commanded: self.manual_commanded,
            six_step_phase_advance: self.six_step_phase_advance,
            foc_desired_torque: self.foc_desired_torque,
        };
        control::dispatch(
            &inputs,
            &mut self.foc,
            &self.params,
            &self.motor,
            &mut self.board,
            self.time,
        );

        // Only FOC drives gates via PWM duty/carrier comparison; Manual and
        // SixStep write `GateState.commanded` directly in `dispatch` above
        // and must not have it clobbered by a stale carrier comparison.
        if self.mode == CommutationMode::Foc {
            self.board.pwm.advance(self.dt);
            let commands = self.board.pwm.gate_commands();
            for phase in 0..3 {
                self.board.gate.set_commanded(phase, commands[phase]);
            }
        }
        self.board.gate.advance(self.dt);

        integrator::step(
            &self.params,
            &self.board,
            &mut self.motor,
            self.load_torque,
            self.dt,
            &mut self.diagnostics,
        );

        self.time += self.dt;

        self.observer.push(crate::observer::Sample {
            time: self.time,
            torque: self.motor.kinematic.torque,
            bemfs: self.motor.electrical.bemfs,
            phase_currents: self.motor.electrical.phase_currents,
            rotor_angular_vel: self.motor.kinematic.rotor_angular_vel,
            foc_voltage_q: self.foc.voltage_qd.re,
            foc_voltage_d: self.foc.voltage_qd.im,
        });
    }
}
