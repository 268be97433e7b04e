//! Electromechanical simulator for a three-phase BLDC/PMSM motor driven by
//! an H-bridge gate array, plus the manual, six-step, and field-oriented
//! control strategies that drive it.
//!
//! This crate is the simulation core only: a fixed-timestep physics
//! integrator, a gate/PWM model, and the controllers that write into it. It
//! has no bundled UI — a host (a GUI, a CLI harness, a test rig) owns a
//! [`scheduler::SimState`], calls [`scheduler::SimState::tick`] on whatever
//! cadence it likes, and reads back motor/board state or the
//! [`observer::Observer`] ring buffers between ticks.

pub mod board;
pub mod config;
pub mod control;
pub mod error;
pub mod integrator;
pub mod math;
pub mod motor;
pub mod observer;
pub mod scheduler;

pub use board::{Actual, BoardState, Commanded, GateState, PwmState};
pub use config::SimConfig;
pub use control::CommutationMode;
pub use error::ParamError;
pub use motor::{CoggingMap, MotorElectrical, MotorKinematic, MotorParams, MotorState};
pub use observer::Observer;
pub use scheduler::SimState;
