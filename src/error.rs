//! Edit-time validation errors.
//!
//! The tick path is total: nothing inside [`crate::scheduler`] or
//! [`crate::integrator`] returns a `Result`. Invalid state is kept out by
//! rejecting bad edits here, before they ever reach [`crate::SimState`].

use thiserror::Error;

/// A rejected edit to a physical parameter.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("rotor inertia must be strictly positive, got {0}")]
    NonPositiveInertia(f32),

    #[error("phase resistance must be strictly positive, got {0}")]
    NonPositiveResistance(f32),

    #[error("phase inductance must be strictly positive, got {0}")]
    NonPositiveInductance(f32),

    #[error("bus voltage must be strictly positive, got {0}")]
    NonPositiveBusVoltage(f32),

    #[error("dead time must be non-negative, got {0}")]
    NegativeDeadTime(f32),

    #[error("PWM resolution must be zero or a positive power of two fraction, got {0}")]
    InvalidPwmResolution(f32),

    #[error("cogging torque map length {got} does not match the expected length {expected}")]
    CoggingMapLengthMismatch { expected: usize, got: usize },

    #[error("FOC period must be strictly positive, got {0}")]
    NonPositivePeriod(f32),

    #[error("step multiplier must be within 1..=5000, got {0}")]
    StepMultiplierOutOfRange(u32),
}
