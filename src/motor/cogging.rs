//! Cogging torque lookup table.

use crate::error::ParamError;
use core::f32::consts::PI;

/// Fixed-length cogging torque table, linearly interpolated over one
/// mechanical revolution and treated as cyclic at the boundary.
pub const COGGING_MAP_LEN: usize = 3600;

/// Integral magnitude above which a cogging map is considered
/// energy-non-conserving (§7 of the specification).
pub const COGGING_ENERGY_WARN_THRESHOLD: f32 = 1e-8;

/// A cogging torque map sampled at `COGGING_MAP_LEN` evenly spaced
/// mechanical angles over `[0, 2π)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoggingMap {
    samples: Vec<f32>,
}

impl Default for CoggingMap {
    fn default() -> Self {
        Self::zero()
    }
}

impl CoggingMap {
    /// A flat, zero-torque map.
    pub fn zero() -> Self {
        Self {
            samples: vec![0.0; COGGING_MAP_LEN],
        }
    }

    /// Build a map from samples, rejecting a length mismatch.
    pub fn from_samples(samples: Vec<f32>) -> Result<Self, ParamError> {
        if samples.len() != COGGING_MAP_LEN {
            return Err(ParamError::CoggingMapLengthMismatch {
                expected: COGGING_MAP_LEN,
                got: samples.len(),
            });
        }
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Linearly interpolated torque at mechanical angle `theta` (any real
    /// value; wrapped into the table's domain).
    pub fn torque_at(&self, theta: f32) -> f32 {
        let wrapped = crate::math::wrap_2pi(theta);
        let scaled = wrapped / (2.0 * PI) * COGGING_MAP_LEN as f32;
        let idx0 = scaled.floor() as usize % COGGING_MAP_LEN;
        let idx1 = (idx0 + 1) % COGGING_MAP_LEN;
        let frac = scaled - scaled.floor();
        self.samples[idx0] * (1.0 - frac) + self.samples[idx1] * frac
    }

    /// Trapezoidal integral of the map over one full revolution, in
    /// torque·radians. Should be near zero for an energy-conserving map.
    pub fn integral(&self) -> f32 {
        let dtheta = 2.0 * PI / COGGING_MAP_LEN as f32;
        let mut sum = 0.0;
        for i in 0..COGGING_MAP_LEN {
            let next = (i + 1) % COGGING_MAP_LEN;
            sum += 0.5 * (self.samples[i] + self.samples[next]) * dtheta;
        }
        sum
    }

    /// Subtract the mean sample so the map integrates to (numerically)
    /// zero. Defaulted to "on" by [`crate::motor::MotorParams`] per the
    /// Open Question resolution recorded in DESIGN.md.
    pub fn recenter(&mut self) {
        let mean = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        for sample in self.samples.iter_mut() {
            *sample -= mean;
        }
    }

    /// Whether this map's integral exceeds the energy-conservation warning
    /// threshold.
    pub fn is_energy_non_conserving(&self) -> bool {
        self.integral().abs() >= COGGING_ENERGY_WARN_THRESHOLD
    }
}
