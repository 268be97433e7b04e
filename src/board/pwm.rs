//! PWM carrier and duty quantization.

use crate::board::gate::Commanded;
use crate::error::ParamError;

/// Carrier, duty, and resolution state for three-phase PWM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmState {
    /// Triangle/sawtooth carrier position in `[0, 1)`.
    pub level: f32,
    /// Per-phase duty cycle in `[0, 1]`, already quantized.
    pub duties: [f32; 3],
    /// Quantization step, `0` (disabled) or a negative power of two.
    pub resolution: f32,
    /// Carrier frequency in Hz.
    pub carrier_freq: f32,
}

impl PwmState {
    pub fn new(carrier_freq: f32, resolution: f32) -> Self {
        Self {
            level: 0.0,
            duties: [0.0; 3],
            resolution,
            carrier_freq,
        }
    }

    pub fn set_resolution(&mut self, resolution: f32) -> Result<(), ParamError> {
        if !Self::is_valid_resolution(resolution) {
            return Err(ParamError::InvalidPwmResolution(resolution));
        }
        self.resolution = resolution;
        Ok(())
    }

    /// `0` (disabled) or a negative power of two, e.g. `2⁻¹`, `2⁻⁸`, `2⁻¹⁶`.
    fn is_valid_resolution(resolution: f32) -> bool {
        if resolution == 0.0 {
            return true;
        }
        if !(resolution > 0.0 && resolution <= 1.0) {
            return false;
        }
        let inv = 1.0 / resolution;
        (inv.log2() - inv.log2().round()).abs() < 1e-3
    }

    /// Round `duty` to the nearest multiple of `resolution`; `resolution ==
    /// 0` disables quantization (identity).
    pub fn quantize(duty: f32, resolution: f32) -> f32 {
        if resolution <= 0.0 {
            duty
        } else {
            (duty / resolution).round() * resolution
        }
    }

    /// Clamp to `[0, 1]`, quantize, and install as the commanded duties.
    pub fn set_duties(&mut self, duties: [f32; 3]) {
        for (slot, duty) in self.duties.iter_mut().zip(duties) {
            *slot = Self::quantize(duty.clamp(0.0, 1.0), self.resolution);
        }
    }

    /// Advance the carrier by one tick of length `dt`.
    pub fn advance(&mut self, dt: f32) {
        self.level = (self.level + dt * self.carrier_freq).rem_euclid(1.0);
    }

    /// Compare duties against the carrier to derive gate commands for the
    /// current tick.
    pub fn gate_commands(&self) -> [Commanded; 3] {
        let mut out = [Commanded::Low; 3];
        for (slot, duty) in out.iter_mut().zip(self.duties) {
            *slot = if duty > self.level {
                Commanded::High
            } else {
                Commanded::Low
            };
        }
        out
    }
}
