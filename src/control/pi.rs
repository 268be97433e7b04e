//! PI regulator with optional conditional-integration anti-windup.

/// Proportional-integral controller state for one control axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiController {
    pub p_gain: f32,
    pub i_gain: f32,
    pub integral: f32,
    pub err: f32,
    pub anti_windup: bool,
    pub sat_limit: f32,
}

impl PiController {
    pub fn new(p_gain: f32, i_gain: f32, sat_limit: f32) -> Self {
        Self {
            p_gain,
            i_gain,
            integral: 0.0,
            err: 0.0,
            anti_windup: true,
            sat_limit,
        }
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.err = 0.0;
    }

    /// Set gains for a target closed-loop bandwidth `omega_c` given the
    /// axis's series resistance and inductance (`p = omega_c * L`, `i =
    /// omega_c * R`).
    pub fn auto_tune(&mut self, omega_c: f32, resistance: f32, inductance: f32) {
        self.p_gain = omega_c * inductance;
        self.i_gain = omega_c * resistance;
    }

    /// One PI update: `err = desired - measured`, integral accumulated over
    /// `period`, conditional-integration anti-windup when enabled.
    pub fn update(&mut self, desired: f32, measured: f32, period: f32) -> f32 {
        let err = desired - measured;
        self.err = err;
        let tentative_integral = self.integral + err * period;
        let unclamped = self.p_gain * err + self.i_gain * tentative_integral;

        if !self.anti_windup {
            self.integral = tentative_integral;
            return unclamped;
        }

        if unclamped > self.sat_limit {
            // Only let the integral keep accumulating if doing so would not
            // grow it past saturation; i.e. only if the error is already
            // pulling back the other way.
            if err <= 0.0 {
                self.integral = tentative_integral;
            }
            self.sat_limit
        } else if unclamped < -self.sat_limit {
            if err >= 0.0 {
                self.integral = tentative_integral;
            }
            -self.sat_limit
        } else {
            self.integral = tentative_integral;
            unclamped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_setpoint_for_a_first_order_plant() {
        // A simple `di/dt = (u - R*i) / L` plant driven by the PI output.
        let r = 0.1;
        let l = 1e-4;
        let bandwidth = 1000.0;
        let mut pi = PiController::new(0.0, 0.0, 1e6);
        pi.auto_tune(bandwidth, r, l);

        let dt = 1e-6;
        let mut measured = 0.0;
        let desired = 5.0;
        // Bound from the specification's PI steady-state property (§8.9).
        let settle_time = 5.0 / (pi.p_gain * pi.i_gain).sqrt();
        let steps = (settle_time / dt) as u32;

        for _ in 0..steps {
            let u = pi.update(desired, measured, dt);
            let di_dt = (u - r * measured) / l;
            measured += di_dt * dt;
        }

        assert!(
            (measured - desired).abs() / desired < 0.01,
            "measured {measured} did not converge to {desired}"
        );
    }

    #[test]
    fn anti_windup_keeps_output_within_saturation() {
        let mut pi = PiController::new(10.0, 10.0, 1.0);
        pi.anti_windup = true;
        for _ in 0..1000 {
            let u = pi.update(100.0, 0.0, 1e-3);
            assert!(u <= 1.0 + 1e-6 && u >= -1.0 - 1e-6);
        }
    }
}
