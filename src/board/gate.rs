//! Commanded vs. actual gate state, including dead-time lockout.

/// A controller's requested switch state for one phase's half-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commanded {
    Low,
    High,
}

/// The half-bridge's real output after dead-time resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actual {
    Low,
    High,
    Off,
}

/// Commanded and actual gate state for all three phases, with per-phase
/// dead-time countdowns.
#[derive(Debug, Clone, PartialEq)]
pub struct GateState {
    pub commanded: [Commanded; 3],
    pub actual: [Actual; 3],
    pub dead_time: f32,
    pub dead_time_remaining: [f32; 3],
}

impl GateState {
    /// Gates start already settled at `Commanded::Low` — power-on is not
    /// modeled as a transition, so there is no initial dead-time lockout.
    pub fn new(dead_time: f32) -> Self {
        Self {
            commanded: [Commanded::Low; 3],
            actual: [Actual::Low; 3],
            dead_time,
            dead_time_remaining: [0.0; 3],
        }
    }

    /// Request a new commanded state for one phase. If it differs from the
    /// current commanded state, the actual output drops to `Off` and the
    /// dead-time countdown restarts.
    pub fn set_commanded(&mut self, phase: usize, commanded: Commanded) {
        if self.commanded[phase] != commanded {
            self.commanded[phase] = commanded;
            if self.dead_time <= 0.0 {
                // No lockout configured: the transition completes instantly.
                self.actual[phase] = match commanded {
                    Commanded::Low => Actual::Low,
                    Commanded::High => Actual::High,
                };
                self.dead_time_remaining[phase] = 0.0;
            } else {
                self.actual[phase] = Actual::Off;
                self.dead_time_remaining[phase] = self.dead_time;
            }
        }
    }

    /// Advance the dead-time countdowns by `dt`; when a phase's countdown
    /// reaches zero, its actual state snaps to its commanded state.
    ///
    /// The zero check tolerates a small slack proportional to `dt` rather
    /// than comparing against exactly `0.0`: repeated `f32` subtraction
    /// leaves a residual of a few `1e-13` after the last decrement for
    /// typical `dead_time`/`dt` ratios, which would otherwise hold the
    /// phase `Off` for one extra tick.
    pub fn advance(&mut self, dt: f32) {
        let slack = dt * 1e-3;
        for phase in 0..3 {
            if self.dead_time_remaining[phase] > 0.0 {
                let remaining = self.dead_time_remaining[phase] - dt;
                if remaining <= slack {
                    self.dead_time_remaining[phase] = 0.0;
                    self.actual[phase] = match self.commanded[phase] {
                        Commanded::Low => Actual::Low,
                        Commanded::High => Actual::High,
                    };
                } else {
                    self.dead_time_remaining[phase] = remaining;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_holds_off_for_exactly_the_dead_time_tick_count() {
        let dt = 0.5e-6;
        let dead_time = 2e-6;
        let mut gate = GateState::new(dead_time);
        // Settle the initial Off state.
        for _ in 0..10 {
            gate.advance(dt);
        }
        assert_eq!(gate.actual[0], Actual::Low);

        gate.set_commanded(0, Commanded::High);
        assert_eq!(gate.actual[0], Actual::Off);

        let expected_off_ticks = (dead_time / dt).ceil() as u32;
        let mut off_ticks = 0;
        for _ in 0..expected_off_ticks {
            assert_eq!(gate.actual[0], Actual::Off);
            gate.advance(dt);
            off_ticks += 1;
        }
        assert_eq!(off_ticks, expected_off_ticks);
        assert_eq!(gate.actual[0], Actual::High);
    }

    #[test]
    fn unchanged_commanded_state_does_not_reset_timer() {
        let mut gate = GateState::new(1e-6);
        gate.advance(1e-6);
        assert_eq!(gate.actual[0], Actual::Low);
        gate.set_commanded(0, Commanded::Low);
        assert_eq!(gate.actual[0], Actual::Low);
        assert_eq!(gate.dead_time_remaining[0], 0.0);
    }
}
