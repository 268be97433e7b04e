//! Trapezoidal six-step commutation with phase advance.

use crate::board::Commanded;
use core::f32::consts::PI;

/// Select the `(commanded_a, commanded_b, commanded_c)` triple for the
/// sector containing `theta_e + 2π·phase_advance`, per the standard
/// commutation table (A+B−, A+C−, B+C−, B+A−, C+A−, C+B−). Six-step drive
/// only energizes two phases at a time; the idle leg for a sector is
/// returned as `None` here and driven `Commanded::Low` by the caller
/// (`control::dispatch`), since this model always drives all three lines.
pub fn six_step_gates(theta_e: f32, phase_advance: f32) -> [Option<Commanded>; 3] {
    let shifted = crate::math::wrap_2pi(theta_e + 2.0 * PI * phase_advance);
    let sector = (shifted / (PI / 3.0)).floor() as i32 % 6;

    use Commanded::{High, Low};
    match sector {
        0 => [Some(High), Some(Low), None],  // A+B-
        1 => [Some(High), None, Some(Low)],  // A+C-
        2 => [None, Some(High), Some(Low)],  // B+C-
        3 => [Some(Low), Some(High), None],  // B+A-
        4 => [Some(Low), None, Some(High)],  // C+A-
        5 => [None, Some(Low), Some(High)],  // C+B-
        _ => unreachable!("sector is always reduced into 0..6"),
    }
}
