//! Coordinate transforms and harmonic series shared by the physics integrator
//! and the FOC controller.

use core::f32::consts::PI;
use num_complex::Complex32;
use num_traits::Float;

/// Number of odd harmonics carried by a back-EMF coefficient set.
pub const NUM_BEMF_HARMONICS: usize = 5;

/// `[sin θ, sin 3θ, sin 5θ, sin 7θ, sin 9θ]`, computed by an angle-addition
/// recurrence rather than five independent `sin` calls: `cur` is rotated by
/// `rot(2θ)` each step, so the whole series costs one `sin`/`cos` pair plus
/// four complex multiplies.
pub fn odd_sine_series(theta: f32) -> [f32; NUM_BEMF_HARMONICS] {
    let step = rot(2.0 * theta);
    let mut cur = rot(theta);
    let mut out = [0.0; NUM_BEMF_HARMONICS];
    for slot in out.iter_mut() {
        *slot = cur.im;
        cur *= step;
    }
    out
}

/// Unit phasor `cos φ + j sin φ`.
pub fn rot(phi: f32) -> Complex32 {
    Complex32::new(Float::cos(phi), Float::sin(phi))
}

/// Amplitude-invariant Clarke transform: three phase quantities to the
/// stationary αβ frame, packed as a complex number (`re` = α, `im` = β).
pub fn clarke(abc: [f32; 3]) -> Complex32 {
    let [a, b, c] = abc;
    let alpha = (2.0 * a - b - c) / 3.0;
    let beta = (b - c) / 3f32.sqrt();
    Complex32::new(alpha, beta)
}

/// Inverse Clarke transform: αβ back to three phase quantities.
pub fn inverse_clarke(ab: Complex32) -> [f32; 3] {
    let sqrt3_2 = 3f32.sqrt() / 2.0;
    [
        ab.re,
        -0.5 * ab.re + sqrt3_2 * ab.im,
        -0.5 * ab.re - sqrt3_2 * ab.im,
    ]
}

/// Park transform: stationary αβ to the rotating qd frame at electrical
/// angle `theta_e` (`re` = q, `im` = d).
pub fn park(ab: Complex32, theta_e: f32) -> Complex32 {
    ab * rot(-theta_e)
}

/// Inverse Park transform: rotating qd back to stationary αβ.
pub fn inverse_park(qd: Complex32, theta_e: f32) -> Complex32 {
    qd * rot(theta_e)
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_2pi(theta: f32) -> f32 {
    let two_pi = 2.0 * PI;
    let wrapped = theta % two_pi;
    if wrapped < 0.0 {
        wrapped + two_pi
    } else {
        wrapped
    }
}

/// Flux-aligned electrical angle used by the physics model's bEMF lookups.
pub fn flux_electrical_angle(num_pole_pairs: u8, rotor_angle: f32) -> f32 {
    wrap_2pi(num_pole_pairs as f32 * rotor_angle)
}

/// q-axis electrical angle used by the FOC controller's Park/Clarke
/// transforms; the q axis leads the rotor flux vector by 90 degrees.
pub fn q_axis_electrical_angle(num_pole_pairs: u8, rotor_angle: f32) -> f32 {
    wrap_2pi(flux_electrical_angle(num_pole_pairs, rotor_angle) - PI / 2.0)
}
