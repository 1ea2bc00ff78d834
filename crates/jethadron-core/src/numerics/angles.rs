//! Azimuthal wrapping and pseudorapidity ordering helpers shared by every
//! correlation path.

use std::f64::consts::{FRAC_PI_2, TAU};

pub const PI_HALF: f64 = FRAC_PI_2;
pub const TWO_PI: f64 = TAU;

const MAX_CORRECTION_STEPS: usize = 4;

/// Maps `angle` into `[min, min + 2π)`.
///
/// Values already inside the range are returned bit-for-bit unchanged, which
/// makes the operation idempotent. Non-finite input is passed through.
pub fn constrain_angle(angle: f64, min: f64) -> f64 {
    if !angle.is_finite() || !min.is_finite() {
        return angle;
    }
    let upper = min + TWO_PI;
    if (min..upper).contains(&angle) {
        return angle;
    }

    let mut value = min + (angle - min).rem_euclid(TWO_PI);
    for _ in 0..MAX_CORRECTION_STEPS {
        if value >= upper {
            value -= TWO_PI;
        } else if value < min {
            value += TWO_PI;
        } else {
            return value;
        }
    }
    // Rounding left the value on the excluded upper edge.
    min
}

/// Jet-hadron azimuthal difference in `[-π/2, 3π/2)`.
pub fn wrap_delta_phi(dphi: f64) -> f64 {
    constrain_angle(dphi, -PI_HALF)
}

/// Leading/subleading jet azimuthal difference in `[0, 2π)`.
pub fn wrap_dijet_delta_phi(dphi: f64) -> f64 {
    constrain_angle(dphi, 0.0)
}

/// `+1` when the leading jet is the more forward one, `-1` otherwise.
pub fn sign_flip(eta_leading: f64, eta_subleading: f64) -> f64 {
    if eta_leading > eta_subleading {
        1.0
    } else {
        -1.0
    }
}

pub fn delta_r(deta: f64, dphi: f64) -> f64 {
    (deta * deta + dphi * dphi).sqrt()
}

/// Hard-scattering scale reconstructed from an MC event weight.
pub fn pt_hat(weight: f64, exponent: f64) -> f64 {
    10.0 / weight.powf(1.0 / exponent)
}
