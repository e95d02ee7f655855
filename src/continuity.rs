//! Repairs sign discontinuities in rotor sequences.
//!
//! Because `q` and `-q` are the same rotation, a sequence of rotors computed independently at each
//! sample (eg, by [`Quaternion::sqrt`] of some pointwise expression) may jump between the two
//! sheets of the double cover from one sample to the next. The rotation itself is continuous, but
//! anything that differentiates or interpolates the rotors will see a spurious jump of size ~2.

use crate::Quaternion;
use std::f64::consts::SQRT_2;

/// The default for the largest componentwise distance allowed between adjacent rotors.
///
/// Two unit quaternions further apart than `√2` are closer to each other's negatives, so this
/// assumes that the rotation changes by less than 90° between samples.
pub const DEFAULT_DISCONTINUITY: f64 = SQRT_2;

/// Removes sign flips from the rotor sequence `r`.
///
/// The first rotor is kept as is. Every later rotor is negated if its componentwise distance
/// `|r[i] - out[i - 1]|` from the previous _output_ exceeds `discont` (see
/// [`DEFAULT_DISCONTINUITY`]).
///
/// This is a single greedy forward pass; it is not globally optimal and relies on the rotation
/// changing slowly compared to the sampling rate. The rotors are assumed to be normalized.
#[must_use]
pub fn unflip_rotors(r: &[Quaternion], discont: f64) -> Vec<Quaternion> {
    let mut out: Vec<Quaternion> = Vec::with_capacity(r.len());
    let mut flips = 0_usize;
    for &rotor in r {
        let rotor = match out.last() {
            Some(previous) if (rotor - *previous).abs() > discont => {
                flips += 1;
                -rotor
            }
            _ => rotor,
        };
        out.push(rotor);
    }
    tracing::trace!(flips, samples = r.len(), "unflipped rotors");
    out
}
