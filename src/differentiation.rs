//! Derivatives of rotor-valued curves.
//!
//! Componentwise finite differences of a rotor curve do not respect the rotation manifold.
//! Instead, the relative rotation between neighbouring samples is taken to the Lie algebra with a
//! logarithm, differenced there, and mapped back by left-multiplying with the rotor at the sample.

use crate::error::{ensure_at_least, ensure_same_len, Result};
use crate::Quaternion;

/// The time derivative `dQ/dt` of the rotor curve `q` sampled at the strictly increasing times `t`.
///
/// At the two ends this uses one-sided differences,
///
/// ```text
/// dQ[0]   = Q[0]   log(Q[0]⁻¹ Q[1])     / (t[1] - t[0])
/// dQ[n-1] = Q[n-1] log(Q[n-2]⁻¹ Q[n-1]) / (t[n-1] - t[n-2])
/// ```
///
/// and at interior points the plain average of the forward and backward body-frame slopes,
/// left-multiplied by `Q[i]`. The average is _not_ weighted by the adjacent step sizes, so
/// non-uniform sampling lowers the accuracy at interior points.
///
/// Since `dQ = Q ω / 2` for a body-frame angular velocity `ω`, `2 Q⁻¹ dQ` recovers that angular
/// velocity as a pure quaternion.
///
/// Requires at least two samples, and fails if a relative rotation between neighbours is a
/// rotation by exactly 2π (whose logarithm is not unique).
pub fn centered_differencing(q: &[Quaternion], t: &[f64]) -> Result<Vec<Quaternion>> {
    ensure_same_len(q.len(), t.len())?;
    ensure_at_least(2, q.len())?;

    // body-frame slope between samples i and i + 1
    let slopes = q
        .windows(2)
        .zip(t.windows(2))
        .map(|(q, t)| Ok((q[0].inverse() * q[1]).log()? / (t[1] - t[0])))
        .collect::<Result<Vec<_>>>()?;

    let n = q.len();
    let mut dq = Vec::with_capacity(n);
    dq.push(q[0] * slopes[0]);
    for i in 1..n - 1 {
        dq.push(q[i] * ((slopes[i] + slopes[i - 1]) * 0.5));
    }
    dq.push(q[n - 1] * slopes[n - 2]);
    Ok(dq)
}
