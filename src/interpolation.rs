//! Interpolation of rotors along the rotation manifold.
//!
//! [`slerp`] moves along the geodesic between two rotors. [`squad`] blends two such geodesics
//! into a smooth cubic curve given a pair of control points, and [`squad_sequence`] and
//! [`QuaternionInterpolator`] pick those control points from the neighbouring samples of a rotor
//! time series, so that the interpolated curve passes through every sample with a continuous
//! angular velocity.
//!
//! The input rotors should be sign-continuous (see [`unflip_rotors`]); otherwise the curve will
//! take the long way around between the flipped samples.
//!
//! [`unflip_rotors`]: crate::continuity::unflip_rotors

use crate::error::{ensure_at_least, ensure_same_len, QuaternionError, Result};
use crate::{IntervalSearch, Quaternion};

/// Spherical linear interpolation, `(qb / qa)^t qa`.
///
/// Gives `qa` at `t = 0` and `qb` at `t = 1`; other values of `t` extrapolate along the same
/// geodesic.
///
/// Fails if `qb / qa` is a negative real quaternion (ie, `qb = -qa`), since there is then no
/// unique geodesic.
pub fn slerp(t: f64, qa: &Quaternion, qb: &Quaternion) -> Result<Quaternion> {
    Ok((*qb / *qa).pow(t)? * *qa)
}

/// Like [`slerp`], but along the shorter of the two geodesics from `qa` to the rotation `qb`.
///
/// `qb` and `-qb` are the same rotation. If `qb` lies on the far side of the double cover
/// (negative four-dimensional dot product with `qa`), `-qb` is used instead, so that `t = 1`
/// gives `-qb`. Rotors that are antipodal in the double cover (`qb = -qa`) describe the same
/// rotation and interpolate to a constant.
pub fn slerp_shortest(t: f64, qa: &Quaternion, qb: &Quaternion) -> Result<Quaternion> {
    if qa.w() * qb.w() + qa.dot(qb) < 0. {
        slerp(t, qa, &-*qb)
    } else {
        slerp(t, qa, qb)
    }
}

/// Spherical quadrangle interpolation between `q0` and `q1` with control points `c0` and `c1`.
///
/// This is the quaternion analogue of a cubic Bézier segment built from nested [`slerp`]s:
/// `slerp(2t(1 - t), slerp(t, q0, q1), slerp(t, c0, c1))`.
pub fn squad(
    t: f64,
    q0: &Quaternion,
    c0: &Quaternion,
    c1: &Quaternion,
    q1: &Quaternion,
) -> Result<Quaternion> {
    slerp(2. * t * (1. - t), &slerp(t, q0, q1)?, &slerp(t, c0, c1)?)
}

/// The control points `(A[i], B[i + 1])` for the bracket between samples `i` and `i + 1`.
///
/// Samples `i - 1` and `i + 2` are needed too. Where they do not exist they are replaced by
/// reflecting the neighbouring sample through the nearest end, with the same time step.
fn control_points(t: &[f64], q: &[Quaternion], i: usize) -> Result<(Quaternion, Quaternion)> {
    let n = q.len();
    let (qi, qip1) = (q[i], q[i + 1]);
    let dti = t[i + 1] - t[i];
    let (qim1, dtim1) = if i == 0 {
        (qi * qip1.conjugate() * qi, dti)
    } else {
        (q[i - 1], t[i] - t[i - 1])
    };
    let (qip2, dtip1) = if i + 2 == n {
        (qip1 * qi.conjugate() * qip1, dti)
    } else {
        (q[i + 2], t[i + 2] - t[i + 1])
    };

    let forward = (qi.conjugate() * qip1).log()?;
    let across = (qip1 * qi.conjugate()).log()? * 2.;
    let a = qi
        * ((forward + (qim1.conjugate() * qi).log()? * (dti / dtim1) - across) * 0.25).exp();
    let b = qip1
        * (((qip1.conjugate() * qip2).log()? * (dti / dtip1) + forward - across) * -0.25).exp();
    Ok((a, b))
}

/// Checks that `time` lies within the sampled range `t`.
fn ensure_within(t: &[f64], time: f64) -> Result<()> {
    let (first, last) = (t[0], t[t.len() - 1]);
    if (first..=last).contains(&time) {
        Ok(())
    } else {
        Err(QuaternionError::CannotExtrapolateQuaternions { time, first, last })
    }
}

/// Evaluates the squad segment of bracket `i` at `time`.
fn evaluate(
    t: &[f64],
    q: &[Quaternion],
    i: usize,
    (a, b): &(Quaternion, Quaternion),
    time: f64,
) -> Result<Quaternion> {
    let tau = (time - t[i]) / (t[i + 1] - t[i]);
    squad(tau, &q[i], a, b, &q[i + 1])
}

/// Squad interpolation of the rotors `q_in` sampled at `t_in` onto the times `t_out`.
///
/// `t_in` must be strictly increasing and hold at least two samples. `t_out` is expected to be
/// ascending, which lets the search for each output's bracket pick up where the previous one
/// left off. Every time in `t_out` must lie within `t_in`; anything outside of it fails with
/// [`QuaternionError::CannotExtrapolateQuaternions`].
///
/// The result passes through the input samples, and reduces to uniform rotation when all the
/// input samples lie on one uniform rotation.
pub fn squad_sequence(t_in: &[f64], q_in: &[Quaternion], t_out: &[f64]) -> Result<Vec<Quaternion>> {
    ensure_same_len(q_in.len(), t_in.len())?;
    ensure_at_least(2, t_in.len())?;

    let mut out = Vec::with_capacity(t_out.len());
    let mut bracket = 0;
    // control points of the most recently visited bracket; only visited brackets are computed
    let mut cached: Option<(usize, (Quaternion, Quaternion))> = None;
    for &time in t_out {
        ensure_within(t_in, time)?;
        if time < t_in[bracket] {
            // out of order; start over
            bracket = 0;
        }
        while bracket + 2 < t_in.len() && t_in[bracket + 1] < time {
            bracket += 1;
        }
        let controls = match cached {
            Some((i, controls)) if i == bracket => controls,
            _ => {
                let controls = control_points(t_in, q_in, bracket)?;
                cached = Some((bracket, controls));
                controls
            }
        };
        out.push(evaluate(t_in, q_in, bracket, &controls, time)?);
    }
    Ok(out)
}

/// Squad interpolation of a fixed rotor time series, for repeated evaluation at single times.
///
/// All control points are computed up front, and the bracket of each query is found with an
/// [`IntervalSearch`] that remembers where the previous query landed. Querying at increasing times
/// is therefore cheap.
///
/// ```
/// use rotor_frames::{Quaternion, QuaternionInterpolator};
///
/// let t = [0., 1., 2., 3.];
/// let q: Vec<_> = t.iter().map(|t| (Quaternion::Z * (0.05 * t)).exp()).collect();
/// let mut interpolator = QuaternionInterpolator::new(&t, &q)?;
///
/// let halfway = interpolator.interpolate(1.5)?;
/// assert!((halfway - (Quaternion::Z * 0.075).exp()).abs() < 1e-12);
/// assert!(interpolator.interpolate(3.5).is_err());
/// # Ok::<(), rotor_frames::QuaternionError>(())
/// ```
#[derive(Clone, Debug)]
pub struct QuaternionInterpolator {
    search: IntervalSearch<f64>,
    rotors: Vec<Quaternion>,
    controls: Vec<(Quaternion, Quaternion)>,
}

impl QuaternionInterpolator {
    /// Prepares interpolation of the rotors `q` sampled at the strictly increasing times `t`.
    ///
    /// Needs at least two samples.
    pub fn new(t: &[f64], q: &[Quaternion]) -> Result<Self> {
        ensure_same_len(q.len(), t.len())?;
        ensure_at_least(2, t.len())?;
        let controls = (0..t.len() - 1)
            .map(|i| control_points(t, q, i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            search: IntervalSearch::new(t.to_vec())?,
            rotors: q.to_vec(),
            controls,
        })
    }

    /// The interpolated rotor at `time`.
    ///
    /// Fails with [`QuaternionError::CannotExtrapolateQuaternions`] if `time` lies outside of the
    /// sampled times.
    pub fn interpolate(&mut self, time: f64) -> Result<Quaternion> {
        ensure_within(self.search.keys(), time)?;
        let i = self.search.find(time);
        evaluate(
            self.search.keys(),
            &self.rotors,
            i,
            &self.controls[i],
            time,
        )
    }
}
