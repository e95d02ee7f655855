//! Construction of rotor sequences (frames) from sampled basis vectors.
//!
//! A _frame_ here is a time series of rotors `R[i]` such that `R[i] x R[i]⁻¹`, `R[i] y R[i]⁻¹`,
//! and `R[i] z R[i]⁻¹` are the frame's basis vectors at time `t[i]` (with `x`, `y`, `z` the fixed
//! unit pure quaternions [`Quaternion::X`], [`Quaternion::Y`], and [`Quaternion::Z`]). Vectors
//! are passed in as pure quaternions.
//!
//! If all three basis vectors are known, the frame is fixed up to sign; [`frame_from_xy`]
//! computes it from the X and Y directions. If only the Z direction is known (say, the direction
//! of a binary's orbital angular momentum), the rotation _about_ Z is left undetermined. That
//! twist is unphysical, and [`frame_from_z`] removes it by imposing the minimal-rotation
//! condition (no angular velocity along Z) through [`minimal_rotation`].

use crate::continuity::{unflip_rotors, DEFAULT_DISCONTINUITY};
use crate::differentiation::centered_differencing;
use crate::error::{ensure_same_len, QuaternionError, Result};
use crate::{scalar_integral, Quaternion};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The default number of fixed-point sweeps performed by [`minimal_rotation`].
pub const DEFAULT_ITERATIONS: usize = 5;

/// Tunables for [`frame_from_z_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameOptions {
    /// Number of [`minimal_rotation`] sweeps.
    pub iterations: usize,
    /// Threshold passed to [`unflip_rotors`].
    pub discontinuity: f64,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            discontinuity: DEFAULT_DISCONTINUITY,
        }
    }
}

impl FrameOptions {
    /// Sets the number of minimal-rotation sweeps.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the sign-continuity threshold.
    #[must_use]
    pub fn with_discontinuity(mut self, discontinuity: f64) -> Self {
        self.discontinuity = discontinuity;
        self
    }
}

/// The rate of change of half the twist angle about the frame's own z axis at each sample.
fn twist_rates(r: &[Quaternion], t: &[f64]) -> Result<Vec<f64>> {
    let rdot = centered_differencing(r, t)?;
    Ok(r.iter()
        .zip(&rdot)
        .map(|(r, rdot)| (r.conjugate() * *rdot * Quaternion::Z).w())
        .collect())
}

/// Removes the twist about z from the frame `r` sampled at times `t`.
///
/// Every `r[i]` is assumed to already carry z to the desired direction at `t[i]`. The result
/// carries z to the same directions, but the rotation about those directions is adjusted so that
/// the frame's angular velocity has no component along its own z axis (the minimal-rotation
/// condition).
///
/// Each of the `iterations` sweeps differentiates the current frame, integrates the twist rate
/// over time, and right-multiplies every rotor by the inverse twist `exp(γ(t)/2 z)`. Exactly that
/// many sweeps are performed; there is no convergence check.
pub fn minimal_rotation(r: &[Quaternion], t: &[f64], iterations: usize) -> Result<Vec<Quaternion>> {
    ensure_same_len(r.len(), t.len())?;

    let mut frame = r.to_vec();
    for iteration in 0..iterations {
        let gamma_over_2_dot = twist_rates(&frame, t)?;
        let residual = gamma_over_2_dot.iter().fold(0_f64, |max, rate| max.max(rate.abs()));
        tracing::debug!(iteration, residual, "minimal-rotation sweep");

        let gamma_over_2 = scalar_integral(&gamma_over_2_dot, t)?;
        for (rotor, half_angle) in frame.iter_mut().zip(gamma_over_2) {
            *rotor = *rotor * (Quaternion::Z * half_angle).exp();
        }
    }
    Ok(frame)
}

/// Constructs the frame whose x and y basis vectors are `x[k]` and `y[k]` at each sample.
///
/// The inputs are unit pure quaternions. The returned rotors take the fixed `(x, y, z)` onto
/// `(X, Y, X × Y)`.
///
/// Fails with [`QuaternionError::InfinitelyManySolutions`] if some `X[k]` is exactly `-x`, where
/// the principal rotor carrying x onto `X[k]` is undefined.
pub fn frame_from_xy(x: &[Quaternion], y: &[Quaternion]) -> Result<Vec<Quaternion>> {
    ensure_same_len(x.len(), y.len())?;

    x.iter()
        .zip(y)
        .map(|(big_x, big_y)| {
            // carries x onto X, with some arbitrary rotation about X
            let ra = (-*big_x * Quaternion::X).sqrt_of_rotor()?;
            let beta = f64::atan2(
                ra.rotate(&Quaternion::Z).dot(big_y),
                ra.rotate(&Quaternion::Y).dot(big_y),
            );
            Ok(ra * (Quaternion::X * (beta / 2.)).exp())
        })
        .collect()
}

/// Constructs the minimal-rotation frame whose z basis vector is `z[k]` at time `t[k]`.
///
/// Equivalent to [`frame_from_z_with`] with `iterations` sweeps and the default sign-continuity
/// threshold.
pub fn frame_from_z(z: &[Quaternion], t: &[f64], iterations: usize) -> Result<Vec<Quaternion>> {
    frame_from_z_with(z, t, &FrameOptions::default().with_iterations(iterations))
}

/// Constructs the minimal-rotation frame whose z basis vector is `z[k]` at time `t[k]`.
///
/// The inputs are unit pure quaternions. Each sample is first aligned independently with the
/// principal rotor `sqrt(-Z[k] z)` taking z onto `Z[k]`. Those rotors are then made
/// sign-continuous with [`unflip_rotors`], and their twist is removed with [`minimal_rotation`].
///
/// Fails with [`QuaternionError::InfinitelyManySolutions`] if some `Z[k]` is exactly `-z`, where
/// that principal rotor is undefined.
pub fn frame_from_z_with(
    z: &[Quaternion],
    t: &[f64],
    options: &FrameOptions,
) -> Result<Vec<Quaternion>> {
    ensure_same_len(z.len(), t.len())?;

    tracing::debug!(samples = z.len(), "aligning z axes");
    let aligned = z
        .iter()
        .map(|big_z| (-*big_z * Quaternion::Z).sqrt())
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(iterations = options.iterations, "removing twist");
    minimal_rotation(
        &unflip_rotors(&aligned, options.discontinuity),
        t,
        options.iterations,
    )
}

/// The rotation between the frames `r1` and `r2`, normalized to the identity at sample
/// `fiducial`.
///
/// Computes `r1[i] offset r2[i]⁻¹` with `offset = r1[fiducial]⁻¹ r2[fiducial]`.
pub fn r_delta(r1: &[Quaternion], r2: &[Quaternion], fiducial: usize) -> Result<Vec<Quaternion>> {
    ensure_same_len(r1.len(), r2.len())?;
    let (Some(r1_fiducial), Some(r2_fiducial)) = (r1.get(fiducial), r2.get(fiducial)) else {
        return Err(QuaternionError::IndexOutOfBounds {
            index: fiducial,
            len: r1.len(),
        });
    };

    let offset = r1_fiducial.inverse() * *r2_fiducial;
    Ok(r1
        .iter()
        .zip(r2)
        .map(|(a, b)| *a * offset * b.inverse())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;
    use uom::si::angle::radian;
    use uom::si::f64::Angle;

    fn rad(radians: f64) -> Angle {
        Angle::new::<radian>(radians)
    }

    fn times(n: u32, dt: f64) -> Vec<f64> {
        (0..n).map(|i| f64::from(i) * dt).collect()
    }

    /// Z precessing about the fixed z axis at the given opening angle, like the orbital angular
    /// momentum of a precessing binary.
    fn precessing_z(t: &[f64], opening: f64, rate: f64) -> Vec<Quaternion> {
        t.iter()
            .map(|t| {
                Quaternion::pure(
                    opening.sin() * (rate * t).cos(),
                    opening.sin() * (rate * t).sin(),
                    opening.cos(),
                )
            })
            .collect()
    }

    fn max_twist_rate(r: &[Quaternion], t: &[f64]) -> f64 {
        twist_rates(r, t)
            .unwrap()
            .iter()
            .fold(0., |max: f64, rate| max.max(rate.abs()))
    }

    #[test]
    fn frame_from_z_follows_z() {
        let t = times(300, 0.02);
        let z = precessing_z(&t, 0.4, 2.);
        let frame = frame_from_z(&z, &t, DEFAULT_ITERATIONS).unwrap();
        assert_eq!(frame.len(), z.len());
        for (r, z) in frame.iter().zip(&z) {
            assert_relative_eq!(r.rotate(&Quaternion::Z), *z, epsilon = 1e-12);
            assert_relative_eq!(r.abs(), 1., epsilon = 1e-12);
        }
    }

    #[test]
    fn frame_from_z_is_sign_continuous() {
        // sweeps Z through the south pole, where sqrt(-Z z) is poorly conditioned
        let t = times(200, 0.01);
        let z: Vec<_> = t
            .iter()
            .map(|t| Quaternion::pure((2. * t).sin(), 0.1, (2. * t).cos()).normalized())
            .collect();
        let frame = frame_from_z(&z, &t, 2).unwrap();
        for pair in frame.windows(2) {
            assert!((pair[1] - pair[0]).abs() < DEFAULT_DISCONTINUITY);
        }
    }

    #[test]
    fn minimal_rotation_removes_twist() {
        let t = times(400, 0.01);
        let z = precessing_z(&t, 0.5, 1.5);
        // a frame carrying z onto Z, but with a gratuitous twist about Z
        let twisted: Vec<_> = z
            .iter()
            .zip(&t)
            .map(|(z, t)| (-*z * Quaternion::Z).sqrt().unwrap() * (Quaternion::Z * (0.8 * t)).exp())
            .collect();
        let before = max_twist_rate(&twisted, &t);

        let frame = minimal_rotation(&twisted, &t, DEFAULT_ITERATIONS).unwrap();
        let after = max_twist_rate(&frame, &t);
        assert!(after < 1e-3 * before, "{after} is not much less than {before}");

        // a second run is near a fixed point
        let again = minimal_rotation(&frame, &t, DEFAULT_ITERATIONS).unwrap();
        assert!(max_twist_rate(&again, &t) <= after + 1e-9);
        for (r, z) in again.iter().zip(&z) {
            assert_relative_eq!(r.rotate(&Quaternion::Z), *z, epsilon = 1e-10);
        }
    }

    #[test]
    fn antipodal_axes_are_rejected() {
        let near_south = Quaternion::pure(0.1, 0., -1.).normalized();
        let z = [Quaternion::Z, near_south, -Quaternion::Z];
        assert_eq!(
            frame_from_z(&z, &[0., 1., 2.], 1),
            Err(QuaternionError::InfinitelyManySolutions { w: -1. })
        );
        // without the antipode, every rotor is finite and tracks Z
        let frame = frame_from_z(&z[..2], &[0., 1.], 1).unwrap();
        for (r, z) in frame.iter().zip(&z) {
            assert!(r.abs().is_finite());
            assert_relative_eq!(r.rotate(&Quaternion::Z), *z, epsilon = 1e-12);
        }

        assert_eq!(
            frame_from_xy(&[-Quaternion::X], &[Quaternion::Y]),
            Err(QuaternionError::InfinitelyManySolutions { w: -1. })
        );
    }

    #[test]
    fn zero_iterations_is_identity() {
        let t = times(5, 1.);
        let r = vec![Quaternion::from_axis_angle(rad(0.3), &Vector3::x()); 5];
        assert_eq!(minimal_rotation(&r, &t, 0).unwrap(), r);
    }

    #[rstest]
    #[case(3, 4)]
    #[case(5, 0)]
    fn size_mismatches(#[case] n_rotors: usize, #[case] n_times: usize) {
        let r = vec![Quaternion::ONE; n_rotors];
        let t: Vec<_> = (0..n_times).map(|i| i as f64).collect();
        let expected = Err(QuaternionError::VectorSizeMismatch {
            left: n_rotors,
            right: n_times,
        });
        assert_eq!(minimal_rotation(&r, &t, 1), expected);
        assert_eq!(frame_from_z(&r, &t, 1), expected);
        assert_eq!(frame_from_xy(&r, &vec![Quaternion::X; n_times]), expected);
        assert_eq!(r_delta(&r, &vec![Quaternion::ONE; n_times], 0), expected);
    }

    #[test]
    fn frame_from_xy_reproduces_basis() {
        let rotors: Vec<_> = (0..20)
            .map(|i| {
                let i = f64::from(i);
                Quaternion::from_euler_angles(rad(0.3 * i), rad(0.1 + 0.05 * i), rad(-0.2 * i))
            })
            .collect();
        let x: Vec<_> = rotors.iter().map(|r| r.rotate(&Quaternion::X)).collect();
        let y: Vec<_> = rotors.iter().map(|r| r.rotate(&Quaternion::Y)).collect();

        let frame = frame_from_xy(&x, &y).unwrap();
        for ((r, x), y) in frame.iter().zip(&x).zip(&y) {
            assert_relative_eq!(r.rotate(&Quaternion::X), *x, epsilon = 1e-12);
            assert_relative_eq!(r.rotate(&Quaternion::Y), *y, epsilon = 1e-12);
        }
        // the frame is unique up to sign
        for (r, expected) in frame.iter().zip(&rotors) {
            let same_sheet = r.w() * expected.w() + r.dot(expected) > 0.;
            let aligned = if same_sheet { *r } else { -*r };
            assert_relative_eq!(aligned, *expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn r_delta_is_identity_at_fiducial() {
        let r1: Vec<_> = (0..6)
            .map(|i| Quaternion::from_axis_angle(rad(0.2 * f64::from(i)), &Vector3::z()))
            .collect();
        let r2: Vec<_> = (0..6)
            .map(|i| Quaternion::from_axis_angle(rad(0.1 * f64::from(i) + 0.4), &Vector3::x()))
            .collect();
        let delta = r_delta(&r1, &r2, 2).unwrap();
        assert_relative_eq!(delta[2], Quaternion::ONE, epsilon = 1e-14);

        // identical frames never drift apart
        for d in r_delta(&r1, &r1, 4).unwrap() {
            assert_relative_eq!(d, Quaternion::ONE, epsilon = 1e-14);
        }

        assert_eq!(
            r_delta(&r1, &r2, 6),
            Err(QuaternionError::IndexOutOfBounds { index: 6, len: 6 })
        );
    }

    #[test]
    fn options() {
        let options = FrameOptions::default()
            .with_iterations(2)
            .with_discontinuity(1.);
        assert_eq!(
            options,
            FrameOptions {
                iterations: 2,
                discontinuity: 1.
            }
        );
        let de: FrameOptions = serde_yaml::from_str("iterations: 3").unwrap();
        assert_eq!(de, FrameOptions::default().with_iterations(3));
    }

    quickcheck! {
        fn r_delta_of_common_rotation_is_constant(r: Quaternion, s: Quaternion, u: Quaternion) -> () {
            // frames that differ by a constant body-fixed rotation never drift apart
            let r1 = vec![r, r * u];
            let r2 = vec![r * s, r * u * s];
            let delta = r_delta(&r1, &r2, 0).unwrap();
            assert_relative_eq!(delta[1], Quaternion::ONE, epsilon = 1e-12);
        }
    }
}
