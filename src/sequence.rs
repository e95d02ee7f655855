//! Elementwise arithmetic over sequences of quaternions and reals.
//!
//! Every binary operation here accepts any combination of single values and sequences on either
//! side: `f64` or `&[f64]`, and [`Quaternion`] or `&[Quaternion]`. A single value is broadcast
//! against every element of the other operand. When both operands are sequences they must have
//! the same length, or the operation fails with [`QuaternionError::VectorSizeMismatch`].
//!
//! ```
//! use rotor_frames::{sequence, Quaternion};
//!
//! let qs = [Quaternion::ONE, Quaternion::X, Quaternion::Y];
//! let scaled = sequence::mul(&[1., 2., 3.][..], &qs[..])?;
//! assert_eq!(scaled[2], Quaternion::pure(0., 3., 0.));
//!
//! let shifted = sequence::add(&qs[..], &1.)?;
//! assert_eq!(shifted[1], Quaternion::new(1., 1., 0., 0.));
//!
//! assert!(sequence::add(&[1., 2.][..], &qs[..]).is_err());
//! # Ok::<(), rotor_frames::QuaternionError>(())
//! ```

use crate::error::{ensure_same_len, QuaternionError, Result};
use crate::Quaternion;
use std::ops::{Add, Div, Mul, Sub};
use uom::si::f64::Angle;

/// One side of a broadcast operation: either a single value or a sequence of values.
pub trait Operand<T> {
    /// The number of elements, or `None` for a single value that broadcasts to any length.
    fn len(&self) -> Option<usize>;

    /// The element at `index`. Single values return themselves for every index.
    ///
    /// `index` is always less than [`Operand::len`] when that is `Some`.
    fn get(&self, index: usize) -> T;
}

impl Operand<f64> for f64 {
    fn len(&self) -> Option<usize> {
        None
    }

    fn get(&self, _: usize) -> f64 {
        *self
    }
}

impl Operand<Quaternion> for Quaternion {
    fn len(&self) -> Option<usize> {
        None
    }

    fn get(&self, _: usize) -> Quaternion {
        *self
    }
}

impl<T: Copy> Operand<T> for [T] {
    fn len(&self) -> Option<usize> {
        Some(<[T]>::len(self))
    }

    fn get(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Copy> Operand<T> for Vec<T> {
    fn len(&self) -> Option<usize> {
        Some(Vec::len(self))
    }

    fn get(&self, index: usize) -> T {
        self[index]
    }
}

impl<T, O> Operand<T> for &O
where
    O: Operand<T> + ?Sized,
{
    fn len(&self) -> Option<usize> {
        (**self).len()
    }

    fn get(&self, index: usize) -> T {
        (**self).get(index)
    }
}

/// The output length of a broadcast between operands of the given lengths.
fn broadcast_len(lhs: Option<usize>, rhs: Option<usize>) -> Result<usize> {
    match (lhs, rhs) {
        (Some(l), Some(r)) => ensure_same_len(l, r).map(|()| l),
        (Some(n), None) | (None, Some(n)) => Ok(n),
        (None, None) => Ok(1),
    }
}

/// Applies `op` elementwise to `lhs` and `rhs`, broadcasting single values.
///
/// Two single values produce a one-element output.
pub fn broadcast<A, B, O, L, R>(lhs: &L, rhs: &R, op: impl Fn(A, B) -> O) -> Result<Vec<O>>
where
    L: Operand<A> + ?Sized,
    R: Operand<B> + ?Sized,
{
    let len = broadcast_len(lhs.len(), rhs.len())?;
    Ok((0..len).map(|i| op(lhs.get(i), rhs.get(i))).collect())
}

/// Like [`broadcast`], but for fallible operations; stops at the first failing element.
pub fn try_broadcast<A, B, O, L, R>(
    lhs: &L,
    rhs: &R,
    op: impl Fn(A, B) -> Result<O>,
) -> Result<Vec<O>>
where
    L: Operand<A> + ?Sized,
    R: Operand<B> + ?Sized,
{
    let len = broadcast_len(lhs.len(), rhs.len())?;
    (0..len).map(|i| op(lhs.get(i), rhs.get(i))).collect()
}

/// Elementwise `lhs + rhs`.
pub fn add<A, B, L, R>(lhs: &L, rhs: &R) -> Result<Vec<A::Output>>
where
    A: Add<B>,
    L: Operand<A> + ?Sized,
    R: Operand<B> + ?Sized,
{
    broadcast(lhs, rhs, A::add)
}

/// Elementwise `lhs - rhs`.
pub fn sub<A, B, L, R>(lhs: &L, rhs: &R) -> Result<Vec<A::Output>>
where
    A: Sub<B>,
    L: Operand<A> + ?Sized,
    R: Operand<B> + ?Sized,
{
    broadcast(lhs, rhs, A::sub)
}

/// Elementwise `lhs * rhs` (the Hamilton product when both sides are quaternions).
pub fn mul<A, B, L, R>(lhs: &L, rhs: &R) -> Result<Vec<A::Output>>
where
    A: Mul<B>,
    L: Operand<A> + ?Sized,
    R: Operand<B> + ?Sized,
{
    broadcast(lhs, rhs, A::mul)
}

/// Elementwise `lhs / rhs` (right division `lhs * rhs⁻¹` when `rhs` is a quaternion).
pub fn div<A, B, L, R>(lhs: &L, rhs: &R) -> Result<Vec<A::Output>>
where
    A: Div<B>,
    L: Operand<A> + ?Sized,
    R: Operand<B> + ?Sized,
{
    broadcast(lhs, rhs, A::div)
}

/// Exponents that a [`Quaternion`] can be raised to.
pub trait Exponent: Copy {
    /// `exp(log(base) * self)`.
    fn raise(base: &Quaternion, exponent: Self) -> Result<Quaternion>;
}

impl Exponent for f64 {
    fn raise(base: &Quaternion, exponent: Self) -> Result<Quaternion> {
        base.pow(exponent)
    }
}

impl Exponent for Quaternion {
    fn raise(base: &Quaternion, exponent: Self) -> Result<Quaternion> {
        base.pow_quaternion(&exponent)
    }
}

/// Elementwise `base ^ exponent`, where the exponent is real or quaternion valued.
pub fn pow<E, L, R>(base: &L, exponent: &R) -> Result<Vec<Quaternion>>
where
    E: Exponent,
    L: Operand<Quaternion> + ?Sized,
    R: Operand<E> + ?Sized,
{
    try_broadcast(base, exponent, |q: Quaternion, e: E| E::raise(&q, e))
}

/// Elementwise [`Quaternion::log`].
pub fn log(qs: &[Quaternion]) -> Result<Vec<Quaternion>> {
    qs.iter().map(Quaternion::log).collect()
}

/// Elementwise [`Quaternion::exp`].
pub fn exp(qs: &[Quaternion]) -> Vec<Quaternion> {
    qs.iter().map(Quaternion::exp).collect()
}

/// Elementwise [`Quaternion::sqrt`].
pub fn sqrt(qs: &[Quaternion]) -> Result<Vec<Quaternion>> {
    qs.iter().map(Quaternion::sqrt).collect()
}

/// Elementwise [`Quaternion::sqrt_of_rotor`].
pub fn sqrt_of_rotor(qs: &[Quaternion]) -> Result<Vec<Quaternion>> {
    qs.iter().map(Quaternion::sqrt_of_rotor).collect()
}

/// Elementwise [`Quaternion::abs`].
pub fn abs(qs: &[Quaternion]) -> Vec<f64> {
    qs.iter().map(Quaternion::abs).collect()
}

/// Elementwise [`Quaternion::angle`].
pub fn angle(qs: &[Quaternion]) -> Result<Vec<f64>> {
    qs.iter().map(Quaternion::angle).collect()
}

/// Elementwise [`Quaternion::inverse`].
pub fn inverse(qs: &[Quaternion]) -> Vec<Quaternion> {
    qs.iter().map(Quaternion::inverse).collect()
}

/// Elementwise [`Quaternion::conjugate`].
pub fn conjugate(qs: &[Quaternion]) -> Vec<Quaternion> {
    qs.iter().map(Quaternion::conjugate).collect()
}

/// Elementwise [`Quaternion::normalized`].
pub fn normalized(qs: &[Quaternion]) -> Vec<Quaternion> {
    qs.iter().map(Quaternion::normalized).collect()
}

/// Elementwise [`Quaternion::normsquared`].
pub fn normsquared(qs: &[Quaternion]) -> Vec<f64> {
    qs.iter().map(Quaternion::normsquared).collect()
}

/// Component `index` (0, 1, 2, 3 for w, x, y, z) of every quaternion.
pub fn components(qs: &[Quaternion], index: usize) -> Result<Vec<f64>> {
    qs.iter().map(|q| q.component(index)).collect()
}

/// Assembles quaternions from four co-indexed component sequences.
pub fn from_components(w: &[f64], x: &[f64], y: &[f64], z: &[f64]) -> Result<Vec<Quaternion>> {
    ensure_same_len(w.len(), x.len())?;
    ensure_same_len(w.len(), y.len())?;
    ensure_same_len(w.len(), z.len())?;
    Ok(w.iter()
        .zip(x)
        .zip(y)
        .zip(z)
        .map(|(((&w, &x), &y), &z)| Quaternion::new(w, x, y, z))
        .collect())
}

/// Converts each row to a quaternion; see [`Quaternion::try_from`] for which rows are accepted.
pub fn from_rows<Row: AsRef<[f64]>>(rows: &[Row]) -> Result<Vec<Quaternion>> {
    rows.iter()
        .map(|row| Quaternion::try_from(row.as_ref()))
        .collect()
}

/// Elementwise [`Quaternion::from_spherical_coordinates`].
pub fn from_spherical_coordinates(vartheta: &[Angle], varphi: &[Angle]) -> Result<Vec<Quaternion>> {
    broadcast(vartheta, varphi, |theta: Angle, phi: Angle| {
        Quaternion::from_spherical_coordinates(theta, phi)
    })
}

/// Elementwise [`Quaternion::from_euler_angles`].
pub fn from_euler_angles(
    alpha: &[Angle],
    beta: &[Angle],
    gamma: &[Angle],
) -> Result<Vec<Quaternion>> {
    ensure_same_len(alpha.len(), beta.len())?;
    ensure_same_len(alpha.len(), gamma.len())?;
    Ok(alpha
        .iter()
        .zip(beta)
        .zip(gamma)
        .map(|((&a, &b), &g)| Quaternion::from_euler_angles(a, b, g))
        .collect())
}

/// Elementwise [`Quaternion::from_axis_angle`]; each axis is given as a 3-component slice.
pub fn from_axis_angles<Axis: AsRef<[f64]>>(
    angles: &[Angle],
    axes: &[Axis],
) -> Result<Vec<Quaternion>> {
    ensure_same_len(angles.len(), axes.len())?;
    angles
        .iter()
        .zip(axes)
        .map(|(&angle, axis)| {
            let axis = axis.as_ref();
            match *axis {
                [x, y, z] => Ok(Quaternion::from_axis_angle(angle, &crate::Vector3::new(x, y, z))),
                _ => Err(QuaternionError::VectorSizeNotUnderstood { len: axis.len() }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;
    use uom::si::angle::degree;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    fn qs() -> Vec<Quaternion> {
        vec![
            Quaternion::new(1., 2., 3., 4.),
            Quaternion::new(-1., 0.5, 0., 2.),
            Quaternion::new(0., 0., 1., 0.),
        ]
    }

    #[test]
    fn scalar_with_sequence() {
        let qs = qs();
        let expected: Vec<_> = qs.iter().map(|q| 2. - *q).collect();
        assert_eq!(sub(&2., &qs).unwrap(), expected);
        let expected: Vec<_> = qs.iter().map(|q| *q / 2.).collect();
        assert_eq!(div(&qs, &2.).unwrap(), expected);
    }

    #[test]
    fn reals_with_single_quaternion() {
        let ts = [1., 2., -1.];
        let q = Quaternion::new(1., 1., 0., 0.);
        assert_eq!(
            mul(&ts[..], &q).unwrap(),
            vec![q, q * 2., -q]
        );
        assert_eq!(add(&q, &ts[..]).unwrap().len(), 3);
    }

    #[test]
    fn sequence_with_sequence() {
        let qs = qs();
        let products = mul(&qs, &qs).unwrap();
        for (product, q) in products.iter().zip(&qs) {
            assert_eq!(*product, *q * *q);
        }
        let ts = vec![1., 2., 3.];
        assert_eq!(
            add(&ts, &qs).unwrap()[2],
            Quaternion::new(3., 0., 1., 0.)
        );
    }

    #[test]
    fn single_values_broadcast_to_one() {
        assert_eq!(
            mul(&Quaternion::X, &Quaternion::Y).unwrap(),
            vec![Quaternion::Z]
        );
    }

    #[rstest]
    #[case(2, 3)]
    #[case(0, 3)]
    #[case(4, 3)]
    fn mismatched_sequences_fail(#[case] n_reals: usize, #[case] n_quaternions: usize) {
        let ts = vec![1.; n_reals];
        let qs = vec![Quaternion::ONE; n_quaternions];
        let expected = Err(QuaternionError::VectorSizeMismatch {
            left: n_reals,
            right: n_quaternions,
        });
        assert_eq!(add(&ts, &qs), expected);
        assert_eq!(sub(&ts, &qs), expected);
        assert_eq!(mul(&ts, &qs), expected);
        assert_eq!(div(&ts, &qs), expected);
        assert_eq!(pow(&Quaternion::ONE, &qs).map(|_| ()), Ok(()));
        assert_eq!(
            pow(&qs, &ts),
            Err(QuaternionError::VectorSizeMismatch {
                left: n_quaternions,
                right: n_reals,
            })
        );
    }

    #[test]
    fn pow_with_real_and_quaternion_exponents() {
        let rotor = Quaternion::from_axis_angle(d(90.), &crate::Vector3::z());
        let halves = pow(&rotor, &[0.5, 1., 2.][..]).unwrap();
        assert_relative_eq!(
            halves[0],
            Quaternion::from_axis_angle(d(45.), &crate::Vector3::z()),
            epsilon = 1e-14
        );
        assert_relative_eq!(halves[1], rotor, epsilon = 1e-14);
        assert_relative_eq!(
            halves[2],
            Quaternion::from_axis_angle(d(180.), &crate::Vector3::z()),
            epsilon = 1e-14
        );

        // a real-valued quaternion exponent agrees with the real exponent
        let by_quaternion = pow(&[rotor][..], &Quaternion::new(0.5, 0., 0., 0.)).unwrap();
        assert_relative_eq!(by_quaternion[0], halves[0], epsilon = 1e-14);

        assert_eq!(
            pow(&Quaternion::new(-1., 0., 0., 0.), &2.),
            Err(QuaternionError::InfinitelyManySolutions { w: -1. })
        );
    }

    #[test]
    fn unary_maps() {
        let qs = qs();
        assert_eq!(conjugate(&qs)[0], Quaternion::new(1., -2., -3., -4.));
        assert_eq!(normsquared(&qs), vec![30., 5.25, 1.]);
        assert_relative_eq!(abs(&normalized(&qs))[1], 1.);
        assert_relative_eq!(mul(&qs, &inverse(&qs)).unwrap()[0], Quaternion::ONE, epsilon = 1e-14);
        let logs = log(&qs).unwrap();
        assert_relative_eq!(exp(&logs)[0], qs[0], epsilon = 1e-14);
        assert_eq!(sqrt(&qs).unwrap().len(), 3);
        assert_eq!(sqrt_of_rotor(&[Quaternion::ONE]), Ok(vec![Quaternion::ONE]));
        assert!(sqrt(&[Quaternion::ONE, -Quaternion::ONE]).is_err());
        assert!(log(&[Quaternion::new(-3., 0., 0., 0.)]).is_err());
        assert_relative_eq!(angle(&[Quaternion::Z]).unwrap()[0], std::f64::consts::PI);
    }

    #[test]
    fn component_extraction() {
        let qs = qs();
        assert_eq!(components(&qs, 3).unwrap(), vec![4., 2., 0.]);
        assert_eq!(
            components(&qs, 4),
            Err(QuaternionError::IndexOutOfBounds { index: 4, len: 4 })
        );
        // an empty sequence has no component to get wrong
        assert_eq!(components(&[], 9), Ok(vec![]));
    }

    #[test]
    fn assembly() {
        let qs = qs();
        let [w, x, y, z] = [0, 1, 2, 3].map(|i| components(&qs, i).unwrap());
        assert_eq!(from_components(&w, &x, &y, &z).unwrap(), qs);
        assert!(from_components(&w, &x, &y, &z[1..]).is_err());

        let rows = vec![vec![1., 2., 3.], vec![1., 2., 3., 4.]];
        assert_eq!(
            from_rows(&rows).unwrap(),
            vec![Quaternion::pure(1., 2., 3.), Quaternion::new(1., 2., 3., 4.)]
        );
        assert_eq!(
            from_rows(&[vec![1.; 5]]),
            Err(QuaternionError::VectorSizeNotUnderstood { len: 5 })
        );
    }

    #[test]
    fn angle_constructors() {
        let built = from_spherical_coordinates(&[d(10.), d(20.)], &[d(30.), d(40.)]).unwrap();
        assert_eq!(built[1], Quaternion::from_spherical_coordinates(d(20.), d(40.)));
        assert!(from_spherical_coordinates(&[d(10.)], &[]).is_err());

        let built = from_euler_angles(&[d(1.)], &[d(2.)], &[d(3.)]).unwrap();
        assert_eq!(built[0], Quaternion::from_euler_angles(d(1.), d(2.), d(3.)));
        assert!(from_euler_angles(&[d(1.)], &[d(2.)], &[]).is_err());

        let built = from_axis_angles(&[d(90.)], &[[0., 0., 2.]]).unwrap();
        assert_relative_eq!(
            built[0].rotate(&Quaternion::X),
            Quaternion::Y,
            epsilon = 1e-14
        );
        assert_eq!(
            from_axis_angles(&[d(90.)], &[[0., 1.]]),
            Err(QuaternionError::VectorSizeNotUnderstood { len: 2 })
        );
    }

    quickcheck! {
        fn broadcasting_matches_pointwise(p: Quaternion, q: Quaternion, t: u8) -> () {
            let t = f64::from(t) / 16.;
            let a = [p, q];
            assert_eq!(mul(&a[..], &t).unwrap(), vec![p * t, q * t]);
            assert_eq!(sub(&t, &a[..]).unwrap(), vec![t - p, t - q]);
            assert_eq!(div(&a[..], &a[..]).unwrap(), vec![p / p, q / q]);
        }
    }
}
