use crate::error::{QuaternionError, Result};
use crate::Vector3;
use std::fmt::{self, Display, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use uom::si::angle::radian;
use uom::si::f64::Angle;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative size below which the vector part of a quaternion is treated as zero by [`log`] and
/// [`exp`].
///
/// [`log`]: Quaternion::log
/// [`exp`]: Quaternion::exp
const EPSILON: f64 = 1.0e-14;

/// A quaternion `w + x i + y j + z k`.
///
/// `w` is the scalar part and `(x, y, z)` the vector part. Quaternions play two roles in this
/// crate: as general elements of the algebra (eg, the logarithm of a rotation, or a pure "vector"
/// quaternion `(0, x, y, z)`), and, when they have unit norm, as _rotors_ that act on vectors by
/// conjugation `q v q⁻¹`.
///
/// <div class="warning">
///
/// Unit norm is a convention, not an invariant of this type. Functions documented as taking
/// rotors assume unit norm and do not check it.
///
/// </div>
///
/// Remember that `q` and `-q` encode the same rotation. Independently-computed rotors for
/// adjacent samples of a continuous rotation may therefore differ in sign, which is what
/// [`unflip_rotors`](crate::continuity::unflip_rotors) repairs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
// serialized as a bare `[w, x, y, z]`
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Quaternion {
    components: [f64; 4],
}

impl Quaternion {
    /// The multiplicative identity `(1, 0, 0, 0)`.
    pub const ONE: Self = Self::new(1., 0., 0., 0.);
    /// The unit pure quaternion along x, `(0, 1, 0, 0)`.
    pub const X: Self = Self::new(0., 1., 0., 0.);
    /// The unit pure quaternion along y, `(0, 0, 1, 0)`.
    pub const Y: Self = Self::new(0., 0., 1., 0.);
    /// The unit pure quaternion along z, `(0, 0, 0, 1)`.
    pub const Z: Self = Self::new(0., 0., 0., 1.);

    /// Constructs a quaternion from its scalar part `w` and vector part `(x, y, z)`.
    #[must_use]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            components: [w, x, y, z],
        }
    }

    /// Constructs a pure quaternion (ie, scalar part zero) representing the vector `(x, y, z)`.
    #[must_use]
    pub const fn pure(x: f64, y: f64, z: f64) -> Self {
        Self::new(0., x, y, z)
    }

    /// Constructs a pure quaternion from a vector.
    #[must_use]
    pub fn from_vector(v: &Vector3) -> Self {
        Self::pure(v.x, v.y, v.z)
    }

    /// Constructs the rotor that takes the z axis onto the point with polar angle `vartheta` and
    /// azimuthal angle `varphi` on the unit sphere.
    #[must_use]
    pub fn from_spherical_coordinates(vartheta: impl Into<Angle>, varphi: impl Into<Angle>) -> Self {
        let vartheta = vartheta.into().get::<radian>();
        let varphi = varphi.into().get::<radian>();
        (Self::Z * (varphi / 2.)).exp() * (Self::Y * (vartheta / 2.)).exp()
    }

    /// Constructs the rotor for the given z-y-z [Euler angles].
    ///
    /// The rotations are about the fixed axes: first by `gamma` about z, then by `beta` about y,
    /// and finally by `alpha` about z.
    ///
    /// [Euler angles]: https://en.wikipedia.org/wiki/Euler_angles
    #[must_use]
    pub fn from_euler_angles(
        alpha: impl Into<Angle>,
        beta: impl Into<Angle>,
        gamma: impl Into<Angle>,
    ) -> Self {
        let alpha = alpha.into().get::<radian>();
        let beta = beta.into().get::<radian>();
        let gamma = gamma.into().get::<radian>();
        (Self::Z * (alpha / 2.)).exp() * (Self::Y * (beta / 2.)).exp() * (Self::Z * (gamma / 2.)).exp()
    }

    /// Constructs the rotor for a right-handed rotation by `angle` about `axis`.
    ///
    /// The axis does not need to be normalized, but must be non-zero.
    #[must_use]
    pub fn from_axis_angle(angle: impl Into<Angle>, axis: &Vector3) -> Self {
        debug_assert_ne!(axis.norm(), 0., "rotation axis must be non-zero");
        let half = angle.into().get::<radian>() / 2.;
        (Self::from_vector(&axis.normalize()) * half).exp()
    }

    /// The scalar part.
    #[must_use]
    pub fn w(&self) -> f64 {
        self.components[0]
    }

    /// The first component of the vector part.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.components[1]
    }

    /// The second component of the vector part.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.components[2]
    }

    /// The third component of the vector part.
    #[must_use]
    pub fn z(&self) -> f64 {
        self.components[3]
    }

    /// Returns component `index`, where 0, 1, 2, 3 are w, x, y, z respectively.
    pub fn component(&self, index: usize) -> Result<f64> {
        self.components
            .get(index)
            .copied()
            .ok_or(QuaternionError::IndexOutOfBounds { index, len: 4 })
    }

    /// Returns a mutable reference to component `index` (see [`Quaternion::component`]).
    pub fn component_mut(&mut self, index: usize) -> Result<&mut f64> {
        self.components
            .get_mut(index)
            .ok_or(QuaternionError::IndexOutOfBounds { index, len: 4 })
    }

    /// The vector part as a 3-vector.
    #[must_use]
    pub fn vector(&self) -> Vector3 {
        Vector3::new(self.x(), self.y(), self.z())
    }

    fn vector_norm(&self) -> f64 {
        let [_, x, y, z] = self.components;
        (x * x + y * y + z * z).sqrt()
    }

    /// `w² + x² + y² + z²`.
    #[must_use]
    pub fn normsquared(&self) -> f64 {
        self.components.iter().map(|c| c * c).sum()
    }

    /// The Euclidean norm of all four components.
    #[must_use]
    pub fn abs(&self) -> f64 {
        self.normsquared().sqrt()
    }

    /// Negates the vector part.
    #[must_use]
    pub fn conjugate(&self) -> Self {
        let [w, x, y, z] = self.components;
        Self::new(w, -x, -y, -z)
    }

    /// The multiplicative inverse, `conjugate / normsquared`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        self.conjugate() / self.normsquared()
    }

    /// This quaternion scaled to unit norm.
    #[must_use]
    pub fn normalized(&self) -> Self {
        *self / self.abs()
    }

    /// The dot product of the _vector parts_ of `self` and `rhs`.
    ///
    /// The scalar parts are ignored, so for pure quaternions this is the usual 3-vector dot
    /// product.
    #[must_use]
    pub fn dot(&self, rhs: &Self) -> f64 {
        self.x() * rhs.x() + self.y() * rhs.y() + self.z() * rhs.z()
    }

    /// The principal logarithm.
    ///
    /// For a rotor by angle `θ` about unit axis `n`, this is the pure quaternion `(θ/2) n`.
    ///
    /// Fails with [`QuaternionError::InfinitelyManySolutions`] for a negative real quaternion,
    /// whose logarithm has an undetermined vector direction.
    pub fn log(&self) -> Result<Self> {
        let [w, x, y, z] = self.components;
        let b = self.vector_norm();
        if b <= EPSILON * w.abs() {
            if w < 0. {
                return Err(QuaternionError::InfinitelyManySolutions { w });
            }
            return Ok(Self::new(w.ln(), 0., 0., 0.));
        }
        let v = b.atan2(w);
        let f = v / b;
        // w / cos(v) == |q|, but the quotient breaks down at w == 0
        Ok(Self::new(self.abs().ln(), f * x, f * y, f * z))
    }

    /// The exponential.
    #[must_use]
    pub fn exp(&self) -> Self {
        let [w, x, y, z] = self.components;
        let b = self.vector_norm();
        if b <= EPSILON * w.abs() {
            return Self::new(w.exp(), 0., 0., 0.);
        }
        let e = w.exp();
        // b is nonzero here
        let f = b.sin() / b;
        Self::new(e * b.cos(), e * f * x, e * f * y, e * f * z)
    }

    /// `exp(t log(self))`.
    pub fn pow(&self, t: f64) -> Result<Self> {
        Ok((self.log()? * t).exp())
    }

    /// `exp(log(self) p)`, ie, a power with a quaternion exponent.
    pub fn pow_quaternion(&self, p: &Self) -> Result<Self> {
        Ok((self.log()? * *p).exp())
    }

    // `None` unless self is real; the closed-form roots divide by zero there
    fn real_sqrt(&self) -> Option<Result<Self>> {
        let w = self.w();
        if self.vector_norm() > EPSILON * w.abs() {
            return None;
        }
        if w < 0. {
            return Some(Err(QuaternionError::InfinitelyManySolutions { w }));
        }
        Some(Ok(Self::new(w.sqrt(), 0., 0., 0.)))
    }

    /// The principal square root.
    ///
    /// Fails with [`QuaternionError::InfinitelyManySolutions`] for a negative real quaternion: any
    /// pure quaternion of the right length squares to it.
    pub fn sqrt(&self) -> Result<Self> {
        if let Some(root) = self.real_sqrt() {
            return root;
        }
        let abs = self.abs();
        Ok((*self / abs + 1.) * (abs / (2. + 2. * self.w() / abs)).sqrt())
    }

    /// The principal square root of a rotor.
    ///
    /// Cheaper than [`Quaternion::sqrt`], but only correct if `self` has unit norm. Fails like
    /// [`Quaternion::sqrt`] for `-1`, the rotation by 2π.
    pub fn sqrt_of_rotor(&self) -> Result<Self> {
        if let Some(root) = self.real_sqrt() {
            return root;
        }
        Ok((*self + 1.) / (2. + 2. * self.w()).sqrt())
    }

    /// The rotation angle of a rotor, `2 |log(self)|`, in radians.
    pub fn angle(&self) -> Result<f64> {
        Ok(2. * self.log()?.abs())
    }

    /// Applies this rotor to the (pure) quaternion `v` by conjugation, `self v self⁻¹`.
    #[must_use]
    pub fn rotate(&self, v: &Self) -> Self {
        *self * *v * self.inverse()
    }
}

impl TryFrom<&[f64]> for Quaternion {
    type Error = QuaternionError;

    /// Three components are taken as a pure vector, four as `[w, x, y, z]`.
    fn try_from(value: &[f64]) -> Result<Self> {
        match *value {
            [x, y, z] => Ok(Self::pure(x, y, z)),
            [w, x, y, z] => Ok(Self::new(w, x, y, z)),
            _ => Err(QuaternionError::VectorSizeNotUnderstood { len: value.len() }),
        }
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from(components: [f64; 4]) -> Self {
        Self { components }
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> Self {
        q.components
    }
}

impl From<nalgebra::Quaternion<f64>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f64>) -> Self {
        Self::new(q.w, q.i, q.j, q.k)
    }
}

impl From<Quaternion> for nalgebra::Quaternion<f64> {
    fn from(q: Quaternion) -> Self {
        nalgebra::Quaternion::new(q.w(), q.x(), q.y(), q.z())
    }
}

impl From<crate::UnitQuaternion> for Quaternion {
    fn from(q: crate::UnitQuaternion) -> Self {
        q.into_inner().into()
    }
}

impl Display for Quaternion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let [w, x, y, z] = self.components;
        write!(f, "[{w}, {x}, {y}, {z}]")
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Quaternion {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.components
            .iter()
            .zip(&other.components)
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Quaternion {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.components
            .iter()
            .zip(&other.components)
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self::Output {
        let [w, x, y, z] = self.components;
        Self::new(-w, -x, -y, -z)
    }
}

// the Hamilton product
impl Mul<Self> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let [w, x, y, z] = self.components;
        let [rw, rx, ry, rz] = rhs.components;
        Self::new(
            w * rw - x * rx - y * ry - z * rz,
            w * rx + x * rw + y * rz - z * ry,
            w * ry - x * rz + y * rw + z * rx,
            w * rz + x * ry - y * rx + z * rw,
        )
    }
}

impl MulAssign<Self> for Quaternion {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

// right division, self * rhs⁻¹
impl Div<Self> for Quaternion {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.inverse()
    }
}

impl Add<Self> for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut out = self;
        out += rhs;
        out
    }
}

impl AddAssign<Self> for Quaternion {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.components.iter_mut().zip(rhs.components) {
            *a += b;
        }
    }
}

impl Sub<Self> for Quaternion {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut out = self;
        out -= rhs;
        out
    }
}

impl SubAssign<Self> for Quaternion {
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.components.iter_mut().zip(rhs.components) {
            *a -= b;
        }
    }
}

// scalars act as real quaternions (t, 0, 0, 0)

impl Add<f64> for Quaternion {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        let [w, x, y, z] = self.components;
        Self::new(w + rhs, x, y, z)
    }
}

impl Sub<f64> for Quaternion {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        let [w, x, y, z] = self.components;
        Self::new(w - rhs, x, y, z)
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            components: self.components.map(|c| c * rhs),
        }
    }
}

impl Div<f64> for Quaternion {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self {
            components: self.components.map(|c| c / rhs),
        }
    }
}

impl Add<Quaternion> for f64 {
    type Output = Quaternion;

    fn add(self, rhs: Quaternion) -> Self::Output {
        rhs + self
    }
}

impl Sub<Quaternion> for f64 {
    type Output = Quaternion;

    fn sub(self, rhs: Quaternion) -> Self::Output {
        -rhs + self
    }
}

impl Mul<Quaternion> for f64 {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Self::Output {
        rhs * self
    }
}

impl Div<Quaternion> for f64 {
    type Output = Quaternion;

    fn div(self, rhs: Quaternion) -> Self::Output {
        rhs.inverse() * self
    }
}
