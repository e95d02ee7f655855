//! This library tracks the time-dependent orientation of a rotating physical configuration (say,
//! the orbital plane of a compact-object binary) as a sequence of unit quaternions ("rotors"),
//! and provides manifold-correct differentiation, continuity repair, gauge fixing, and
//! interpolation over such sequences.
//!
//! The one thing to keep in mind throughout is that quaternions _double cover_ rotations: `q`
//! and `-q` describe exactly the same rotation. Doing naive componentwise math on a time series of
//! rotors (lerping, finite-differencing, spline-fitting) produces frames that are discontinuous
//! or simply wrong. The functions in this crate all work on the rotation manifold instead.
//!
//! The building block is [`Quaternion`], which implements the quaternion algebra (Hamilton
//! product, [`log`](Quaternion::log), [`exp`](Quaternion::exp), powers, and square roots). The
//! [`sequence`] module lifts that algebra elementwise over slices of quaternions and reals. On top
//! of that:
//!
//! - [`differentiation`] computes the derivative of a rotor curve;
//! - [`continuity`] removes spurious sign flips between adjacent rotors;
//! - [`frames`] builds rotor sequences from sampled basis vectors, including the
//!   minimal-rotation frame that removes the unphysical twist about an axis;
//! - [`interpolation`] provides Slerp and Squad, including a stateful [`QuaternionInterpolator`]
//!   for repeated queries.
//!
//! # Examples
//!
//! Suppose the orbital angular momentum of a binary precesses slowly about the z axis. Given
//! samples of its direction, we build the minimal-rotation frame that follows it and then query
//! that frame between samples:
//!
//! ```
//! use rotor_frames::{frames, interpolation, Quaternion};
//!
//! let times: Vec<f64> = (0..200).map(|i| i as f64 * 0.05).collect();
//! let tilt = 0.3_f64;
//! let directions: Vec<Quaternion> = times
//!     .iter()
//!     .map(|t| Quaternion::pure(tilt.sin() * t.cos(), tilt.sin() * t.sin(), tilt.cos()))
//!     .collect();
//!
//! let frame = frames::frame_from_z(&directions, &times, frames::DEFAULT_ITERATIONS)?;
//!
//! // the frame's z axis follows the sampled direction
//! let z = frame[17].rotate(&Quaternion::Z);
//! assert!((z - directions[17]).abs() < 1e-10);
//!
//! // and can be evaluated in between samples
//! let between = interpolation::squad_sequence(&times, &frame, &[0.125, 3.3])?;
//! assert_eq!(between.len(), 2);
//! # Ok::<(), rotor_frames::QuaternionError>(())
//! ```

mod error;
mod quaternion;
mod scalar;
mod search;

pub mod continuity;
pub mod differentiation;
pub mod frames;
pub mod interpolation;
pub mod sequence;

pub(crate) type Vector3 = nalgebra::Vector3<f64>;
pub(crate) type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

pub use error::{QuaternionError, Result};
pub use interpolation::QuaternionInterpolator;
pub use quaternion::Quaternion;
pub use scalar::{scalar_derivative, scalar_integral};
pub use search::IntervalSearch;
