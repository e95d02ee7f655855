//! Errors raised when a caller violates the contract of a quaternion operation.
//!
//! None of these are expected runtime conditions: each one means that the inputs handed to a
//! function did not satisfy its preconditions. They are reported at the point of detection and
//! never silently repaired (no truncation, padding, or clamping) -- what to do about them is up
//! to the caller.

/// Convenience alias for results of fallible quaternion operations.
pub type Result<T, E = QuaternionError> = std::result::Result<T, E>;

/// The ways in which a quaternion or quaternion-sequence operation can fail.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum QuaternionError {
    /// Two sequences that must be co-indexed have different lengths.
    #[error("sequence size mismatch: {left} != {right}")]
    VectorSizeMismatch { left: usize, right: usize },

    /// An index lies outside of the valid range.
    ///
    /// For quaternion components the valid range is `0..4`.
    #[error("{index} is not a valid index (expected < {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The logarithm or square root of a negative real quaternion was requested.
    ///
    /// The direction of the vector part of the result is undetermined (any unit vector works), so
    /// there is no single answer. For rotors this means a rotation by 2π, which shows up as `-1`
    /// in `sqrt(-Z z)` when `Z = -z`, or as `qb / qa` when `qb = -qa`.
    #[error("infinitely many solutions for a negative scalar (w = {w})")]
    InfinitelyManySolutions { w: f64 },

    /// A requested interpolation time lies outside of the sampled time range.
    ///
    /// Both ends are rejected: times before the first sample as well as times after the last.
    #[error("time {time} is outside of the input data (times {first} to {last})")]
    CannotExtrapolateQuaternions { time: f64, first: f64, last: f64 },

    /// A quaternion was constructed from a list with neither 3 nor 4 components.
    #[error("cannot build a quaternion from {len} components (expected 3 or 4)")]
    VectorSizeNotUnderstood { len: usize },

    /// An operation needs more samples than it was given.
    #[error("need at least {needed} samples, got {got}")]
    TooFewSamples { needed: usize, got: usize },
}

/// Returns [`QuaternionError::VectorSizeMismatch`] unless `left == right`.
pub(crate) fn ensure_same_len(left: usize, right: usize) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(QuaternionError::VectorSizeMismatch { left, right })
    }
}

/// Returns [`QuaternionError::TooFewSamples`] unless `got >= needed`.
pub(crate) fn ensure_at_least(needed: usize, got: usize) -> Result<()> {
    if got >= needed {
        Ok(())
    } else {
        Err(QuaternionError::TooFewSamples { needed, got })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_is_detected() {
        assert_eq!(ensure_same_len(3, 3), Ok(()));
        assert_eq!(
            ensure_same_len(3, 4),
            Err(QuaternionError::VectorSizeMismatch { left: 3, right: 4 })
        );
    }

    #[test]
    fn too_few_samples_is_detected() {
        assert_eq!(ensure_at_least(2, 2), Ok(()));
        assert_eq!(
            ensure_at_least(2, 1),
            Err(QuaternionError::TooFewSamples { needed: 2, got: 1 })
        );
    }

    #[test]
    fn messages() {
        insta::assert_snapshot!(
            QuaternionError::VectorSizeMismatch { left: 2, right: 5 },
            @"sequence size mismatch: 2 != 5"
        );
        insta::assert_snapshot!(
            QuaternionError::VectorSizeNotUnderstood { len: 7 },
            @"cannot build a quaternion from 7 components (expected 3 or 4)"
        );
    }
}
