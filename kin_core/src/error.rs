//! Error types for kin_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std compatibility.

use core::fmt;

/// Error types that can occur during kin_core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KinCoreError {
    /// A chain must have at least one degree of freedom.
    ZeroDof,
    /// A joint angle was NaN or infinite.
    NonFiniteAngle {
        /// Index of the offending joint.
        index: usize,
    },
    /// An angle slice had a different length than the chain expects.
    DofMismatch {
        /// The expected degree-of-freedom count.
        expected: usize,
        /// The length that was provided.
        got: usize,
    },
    /// A string named no known coordinate system.
    UnknownCoordSystem,
}

impl fmt::Display for KinCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinCoreError::ZeroDof => {
                write!(f, "a kinematic chain requires at least one joint")
            }
            KinCoreError::NonFiniteAngle { index } => {
                write!(f, "joint angle at index {} is not finite", index)
            }
            KinCoreError::DofMismatch { expected, got } => {
                write!(f, "expected {} joint angles, got {}", expected, got)
            }
            KinCoreError::UnknownCoordSystem => {
                write!(f, "unknown coordinate system (expected 'cartesian' or 'angular')")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KinCoreError {}
