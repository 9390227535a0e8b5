//! Core types for kinematic-chain state handling.

#[cfg(any(feature = "std", feature = "alloc"))]
use crate::alloc_prelude::Vec;
#[cfg(any(feature = "std", feature = "alloc"))]
use crate::chain::wrap_angle;
use crate::error::KinCoreError;

/// Length of every link in the canonical chain, in world units.
///
/// The trainer works in a normalized space where links have unit length;
/// scaling to physical units is the caller's business.
pub const LINK_LENGTH: f32 = 1.0;

/// The space in which a kinematic state is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CoordSystem {
    /// Cartesian link-endpoint positions, two values per joint.
    Cartesian,
    /// Joint angles in radians, one value per joint.
    Angular,
}

impl CoordSystem {
    /// Dimensionality of the state representation for a chain with `dof` joints.
    #[inline]
    pub const fn state_dim(self, dof: usize) -> usize {
        match self {
            CoordSystem::Cartesian => 2 * dof,
            CoordSystem::Angular => dof,
        }
    }
}

impl core::str::FromStr for CoordSystem {
    type Err = KinCoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cartesian" => Ok(CoordSystem::Cartesian),
            "angular" => Ok(CoordSystem::Angular),
            _ => Err(KinCoreError::UnknownCoordSystem),
        }
    }
}

/// An owned joint-space state: one angle in radians per degree of freedom.
#[cfg(any(feature = "std", feature = "alloc"))]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointState {
    angles: Vec<f32>,
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl JointState {
    /// Create a joint state, validating the angle vector.
    ///
    /// # Errors
    /// Returns an error for an empty vector or any non-finite angle.
    pub fn new(angles: Vec<f32>) -> Result<Self, KinCoreError> {
        if angles.is_empty() {
            return Err(KinCoreError::ZeroDof);
        }
        for (index, angle) in angles.iter().enumerate() {
            if !angle.is_finite() {
                return Err(KinCoreError::NonFiniteAngle { index });
            }
        }
        Ok(Self { angles })
    }

    /// Create a joint state that must have exactly `dof` angles.
    ///
    /// # Errors
    /// Returns a dof-mismatch error for the wrong length, and the same
    /// errors as [`JointState::new`] otherwise.
    pub fn with_dof(angles: Vec<f32>, dof: usize) -> Result<Self, KinCoreError> {
        if angles.len() != dof {
            return Err(KinCoreError::DofMismatch {
                expected: dof,
                got: angles.len(),
            });
        }
        Self::new(angles)
    }

    /// Number of degrees of freedom.
    #[inline]
    pub fn dof(&self) -> usize {
        self.angles.len()
    }

    /// The raw angles in radians.
    #[inline]
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// A copy of this state with every angle wrapped to `(-pi, pi]`.
    pub fn normalized(&self) -> Self {
        Self {
            angles: self.angles.iter().map(|&a| wrap_angle(a)).collect(),
        }
    }
}
