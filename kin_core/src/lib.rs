//! # kin_core
//!
//! Pure mathematical primitives for kinematic-chain state handling.
//!
//! This crate provides the foundational math consumed by the visual modeling
//! trainer: joint-state representation, angle normalization, and forward
//! kinematics for planar revolute chains. It carries no tensor framework and
//! no storage; just math over plain floats.
//!
//! ## Features
//!
//! - **no_std compatible**: Works in embedded environments with the `alloc` feature
//! - **Coordinate systems**: Angular (joint space) and Cartesian (link endpoints)
//! - **Deterministic**: No hidden global state, no randomness
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables standard library support
//! - `alloc`: Enables heap allocation (Vec, etc.) without full std
//! - `serde`: Serialize/Deserialize for the public types
//!
//! ## Modules
//!
//! - [`types`]: Core data types (`CoordSystem`, `JointState`)
//! - [`chain`]: Forward kinematics and state-vector construction
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```ignore
//! use kin_core::prelude::*;
//!
//! let state = JointState::new(vec![0.1, -0.4, 1.2])?;
//! let positions = chain_positions(state.angles());
//! let vector = state_vector(state.angles(), CoordSystem::Cartesian);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Conditional std/alloc support
#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;

// Internal alloc prelude for conditional compilation
#[cfg(feature = "std")]
mod alloc_prelude {
    pub use std::vec::Vec;
}

#[cfg(all(feature = "alloc", not(feature = "std")))]
mod alloc_prelude {
    pub use alloc::vec::Vec;
}

pub mod chain;
pub mod error;
pub mod types;

pub use chain::{chain_positions, state_dim, state_vector, wrap_angle};
pub use error::KinCoreError;
pub use types::{CoordSystem, JointState, LINK_LENGTH};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::chain::{chain_positions, state_dim, state_vector, wrap_angle};
    pub use crate::error::KinCoreError;
    pub use crate::types::{CoordSystem, JointState, LINK_LENGTH};
}
