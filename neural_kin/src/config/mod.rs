//! Configuration types for neural_kin.
//!
//! This module provides the YAML-backed run configuration plus Burn-style
//! configuration structs for the model and the trainer.

mod model;
mod run;
mod training;

pub use model::{ModelVariant, VisModelingModelConfig};
pub use run::RunConfig;
pub use training::TrainerConfig;
