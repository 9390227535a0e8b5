//! Training infrastructure.
//!
//! This module provides:
//! - `Trainer`: the epoch driver over Burn's optimizer machinery
//! - Multi-step learning-rate scheduling
//! - Epoch metrics and the run-directory metrics log
//! - Checkpoint save/load with validation-loss monitoring

mod checkpoint;
mod metrics;
mod schedule;
mod trainer;

pub use checkpoint::{
    best_checkpoint, checkpoint_dir_name, checkpoint_exists, load_model, save_checkpoint,
    CheckpointMetadata,
};
pub use metrics::{EpochMetrics, MetricsWriter};
pub use schedule::MultiStepLr;
pub use trainer::{FitReport, Trainer};

use burn::tensor::backend::Backend;

/// Seed every determinism source the run touches.
///
/// Seeds the backend's global RNG; the trainer additionally derives its own
/// shuffle/split RNG from the same seed.
pub fn seed_everything<B: Backend>(seed: u64) {
    B::seed(seed);
}
