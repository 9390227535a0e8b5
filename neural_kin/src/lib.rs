//! # neural_kin
//!
//! Visual kinematic modeling with Burn.
//!
//! This crate is the experiment side of the visual modeling ecosystem: it
//! loads a YAML run configuration, seeds determinism sources, builds a
//! [`VisModelingModel`], and drives a training run through the [`Trainer`].
//! The numeric heavy lifting (autodiff, optimizer arithmetic, record
//! serialization) is Burn's; this crate authors the configuration surface,
//! the model composition and the dataset plumbing.
//!
//! ## Run modes
//!
//! The `train` binary launches one of three modes:
//!
//! - **standard**: train the full model
//! - **kinematic**: fine-tune, loading a pretrained kinematic encoder
//! - **kinematic-scratch**: train the kinematic model from scratch with
//!   validation-monitored checkpointing
//!
//! ## Quick Start
//!
//! ```ignore
//! use neural_kin::{config::RunConfig, launch::{run, LaunchMode}, select_devices, AdBackend};
//!
//! let config = RunConfig::load("config.yaml".as_ref())?;
//! let devices = select_devices(config.if_cuda, config.num_gpus)?;
//! let report = run::<AdBackend>(&config, LaunchMode::Standard, devices)?;
//! println!("best val loss: {:?}", report.best_val_loss);
//! ```
//!
//! ## Feature Flags
//!
//! - `wgpu`: GPU acceleration via WebGPU (CPU ndarray backend otherwise)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod launch;
pub mod loss;
pub mod model;
pub mod nn;
pub mod training;

// Re-export key types for convenience
pub use config::{RunConfig, TrainerConfig, VisModelingModelConfig};
pub use error::{NeuralKinError, Result};
pub use launch::{run, LaunchMode};
pub use loss::LossType;
pub use model::{KinematicEncoder, VisModelingModel};
pub use training::{FitReport, Trainer};

// Re-export from kin_core for convenience
pub use kin_core::CoordSystem;

use burn::tensor::backend::Backend;

/// Backend used for training and evaluation (ndarray by default, WGPU if enabled).
#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Wgpu<f32>;
/// Backend used for training and evaluation (ndarray by default, WGPU if enabled).
#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::NdArray<f32>;

/// Autodiff wrapper over [`TrainBackend`], used by the launcher.
pub type AdBackend = burn::backend::Autodiff<TrainBackend>;

/// Device type of [`TrainBackend`].
pub type TrainDevice = <TrainBackend as Backend>::Device;

/// Resolve the device list for a run from the configured GPU settings.
///
/// The data-parallel mechanics across the returned devices belong to the
/// backend; this function only authors the selection.
///
/// # Errors
/// Returns a backend error when the configuration asks for the GPU but the
/// crate was built without the `wgpu` feature.
pub fn select_devices(if_cuda: bool, num_gpus: usize) -> Result<Vec<TrainDevice>> {
    if !if_cuda {
        return Ok(vec![TrainDevice::default()]);
    }
    if !cfg!(feature = "wgpu") {
        return Err(NeuralKinError::Backend {
            message: "config requests the GPU but this build has no `wgpu` feature; \
                      rebuild with --features wgpu or set if_cuda: false"
                .to_string(),
        });
    }
    Ok((0..num_gpus.max(1)).map(gpu_device).collect())
}

#[cfg(feature = "wgpu")]
fn gpu_device(index: usize) -> TrainDevice {
    burn::backend::wgpu::WgpuDevice::DiscreteGpu(index)
}

#[cfg(not(feature = "wgpu"))]
fn gpu_device(_index: usize) -> TrainDevice {
    TrainDevice::default()
}
