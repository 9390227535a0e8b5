//! Checkpoint save/load with validation-loss monitoring.
//!
//! A checkpoint is a directory containing:
//! - `metadata.json`: epoch, validation loss and record precision
//! - `model.bin`: record of the full model
//! - `encoder.bin`: record of the kinematic encoder alone, so fine-tune
//!   runs can initialize the encoder without the decoder

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{BinFileRecorder, FullPrecisionSettings, HalfPrecisionSettings, PrecisionSettings};
use serde::{Deserialize, Serialize};

use crate::config::VisModelingModelConfig;
use crate::error::{NeuralKinError, Result};
use crate::model::VisModelingModel;

/// Checkpoint metadata stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Epoch the checkpoint was taken at.
    pub epoch: usize,
    /// Validation loss at that epoch.
    pub val_loss: f32,
    /// Best validation loss seen so far in the run.
    pub best_val_loss: f32,
    /// Whether the records are stored at half precision.
    pub half_precision: bool,
    /// Checkpoint version for compatibility.
    pub version: u32,
}

impl CheckpointMetadata {
    /// Read metadata from a checkpoint directory.
    ///
    /// # Errors
    /// Returns a checkpoint error when the directory holds no metadata.
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join("metadata.json");
        let text = fs::read_to_string(&path).map_err(|e| NeuralKinError::Checkpoint {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&text).map_err(|e| NeuralKinError::Checkpoint {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join("metadata.json");
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Directory name for a checkpoint, embedding epoch and validation loss.
pub fn checkpoint_dir_name(epoch: usize, val_loss: f32) -> String {
    format!("epoch{:03}_val{:.4}", epoch, val_loss)
}

/// Save a checkpoint of the model to a directory.
pub fn save_checkpoint<B: Backend>(
    dir: &Path,
    model: &VisModelingModel<B>,
    metadata: &CheckpointMetadata,
) -> Result<()> {
    fs::create_dir_all(dir)?;
    metadata.write(dir)?;

    if metadata.half_precision {
        save_records::<B, HalfPrecisionSettings>(dir, model)?;
    } else {
        save_records::<B, FullPrecisionSettings>(dir, model)?;
    }

    log::info!(
        "saved checkpoint to {} (epoch {}, val loss {:.6})",
        dir.display(),
        metadata.epoch,
        metadata.val_loss
    );

    Ok(())
}

fn save_records<B: Backend, S: PrecisionSettings>(
    dir: &Path,
    model: &VisModelingModel<B>,
) -> Result<()> {
    let recorder = BinFileRecorder::<S>::new();
    model.clone().save_file(dir.join("model"), &recorder)?;
    model.encoder().clone().save_file(dir.join("encoder"), &recorder)?;
    Ok(())
}

/// Load a full model from a checkpoint directory.
///
/// The model is first initialized from `config`, so the checkpoint must
/// have been written by a model of the same configuration.
pub fn load_model<B: Backend>(
    dir: &Path,
    config: &VisModelingModelConfig,
    device: &B::Device,
) -> Result<(VisModelingModel<B>, CheckpointMetadata)> {
    let metadata = CheckpointMetadata::read(dir)?;
    let model = VisModelingModel::new(config, device);
    let path = dir.join("model");

    let model = if metadata.half_precision {
        let recorder = BinFileRecorder::<HalfPrecisionSettings>::new();
        model.load_file(path, &recorder, device)?
    } else {
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        model.load_file(path, &recorder, device)?
    };

    Ok((model, metadata))
}

/// Check if a complete checkpoint exists at the given path.
pub fn checkpoint_exists(dir: &Path) -> bool {
    dir.join("metadata.json").exists()
        && dir.join("model.bin").exists()
        && dir.join("encoder.bin").exists()
}

/// Find the checkpoint with the lowest validation loss under a run directory.
///
/// Scans `run_dir/checkpoints/*`; directories without readable metadata are
/// skipped.
pub fn best_checkpoint(run_dir: &Path) -> Option<PathBuf> {
    let mut best_loss = f32::INFINITY;
    let mut best_path = None;

    let entries = fs::read_dir(run_dir.join("checkpoints")).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() || !checkpoint_exists(&path) {
            continue;
        }
        if let Ok(metadata) = CheckpointMetadata::read(&path) {
            if metadata.val_loss < best_loss {
                best_loss = metadata.val_loss;
                best_path = Some(path);
            }
        }
    }

    best_path
}
