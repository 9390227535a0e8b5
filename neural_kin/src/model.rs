//! The visual modeling model.

use std::path::Path;

use burn::module::Module;
use burn::prelude::*;
use burn::record::{BinFileRecorder, FullPrecisionSettings, HalfPrecisionSettings};

use crate::config::VisModelingModelConfig;
use crate::error::Result;
use crate::nn::{FrameDecoder, FrameEncoder, Mlp, MlpConfig};
use crate::training::CheckpointMetadata;

/// Frame encoder plus kinematic head: maps a frame to its state representation.
///
/// This is the piece the `kinematic` run mode initializes from a pretrained
/// checkpoint, so it is a module of its own with its own record.
#[derive(Module, Debug)]
pub struct KinematicEncoder<B: Backend> {
    /// Convolutional frame encoder.
    frames: FrameEncoder<B>,
    /// MLP projecting features to the state representation.
    head: Mlp<B>,
}

impl<B: Backend> KinematicEncoder<B> {
    /// Create a new kinematic encoder from configuration.
    pub fn new(config: &VisModelingModelConfig, device: &B::Device) -> Self {
        let frames = FrameEncoder::new(config, device);
        let head = MlpConfig::new(config.feature_dim, config.state_dim())
            .with_hidden_dims(config.variant.head_hidden())
            .init(device);

        Self { frames, head }
    }

    /// Forward pass.
    ///
    /// Input shape: [batch, channels, height, width]
    /// Output shape: [batch, state_dim]
    pub fn forward(&self, frames: Tensor<B, 4>) -> Tensor<B, 2> {
        self.head.forward(self.frames.forward(frames))
    }
}

/// Visual modeling model: kinematic encoder plus frame decoder.
///
/// The forward pass reads a frame, infers the kinematic state in the
/// configured coordinate system, and reconstructs the frame from that state
/// alone, which is what forces the state bottleneck to carry the pose.
#[derive(Module, Debug)]
pub struct VisModelingModel<B: Backend> {
    /// Kinematic encoder (frame encoder + head).
    encoder: KinematicEncoder<B>,
    /// Frame decoder.
    decoder: FrameDecoder<B>,
}

impl<B: Backend> VisModelingModel<B> {
    /// Create a new model from configuration.
    pub fn new(config: &VisModelingModelConfig, device: &B::Device) -> Self {
        Self {
            encoder: KinematicEncoder::new(config, device),
            decoder: FrameDecoder::new(config, device),
        }
    }

    /// Forward pass.
    ///
    /// Returns `(reconstruction, state)`:
    /// * reconstruction shape: [batch, channels, height, width]
    /// * state shape: [batch, state_dim]
    pub fn forward(&self, frames: Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 2>) {
        let state = self.encoder.forward(frames);
        let reconstruction = self.decoder.forward(state.clone());
        (reconstruction, state)
    }

    /// The kinematic encoder submodule.
    pub fn encoder(&self) -> &KinematicEncoder<B> {
        &self.encoder
    }

    /// Replace the kinematic encoder with weights from a pretrained checkpoint.
    ///
    /// `checkpoint_dir` is a checkpoint directory as written by the trainer;
    /// the encoder record is loaded at the precision the checkpoint metadata
    /// declares. The decoder is left untouched.
    ///
    /// # Errors
    /// Returns a checkpoint or record error when the directory is missing,
    /// inconsistent, or shaped for a different configuration.
    pub fn load_kinematic_encoder(self, checkpoint_dir: &Path, device: &B::Device) -> Result<Self> {
        let metadata = CheckpointMetadata::read(checkpoint_dir)?;
        let path = checkpoint_dir.join("encoder");

        let encoder = if metadata.half_precision {
            let recorder = BinFileRecorder::<HalfPrecisionSettings>::new();
            self.encoder.load_file(path, &recorder, device)?
        } else {
            let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
            self.encoder.load_file(path, &recorder, device)?
        };

        log::info!(
            "loaded pretrained kinematic encoder from {} (epoch {}, val loss {:.6})",
            checkpoint_dir.display(),
            metadata.epoch,
            metadata.val_loss
        );

        Ok(Self {
            encoder,
            decoder: self.decoder,
        })
    }
}
