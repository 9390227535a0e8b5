//! Batch types for training.

use burn::prelude::*;

/// One mini-batch of frames, with ground-truth joint states when available.
#[derive(Debug, Clone)]
pub struct FrameBatch<B: Backend> {
    /// Frames: [batch, channels, height, width], pixels in `[0, 1]`.
    pub frames: Tensor<B, 4>,
    /// Ground-truth joint angles: [batch, dof], present only when the
    /// dataset ships a `states.bin`.
    pub states: Option<Tensor<B, 2>>,
}

impl<B: Backend> FrameBatch<B> {
    /// Number of samples in this batch.
    pub fn batch_size(&self) -> usize {
        self.frames.dims()[0]
    }

    /// Get the device of this batch.
    pub fn device(&self) -> B::Device {
        self.frames.device()
    }
}
