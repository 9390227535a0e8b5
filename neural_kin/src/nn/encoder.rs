//! Convolutional frame encoder.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::prelude::*;

use crate::config::VisModelingModelConfig;

/// Strided convolution stack that maps a frame to a flat feature vector.
///
/// Four stride-2 convolutions shrink the spatial extent by 16x, then a
/// linear projection produces the feature vector the kinematic head reads.
#[derive(Module, Debug)]
pub struct FrameEncoder<B: Backend> {
    /// Stride-2 convolution stack.
    convs: Vec<Conv2d<B>>,
    /// Projection to the feature vector.
    proj: Linear<B>,
    /// Activation function.
    activation: Relu,
}

impl<B: Backend> FrameEncoder<B> {
    /// Create a new frame encoder from configuration.
    pub fn new(config: &VisModelingModelConfig, device: &B::Device) -> Self {
        let mut convs = Vec::new();
        let mut in_ch = config.channels;

        for &out_ch in config.variant.encoder_channels().iter() {
            convs.push(
                Conv2dConfig::new([in_ch, out_ch], [3, 3])
                    .with_stride([2, 2])
                    .with_padding(PaddingConfig2d::Explicit(1, 1))
                    .init(device),
            );
            in_ch = out_ch;
        }

        let down = config.downsample();
        let spatial = (config.height / down) * (config.width / down);
        let proj = LinearConfig::new(in_ch * spatial, config.feature_dim).init(device);

        Self {
            convs,
            proj,
            activation: Relu::new(),
        }
    }

    /// Forward pass.
    ///
    /// Input shape: [batch, channels, height, width]
    /// Output shape: [batch, feature_dim]
    pub fn forward(&self, frames: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = frames;
        for conv in &self.convs {
            x = conv.forward(x);
            x = self.activation.forward(x);
        }

        let [batch, ch, h, w] = x.dims();
        let flat = x.reshape([batch, ch * h * w]);

        self.activation.forward(self.proj.forward(flat))
    }
}
