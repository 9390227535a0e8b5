//! Transposed-convolution frame decoder.

use burn::module::Module;
use burn::nn::conv::{ConvTranspose2d, ConvTranspose2dConfig};
use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::sigmoid;

use crate::config::VisModelingModelConfig;

/// Decoder that reconstructs a frame from a kinematic state representation.
///
/// Mirrors the encoder: a linear projection lifts the state to the coarsest
/// feature map, then four stride-2 transposed convolutions upsample back to
/// the frame resolution. The final sigmoid keeps pixels in `[0, 1]`.
#[derive(Module, Debug)]
pub struct FrameDecoder<B: Backend> {
    /// Projection from the state to the coarsest feature map.
    proj: Linear<B>,
    /// Stride-2 transposed convolution stack.
    deconvs: Vec<ConvTranspose2d<B>>,
    /// Activation function.
    activation: Relu,
    /// Coarsest feature map shape: [channels, height, width].
    #[module(skip)]
    base: [usize; 3],
}

impl<B: Backend> FrameDecoder<B> {
    /// Create a new frame decoder from configuration.
    pub fn new(config: &VisModelingModelConfig, device: &B::Device) -> Self {
        let enc_channels = config.variant.encoder_channels();
        let down = config.downsample();
        let base = [
            enc_channels[3],
            config.height / down,
            config.width / down,
        ];

        let proj =
            LinearConfig::new(config.state_dim(), base[0] * base[1] * base[2]).init(device);

        // Reverse of the encoder progression, ending on the frame channels.
        let steps = [
            (enc_channels[3], enc_channels[2]),
            (enc_channels[2], enc_channels[1]),
            (enc_channels[1], enc_channels[0]),
            (enc_channels[0], config.channels),
        ];
        let deconvs = steps
            .iter()
            .map(|&(in_ch, out_ch)| {
                // kernel 4, stride 2, padding 1 doubles the spatial extent exactly
                ConvTranspose2dConfig::new([in_ch, out_ch], [4, 4])
                    .with_stride([2, 2])
                    .with_padding([1, 1])
                    .init(device)
            })
            .collect();

        Self {
            proj,
            deconvs,
            activation: Relu::new(),
            base,
        }
    }

    /// Forward pass.
    ///
    /// Input shape: [batch, state_dim]
    /// Output shape: [batch, channels, height, width], values in `[0, 1]`
    pub fn forward(&self, state: Tensor<B, 2>) -> Tensor<B, 4> {
        let [batch, _] = state.dims();
        let [ch, h, w] = self.base;

        let lifted = self.activation.forward(self.proj.forward(state));
        let mut x = lifted.reshape([batch, ch, h, w]);

        let last = self.deconvs.len() - 1;
        for (i, deconv) in self.deconvs.iter().enumerate() {
            x = deconv.forward(x);
            if i < last {
                x = self.activation.forward(x);
            }
        }

        sigmoid(x)
    }
}
