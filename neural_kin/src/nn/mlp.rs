//! MLP (Multi-Layer Perceptron) building blocks.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Configuration for an MLP stack.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Input dimension.
    pub input_dim: usize,
    /// Output dimension.
    pub output_dim: usize,
    /// Hidden layer dimensions.
    #[config(default = "vec![]")]
    pub hidden_dims: Vec<usize>,
    /// Dropout probability.
    #[config(default = 0.0)]
    pub dropout: f64,
}

impl MlpConfig {
    /// Initialize the MLP.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut layers = Vec::new();
        let mut in_dim = self.input_dim;

        // Hidden layers
        for &out_dim in &self.hidden_dims {
            layers.push(LinearConfig::new(in_dim, out_dim).init(device));
            in_dim = out_dim;
        }

        // Output layer
        let output = LinearConfig::new(in_dim, self.output_dim).init(device);

        let dropout = if self.dropout > 0.0 {
            Some(DropoutConfig::new(self.dropout).init())
        } else {
            None
        };

        Mlp {
            layers,
            output,
            activation: Relu::new(),
            dropout,
        }
    }
}

/// Multi-Layer Perceptron module.
///
/// The output layer is linear; callers pick their own final nonlinearity.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    /// Hidden layers.
    layers: Vec<Linear<B>>,
    /// Output layer.
    output: Linear<B>,
    /// Activation function.
    activation: Relu,
    /// Optional dropout.
    dropout: Option<Dropout>,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass.
    ///
    /// Input shape: [batch, input_dim]
    /// Output shape: [batch, output_dim]
    pub fn forward(&self, mut x: Tensor<B, 2>) -> Tensor<B, 2> {
        for layer in &self.layers {
            x = layer.forward(x);
            x = self.activation.forward(x);
            if let Some(ref dropout) = self.dropout {
                x = dropout.forward(x);
            }
        }

        self.output.forward(x)
    }

    /// Output dimension of the stack.
    pub fn output_dim(&self) -> usize {
        self.output.weight.dims()[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_mlp_forward() {
        let device = Default::default();
        let config = MlpConfig::new(6, 2).with_hidden_dims(vec![32, 16]);
        let mlp = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([4, 6], &device);
        let output = mlp.forward(input);

        assert_eq!(output.dims(), [4, 2]);
        assert_eq!(mlp.output_dim(), 2);
    }

    #[test]
    fn test_mlp_without_hidden_layers() {
        let device = Default::default();
        let config = MlpConfig::new(3, 5);
        let mlp = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([2, 3], &device);
        assert_eq!(mlp.forward(input).dims(), [2, 5]);
    }
}
