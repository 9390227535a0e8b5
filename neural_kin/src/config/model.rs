//! Model configuration types.

use burn::config::Config;
use kin_core::CoordSystem;
use serde::{Deserialize, Serialize};

use crate::error::NeuralKinError;

/// Capacity preset for the frame encoder/decoder pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    /// Default capacity.
    Baseline,
    /// Wider convolution stacks and head.
    Large,
}

impl ModelVariant {
    /// Channel progression of the four stride-2 encoder convolutions.
    pub fn encoder_channels(self) -> [usize; 4] {
        match self {
            ModelVariant::Baseline => [32, 64, 128, 256],
            ModelVariant::Large => [64, 128, 256, 512],
        }
    }

    /// Hidden layer widths of the kinematic head.
    pub fn head_hidden(self) -> Vec<usize> {
        match self {
            ModelVariant::Baseline => vec![128, 64],
            ModelVariant::Large => vec![256, 128],
        }
    }
}

impl std::str::FromStr for ModelVariant {
    type Err = NeuralKinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseline" => Ok(ModelVariant::Baseline),
            "large" => Ok(ModelVariant::Large),
            _ => Err(NeuralKinError::InvalidConfig {
                message: format!("unknown model variant '{}'", s),
            }),
        }
    }
}

/// Configuration for the visual modeling model.
#[derive(Config, Debug)]
pub struct VisModelingModelConfig {
    /// Degrees of freedom of the kinematic state.
    pub dof: usize,

    /// Space in which the kinematic head expresses the state.
    pub coord_system: CoordSystem,

    /// Frame height in pixels.
    pub height: usize,

    /// Frame width in pixels.
    pub width: usize,

    /// Frame channel count.
    pub channels: usize,

    /// Capacity preset.
    #[config(default = "ModelVariant::Baseline")]
    pub variant: ModelVariant,

    /// Width of the encoder feature vector feeding the kinematic head.
    #[config(default = 128)]
    pub feature_dim: usize,
}

impl VisModelingModelConfig {
    /// Dimensionality of the state representation the kinematic head emits.
    pub fn state_dim(&self) -> usize {
        self.coord_system.state_dim(self.dof)
    }

    /// Spatial downsampling factor of the encoder convolution stack.
    pub const fn downsample(&self) -> usize {
        16
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.dof == 0 {
            return Err("dof must be positive".to_string());
        }
        if self.channels == 0 {
            return Err("channels must be positive".to_string());
        }
        if self.feature_dim == 0 {
            return Err("feature_dim must be positive".to_string());
        }
        let down = self.downsample();
        if self.height < down || self.height % down != 0 {
            return Err(format!("height must be a positive multiple of {}", down));
        }
        if self.width < down || self.width % down != 0 {
            return Err(format!("width must be a positive multiple of {}", down));
        }
        Ok(())
    }
}
