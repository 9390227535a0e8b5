//! Neural network building blocks for the visual modeling model.

mod decoder;
mod encoder;
mod mlp;

pub use decoder::FrameDecoder;
pub use encoder::FrameEncoder;
pub use mlp::{Mlp, MlpConfig};
