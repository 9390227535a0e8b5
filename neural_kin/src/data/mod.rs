//! Dataset loading and batching.

mod batch;
mod dataset;

pub use batch::FrameBatch;
pub use dataset::{DatasetMeta, DatasetSplits, FrameDataset};
