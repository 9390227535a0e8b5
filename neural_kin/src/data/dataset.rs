//! On-disk frame dataset.
//!
//! A dataset root contains:
//! - `meta.json`: frame geometry and sample count
//! - `frames.bin`: raw little-endian f32 pixels, one frame per sample
//! - `states.bin` (optional): raw little-endian f32 joint angles, `dof`
//!   values per sample, used for validation-time state metrics

use std::fs;
use std::path::Path;

use burn::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::FrameBatch;
use crate::error::{NeuralKinError, Result};

/// Fraction of samples held out for each of validation and test.
const HOLDOUT_FRACTION: usize = 10;

/// Dataset metadata, stored as `meta.json` at the dataset root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Number of samples.
    pub samples: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// Frame width in pixels.
    pub width: usize,
    /// Frame channel count.
    pub channels: usize,
    /// Degrees of freedom of the recorded system.
    pub dof: usize,
}

impl DatasetMeta {
    /// Floats per frame.
    pub fn frame_len(&self) -> usize {
        self.channels * self.height * self.width
    }
}

/// Index sets for the train/val/test partition of a dataset.
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    /// Training sample indices.
    pub train: Vec<usize>,
    /// Validation sample indices.
    pub val: Vec<usize>,
    /// Test sample indices.
    pub test: Vec<usize>,
}

/// A frame dataset held in memory.
#[derive(Debug)]
pub struct FrameDataset {
    meta: DatasetMeta,
    frames: Vec<f32>,
    states: Option<Vec<f32>>,
}

impl FrameDataset {
    /// Open a dataset directory, validating sizes against `meta.json`.
    ///
    /// Frame decoding fans out over `num_workers` threads.
    ///
    /// # Errors
    /// Returns a dataset error when a file is missing, truncated, or
    /// inconsistent with the metadata.
    pub fn open(root: &Path, num_workers: usize) -> Result<Self> {
        let meta_path = root.join("meta.json");
        let meta_text = fs::read_to_string(&meta_path).map_err(|e| dataset_error(
            format!("failed to read {}: {}", meta_path.display(), e),
        ))?;
        let meta: DatasetMeta = serde_json::from_str(&meta_text).map_err(|e| dataset_error(
            format!("failed to parse {}: {}", meta_path.display(), e),
        ))?;

        if meta.samples == 0 {
            return Err(dataset_error(format!(
                "{} declares an empty dataset",
                meta_path.display()
            )));
        }
        if meta.frame_len() == 0 || meta.dof == 0 {
            return Err(dataset_error(format!(
                "{} declares degenerate frame geometry",
                meta_path.display()
            )));
        }

        let frames_path = root.join("frames.bin");
        let frame_bytes = fs::read(&frames_path).map_err(|e| dataset_error(
            format!("failed to read {}: {}", frames_path.display(), e),
        ))?;
        let expected = meta.samples * meta.frame_len() * 4;
        if frame_bytes.len() != expected {
            return Err(dataset_error(format!(
                "{}: expected {} bytes, got {}",
                frames_path.display(),
                expected,
                frame_bytes.len()
            )));
        }
        let frames = decode_f32_le(&frame_bytes, num_workers);

        let states_path = root.join("states.bin");
        let states = if states_path.exists() {
            let state_bytes = fs::read(&states_path).map_err(|e| dataset_error(
                format!("failed to read {}: {}", states_path.display(), e),
            ))?;
            let expected = meta.samples * meta.dof * 4;
            if state_bytes.len() != expected {
                return Err(dataset_error(format!(
                    "{}: expected {} bytes, got {}",
                    states_path.display(),
                    expected,
                    state_bytes.len()
                )));
            }
            let states = decode_f32_le(&state_bytes, num_workers);
            for (i, sample) in states.chunks(meta.dof).enumerate() {
                kin_core::JointState::with_dof(sample.to_vec(), meta.dof).map_err(|e| {
                    dataset_error(format!("{} sample {}: {}", states_path.display(), i, e))
                })?;
            }
            Some(states)
        } else {
            None
        };

        log::info!(
            "opened dataset at {}: {} samples of {}x{}x{}, states {}",
            root.display(),
            meta.samples,
            meta.channels,
            meta.height,
            meta.width,
            if states.is_some() { "present" } else { "absent" },
        );

        Ok(Self {
            meta,
            frames,
            states,
        })
    }

    /// Dataset metadata.
    pub fn meta(&self) -> &DatasetMeta {
        &self.meta
    }

    /// Whether ground-truth joint states are available.
    pub fn has_states(&self) -> bool {
        self.states.is_some()
    }

    /// Partition the sample indices into train/val/test.
    ///
    /// The shuffle is driven entirely by `seed`, so a given seed always
    /// produces the same partition. Validation and test each take a tenth
    /// of the samples; tiny datasets may leave them empty.
    pub fn split(&self, seed: u64) -> DatasetSplits {
        let mut indices: Vec<usize> = (0..self.meta.samples).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let holdout = self.meta.samples / HOLDOUT_FRACTION;
        let test = indices.split_off(indices.len() - holdout);
        let val = indices.split_off(indices.len() - holdout);

        DatasetSplits {
            train: indices,
            val,
            test,
        }
    }

    /// Gather one mini-batch of samples onto a device.
    ///
    /// Indices outside the dataset are a programming error upstream and
    /// are reported as a shape mismatch.
    pub fn batch<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> Result<FrameBatch<B>> {
        let frame_len = self.meta.frame_len();
        let mut frame_data = Vec::with_capacity(indices.len() * frame_len);
        for &index in indices {
            if index >= self.meta.samples {
                return Err(NeuralKinError::ShapeMismatch {
                    expected: vec![self.meta.samples],
                    got: vec![index],
                });
            }
            let start = index * frame_len;
            frame_data.extend_from_slice(&self.frames[start..start + frame_len]);
        }

        let frames = Tensor::from_data(
            TensorData::new(
                frame_data,
                [
                    indices.len(),
                    self.meta.channels,
                    self.meta.height,
                    self.meta.width,
                ],
            ),
            device,
        );

        let states = self.states.as_ref().map(|states| {
            let dof = self.meta.dof;
            let mut state_data = Vec::with_capacity(indices.len() * dof);
            for &index in indices {
                let start = index * dof;
                state_data.extend_from_slice(&states[start..start + dof]);
            }
            Tensor::from_data(TensorData::new(state_data, [indices.len(), dof]), device)
        });

        Ok(FrameBatch { frames, states })
    }
}

fn dataset_error(message: String) -> NeuralKinError {
    NeuralKinError::Dataset { message }
}

/// Convert little-endian f32 bytes, fanning the work out over decode threads.
fn decode_f32_le(bytes: &[u8], num_workers: usize) -> Vec<f32> {
    let total = bytes.len() / 4;
    if total == 0 {
        return Vec::new();
    }

    let workers = num_workers.max(1).min(total);
    let floats_per_chunk = total.div_ceil(workers);

    let mut out = Vec::with_capacity(total);
    std::thread::scope(|scope| {
        let handles: Vec<_> = bytes
            .chunks(floats_per_chunk * 4)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .chunks_exact(4)
                        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                        .collect::<Vec<f32>>()
                })
            })
            .collect();
        for handle in handles {
            out.extend(handle.join().expect("decode worker panicked"));
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use tempfile::TempDir;

    type TestBackend = NdArray;

    fn write_dataset(dir: &Path, samples: usize, with_states: bool) -> DatasetMeta {
        let meta = DatasetMeta {
            samples,
            height: 4,
            width: 4,
            channels: 1,
            dof: 2,
        };
        fs::write(dir.join("meta.json"), serde_json::to_string(&meta).unwrap()).unwrap();

        let mut frame_bytes = Vec::new();
        for i in 0..samples * meta.frame_len() {
            frame_bytes.extend_from_slice(&(i as f32).to_le_bytes());
        }
        fs::write(dir.join("frames.bin"), frame_bytes).unwrap();

        if with_states {
            let mut state_bytes = Vec::new();
            for i in 0..samples * meta.dof {
                state_bytes.extend_from_slice(&(i as f32 * 0.1).to_le_bytes());
            }
            fs::write(dir.join("states.bin"), state_bytes).unwrap();
        }

        meta
    }

    #[test]
    fn test_open_and_batch() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path(), 5, true);

        let dataset = FrameDataset::open(dir.path(), 2).unwrap();
        assert!(dataset.has_states());

        let device = Default::default();
        let batch = dataset.batch::<TestBackend>(&[0, 2], &device).unwrap();
        assert_eq!(batch.frames.dims(), [2, 1, 4, 4]);
        assert_eq!(batch.states.as_ref().unwrap().dims(), [2, 2]);

        // Sample 2's first pixel is 2 * frame_len = 32.
        let values: Vec<f32> = batch.frames.into_data().to_vec().unwrap();
        assert_eq!(values[16], 32.0);
    }

    #[test]
    fn test_open_without_states() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path(), 3, false);

        let dataset = FrameDataset::open(dir.path(), 1).unwrap();
        assert!(!dataset.has_states());

        let device = Default::default();
        let batch = dataset.batch::<TestBackend>(&[1], &device).unwrap();
        assert!(batch.states.is_none());
    }

    #[test]
    fn test_truncated_frames_rejected() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path(), 4, false);

        let bytes = fs::read(dir.path().join("frames.bin")).unwrap();
        fs::write(dir.path().join("frames.bin"), &bytes[..bytes.len() - 4]).unwrap();

        let err = FrameDataset::open(dir.path(), 1).unwrap_err();
        assert!(matches!(err, NeuralKinError::Dataset { .. }));
    }

    #[test]
    fn test_wrong_state_size_rejected() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path(), 4, true);
        fs::write(dir.path().join("states.bin"), [0u8; 12]).unwrap();

        assert!(FrameDataset::open(dir.path(), 1).is_err());
    }

    #[test]
    fn test_non_finite_state_rejected() {
        let dir = TempDir::new().unwrap();
        let meta = write_dataset(dir.path(), 4, true);

        let mut state_bytes = Vec::new();
        for _ in 0..4 * meta.dof - 1 {
            state_bytes.extend_from_slice(&0.5f32.to_le_bytes());
        }
        state_bytes.extend_from_slice(&f32::NAN.to_le_bytes());
        fs::write(dir.path().join("states.bin"), state_bytes).unwrap();

        let err = FrameDataset::open(dir.path(), 1).unwrap_err();
        assert!(err.to_string().contains("sample 3"));
    }

    #[test]
    fn test_split_is_deterministic() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path(), 30, false);
        let dataset = FrameDataset::open(dir.path(), 1).unwrap();

        let a = dataset.split(7);
        let b = dataset.split(7);
        assert_eq!(a.train, b.train);
        assert_eq!(a.val, b.val);
        assert_eq!(a.test, b.test);

        assert_eq!(a.val.len(), 3);
        assert_eq!(a.test.len(), 3);
        assert_eq!(a.train.len(), 24);

        let c = dataset.split(8);
        assert_ne!(a.train, c.train);
    }

    #[test]
    fn test_split_covers_every_sample_once() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path(), 20, false);
        let dataset = FrameDataset::open(dir.path(), 1).unwrap();

        let splits = dataset.split(0);
        let mut all: Vec<usize> = splits
            .train
            .iter()
            .chain(splits.val.iter())
            .chain(splits.test.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_decode_matches_single_worker() {
        let bytes: Vec<u8> = (0..64u32)
            .flat_map(|i| (i as f32).to_le_bytes())
            .collect();
        assert_eq!(decode_f32_le(&bytes, 1), decode_f32_le(&bytes, 5));
        assert_eq!(decode_f32_le(&bytes, 1).len(), 64);
    }
}
