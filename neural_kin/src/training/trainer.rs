//! The training driver.

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use kin_core::CoordSystem;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::TrainerConfig;
use crate::data::FrameDataset;
use crate::error::{NeuralKinError, Result};
use crate::loss::{LossType, ReconstructionLoss};
use crate::model::VisModelingModel;
use crate::training::checkpoint::{checkpoint_dir_name, save_checkpoint, CheckpointMetadata};
use crate::training::metrics::{mean, EpochMetrics, MetricsWriter};
use crate::training::schedule::MultiStepLr;

/// Summary of a completed fit.
#[derive(Debug, Clone)]
pub struct FitReport {
    /// Number of epochs that ran.
    pub epochs_run: usize,
    /// Best validation loss seen, absent when the validation split was empty.
    pub best_val_loss: Option<f32>,
    /// Mean training loss of the final epoch.
    pub final_train_loss: f32,
    /// Number of checkpoints written.
    pub checkpoints_saved: usize,
}

/// Epoch driver over Burn's Adam optimizer and autodiff machinery.
///
/// The trainer owns no model state; `fit` takes a model, threads it through
/// the optimizer steps, and leaves the trained weights in the checkpoints.
pub struct Trainer<B: AutodiffBackend> {
    config: TrainerConfig,
    devices: Vec<B::Device>,
    loss: ReconstructionLoss,
    coord_system: CoordSystem,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// Create a trainer.
    ///
    /// The device list comes from the run configuration's GPU settings;
    /// optimization runs on the first device, the rest are the backend's
    /// business.
    ///
    /// # Errors
    /// Returns an error for an invalid configuration or an empty device list.
    pub fn new(
        config: TrainerConfig,
        devices: Vec<B::Device>,
        loss_type: LossType,
        coord_system: CoordSystem,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|message| NeuralKinError::InvalidConfig { message })?;
        if devices.is_empty() {
            return Err(NeuralKinError::Backend {
                message: "trainer needs at least one device".to_string(),
            });
        }

        Ok(Self {
            config,
            devices,
            loss: ReconstructionLoss::new(loss_type),
            coord_system,
        })
    }

    /// The run directory this trainer writes into.
    pub fn run_dir(&self) -> &Path {
        Path::new(&self.config.run_dir)
    }

    /// Run the optimization loop.
    ///
    /// Each epoch trains over the shuffled training split, validates, and
    /// logs metrics to the run directory. With checkpointing enabled, a
    /// checkpoint is saved whenever the validation loss improves.
    pub fn fit(&self, model: VisModelingModel<B>, dataset: &FrameDataset) -> Result<FitReport> {
        let device = self.devices[0].clone();
        let mut splits = dataset.split(self.config.seed);

        if splits.train.is_empty() {
            return Err(NeuralKinError::Dataset {
                message: "training split is empty".to_string(),
            });
        }
        if splits.val.is_empty() {
            log::warn!("validation split is empty; no checkpoints will be written");
        }

        let run_dir = PathBuf::from(&self.config.run_dir);
        fs::create_dir_all(&run_dir)?;
        let mut metrics_writer = MetricsWriter::create(&run_dir.join("metrics.jsonl"))?;

        let schedule = MultiStepLr::new(
            self.config.learning_rate,
            self.config.gamma,
            self.config.lr_schedule.clone(),
        );
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut optim = AdamConfig::new().init();

        let mut model = model;
        let mut best_val_loss = f32::INFINITY;
        let mut checkpoints_saved = 0;
        let mut final_train_loss = 0.0;

        for epoch in 0..self.config.epochs {
            let lr = schedule.lr_at(epoch);
            splits.train.shuffle(&mut rng);

            let mut train_losses = Vec::new();
            for chunk in splits.train.chunks(self.config.train_batch) {
                let batch = dataset.batch::<B>(chunk, &device)?;
                let (reconstruction, _state) = model.forward(batch.frames.clone());
                let loss = self.loss.forward(reconstruction, batch.frames);

                let loss_value = loss.clone().detach().into_data().to_vec::<f32>().unwrap()[0];
                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optim.step(lr, model, grads);

                train_losses.push(loss_value);
            }
            let train_loss = mean(&train_losses);
            final_train_loss = train_loss;

            let (val_loss, state_mae) = if splits.val.is_empty() {
                (None, None)
            } else {
                let (loss, mae) =
                    self.run_split(&model.valid(), dataset, &splits.val, self.config.val_batch, &device)?;
                (Some(loss), mae)
            };

            let metrics = EpochMetrics {
                epoch,
                train_loss,
                val_loss,
                state_mae,
                learning_rate: lr,
            };
            metrics.log();
            metrics_writer.append(&metrics)?;

            if let Some(val_loss) = val_loss {
                if val_loss < best_val_loss {
                    best_val_loss = val_loss;
                    if self.config.checkpointing {
                        let dir = run_dir
                            .join("checkpoints")
                            .join(checkpoint_dir_name(epoch, val_loss));
                        let metadata = CheckpointMetadata {
                            epoch,
                            val_loss,
                            best_val_loss,
                            half_precision: self.config.half_precision,
                            version: 1,
                        };
                        save_checkpoint(&dir, &model, &metadata)?;
                        checkpoints_saved += 1;
                    }
                }
            }
        }

        Ok(FitReport {
            epochs_run: self.config.epochs,
            best_val_loss: best_val_loss.is_finite().then_some(best_val_loss),
            final_train_loss,
            checkpoints_saved,
        })
    }

    /// Measure the reconstruction loss on the held-out test split.
    ///
    /// Returns `None` when the test split is empty.
    pub fn evaluate(
        &self,
        model: &VisModelingModel<B::InnerBackend>,
        dataset: &FrameDataset,
    ) -> Result<Option<f32>> {
        let device = self.devices[0].clone();
        let splits = dataset.split(self.config.seed);
        if splits.test.is_empty() {
            return Ok(None);
        }
        let (loss, _) =
            self.run_split(model, dataset, &splits.test, self.config.test_batch, &device)?;
        Ok(Some(loss))
    }

    /// Loss (and state error, when ground truth exists) over one index set.
    fn run_split(
        &self,
        model: &VisModelingModel<B::InnerBackend>,
        dataset: &FrameDataset,
        indices: &[usize],
        batch_size: usize,
        device: &B::Device,
    ) -> Result<(f32, Option<f32>)> {
        let mut losses = Vec::new();
        let mut state_errors = Vec::new();

        for chunk in indices.chunks(batch_size) {
            let batch = dataset.batch::<B::InnerBackend>(chunk, device)?;
            let (reconstruction, state) = model.forward(batch.frames.clone());
            let loss = self.loss.forward(reconstruction, batch.frames);
            losses.push(loss.into_data().to_vec::<f32>().unwrap()[0]);

            if let Some(gt) = batch.states {
                let target = self.state_targets(&gt);
                let mae = (state - target).abs().mean();
                state_errors.push(mae.into_data().to_vec::<f32>().unwrap()[0]);
            }
        }

        let mae = (!state_errors.is_empty()).then(|| mean(&state_errors));
        Ok((mean(&losses), mae))
    }

    /// Convert ground-truth joint angles into the representation the
    /// kinematic head emits, so the comparison is apples to apples.
    fn state_targets(
        &self,
        angles: &Tensor<B::InnerBackend, 2>,
    ) -> Tensor<B::InnerBackend, 2> {
        let [batch, dof] = angles.dims();
        let data: Vec<f32> = angles.clone().into_data().to_vec().unwrap();

        let dim = self.coord_system.state_dim(dof);
        let mut out = Vec::with_capacity(batch * dim);
        for sample in data.chunks(dof) {
            out.extend(kin_core::state_vector(sample, self.coord_system));
        }

        Tensor::from_data(TensorData::new(out, [batch, dim]), &angles.device())
    }
}
