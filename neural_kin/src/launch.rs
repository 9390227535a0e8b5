//! Launch logic for the three run modes.
//!
//! One parameterized launch function covers the three modes; the mode only
//! decides whether a pretrained encoder is loaded and whether checkpointing
//! is on.

use std::path::PathBuf;

use burn::tensor::backend::AutodiffBackend;

use crate::config::{RunConfig, TrainerConfig, VisModelingModelConfig};
use crate::data::FrameDataset;
use crate::error::{NeuralKinError, Result};
use crate::model::VisModelingModel;
use crate::training::{seed_everything, FitReport, Trainer};

/// The three training modes the launcher supports.
#[derive(Debug, Clone)]
pub enum LaunchMode {
    /// Train the full model; no checkpoint callbacks.
    Standard,
    /// Fine-tune, initializing the kinematic encoder from a pretrained
    /// checkpoint, with validation-monitored checkpointing.
    Kinematic {
        /// Checkpoint directory holding the pretrained encoder record.
        pretrained_encoder: PathBuf,
    },
    /// Train the kinematic model from scratch with validation-monitored
    /// checkpointing.
    KinematicScratch,
}

impl LaunchMode {
    /// Whether this mode saves checkpoints on validation improvement.
    pub fn checkpointing(&self) -> bool {
        !matches!(self, LaunchMode::Standard)
    }

    /// The mode's name, as spelled on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            LaunchMode::Standard => "standard",
            LaunchMode::Kinematic { .. } => "kinematic",
            LaunchMode::KinematicScratch => "kinematic-scratch",
        }
    }
}

/// Launch one training run.
///
/// Validates and logs the configuration, seeds determinism sources, opens
/// the dataset, builds the model and trainer with the configured field
/// mapping, and runs the fit.
///
/// # Errors
/// Propagates configuration, dataset, checkpoint and I/O errors; an
/// unreadable pretrained encoder in `kinematic` mode fails the launch.
pub fn run<B: AutodiffBackend>(
    config: &RunConfig,
    mode: LaunchMode,
    devices: Vec<B::Device>,
) -> Result<FitReport> {
    config.validate()?;
    log::info!("run configuration: {:#?}", config);

    let run_dir = config.run_dir();
    log::info!("mode '{}', run directory '{}'", mode.name(), run_dir);

    seed_everything::<B>(config.seed);

    let dataset = FrameDataset::open(&config.data_filepath, config.num_workers)?;
    let meta = dataset.meta();
    if meta.dof != config.dof {
        return Err(NeuralKinError::InvalidConfig {
            message: format!(
                "config dof {} does not match dataset dof {}",
                config.dof, meta.dof
            ),
        });
    }

    let model_config = VisModelingModelConfig::new(
        config.dof,
        config.coord_system()?,
        meta.height,
        meta.width,
        meta.channels,
    )
    .with_variant(config.model_variant()?);
    model_config
        .validate()
        .map_err(|message| NeuralKinError::InvalidConfig { message })?;

    let device = devices
        .first()
        .ok_or_else(|| NeuralKinError::Backend {
            message: "launch needs at least one device".to_string(),
        })?
        .clone();

    let mut model: VisModelingModel<B> = VisModelingModel::new(&model_config, &device);
    if let LaunchMode::Kinematic { pretrained_encoder } = &mode {
        model = model.load_kinematic_encoder(pretrained_encoder, &device)?;
    }

    let trainer_config = TrainerConfig::new(config.epochs, config.lr, run_dir)
        .with_gamma(config.gamma)
        .with_lr_schedule(config.lr_schedule.clone())
        .with_seed(config.seed)
        .with_train_batch(config.train_batch)
        .with_val_batch(config.val_batch)
        .with_test_batch(config.test_batch)
        .with_checkpointing(mode.checkpointing());

    let trainer = Trainer::new(
        trainer_config,
        devices,
        config.loss_type()?,
        config.coord_system()?,
    )?;

    trainer.fit(model, &dataset)
}
