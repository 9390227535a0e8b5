//! Experiment launcher for visual kinematic modeling training runs.
//!
//! Usage: `train <config.yaml> <standard|kinematic|kinematic-scratch> [pretrained_encoder]`

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use neural_kin::config::RunConfig;
use neural_kin::launch::{run, LaunchMode};
use neural_kin::{select_devices, AdBackend};

#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Train the visual kinematic modeling model from a YAML run configuration"
)]
struct TrainArgs {
    /// Path to the YAML run configuration.
    config: PathBuf,
    /// Training mode.
    #[arg(value_enum)]
    mode: Mode,
    /// Checkpoint directory of a pretrained kinematic encoder (kinematic mode only).
    pretrained_encoder: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Standard,
    Kinematic,
    KinematicScratch,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = TrainArgs::parse();

    // Report config problems directly; everything downstream assumes a
    // well-formed mapping.
    let config = match RunConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mode = match args.mode {
        Mode::Standard => LaunchMode::Standard,
        Mode::KinematicScratch => LaunchMode::KinematicScratch,
        Mode::Kinematic => LaunchMode::Kinematic {
            pretrained_encoder: args
                .pretrained_encoder
                .clone()
                .context("kinematic mode requires a pretrained encoder checkpoint path")?,
        },
    };

    let devices = select_devices(config.if_cuda, config.num_gpus)?;
    let report = run::<AdBackend>(&config, mode, devices)?;

    log::info!(
        "finished {} epoch(s); best val loss {:?}, final train loss {:.6}, {} checkpoint(s)",
        report.epochs_run,
        report.best_val_loss,
        report.final_train_loss,
        report.checkpoints_saved,
    );

    Ok(())
}
