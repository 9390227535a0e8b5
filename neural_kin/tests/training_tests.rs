//! Trainer-level integration tests.

use std::fs;
use std::path::Path;

use kin_core::CoordSystem;
use neural_kin::config::{TrainerConfig, VisModelingModelConfig};
use neural_kin::data::FrameDataset;
use neural_kin::loss::LossType;
use neural_kin::model::VisModelingModel;
use neural_kin::training::{best_checkpoint, load_model, seed_everything};
use neural_kin::{AdBackend, TrainBackend, TrainDevice, Trainer};
use tempfile::TempDir;

const SAMPLES: usize = 14;
const DOF: usize = 2;

fn write_dataset(root: &Path) {
    fs::create_dir_all(root).unwrap();

    let meta = serde_json::json!({
        "samples": SAMPLES,
        "height": 16,
        "width": 16,
        "channels": 1,
        "dof": DOF,
    });
    fs::write(root.join("meta.json"), meta.to_string()).unwrap();

    let frame_len = 16 * 16;
    let mut frame_bytes = Vec::with_capacity(SAMPLES * frame_len * 4);
    for i in 0..SAMPLES * frame_len {
        let value = (i % 23) as f32 / 23.0;
        frame_bytes.extend_from_slice(&value.to_le_bytes());
    }
    fs::write(root.join("frames.bin"), frame_bytes).unwrap();

    let mut state_bytes = Vec::with_capacity(SAMPLES * DOF * 4);
    for i in 0..SAMPLES * DOF {
        let angle = (i as f32 * 0.2) - 1.0;
        state_bytes.extend_from_slice(&angle.to_le_bytes());
    }
    fs::write(root.join("states.bin"), state_bytes).unwrap();
}

fn model_config() -> VisModelingModelConfig {
    VisModelingModelConfig::new(DOF, CoordSystem::Angular, 16, 16, 1)
}

#[test]
fn fit_then_reload_and_evaluate() {
    let workspace = TempDir::new().unwrap();
    let data = workspace.path().join("data");
    write_dataset(&data);

    seed_everything::<AdBackend>(5);
    let dataset = FrameDataset::open(&data, 1).unwrap();
    let device = TrainDevice::default();

    let run_dir = workspace.path().join("run");
    let trainer_config = TrainerConfig::new(2, 1e-3, run_dir.to_string_lossy().into_owned())
        .with_seed(5)
        .with_train_batch(4)
        .with_val_batch(2)
        .with_test_batch(2)
        .with_checkpointing(true);

    let trainer: Trainer<AdBackend> = Trainer::new(
        trainer_config,
        vec![device.clone()],
        LossType::Mse,
        CoordSystem::Angular,
    )
    .unwrap();

    let model = VisModelingModel::<AdBackend>::new(&model_config(), &device);
    let report = trainer.fit(model, &dataset).unwrap();

    assert_eq!(report.epochs_run, 2);
    assert!(report.checkpoints_saved >= 1);
    let best_val = report.best_val_loss.unwrap();
    assert!(best_val.is_finite() && best_val >= 0.0);

    // Reload the best checkpoint and measure test loss with it.
    let best = best_checkpoint(&run_dir).unwrap();
    let (reloaded, metadata) =
        load_model::<TrainBackend>(&best, &model_config(), &device).unwrap();
    assert!(metadata.half_precision);
    assert!((metadata.best_val_loss - best_val).abs() < 1e-6);

    let test_loss = trainer.evaluate(&reloaded, &dataset).unwrap().unwrap();
    assert!(test_loss.is_finite() && test_loss >= 0.0);
}

#[test]
fn full_precision_checkpoints_round_trip() {
    let workspace = TempDir::new().unwrap();
    let data = workspace.path().join("data");
    write_dataset(&data);

    let dataset = FrameDataset::open(&data, 1).unwrap();
    let device = TrainDevice::default();

    let run_dir = workspace.path().join("run");
    let trainer_config = TrainerConfig::new(1, 1e-3, run_dir.to_string_lossy().into_owned())
        .with_train_batch(4)
        .with_val_batch(2)
        .with_checkpointing(true)
        .with_half_precision(false);

    let trainer: Trainer<AdBackend> = Trainer::new(
        trainer_config,
        vec![device.clone()],
        LossType::L1,
        CoordSystem::Angular,
    )
    .unwrap();

    let model = VisModelingModel::<AdBackend>::new(&model_config(), &device);
    trainer.fit(model, &dataset).unwrap();

    let best = best_checkpoint(&run_dir).unwrap();
    let (_, metadata) = load_model::<TrainBackend>(&best, &model_config(), &device).unwrap();
    assert!(!metadata.half_precision);
}

#[test]
fn training_reduces_loss_on_a_constant_dataset() {
    // A constant frame is trivially learnable; a few epochs should beat the
    // untrained reconstruction.
    let workspace = TempDir::new().unwrap();
    let data = workspace.path().join("data");
    fs::create_dir_all(&data).unwrap();

    let meta = serde_json::json!({
        "samples": 10, "height": 16, "width": 16, "channels": 1, "dof": DOF,
    });
    fs::write(data.join("meta.json"), meta.to_string()).unwrap();
    let frame_len = 16 * 16;
    let mut frame_bytes = Vec::new();
    for _ in 0..10 * frame_len {
        frame_bytes.extend_from_slice(&0.25f32.to_le_bytes());
    }
    fs::write(data.join("frames.bin"), frame_bytes).unwrap();

    let dataset = FrameDataset::open(&data, 1).unwrap();
    let device = TrainDevice::default();

    let run_dir = workspace.path().join("run");
    let trainer_config = TrainerConfig::new(8, 1e-2, run_dir.to_string_lossy().into_owned())
        .with_train_batch(4)
        .with_val_batch(2);

    let trainer: Trainer<AdBackend> = Trainer::new(
        trainer_config,
        vec![device.clone()],
        LossType::Mse,
        CoordSystem::Angular,
    )
    .unwrap();

    let model = VisModelingModel::<AdBackend>::new(&model_config(), &device);
    let report = trainer.fit(model, &dataset).unwrap();

    let metrics = fs::read_to_string(run_dir.join("metrics.jsonl")).unwrap();
    let first: serde_json::Value = serde_json::from_str(metrics.lines().next().unwrap()).unwrap();
    let first_loss = first["train_loss"].as_f64().unwrap();

    assert!(
        (report.final_train_loss as f64) < first_loss,
        "final {} should improve on first {}",
        report.final_train_loss,
        first_loss
    );
}
