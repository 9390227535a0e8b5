//! The YAML-backed run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use kin_core::CoordSystem;
use serde::{Deserialize, Serialize};

use crate::config::ModelVariant;
use crate::error::{NeuralKinError, Result};
use crate::loss::LossType;

/// One training run's settings, loaded from a YAML mapping.
///
/// The configuration is read once at launch and treated as immutable for the
/// run's duration. Fields are copied verbatim into the model and trainer
/// constructors; nothing is silently defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Base learning rate.
    pub lr: f64,
    /// RNG seed for the whole run.
    pub seed: u64,
    /// Degrees of freedom of the kinematic state.
    pub dof: usize,
    /// Run on the GPU backend.
    pub if_cuda: bool,
    /// Learning-rate decay factor applied at each schedule milestone.
    pub gamma: f64,
    /// Training batch size.
    pub train_batch: usize,
    /// Validation batch size.
    pub val_batch: usize,
    /// Test batch size.
    pub test_batch: usize,
    /// Dataset decode worker threads.
    pub num_workers: usize,
    /// Model variant selector.
    pub model_name: String,
    /// Dataset root directory.
    pub data_filepath: PathBuf,
    /// Reconstruction loss selector (`mse`, `l1` or `bce`).
    pub loss_type: String,
    /// Kinematic head output space (`cartesian` or `angular`).
    pub coord_system: String,
    /// Epoch milestones at which the learning rate decays by `gamma`.
    pub lr_schedule: Vec<usize>,
    /// Maximum training epochs.
    pub epochs: usize,
    /// Device count for the GPU backend.
    pub num_gpus: usize,
    /// Run directory prefix.
    pub log_dir: String,
    /// Free-form experiment tag.
    pub tag: String,
}

impl RunConfig {
    /// Load a run configuration from a YAML file.
    ///
    /// # Errors
    /// Returns a config error naming the path when the file cannot be read
    /// or does not parse as the expected mapping.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| NeuralKinError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| NeuralKinError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the configuration for values no run could use.
    ///
    /// # Errors
    /// Returns an `InvalidConfig` error describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.dof == 0 {
            return Err(invalid("dof must be positive"));
        }
        if self.epochs == 0 {
            return Err(invalid("epochs must be positive"));
        }
        if self.train_batch == 0 || self.val_batch == 0 || self.test_batch == 0 {
            return Err(invalid("batch sizes must be positive"));
        }
        if !(self.lr > 0.0 && self.lr.is_finite()) {
            return Err(invalid("lr must be positive and finite"));
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(invalid("gamma must be in (0, 1]"));
        }
        if self.lr_schedule.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("lr_schedule milestones must be strictly ascending"));
        }
        self.loss_type()?;
        self.coord_system()?;
        self.model_variant()?;
        Ok(())
    }

    /// The reconstruction loss selected by `loss_type`.
    pub fn loss_type(&self) -> Result<LossType> {
        self.loss_type
            .parse()
            .map_err(|_| invalid(&format!("unknown loss_type '{}'", self.loss_type)))
    }

    /// The coordinate system selected by `coord_system`.
    pub fn coord_system(&self) -> Result<CoordSystem> {
        self.coord_system
            .parse()
            .map_err(|_| invalid(&format!("unknown coord_system '{}'", self.coord_system)))
    }

    /// The model variant selected by `model_name`.
    pub fn model_variant(&self) -> Result<ModelVariant> {
        self.model_name
            .parse()
            .map_err(|_| invalid(&format!("unknown model_name '{}'", self.model_name)))
    }

    /// Directory name for this run: `{log_dir}_{model_name}_{tag}_{seed}`.
    pub fn run_dir(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.log_dir, self.model_name, self.tag, self.seed
        )
    }
}

fn invalid(message: &str) -> NeuralKinError {
    NeuralKinError::InvalidConfig {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunConfig {
        RunConfig {
            lr: 1e-4,
            seed: 3,
            dof: 4,
            if_cuda: false,
            gamma: 0.5,
            train_batch: 16,
            val_batch: 8,
            test_batch: 8,
            num_workers: 2,
            model_name: "baseline".to_string(),
            data_filepath: PathBuf::from("data/arm"),
            loss_type: "mse".to_string(),
            coord_system: "angular".to_string(),
            lr_schedule: vec![30, 60],
            epochs: 90,
            num_gpus: 1,
            log_dir: "logs".to_string(),
            tag: "dev".to_string(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_run_dir_naming() {
        assert_eq!(sample().run_dir(), "logs_baseline_dev_3");
    }

    #[test]
    fn test_rejects_zero_fields() {
        let mut config = sample();
        config.dof = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.epochs = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.val_batch = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_selectors() {
        let mut config = sample();
        config.loss_type = "hinge".to_string();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.coord_system = "polar".to_string();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.model_name = "resnet".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unsorted_schedule() {
        let mut config = sample();
        config.lr_schedule = vec![60, 30];
        assert!(config.validate().is_err());

        config.lr_schedule = vec![30, 30];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
lr: 0.0005
seed: 42
dof: 6
if_cuda: false
gamma: 0.1
train_batch: 32
val_batch: 16
test_batch: 16
num_workers: 4
model_name: large
data_filepath: datasets/crane
loss_type: bce
coord_system: cartesian
lr_schedule: [50, 80]
epochs: 100
num_gpus: 2
log_dir: runs
tag: night
"#;
        let config: RunConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.dof, 6);
        assert_eq!(config.coord_system().unwrap(), CoordSystem::Cartesian);
        assert_eq!(config.loss_type().unwrap(), LossType::Bce);
        assert_eq!(config.run_dir(), "runs_large_night_42");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let yaml = "lr: 0.001\nseed: 1\n";
        assert!(serde_yaml::from_str::<RunConfig>(yaml).is_err());
    }
}
