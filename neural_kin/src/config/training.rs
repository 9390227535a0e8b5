//! Trainer configuration.

use burn::config::Config;

/// Configuration for the training driver.
///
/// Field values come verbatim from the run configuration; the launcher only
/// decides the mode toggles (`checkpointing`).
#[derive(Config, Debug)]
pub struct TrainerConfig {
    /// Maximum training epochs.
    pub epochs: usize,

    /// Base learning rate.
    pub learning_rate: f64,

    /// Run directory: metrics and checkpoints land here.
    pub run_dir: String,

    /// Learning-rate decay factor applied at each schedule milestone.
    #[config(default = 1.0)]
    pub gamma: f64,

    /// Epoch milestones at which the learning rate decays by `gamma`.
    #[config(default = "vec![]")]
    pub lr_schedule: Vec<usize>,

    /// Seed for the trainer's own RNG use (shuffles, splits).
    #[config(default = 42)]
    pub seed: u64,

    /// Training batch size.
    #[config(default = 1)]
    pub train_batch: usize,

    /// Validation batch size.
    #[config(default = 1)]
    pub val_batch: usize,

    /// Test batch size, consumed by [`crate::Trainer::evaluate`].
    #[config(default = 1)]
    pub test_batch: usize,

    /// Save a checkpoint whenever the validation loss improves.
    #[config(default = false)]
    pub checkpointing: bool,

    /// Store checkpoint records at half precision.
    #[config(default = true)]
    pub half_precision: bool,
}

impl TrainerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.epochs == 0 {
            return Err("epochs must be positive".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err("learning_rate must be positive and finite".to_string());
        }
        if self.train_batch == 0 || self.val_batch == 0 || self.test_batch == 0 {
            return Err("batch sizes must be positive".to_string());
        }
        if self.run_dir.is_empty() {
            return Err("run_dir must not be empty".to_string());
        }
        Ok(())
    }
}
