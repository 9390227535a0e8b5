//! Epoch metrics and the run-directory metrics log.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Metrics for one training epoch.
#[derive(Debug, Clone, Serialize)]
pub struct EpochMetrics {
    /// Epoch index, starting at 0.
    pub epoch: usize,
    /// Mean training loss over the epoch.
    pub train_loss: f32,
    /// Mean validation loss, absent when the validation split is empty.
    pub val_loss: Option<f32>,
    /// Mean absolute error of the predicted state against ground truth,
    /// absent when the dataset ships no states.
    pub state_mae: Option<f32>,
    /// Learning rate used for this epoch.
    pub learning_rate: f64,
}

impl EpochMetrics {
    /// Log this epoch's metrics.
    pub fn log(&self) {
        match (self.val_loss, self.state_mae) {
            (Some(val), Some(mae)) => log::info!(
                "epoch {}: train={:.6} val={:.6} state_mae={:.6} lr={:.2e}",
                self.epoch,
                self.train_loss,
                val,
                mae,
                self.learning_rate,
            ),
            (Some(val), None) => log::info!(
                "epoch {}: train={:.6} val={:.6} lr={:.2e}",
                self.epoch,
                self.train_loss,
                val,
                self.learning_rate,
            ),
            _ => log::info!(
                "epoch {}: train={:.6} lr={:.2e}",
                self.epoch,
                self.train_loss,
                self.learning_rate,
            ),
        }
    }
}

/// Append-only JSONL metrics log, one line per epoch.
pub struct MetricsWriter {
    writer: BufWriter<File>,
}

impl MetricsWriter {
    /// Create (truncate) the metrics log at the given path.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    /// Append one epoch's metrics and flush.
    pub fn append(&mut self, metrics: &EpochMetrics) -> Result<()> {
        let line = serde_json::to_string(metrics)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Mean of a slice of losses; zero when empty.
pub(crate) fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}
