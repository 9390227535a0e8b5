//! Error types for neural_kin.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or running a training experiment.
#[derive(Error, Debug)]
pub enum NeuralKinError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML.
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A configuration field has an unusable value.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The dataset on disk is malformed.
    #[error("dataset error: {message}")]
    Dataset {
        /// Description of the dataset error.
        message: String,
    },

    /// Tensor or buffer shape mismatch.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// A checkpoint directory is missing or inconsistent.
    #[error("checkpoint error: {message}")]
    Checkpoint {
        /// Description of the checkpoint error.
        message: String,
    },

    /// The requested compute backend is unavailable in this build.
    #[error("backend error: {message}")]
    Backend {
        /// Description of the backend error.
        message: String,
    },

    /// Record (de)serialization error from the training framework.
    #[error("record error: {0}")]
    Record(#[from] burn::record::RecorderError),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for neural_kin operations.
pub type Result<T> = std::result::Result<T, NeuralKinError>;
