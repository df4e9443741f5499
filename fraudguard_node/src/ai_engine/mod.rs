//! Fraud scoring engine
//!
//! A random-forest classifier plus the wrapper the HTTP layer calls to turn a
//! fraud probability into an integer risk score.

pub mod forest;
pub mod fraud_model;

pub use forest::{ForestParams, RandomForest};
pub use fraud_model::{FraudDetectionModel, FALLBACK_SCORE, MAX_RISK_SCORE};

use thiserror::Error;

/// Errors raised while training, loading or evaluating a classifier
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature count mismatch: expected {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("invalid training data: {0}")]
    InvalidTrainingData(String),

    #[error("invalid model parameters: {0}")]
    InvalidParams(String),

    #[error("corrupt model: {0}")]
    Corrupt(String),

    #[error("model file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("model json error: {0}")]
    Json(#[from] serde_json::Error),
}
