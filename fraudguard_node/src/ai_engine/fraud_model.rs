//! Fraud detection model wrapper
//! Scores feature vectors with a trained forest, or a constant when no model is installed

use super::{ModelError, RandomForest};
use log::{info, warn};
use std::io::ErrorKind;
use std::path::Path;

/// Score returned when no trained model is available
pub const FALLBACK_SCORE: u32 = 500;

/// Upper bound of the risk score scale
pub const MAX_RISK_SCORE: u32 = 1000;

/// Fraud detection model used by the API
pub struct FraudDetectionModel {
    /// Trained classifier; `None` means fallback scoring
    model: Option<RandomForest>,
}

impl FraudDetectionModel {
    /// Load a model from `path`.
    ///
    /// A missing file is not an error: the wrapper falls back to
    /// [`FALLBACK_SCORE`]. Unreadable or corrupt files are.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        match RandomForest::load(path) {
            Ok(forest) => {
                info!(
                    "Loaded model from {} ({} trees, {} features)",
                    path.display(),
                    forest.n_trees(),
                    forest.n_features()
                );
                Ok(Self::from_forest(forest))
            }
            Err(ModelError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Model file {} not found. Using fallback score {}.",
                    path.display(),
                    FALLBACK_SCORE
                );
                Ok(Self::fallback())
            }
            Err(e) => Err(e),
        }
    }

    pub fn from_forest(forest: RandomForest) -> Self {
        Self {
            model: Some(forest),
        }
    }

    pub fn fallback() -> Self {
        Self { model: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Number of features the model expects, if a model is loaded
    pub fn expected_features(&self) -> Option<usize> {
        self.model.as_ref().map(RandomForest::n_features)
    }

    /// Risk score in `[0, MAX_RISK_SCORE]`: `floor(P(fraud) * 1000)`
    pub fn predict_score(&self, features: &[f64]) -> Result<u32, ModelError> {
        match &self.model {
            None => Ok(FALLBACK_SCORE),
            Some(forest) => {
                let probability = forest.predict_proba(features)?;
                let score = (probability * MAX_RISK_SCORE as f64) as u32;
                Ok(score.min(MAX_RISK_SCORE))
            }
        }
    }
}
