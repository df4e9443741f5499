//! Random forest classifier for binary fraud labels
//!
//! Each member of the ensemble is a single-tree smartcore forest grown on its
//! own bootstrap sample. The fraud probability is the fraction of members that
//! vote for label 1.

use super::ModelError;
use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;

type Member = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

/// Training parameters for the forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth of each tree (unbounded when `None`)
    pub max_depth: Option<u16>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Seed for bootstrap and feature sampling
    pub seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: None,
        }
    }
}

/// Trained random forest
#[derive(Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    members: Vec<Member>,
}

impl RandomForest {
    /// Fit a forest on `x` (one row per sample) and 0/1 labels `y`
    pub fn fit(
        x: &Array2<f64>,
        y: &Array1<u8>,
        params: &ForestParams,
    ) -> Result<Self, ModelError> {
        let (n_samples, n_features) = x.dim();

        if n_samples == 0 || n_features == 0 {
            return Err(ModelError::InvalidTrainingData(
                "training set is empty".to_string(),
            ));
        }
        if y.len() != n_samples {
            return Err(ModelError::InvalidTrainingData(format!(
                "{} rows but {} labels",
                n_samples,
                y.len()
            )));
        }
        if y.iter().any(|&label| label > 1) {
            return Err(ModelError::InvalidTrainingData(
                "labels must be 0 or 1".to_string(),
            ));
        }
        if !(y.iter().any(|&label| label == 0) && y.iter().any(|&label| label == 1)) {
            return Err(ModelError::InvalidTrainingData(
                "labels must contain both classes".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidTrainingData(
                "features must be finite".to_string(),
            ));
        }
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidParams(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if params.min_samples_split < 2 {
            return Err(ModelError::InvalidParams(
                "min_samples_split must be at least 2".to_string(),
            ));
        }

        let rows: Vec<Vec<f64>> = x.outer_iter().map(|row| row.to_vec()).collect();
        let matrix = DenseMatrix::from_2d_vec(&rows);
        let labels: Vec<u32> = y.iter().map(|&label| u32::from(label)).collect();

        let base_seed = params.seed.unwrap_or_else(rand::random);

        let mut members = Vec::with_capacity(params.n_estimators);
        for i in 0..params.n_estimators {
            let mut member_params = RandomForestClassifierParameters::default()
                .with_n_trees(1)
                .with_min_samples_split(params.min_samples_split)
                .with_seed(base_seed.wrapping_add(i as u64));
            if let Some(depth) = params.max_depth {
                member_params = member_params.with_max_depth(depth);
            }

            let member = RandomForestClassifier::fit(&matrix, &labels, member_params)
                .map_err(|e| ModelError::InvalidTrainingData(format!("tree {}: {}", i, e)))?;
            members.push(member);
        }

        debug!(
            "Fitted forest: {} trees, {} features, {} samples",
            members.len(),
            n_features,
            n_samples
        );

        Ok(Self {
            n_features,
            members,
        })
    }

    /// Probability of the fraud class (label 1), in `[0, 1]`
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let row = DenseMatrix::from_2d_vec(&vec![features.to_vec()]);
        let mut votes = 0usize;
        for member in &self.members {
            let labels = member
                .predict(&row)
                .map_err(|e| ModelError::Corrupt(e.to_string()))?;
            if labels.first() == Some(&1) {
                votes += 1;
            }
        }

        Ok(votes as f64 / self.members.len() as f64)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }

    /// Serialize to `path`; `.json` files are written as JSON, everything else as bincode
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let bytes = if is_json(path) {
            serde_json::to_vec(self)?
        } else {
            bincode::serialize(self)?
        };
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Deserialize from `path` and check that every tree can predict
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let forest: Self = if is_json(path) {
            serde_json::from_slice(&bytes)?
        } else {
            bincode::deserialize(&bytes)?
        };
        forest.validate()?;
        Ok(forest)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::Corrupt("model has zero features".to_string()));
        }
        if self.members.is_empty() {
            return Err(ModelError::Corrupt("model has no trees".to_string()));
        }

        self.predict_proba(&vec![0.0; self.n_features]).map(|_| ())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<u8>) {
        // Label is 1 exactly when the first feature exceeds 0.5; the second mirrors it
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..200 {
            let a = (i as f64) / 200.0;
            rows.extend_from_slice(&[a, 1.0 - a]);
            labels.push(u8::from(a > 0.5));
        }
        (
            Array2::from_shape_vec((200, 2), rows).unwrap(),
            Array1::from(labels),
        )
    }

    fn seeded(n_estimators: usize) -> ForestParams {
        ForestParams {
            n_estimators,
            seed: Some(7),
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_learns_separable_data() {
        let (x, y) = separable_data();
        let forest = RandomForest::fit(&x, &y, &seeded(25)).unwrap();

        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.n_features(), 2);
        assert!(forest.predict_proba(&[0.95, 0.05]).unwrap() > 0.8);
        assert!(forest.predict_proba(&[0.05, 0.95]).unwrap() < 0.2);
    }

    #[test]
    fn test_probability_is_bounded() {
        let (x, y) = separable_data();
        let forest = RandomForest::fit(&x, &y, &seeded(10)).unwrap();

        for sample in [[-10.0, 5.0], [0.5, 0.5], [1e9, -1e9]] {
            let p = forest.predict_proba(&sample).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_adjacent_float_values_terminate() {
        // The midpoint of two neighbouring floats rounds onto one of them
        let low = f64::from_bits(1.0f64.to_bits() + 1);
        let high = f64::from_bits(1.0f64.to_bits() + 2);
        let x = array![[low], [high]];
        let y = array![0u8, 1];

        let params = ForestParams {
            n_estimators: 1,
            seed: Some(1),
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&x, &y, &params).unwrap();

        for sample in [[low], [high], [0.0]] {
            let p = forest.predict_proba(&sample).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_depth_limited_stumps() {
        let (x, y) = separable_data();
        let params = ForestParams {
            max_depth: Some(1),
            ..seeded(3)
        };
        let forest = RandomForest::fit(&x, &y, &params).unwrap();

        let p = forest.predict_proba(&[0.9, 0.1]).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = separable_data();
        let a = RandomForest::fit(&x, &y, &seeded(8)).unwrap();
        let b = RandomForest::fit(&x, &y, &seeded(8)).unwrap();

        for sample in [[0.2, 0.9], [0.51, 0.1], [0.7, 0.7]] {
            assert_eq!(
                a.predict_proba(&sample).unwrap(),
                b.predict_proba(&sample).unwrap()
            );
        }
    }

    #[test]
    fn test_feature_mismatch() {
        let (x, y) = separable_data();
        let forest = RandomForest::fit(&x, &y, &seeded(2)).unwrap();

        let err = forest.predict_proba(&[0.1, 0.2, 0.3]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_rejects_bad_training_input() {
        let x = array![[0.1, 0.2], [0.3, 0.4]];

        let wrong_len = array![0u8];
        assert!(RandomForest::fit(&x, &wrong_len, &seeded(2)).is_err());

        let bad_labels = array![0u8, 2];
        assert!(RandomForest::fit(&x, &bad_labels, &seeded(2)).is_err());

        let single_class = array![1u8, 1];
        assert!(RandomForest::fit(&x, &single_class, &seeded(2)).is_err());

        let y = array![0u8, 1];
        assert!(RandomForest::fit(&x, &y, &seeded(0)).is_err());

        let non_finite = array![[0.1, f64::NAN], [0.3, 0.4]];
        assert!(RandomForest::fit(&non_finite, &y, &seeded(2)).is_err());

        let empty = Array2::<f64>::zeros((0, 2));
        assert!(RandomForest::fit(&empty, &Array1::<u8>::zeros(0), &seeded(2)).is_err());
    }

    #[test]
    fn test_save_and_load_formats() {
        let (x, y) = separable_data();
        let forest = RandomForest::fit(&x, &y, &seeded(4)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        for name in ["model.bin", "model.json"] {
            let path = dir.path().join(name);
            forest.save(&path).unwrap();
            let loaded = RandomForest::load(&path).unwrap();
            assert_eq!(loaded.n_trees(), 4);
            assert_eq!(loaded.n_features(), 2);
            for sample in [[0.8, 0.2], [0.1, 0.9]] {
                assert_eq!(
                    loaded.predict_proba(&sample).unwrap(),
                    forest.predict_proba(&sample).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_load_rejects_empty_forest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"n_features":2,"members":[]}"#).unwrap();

        assert!(matches!(
            RandomForest::load(&path),
            Err(ModelError::Corrupt(_))
        ));
    }
}
