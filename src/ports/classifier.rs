//! Classifier port: Trait for a fitted binary churn model.
//!
//! The application never sees the concrete model type; it only needs
//! probabilities, labels and per-feature weights.

use crate::domain::FeatureMatrix;

/// Contract violations between an aligned matrix and the fitted model.
///
/// These indicate an alignment defect, never a user input problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("model expects {expected} features, matrix has {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("feature {position} is '{actual}', model expects '{expected}'")]
    ColumnOrder {
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("cannot score an empty matrix")]
    EmptyInput,

    #[error("non-finite feature value in row {row}")]
    NonFinite { row: usize },
}

/// Trait for fitted binary classifiers.
pub trait Classifier: Send + Sync {
    /// Feature names, in the exact order the model was fitted on.
    fn feature_names(&self) -> &[String];

    /// One weight per feature, aligned with `feature_names`.
    ///
    /// Sign is the direction of the effect on churn, magnitude its strength.
    fn coefficients(&self) -> &[f64];

    fn intercept(&self) -> f64;

    /// `[P(stay), P(churn)]` for every row.
    ///
    /// # Errors
    /// Returns `InferenceError` if the matrix columns differ from
    /// `feature_names` or the matrix is empty.
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, InferenceError>;

    /// Binary label per row (0 = retained, 1 = churn).
    ///
    /// # Errors
    /// Same conditions as `predict_proba`.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<u8>, InferenceError> {
        Ok(self
            .predict_proba(features)?
            .iter()
            .map(|p| u8::from(p[1] > p[0]))
            .collect())
    }

    /// Check that a matrix matches the fitted feature layout.
    ///
    /// # Errors
    /// Returns the first mismatch found.
    fn check_columns(&self, features: &FeatureMatrix) -> Result<(), InferenceError> {
        let expected = self.feature_names();
        let actual = features.columns();

        if expected.len() != actual.len() {
            return Err(InferenceError::ColumnCount {
                expected: expected.len(),
                actual: actual.len(),
            });
        }

        if let Some((position, (e, a))) = expected
            .iter()
            .zip(actual)
            .enumerate()
            .find(|(_, (e, a))| e != a)
        {
            return Err(InferenceError::ColumnOrder {
                position,
                expected: e.clone(),
                actual: a.clone(),
            });
        }

        if features.is_empty() {
            return Err(InferenceError::EmptyInput);
        }

        Ok(())
    }
}
