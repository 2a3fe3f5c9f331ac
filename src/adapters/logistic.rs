//! Logistic regression adapter: Implementation of `Classifier`.
//!
//! Scores rows with `sigmoid(w · x + b)`. Parameters come from the exported
//! `churn_model.json`; the feature order is bound at load time so every call
//! can check that the aligned matrix matches what the model was fitted on.

use serde::{Deserialize, Serialize};

use crate::domain::{ClassCounts, FeatureMatrix, ReportedMetrics};
use crate::ports::{Classifier, InferenceError};

/// Only model family this adapter understands.
pub const LOGISTIC_MODEL_TYPE: &str = "logistic_regression";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub trained_on: Option<String>,
    #[serde(default)]
    pub metrics: Option<ReportedMetrics>,
    #[serde(default)]
    pub class_counts: Option<ClassCounts>,
}

/// On-disk model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLogisticModel {
    pub model_type: String,
    #[serde(default = "default_classes")]
    pub classes: Vec<u8>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

fn default_classes() -> Vec<u8> {
    vec![0, 1]
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("unsupported model type '{0}'")]
    UnsupportedType(String),

    #[error("expected classes [0, 1], got {0:?}")]
    Classes(Vec<u8>),

    #[error("{coefficients} coefficients for {features} features")]
    LengthMismatch { features: usize, coefficients: usize },

    #[error("model has no features")]
    Empty,

    #[error("model parameters contain non-finite values")]
    NonFinite,
}

/// Fitted binary logistic regression.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    metadata: ModelMetadata,
}

impl LogisticModel {
    /// Build a model from raw parameters.
    ///
    /// # Errors
    /// Returns `ModelError` if the parameters are empty, non-finite or do not
    /// line up with `feature_names`.
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, ModelError> {
        if feature_names.is_empty() {
            return Err(ModelError::Empty);
        }
        if coefficients.len() != feature_names.len() {
            return Err(ModelError::LengthMismatch {
                features: feature_names.len(),
                coefficients: coefficients.len(),
            });
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        Ok(Self {
            feature_names,
            coefficients,
            intercept,
            metadata: ModelMetadata::default(),
        })
    }

    /// Bind exported parameters to the feature order they were fitted on.
    ///
    /// # Errors
    /// Same as [`LogisticModel::new`], plus unsupported model type or classes.
    pub fn from_exported(
        exported: ExportedLogisticModel,
        feature_names: Vec<String>,
    ) -> Result<Self, ModelError> {
        if exported.model_type != LOGISTIC_MODEL_TYPE {
            return Err(ModelError::UnsupportedType(exported.model_type));
        }
        if exported.classes != [0, 1] {
            return Err(ModelError::Classes(exported.classes));
        }

        let mut model = Self::new(feature_names, exported.coefficients, exported.intercept)?;
        model.metadata = exported.metadata;
        Ok(model)
    }

    #[must_use]
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Raw decision value `w · x + b` for one aligned row.
    #[must_use]
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn intercept(&self) -> f64 {
        self.intercept
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, InferenceError> {
        self.check_columns(features)?;

        features
            .iter_rows()
            .enumerate()
            .map(|(row, values)| {
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(InferenceError::NonFinite { row });
                }
                let churn = sigmoid(self.decision_function(values));
                Ok([1.0 - churn, churn])
            })
            .collect()
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<u8>, InferenceError> {
        self.check_columns(features)?;
        Ok(features
            .iter_rows()
            .map(|values| u8::from(self.decision_function(values) > 0.0))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| (*c).to_string()).collect()
    }

    fn toy_model() -> LogisticModel {
        LogisticModel::new(names(&["a", "b"]), vec![2.0, -1.0], -0.5).expect("valid model")
    }

    #[test]
    fn test_sigmoid_symmetry() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(3.0) + sigmoid(-3.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    #[test]
    fn test_predict_proba_pairs_sum_to_one() {
        let model = toy_model();
        let x = FeatureMatrix::from_rows(names(&["a", "b"]), vec![vec![1.0, 0.0], vec![0.0, 3.0]])
            .expect("valid matrix");

        let probs = model.predict_proba(&x).expect("columns match");
        assert_eq!(probs.len(), 2);
        for [stay, churn] in &probs {
            assert!((stay + churn - 1.0).abs() < 1e-12);
        }
        // 2*1 - 0.5 = 1.5
        assert!((probs[0][1] - sigmoid(1.5)).abs() < 1e-12);

        let labels = model.predict(&x).expect("columns match");
        assert_eq!(labels, vec![1, 0]);
    }

    #[test]
    fn test_column_order_enforced() {
        let model = toy_model();
        let swapped =
            FeatureMatrix::from_rows(names(&["b", "a"]), vec![vec![0.0, 1.0]]).expect("valid matrix");

        let err = model.predict_proba(&swapped).expect_err("order mismatch");
        assert!(matches!(err, InferenceError::ColumnOrder { position: 0, .. }));

        let narrow = FeatureMatrix::from_rows(names(&["a"]), vec![vec![1.0]]).expect("valid matrix");
        assert_eq!(
            model.predict(&narrow).expect_err("count mismatch"),
            InferenceError::ColumnCount { expected: 2, actual: 1 }
        );
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let model = toy_model();
        let empty = FeatureMatrix::new(names(&["a", "b"]));
        assert_eq!(model.predict_proba(&empty), Err(InferenceError::EmptyInput));
    }

    #[test]
    fn test_from_exported_validates() {
        let exported = ExportedLogisticModel {
            model_type: "random_forest".into(),
            classes: vec![0, 1],
            coefficients: vec![1.0],
            intercept: 0.0,
            metadata: ModelMetadata::default(),
        };
        assert!(matches!(
            LogisticModel::from_exported(exported, names(&["a"])),
            Err(ModelError::UnsupportedType(_))
        ));

        let bad_len = LogisticModel::new(names(&["a", "b"]), vec![1.0], 0.0);
        assert_eq!(
            bad_len.expect_err("length mismatch"),
            ModelError::LengthMismatch { features: 2, coefficients: 1 }
        );
    }
}
