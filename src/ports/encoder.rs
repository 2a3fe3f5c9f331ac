//! Encoder port: Trait for fitted categorical encoders.

use crate::domain::FeatureMatrix;

/// What to do with a category the encoder was not fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCategoryPolicy {
    /// Fail the whole transform.
    #[default]
    Reject,
    /// Emit an all-zero indicator block for that field.
    ZeroFill,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("unknown category '{value}' for field {field}")]
    UnknownCategory { field: String, value: String },

    #[error("encoder was fitted on fields [{expected}], got [{actual}]")]
    FieldMismatch { expected: String, actual: String },

    #[error("row {row} has {actual} categorical values, expected {expected}")]
    RowWidth { row: usize, expected: usize, actual: usize },
}

/// Trait for one-hot style categorical encoders.
pub trait CategoricalEncoder: Send + Sync {
    /// Raw field names the encoder was fitted on, in fitted order.
    fn input_fields(&self) -> Vec<&str>;

    /// Generated column names, in output order (`{field}_{category}`).
    fn output_feature_names(&self) -> Vec<String>;

    fn unknown_policy(&self) -> UnknownCategoryPolicy;

    /// Encode categorical columns into indicator columns.
    ///
    /// `fields` names the columns of `rows`; it must equal `input_fields`.
    ///
    /// # Errors
    /// Returns `EncodeError::FieldMismatch` for a different field layout and
    /// `EncodeError::UnknownCategory` for unfitted values under `Reject`.
    fn transform(&self, fields: &[String], rows: &[Vec<&str>]) -> Result<FeatureMatrix, EncodeError>;
}
