//! One-hot encoder adapter: Implementation of `CategoricalEncoder`.
//!
//! Mirrors the fitted encoder exported with the model: one indicator column
//! per (field, category), minus the dropped category of binary fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::FeatureMatrix;
use crate::ports::{CategoricalEncoder, EncodeError, UnknownCategoryPolicy};

/// `handle_unknown` as written in the encoder artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

impl From<HandleUnknown> for UnknownCategoryPolicy {
    fn from(value: HandleUnknown) -> Self {
        match value {
            HandleUnknown::Error => Self::Reject,
            HandleUnknown::Ignore => Self::ZeroFill,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedField {
    pub name: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub drop: Option<String>,
}

/// On-disk encoder parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedEncoder {
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
    pub fields: Vec<ExportedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncoderSpecError {
    #[error("encoder has no fields")]
    Empty,

    #[error("field {0} is declared twice")]
    DuplicateField(String),

    #[error("field {0} has no categories")]
    NoCategories(String),

    #[error("field {field} lists category '{category}' twice")]
    DuplicateCategory { field: String, category: String },

    #[error("field {field} drops '{category}', which is not one of its categories")]
    UnknownDrop { field: String, category: String },
}

#[derive(Debug, Clone)]
struct FittedField {
    name: String,
    categories: Vec<String>,
    dropped: Option<usize>,
    /// Output column of each category (`None` for the dropped one).
    slots: Vec<Option<usize>>,
}

/// Fitted one-hot encoder.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    fields: Vec<FittedField>,
    output_names: Vec<String>,
    policy: UnknownCategoryPolicy,
}

impl OneHotEncoder {
    /// Validate exported parameters and precompute the output layout.
    ///
    /// # Errors
    /// Returns `EncoderSpecError` for empty or inconsistent field definitions.
    pub fn from_exported(exported: ExportedEncoder) -> Result<Self, EncoderSpecError> {
        if exported.fields.is_empty() {
            return Err(EncoderSpecError::Empty);
        }

        let mut seen_fields = HashSet::new();
        let mut fields = Vec::with_capacity(exported.fields.len());
        let mut output_names = Vec::new();

        for spec in exported.fields {
            if !seen_fields.insert(spec.name.clone()) {
                return Err(EncoderSpecError::DuplicateField(spec.name));
            }
            if spec.categories.is_empty() {
                return Err(EncoderSpecError::NoCategories(spec.name));
            }

            let mut seen = HashSet::new();
            if let Some(dup) = spec.categories.iter().find(|c| !seen.insert(c.as_str())) {
                return Err(EncoderSpecError::DuplicateCategory {
                    field: spec.name.clone(),
                    category: dup.clone(),
                });
            }

            let dropped = match &spec.drop {
                Some(category) => Some(
                    spec.categories
                        .iter()
                        .position(|c| c == category)
                        .ok_or_else(|| EncoderSpecError::UnknownDrop {
                            field: spec.name.clone(),
                            category: category.clone(),
                        })?,
                ),
                None => None,
            };

            let mut slots = Vec::with_capacity(spec.categories.len());
            for (i, category) in spec.categories.iter().enumerate() {
                if Some(i) == dropped {
                    slots.push(None);
                } else {
                    slots.push(Some(output_names.len()));
                    output_names.push(format!("{}_{}", spec.name, category));
                }
            }

            fields.push(FittedField {
                name: spec.name,
                categories: spec.categories,
                dropped,
                slots,
            });
        }

        Ok(Self {
            fields,
            output_names,
            policy: exported.handle_unknown.into(),
        })
    }

    /// Override the unknown-category policy from the artifact.
    #[must_use]
    pub fn with_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fitted categories of a field.
    #[must_use]
    pub fn categories(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.categories.as_slice())
    }

    /// Dropped category of a field, if any.
    #[must_use]
    pub fn dropped_category(&self, field: &str) -> Option<&str> {
        let f = self.fields.iter().find(|f| f.name == field)?;
        f.dropped.map(|i| f.categories[i].as_str())
    }
}

impl CategoricalEncoder for OneHotEncoder {
    fn input_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    fn output_feature_names(&self) -> Vec<String> {
        self.output_names.clone()
    }

    fn unknown_policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }

    fn transform(&self, fields: &[String], rows: &[Vec<&str>]) -> Result<FeatureMatrix, EncodeError> {
        let fitted = self.input_fields();
        if fields.len() != fitted.len() || fields.iter().zip(&fitted).any(|(a, b)| a != b) {
            return Err(EncodeError::FieldMismatch {
                expected: fitted.join(", "),
                actual: fields.join(", "),
            });
        }

        let mut matrix = FeatureMatrix::new(self.output_names.clone());
        let mut encoded = vec![0.0; self.output_names.len()];

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != self.fields.len() {
                return Err(EncodeError::RowWidth {
                    row: row_index,
                    expected: self.fields.len(),
                    actual: row.len(),
                });
            }

            encoded.fill(0.0);
            for (field, value) in self.fields.iter().zip(row) {
                match field.categories.iter().position(|c| c == value) {
                    Some(i) => {
                        if let Some(slot) = field.slots[i] {
                            encoded[slot] = 1.0;
                        }
                    }
                    None => match self.policy {
                        UnknownCategoryPolicy::Reject => {
                            return Err(EncodeError::UnknownCategory {
                                field: field.name.clone(),
                                value: (*value).to_string(),
                            });
                        }
                        UnknownCategoryPolicy::ZeroFill => {
                            tracing::warn!(
                                "Unknown category '{}' for {} encoded as all zeros (row {})",
                                value,
                                field.name,
                                row_index
                            );
                        }
                    },
                }
            }

            matrix.push_row(&encoded).map_err(|_| EncodeError::RowWidth {
                row: row_index,
                expected: self.output_names.len(),
                actual: encoded.len(),
            })?;
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(handle_unknown: HandleUnknown) -> OneHotEncoder {
        OneHotEncoder::from_exported(ExportedEncoder {
            handle_unknown,
            fields: vec![
                ExportedField {
                    name: "gender".into(),
                    categories: vec!["Female".into(), "Male".into()],
                    drop: Some("Female".into()),
                },
                ExportedField {
                    name: "Contract".into(),
                    categories: vec!["Month-to-month".into(), "One year".into(), "Two year".into()],
                    drop: None,
                },
            ],
        })
        .expect("valid encoder")
    }

    fn fields() -> Vec<String> {
        vec!["gender".into(), "Contract".into()]
    }

    #[test]
    fn test_output_names_skip_dropped_category() {
        let enc = encoder(HandleUnknown::Error);
        assert_eq!(
            enc.output_feature_names(),
            vec!["gender_Male", "Contract_Month-to-month", "Contract_One year", "Contract_Two year"]
        );
        assert_eq!(enc.dropped_category("gender"), Some("Female"));
    }

    #[test]
    fn test_transform_sets_one_indicator_per_field() {
        let enc = encoder(HandleUnknown::Error);
        let out = enc
            .transform(&fields(), &[vec!["Male", "Two year"], vec!["Female", "Month-to-month"]])
            .expect("known categories");

        assert_eq!(out.row(0), Some([1.0, 0.0, 0.0, 1.0].as_slice()));
        assert_eq!(out.row(1), Some([0.0, 1.0, 0.0, 0.0].as_slice()));
    }

    #[test]
    fn test_unknown_category_rejected_by_default() {
        let enc = encoder(HandleUnknown::Error);
        assert_eq!(enc.unknown_policy(), UnknownCategoryPolicy::Reject);

        let err = enc
            .transform(&fields(), &[vec!["Male", "Three year"]])
            .expect_err("unknown category");
        assert_eq!(
            err,
            EncodeError::UnknownCategory { field: "Contract".into(), value: "Three year".into() }
        );
    }

    #[test]
    fn test_unknown_category_zero_filled_when_ignored() {
        let enc = encoder(HandleUnknown::Ignore);
        let out = enc
            .transform(&fields(), &[vec!["Male", "Three year"]])
            .expect("ignored unknown");
        assert_eq!(out.row(0), Some([1.0, 0.0, 0.0, 0.0].as_slice()));
    }

    #[test]
    fn test_field_layout_must_match() {
        let enc = encoder(HandleUnknown::Error);
        let swapped = vec!["Contract".to_string(), "gender".to_string()];
        assert!(matches!(
            enc.transform(&swapped, &[vec!["Two year", "Male"]]),
            Err(EncodeError::FieldMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let bad_drop = ExportedEncoder {
            handle_unknown: HandleUnknown::Error,
            fields: vec![ExportedField {
                name: "gender".into(),
                categories: vec!["Female".into(), "Male".into()],
                drop: Some("Other".into()),
            }],
        };
        assert!(matches!(
            OneHotEncoder::from_exported(bad_drop),
            Err(EncoderSpecError::UnknownDrop { .. })
        ));

        let empty = ExportedEncoder { handle_unknown: HandleUnknown::Error, fields: vec![] };
        assert_eq!(OneHotEncoder::from_exported(empty).expect_err("no fields"), EncoderSpecError::Empty);
    }
}
