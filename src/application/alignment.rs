//! Feature alignment: raw records to the model's feature layout.
//!
//! Steps, per batch:
//! 1. Check every required raw field is present (all missing names at once)
//! 2. Split fields into the categorical subset and the numeric rest
//! 3. Encode the categorical subset
//! 4. Concatenate numeric + encoded columns
//! 5. Reindex to the expected feature order, zero-filling absent columns

use crate::domain::{FeatureMatrix, FieldSource, FieldValue, MissingFieldError, ShapeError, REQUIRED_FIELDS};
use crate::ports::{CategoricalEncoder, EncodeError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignError {
    #[error("record {row}: {source}")]
    Missing {
        row: usize,
        #[source]
        source: MissingFieldError,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("record {row}: field {field} must be numeric, got '{value}'")]
    NotNumeric { row: usize, field: String, value: String },

    #[error("record {row}: categorical field {field} has a numeric value")]
    NotCategorical { row: usize, field: String },

    #[error("alignment produced an inconsistent matrix: {0}")]
    Shape(#[from] ShapeError),
}

impl AlignError {
    /// Missing fields, when that is the cause.
    #[must_use]
    pub fn missing_fields(&self) -> Option<&MissingFieldError> {
        match self {
            Self::Missing { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Required raw fields that are not routed through the encoder, in canonical order.
#[must_use]
pub fn numeric_fields(categorical_fields: &[String]) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|f| !categorical_fields.iter().any(|c| c == *f))
        .map(|f| (*f).to_string())
        .collect()
}

fn missing_fields<R: FieldSource>(record: &R, categorical_fields: &[String]) -> Vec<String> {
    let extra = categorical_fields
        .iter()
        .map(String::as_str)
        .filter(|c| !REQUIRED_FIELDS.contains(c));

    REQUIRED_FIELDS
        .iter()
        .copied()
        .chain(extra)
        .filter(|f| record.field(f).is_none())
        .map(str::to_string)
        .collect()
}

/// Align raw records to `expected_feature_order`.
///
/// The result always has exactly `expected_feature_order.len()` columns in
/// that order; aligning the same records twice yields identical matrices.
///
/// # Errors
/// Returns `AlignError::Missing` for the first record lacking required
/// fields, `AlignError::Encode` when the encoder rejects a value, and
/// `AlignError::NotNumeric` for numeric fields that do not parse to a finite number.
pub fn align<R, E>(
    records: &[R],
    categorical_fields: &[String],
    expected_feature_order: &[String],
    encoder: &E,
) -> Result<FeatureMatrix, AlignError>
where
    R: FieldSource,
    E: CategoricalEncoder + ?Sized,
{
    for (row, record) in records.iter().enumerate() {
        let missing = missing_fields(record, categorical_fields);
        if !missing.is_empty() {
            return Err(AlignError::Missing {
                row,
                source: MissingFieldError::new(missing),
            });
        }
    }

    let numeric = numeric_fields(categorical_fields);
    let mut numeric_matrix = FeatureMatrix::new(numeric.clone());
    let mut categorical_rows: Vec<Vec<&str>> = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        let mut values = Vec::with_capacity(numeric.len());
        for field in &numeric {
            let value = match record.field(field) {
                Some(FieldValue::Number(v)) => v,
                Some(FieldValue::Text(text)) => text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| AlignError::NotNumeric {
                        row,
                        field: field.clone(),
                        value: text.to_string(),
                    })?,
                None => {
                    return Err(AlignError::Missing {
                        row,
                        source: MissingFieldError::new(vec![field.clone()]),
                    })
                }
            };
            values.push(value);
        }
        numeric_matrix.push_row(&values)?;

        let mut categories = Vec::with_capacity(categorical_fields.len());
        for field in categorical_fields {
            match record.field(field) {
                Some(FieldValue::Text(text)) => categories.push(text.trim()),
                Some(FieldValue::Number(_)) => {
                    return Err(AlignError::NotCategorical {
                        row,
                        field: field.clone(),
                    })
                }
                None => {
                    return Err(AlignError::Missing {
                        row,
                        source: MissingFieldError::new(vec![field.clone()]),
                    })
                }
            }
        }
        categorical_rows.push(categories);
    }

    let encoded = encoder.transform(categorical_fields, &categorical_rows)?;
    let combined = numeric_matrix.hstack(&encoded)?;

    tracing::debug!(
        "Aligned {} records: {} numeric + {} encoded -> {} features",
        records.len(),
        numeric.len(),
        encoded.n_cols(),
        expected_feature_order.len()
    );

    Ok(combined.reindex(expected_feature_order))
}
