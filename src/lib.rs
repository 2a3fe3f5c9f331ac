//! # ChurnLens
//!
//! Customer churn scoring dashboard for a telecom operator.
//!
//! This crate provides:
//! - Logistic regression inference over one-hot encoded customer records
//! - Single-customer and CSV batch scoring with BAJO / MEDIO / ALTO risk tiers
//! - Feature importance and a (demo) model drift monitor
//! - Terminal UI for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (customer records, predictions, metrics)
//! - `ports`: Trait definitions for the classifier, encoder and metric feeds
//! - `adapters`: Concrete implementations (JSON artifacts, CSV, simulated metrics)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{CustomerRecord, Prediction, RiskTier};

/// Result type for ChurnLens operations
pub type Result<T> = std::result::Result<T, ChurnError>;

/// Main error type for ChurnLens
#[derive(Debug, thiserror::Error)]
pub enum ChurnError {
    #[error("Model artifacts could not be loaded: {0}")]
    Artifacts(#[from] adapters::ArtifactLoadError),

    #[error("{0}")]
    MissingFields(#[from] domain::MissingFieldError),

    #[error("Invalid customer record: {0}")]
    InvalidRecord(#[from] domain::RecordError),

    #[error("Batch scoring failed: {0}")]
    Batch(#[from] application::BatchError),

    #[error("Feature alignment failed: {0}")]
    Alignment(#[from] application::AlignError),

    #[error("Inference failed: {0}")]
    Inference(#[from] ports::InferenceError),

    #[error("Metrics unavailable: {0}")]
    Metrics(#[from] ports::MetricsError),

    #[error("CSV error: {0}")]
    Csv(#[from] adapters::CsvError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChurnError {
    /// Required fields the input lacked, when that is the cause.
    #[must_use]
    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            Self::MissingFields(e) => Some(&e.fields),
            Self::InvalidRecord(domain::RecordError::Missing(e)) => Some(&e.fields),
            Self::Batch(application::BatchError::MissingColumns(e)) => Some(&e.fields),
            Self::Alignment(e) => e.missing_fields().map(|m| m.fields.as_slice()),
            _ => None,
        }
    }

    /// Whether the error stems from user input rather than an internal defect.
    ///
    /// Column mismatches between an aligned matrix and the model can only
    /// come from an alignment bug and are not the user's to fix.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Inference(_) | Self::Alignment(application::AlignError::Shape(_)) => false,
            Self::Alignment(application::AlignError::Encode(ports::EncodeError::FieldMismatch { .. })) => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_surface_from_any_layer() {
        let missing = domain::MissingFieldError::new(vec!["Contract".to_string()]);

        let batch = ChurnError::from(application::BatchError::MissingColumns(missing.clone()));
        assert_eq!(batch.missing_fields(), Some(["Contract".to_string()].as_slice()));
        assert!(batch.to_string().contains("Contract"));

        let record = ChurnError::from(domain::RecordError::from(missing));
        assert_eq!(record.missing_fields().map(<[String]>::len), Some(1));
        assert!(record.is_user_error());
    }

    #[test]
    fn test_inference_errors_are_defects() {
        let err = ChurnError::from(ports::InferenceError::EmptyInput);
        assert!(!err.is_user_error());
        assert!(err.missing_fields().is_none());
    }
}
