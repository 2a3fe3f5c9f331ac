//! Model context: fitted artifacts held read-only for the process lifetime.

use std::path::Path;

use crate::adapters::artifacts::{load_artifacts, ArtifactLoadError, LoadOptions};
use crate::adapters::{LogisticModel, OneHotEncoder};
use crate::domain::{ClassCounts, LabelCatalog, ReportedMetrics};
use crate::ports::{CategoricalEncoder, Classifier};

use super::alignment::numeric_fields;

/// Descriptive facts about the loaded model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelInfo {
    pub source: String,
    pub verified: bool,
    pub metrics: Option<ReportedMetrics>,
    pub class_counts: Option<ClassCounts>,
}

/// Everything inference needs, constructed once and never mutated.
///
/// Share it behind an `Arc`; all access is through `&self`.
#[derive(Debug)]
pub struct ModelContext<C, E> {
    classifier: C,
    encoder: E,
    feature_order: Vec<String>,
    categorical_fields: Vec<String>,
    numeric_fields: Vec<String>,
    labels: LabelCatalog,
    info: ModelInfo,
}

/// Context backed by the shipped artifact formats.
pub type ChurnModelContext = ModelContext<LogisticModel, OneHotEncoder>;

impl<C, E> ModelContext<C, E>
where
    C: Classifier,
    E: CategoricalEncoder,
{
    pub fn new(
        classifier: C,
        encoder: E,
        feature_order: Vec<String>,
        categorical_fields: Vec<String>,
        info: ModelInfo,
    ) -> Self {
        let numeric_fields = numeric_fields(&categorical_fields);
        Self {
            classifier,
            encoder,
            feature_order,
            categorical_fields,
            numeric_fields,
            labels: LabelCatalog::new(),
            info,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn categorical_fields(&self) -> &[String] {
        &self.categorical_fields
    }

    pub fn numeric_fields(&self) -> &[String] {
        &self.numeric_fields
    }

    pub fn labels(&self) -> &LabelCatalog {
        &self.labels
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

impl ChurnModelContext {
    /// Load the four artifacts from `dir`.
    ///
    /// # Errors
    /// Returns `ArtifactLoadError` if any artifact is missing or invalid.
    pub fn load(dir: &Path, options: &LoadOptions) -> Result<Self, ArtifactLoadError> {
        let artifacts = load_artifacts(dir, options)?;
        let metadata = artifacts.model.metadata().clone();

        let info = ModelInfo {
            source: dir.display().to_string(),
            verified: artifacts.verified,
            metrics: metadata.metrics,
            class_counts: metadata.class_counts,
        };

        Ok(Self::new(
            artifacts.model,
            artifacts.encoder,
            artifacts.feature_order,
            artifacts.categorical_fields,
            info,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_shareable() {
        assert_send_sync::<ChurnModelContext>();
    }

    #[test]
    fn test_load_shipped_context() {
        let ctx = ChurnModelContext::load(Path::new("models"), &LoadOptions::default())
            .expect("shipped artifacts");

        assert_eq!(ctx.feature_order().len(), ctx.classifier().coefficients().len());
        assert_eq!(ctx.numeric_fields().len(), 5);
        assert_eq!(ctx.info().class_counts.map(|c| c.total()), Some(7043));
        assert!(ctx.info().metrics.is_some());
    }
}
