//! Scoring service: Orchestrates alignment and inference.
//!
//! Every scoring path goes through `align` then the classifier, so single
//! predictions and batches see identical feature layouts.

use std::sync::Arc;

use crate::domain::{CustomerRecord, FeatureMatrix, FieldSource, Prediction, RiskTier};
use crate::ports::{CategoricalEncoder, Classifier, InferenceError};
use crate::ChurnError;

use super::alignment::align;
use super::context::ModelContext;

/// Contributions reported alongside a single prediction.
const TOP_CONTRIBUTIONS: usize = 5;

/// One feature's share of the decision value for a single customer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureContribution {
    pub feature: String,
    pub label: String,
    pub value: f64,
    pub coefficient: f64,
}

impl FeatureContribution {
    /// `coefficient * value`; positive pushes toward churn.
    #[must_use]
    pub fn contribution(&self) -> f64 {
        self.coefficient * self.value
    }
}

/// Full result of scoring one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    pub prediction: Prediction,
    pub tier: RiskTier,

    /// Largest absolute contributions first.
    pub contributions: Vec<FeatureContribution>,
}

impl PredictionReport {
    #[must_use]
    pub fn churn_probability(&self) -> f64 {
        self.prediction.churn_probability()
    }
}

/// Service for scoring customers against the loaded model.
pub struct ScoringService<C, E>
where
    C: Classifier,
    E: CategoricalEncoder,
{
    context: Arc<ModelContext<C, E>>,
}

impl<C, E> Clone for ScoringService<C, E>
where
    C: Classifier,
    E: CategoricalEncoder,
{
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
        }
    }
}

impl<C, E> ScoringService<C, E>
where
    C: Classifier,
    E: CategoricalEncoder,
{
    pub fn new(context: Arc<ModelContext<C, E>>) -> Self {
        Self { context }
    }

    #[must_use]
    pub fn context(&self) -> &ModelContext<C, E> {
        &self.context
    }

    /// Align records to the model's feature order.
    ///
    /// # Errors
    /// Returns `ChurnError::Alignment` if a record is incomplete or invalid.
    pub fn align<R: FieldSource>(&self, records: &[R]) -> Result<FeatureMatrix, ChurnError> {
        let ctx = &self.context;
        Ok(align(
            records,
            ctx.categorical_fields(),
            ctx.feature_order(),
            ctx.encoder(),
        )?)
    }

    /// Score any number of records in one pass.
    ///
    /// Results are in input order; an empty slice yields an empty vector.
    ///
    /// # Errors
    /// Returns error if alignment fails or the model rejects the matrix.
    pub fn score_records<R: FieldSource>(&self, records: &[R]) -> Result<Vec<Prediction>, ChurnError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Step 1: Aligning {} records...", records.len());
        let features = self.align(records)?;

        tracing::debug!("Step 2: Running inference...");
        let predictions = self.predict_matrix(&features)?;

        tracing::info!("Scored {} records", predictions.len());
        Ok(predictions)
    }

    /// Run the classifier over an aligned matrix. A rejection here is a
    /// defect, not bad input, and is logged as such.
    fn predict_matrix(&self, features: &FeatureMatrix) -> Result<Vec<Prediction>, ChurnError> {
        let classifier = self.context.classifier();
        let rejected = |e: InferenceError| {
            tracing::error!("Aligned matrix rejected by model: {}", e);
            e
        };
        let probabilities = classifier.predict_proba(features).map_err(rejected)?;
        let labels = classifier.predict(features).map_err(rejected)?;

        Ok(labels
            .into_iter()
            .zip(probabilities)
            .map(|(label, probs)| Prediction::new(label, probs))
            .collect())
    }

    /// Score one customer and explain the result.
    ///
    /// # Errors
    /// Same conditions as [`ScoringService::score_records`].
    pub fn score_record(&self, record: &CustomerRecord) -> Result<PredictionReport, ChurnError> {
        let features = self.align(std::slice::from_ref(record))?;
        let classifier = self.context.classifier();

        let prediction = self
            .predict_matrix(&features)?
            .into_iter()
            .next()
            .ok_or(InferenceError::EmptyInput)?;

        let labels = self.context.labels();
        let mut contributions: Vec<FeatureContribution> = features
            .columns()
            .iter()
            .zip(features.row(0).unwrap_or_default())
            .zip(classifier.coefficients())
            .filter(|((_, value), _)| **value != 0.0)
            .map(|((feature, value), coefficient)| FeatureContribution {
                feature: feature.clone(),
                label: labels.feature_label(feature),
                value: *value,
                coefficient: *coefficient,
            })
            .collect();
        contributions.sort_by(|a, b| b.contribution().abs().total_cmp(&a.contribution().abs()));
        contributions.truncate(TOP_CONTRIBUTIONS);

        let tier = prediction.risk_tier();
        tracing::info!(
            "Prediction: p(churn)={:.4} tier={} label={}",
            prediction.churn_probability(),
            tier,
            prediction.label
        );

        Ok(PredictionReport {
            prediction,
            tier,
            contributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LoadOptions;
    use crate::application::ChurnModelContext;
    use crate::domain::sample::example_records;
    use std::path::Path;

    fn service() -> ScoringService<crate::adapters::LogisticModel, crate::adapters::OneHotEncoder> {
        let ctx = ChurnModelContext::load(Path::new("models"), &LoadOptions::default()).expect("shipped artifacts");
        ScoringService::new(Arc::new(ctx))
    }

    #[test]
    fn test_batch_matches_individual_scoring() {
        let service = service();
        let records = example_records().expect("samples");

        let batch = service.score_records(&records).expect("batch scores");
        assert_eq!(batch.len(), records.len());

        for (record, from_batch) in records.iter().zip(&batch) {
            let single = service.score_record(record).expect("single score");
            assert!((single.churn_probability() - from_batch.churn_probability()).abs() < 1e-12);
            assert_eq!(single.prediction.label, from_batch.label);
        }
    }

    #[test]
    fn test_single_record_model_rejection_is_internal_error() {
        let artifacts = crate::adapters::load_artifacts(Path::new("models"), &LoadOptions::default())
            .expect("shipped artifacts");
        let mut reordered = artifacts.feature_order.clone();
        reordered.reverse();
        let ctx = ModelContext::new(
            artifacts.model,
            artifacts.encoder,
            reordered,
            artifacts.categorical_fields,
            crate::application::ModelInfo::default(),
        );
        let service = ScoringService::new(Arc::new(ctx));
        let record = example_records().expect("samples").remove(0);

        let err = service.score_record(&record).expect_err("column order mismatch");
        assert!(matches!(err, ChurnError::Inference(InferenceError::ColumnOrder { .. })));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_label_agrees_with_probability() {
        let service = service();
        let records = example_records().expect("samples");

        for p in service.score_records(&records).expect("scores") {
            assert!((0.0..=1.0).contains(&p.churn_probability()));
            assert!((p.probabilities[0] + p.probabilities[1] - 1.0).abs() < 1e-12);
            assert_eq!(p.will_churn(), p.churn_probability() > 0.5);
        }
    }

    #[test]
    fn test_known_sample_probabilities() {
        let service = service();
        let records = example_records().expect("samples");
        let scores = service.score_records(&records).expect("scores");

        assert!((scores[0].churn_probability() - 0.8889).abs() < 1e-3);
        assert_eq!(scores[0].risk_tier(), RiskTier::Alto);
        assert_eq!(scores[3].risk_tier(), RiskTier::Medio);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let service = service();
        let none: Vec<CustomerRecord> = Vec::new();
        assert!(service.score_records(&none).expect("empty ok").is_empty());
    }

    #[test]
    fn test_report_contributions_sorted() {
        let service = service();
        let records = example_records().expect("samples");
        let report = service.score_record(&records[0]).expect("scores");

        assert_eq!(report.tier, report.prediction.risk_tier());
        assert!(!report.contributions.is_empty());
        assert!(report.contributions.len() <= TOP_CONTRIBUTIONS);
        for pair in report.contributions.windows(2) {
            assert!(pair[0].contribution().abs() >= pair[1].contribution().abs());
        }
    }
}
