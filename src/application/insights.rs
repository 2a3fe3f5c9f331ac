//! Insights service: what the model learned and how customers split.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{ClassCounts, FieldValue, LabeledRecord, ReportedMetrics};
use crate::ports::{CategoricalEncoder, Classifier};

use super::context::ModelContext;

/// Direction of a feature's effect on churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    IncreasesChurn,
    ReducesChurn,
}

impl Impact {
    #[must_use]
    pub fn for_coefficient(coefficient: f64) -> Self {
        if coefficient > 0.0 {
            Self::IncreasesChurn
        } else {
            Self::ReducesChurn
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::IncreasesChurn => "Aumenta Churn",
            Self::ReducesChurn => "Reduce Churn",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub display_name: String,
    pub coefficient: f64,
    pub impact: Impact,
}

/// Aggregate view of the coefficient signs.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceSummary {
    pub increasing: usize,
    pub reducing: usize,
    pub strongest_increasing: Option<FeatureImportance>,
    pub strongest_reducing: Option<FeatureImportance>,
}

/// Churn share for one category of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRate {
    pub category: String,
    pub total: usize,
    pub churned: usize,
}

impl SegmentRate {
    #[must_use]
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.churned as f64 / self.total as f64
        }
    }
}

/// Service for model introspection.
pub struct InsightsService<C, E>
where
    C: Classifier,
    E: CategoricalEncoder,
{
    context: Arc<ModelContext<C, E>>,
}

impl<C, E> InsightsService<C, E>
where
    C: Classifier,
    E: CategoricalEncoder,
{
    pub fn new(context: Arc<ModelContext<C, E>>) -> Self {
        Self { context }
    }

    /// All features ordered by absolute coefficient, largest first.
    fn ranked(&self) -> Vec<FeatureImportance> {
        let classifier = self.context.classifier();
        let labels = self.context.labels();

        let mut ranked: Vec<FeatureImportance> = classifier
            .feature_names()
            .iter()
            .zip(classifier.coefficients())
            .map(|(feature, &coefficient)| FeatureImportance {
                feature: feature.clone(),
                display_name: labels.feature_label(feature),
                coefficient,
                impact: Impact::for_coefficient(coefficient),
            })
            .collect();
        ranked.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        ranked
    }

    /// The `top_n` most influential features.
    #[must_use]
    pub fn feature_importance(&self, top_n: usize) -> Vec<FeatureImportance> {
        let mut ranked = self.ranked();
        ranked.truncate(top_n);
        ranked
    }

    #[must_use]
    pub fn importance_summary(&self) -> ImportanceSummary {
        let ranked = self.ranked();
        let of = |impact: Impact| ranked.iter().filter(move |f| f.impact == impact);

        ImportanceSummary {
            increasing: of(Impact::IncreasesChurn).count(),
            reducing: of(Impact::ReducesChurn).count(),
            strongest_increasing: of(Impact::IncreasesChurn).next().cloned(),
            strongest_reducing: of(Impact::ReducesChurn).next().cloned(),
        }
    }

    #[must_use]
    pub fn reported_metrics(&self) -> Option<ReportedMetrics> {
        self.context.info().metrics
    }

    #[must_use]
    pub fn class_distribution(&self) -> Option<ClassCounts> {
        self.context.info().class_counts
    }
}

/// Churn share per category of `field` across `records`.
///
/// Categories are returned in lexical order; an unknown field yields nothing.
#[must_use]
pub fn segment_churn_rates(records: &[LabeledRecord], field: &str) -> Vec<SegmentRate> {
    let mut groups: BTreeMap<String, (usize, usize)> = BTreeMap::new();

    for labeled in records {
        let category = match labeled.record.value(field) {
            Some(FieldValue::Text(text)) => text.to_string(),
            Some(FieldValue::Number(n)) => n.to_string(),
            None => return Vec::new(),
        };
        let entry = groups.entry(category).or_default();
        entry.0 += 1;
        entry.1 += usize::from(labeled.churned);
    }

    groups
        .into_iter()
        .map(|(category, (total, churned))| SegmentRate {
            category,
            total,
            churned,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LoadOptions;
    use crate::application::ChurnModelContext;
    use crate::domain::sample::reference_records;
    use std::path::Path;

    fn service() -> InsightsService<crate::adapters::LogisticModel, crate::adapters::OneHotEncoder> {
        let ctx = ChurnModelContext::load(Path::new("models"), &LoadOptions::default()).expect("shipped artifacts");
        InsightsService::new(Arc::new(ctx))
    }

    #[test]
    fn test_importance_sorted_by_magnitude() {
        let top = service().feature_importance(10);
        assert_eq!(top.len(), 10);
        for pair in top.windows(2) {
            assert!(pair[0].coefficient.abs() >= pair[1].coefficient.abs());
        }
        for f in &top {
            assert_eq!(f.impact == Impact::IncreasesChurn, f.coefficient > 0.0);
        }
    }

    #[test]
    fn test_summary_counts_cover_all_features() {
        let service = service();
        let summary = service.importance_summary();
        let total = service.feature_importance(usize::MAX).len();

        assert_eq!(summary.increasing + summary.reducing, total);
        let up = summary.strongest_increasing.expect("some feature raises churn");
        assert!(up.coefficient > 0.0);
        assert_eq!(up.impact.label(), "Aumenta Churn");
        let down = summary.strongest_reducing.expect("some feature lowers churn");
        assert!(down.coefficient <= 0.0);
    }

    #[test]
    fn test_metadata_exposed() {
        let service = service();
        let counts = service.class_distribution().expect("class counts shipped");
        assert_eq!(counts.retained, 5174);
        assert_eq!(counts.churned, 1869);
        assert!(service.reported_metrics().is_some());
    }

    #[test]
    fn test_segment_rates() {
        let records = reference_records().expect("reference rows");
        let rates = segment_churn_rates(&records, "Contract");

        let monthly = rates
            .iter()
            .find(|r| r.category == "Month-to-month")
            .expect("month-to-month present");
        assert_eq!(monthly.total, 2);
        assert_eq!(monthly.churned, 1);
        assert!((monthly.rate() - 0.5).abs() < 1e-12);

        assert_eq!(rates.iter().map(|r| r.total).sum::<usize>(), records.len());
        assert!(segment_churn_rates(&records, "NotAField").is_empty());
    }
}
