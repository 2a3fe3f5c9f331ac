//! Model performance metrics over time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metrics tracked by the monitoring screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelMetric {
    Accuracy,
    RocAuc,
    F1,
}

impl ModelMetric {
    pub const ALL: [Self; 3] = [Self::Accuracy, Self::RocAuc, Self::F1];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accuracy => "Accuracy",
            Self::RocAuc => "ROC AUC",
            Self::F1 => "F1",
        }
    }

    /// Column name used in metric history files.
    #[must_use]
    pub fn column(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::RocAuc => "roc_auc",
            Self::F1 => "f1",
        }
    }

    /// Minimum acceptable window mean before drift is flagged.
    #[must_use]
    pub fn default_threshold(&self) -> f64 {
        match self {
            Self::Accuracy => 0.75,
            Self::RocAuc => 0.78,
            Self::F1 => 0.62,
        }
    }
}

/// One day of observed metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub date: NaiveDate,
    pub accuracy: f64,
    pub roc_auc: f64,
    pub f1: f64,
}

impl MetricSample {
    #[must_use]
    pub fn get(&self, metric: ModelMetric) -> f64 {
        match metric {
            ModelMetric::Accuracy => self.accuracy,
            ModelMetric::RocAuc => self.roc_auc,
            ModelMetric::F1 => self.f1,
        }
    }
}

/// Chronological metric series plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricHistory {
    pub samples: Vec<MetricSample>,

    /// True when the values are generated rather than measured.
    pub simulated: bool,

    /// Human-readable origin (file path or generator description).
    pub origin: String,
}

impl MetricHistory {
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn series(&self, metric: ModelMetric) -> Vec<f64> {
        self.samples.iter().map(|s| s.get(metric)).collect()
    }
}

/// Offline evaluation metrics reported alongside the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedMetrics {
    pub f1: f64,
    pub roc_auc: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
}

/// Training-set class balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub retained: u64,
    pub churned: u64,
}

impl ClassCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.retained + self.churned
    }

    #[must_use]
    pub fn churn_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.churned as f64 / total as f64,
        }
    }
}
