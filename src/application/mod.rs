//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

pub mod alignment;
pub mod batch;
mod context;
mod inference;
mod insights;
mod monitoring;

pub use alignment::{align, AlignError};
pub use batch::{score_table, BatchError, BatchSummary, ScoredBatch};
pub use context::{ChurnModelContext, ModelContext, ModelInfo};
pub use inference::{FeatureContribution, PredictionReport, ScoringService};
pub use insights::{
    segment_churn_rates, FeatureImportance, Impact, ImportanceSummary, InsightsService, SegmentRate,
};
pub use monitoring::{
    MetricStatus, MonitoringReport, MonitoringService, DEFAULT_WINDOW, MAX_WINDOW, MIN_WINDOW,
};

/// Scoring service over the shipped artifact formats.
pub type ChurnScoringService = ScoringService<crate::adapters::LogisticModel, crate::adapters::OneHotEncoder>;

/// Insights service over the shipped artifact formats.
pub type ChurnInsightsService = InsightsService<crate::adapters::LogisticModel, crate::adapters::OneHotEncoder>;
