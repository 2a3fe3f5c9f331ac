//! Domain layer: Core types for churn scoring.
//!
//! Pure Rust types with no I/O. Records are validated at construction,
//! matrices check their own shapes, and risk tiers are a pure function of
//! the churn probability.

pub mod customer;
mod features;
mod labels;
mod metrics;
mod prediction;
pub mod sample;
mod table;

pub use customer::{
    Categorical, CustomerRecord, FieldKind, FieldSource, FieldValue, LabeledRecord,
    MissingFieldError, RecordError, REQUIRED_FIELDS,
};
pub use features::{FeatureMatrix, ShapeError};
pub use labels::LabelCatalog;
pub use metrics::{ClassCounts, MetricHistory, MetricSample, ModelMetric, ReportedMetrics};
pub use prediction::{Prediction, RiskTier, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
pub use table::RawTable;
