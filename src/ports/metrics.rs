//! Metrics source port: where monitoring data comes from.

use crate::domain::MetricHistory;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to read metric history: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid metric history at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("metric history has no samples")]
    Empty,
}

/// Trait for anything that can supply a daily metric history.
pub trait MetricsSource: Send + Sync {
    /// Load the full history, oldest first.
    ///
    /// # Errors
    /// Returns `MetricsError` if the history cannot be read or is empty.
    fn history(&self) -> Result<MetricHistory, MetricsError>;

    /// Whether the values are synthetic.
    fn is_simulated(&self) -> bool;
}

impl<M: MetricsSource + ?Sized> MetricsSource for Box<M> {
    fn history(&self) -> Result<MetricHistory, MetricsError> {
        (**self).history()
    }

    fn is_simulated(&self) -> bool {
        (**self).is_simulated()
    }
}
