//! Monitoring service: drift indicators over a metric history.

use crate::domain::{MetricHistory, ModelMetric};
use crate::ports::{MetricsError, MetricsSource};

pub const MIN_WINDOW: usize = 3;
pub const MAX_WINDOW: usize = 30;
pub const DEFAULT_WINDOW: usize = 7;

/// Indicators for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStatus {
    pub metric: ModelMetric,
    pub latest: f64,

    /// `latest` minus the mean of the samples before the window.
    ///
    /// Falls back to the whole-history mean when the history is no longer
    /// than the window.
    pub delta: f64,
    pub window_mean: f64,
    pub threshold: f64,
    pub drifting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringReport {
    pub history: MetricHistory,
    pub window: usize,
    pub statuses: Vec<MetricStatus>,
}

impl MonitoringReport {
    #[must_use]
    pub fn simulated(&self) -> bool {
        self.history.simulated
    }

    #[must_use]
    pub fn status(&self, metric: ModelMetric) -> Option<&MetricStatus> {
        self.statuses.iter().find(|s| s.metric == metric)
    }

    #[must_use]
    pub fn any_drift(&self) -> bool {
        self.statuses.iter().any(|s| s.drifting)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Service computing drift flags from a `MetricsSource`.
pub struct MonitoringService<M: MetricsSource> {
    source: M,
    window: usize,
    thresholds: [f64; 3],
}

impl<M: MetricsSource> MonitoringService<M> {
    pub fn new(source: M, window: usize) -> Self {
        Self {
            source,
            window: window.clamp(MIN_WINDOW, MAX_WINDOW),
            thresholds: ModelMetric::ALL.map(|m| m.default_threshold()),
        }
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Set the window, clamped to the supported range.
    pub fn set_window(&mut self, window: usize) {
        self.window = window.clamp(MIN_WINDOW, MAX_WINDOW);
    }

    fn slot(metric: ModelMetric) -> usize {
        match metric {
            ModelMetric::Accuracy => 0,
            ModelMetric::RocAuc => 1,
            ModelMetric::F1 => 2,
        }
    }

    #[must_use]
    pub fn threshold(&self, metric: ModelMetric) -> f64 {
        self.thresholds[Self::slot(metric)]
    }

    /// Set a drift threshold, clamped to [0, 1].
    pub fn set_threshold(&mut self, metric: ModelMetric, value: f64) {
        self.thresholds[Self::slot(metric)] = value.clamp(0.0, 1.0);
    }

    #[must_use]
    pub fn is_simulated(&self) -> bool {
        self.source.is_simulated()
    }

    /// Pull the history and evaluate every metric.
    ///
    /// # Errors
    /// Returns `MetricsError` if the source fails or yields no samples.
    pub fn report(&self) -> Result<MonitoringReport, MetricsError> {
        let history = self.source.history()?;
        if history.is_empty() {
            return Err(MetricsError::Empty);
        }

        let statuses = ModelMetric::ALL
            .iter()
            .map(|&metric| self.evaluate(&history, metric))
            .collect::<Vec<_>>();

        for status in statuses.iter().filter(|s| s.drifting) {
            tracing::warn!(
                "{} window mean {:.4} below threshold {:.2}",
                status.metric.name(),
                status.window_mean,
                status.threshold
            );
        }

        Ok(MonitoringReport {
            history,
            window: self.window,
            statuses,
        })
    }

    fn evaluate(&self, history: &MetricHistory, metric: ModelMetric) -> MetricStatus {
        let series = history.series(metric);
        let latest = series.last().copied().unwrap_or_default();

        let split = series.len().saturating_sub(self.window);
        let (before, window) = series.split_at(split);
        let baseline = if before.is_empty() { mean(&series) } else { mean(before) };
        let window_mean = mean(window);
        let threshold = self.threshold(metric);

        MetricStatus {
            metric,
            latest,
            delta: latest - baseline,
            window_mean,
            threshold,
            drifting: window_mean < threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::csv_io::CsvMetricsSource;
    use crate::adapters::SimulatedMetricsSource;
    use chrono::NaiveDate;

    struct FixedSource(MetricHistory);

    impl MetricsSource for FixedSource {
        fn history(&self) -> Result<MetricHistory, MetricsError> {
            Ok(self.0.clone())
        }

        fn is_simulated(&self) -> bool {
            false
        }
    }

    fn history_csv(rows: &[(f64, f64, f64)]) -> MetricHistory {
        let mut csv = String::from("date,accuracy,roc_auc,f1\n");
        for (day, (a, r, f)) in rows.iter().enumerate() {
            csv.push_str(&format!("2026-01-{:02},{a},{r},{f}\n", day + 1));
        }
        CsvMetricsSource::parse(csv.as_bytes(), "test").expect("valid history")
    }

    #[test]
    fn test_window_is_clamped() {
        let source = SimulatedMetricsSource::new(30, 42);
        assert_eq!(MonitoringService::new(source.clone(), 1).window(), MIN_WINDOW);
        assert_eq!(MonitoringService::new(source.clone(), 99).window(), MAX_WINDOW);

        let mut service = MonitoringService::new(source, DEFAULT_WINDOW);
        service.set_window(0);
        assert_eq!(service.window(), MIN_WINDOW);
    }

    #[test]
    fn test_delta_against_pre_window_mean() {
        let rows = [
            (0.80, 0.85, 0.70),
            (0.80, 0.85, 0.70),
            (0.70, 0.70, 0.50),
            (0.70, 0.70, 0.50),
            (0.70, 0.70, 0.50),
        ];
        let service = MonitoringService::new(FixedSource(history_csv(&rows)), 3);
        let report = service.report().expect("report");

        let acc = report.status(ModelMetric::Accuracy).expect("accuracy");
        assert!((acc.latest - 0.70).abs() < 1e-12);
        assert!((acc.delta - (-0.10)).abs() < 1e-12);
        assert!((acc.window_mean - 0.70).abs() < 1e-12);
        assert!(acc.drifting);
        assert!(report.any_drift());
        assert!(!report.simulated());
    }

    #[test]
    fn test_short_history_uses_full_mean() {
        let rows = [(0.80, 0.85, 0.70), (0.90, 0.85, 0.70), (1.00, 0.85, 0.70)];
        let service = MonitoringService::new(FixedSource(history_csv(&rows)), 7);
        let acc = *service
            .report()
            .expect("report")
            .status(ModelMetric::Accuracy)
            .expect("accuracy");

        assert!((acc.delta - 0.10).abs() < 1e-9);
        assert!(!acc.drifting);
    }

    #[test]
    fn test_threshold_adjustment() {
        let rows = [(0.80, 0.85, 0.70); 5];
        let mut service = MonitoringService::new(FixedSource(history_csv(&rows)), 3);
        assert!(!service.report().expect("report").any_drift());

        service.set_threshold(ModelMetric::F1, 0.9);
        let report = service.report().expect("report");
        assert!(report.status(ModelMetric::F1).expect("f1").drifting);
        assert!(!report.status(ModelMetric::RocAuc).expect("auc").drifting);

        service.set_threshold(ModelMetric::F1, 4.0);
        assert_eq!(service.threshold(ModelMetric::F1), 1.0);
    }

    #[test]
    fn test_simulated_history_is_flagged() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
        let service = MonitoringService::new(SimulatedMetricsSource::ending_on(30, 42, end), DEFAULT_WINDOW);
        assert!(service.is_simulated());

        let report = service.report().expect("report");
        assert!(report.simulated());
        assert_eq!(report.history.len(), 30);
        assert_eq!(report.statuses.len(), 3);
    }
}
