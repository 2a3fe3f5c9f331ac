//! Simulated metrics adapter: synthetic metric history for demos.
//!
//! Produces a seeded random walk per metric. The values are NOT measured
//! model performance; every history it returns is flagged `simulated` and
//! the dashboard labels it as a demo.

use chrono::{Duration, Local, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::domain::{MetricHistory, MetricSample};
use crate::ports::{MetricsError, MetricsSource};

/// Random walk parameters for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkSpec {
    pub start: f64,
    pub step_sd: f64,
    pub min: f64,
    pub max: f64,
}

pub const ACCURACY_WALK: WalkSpec = WalkSpec { start: 0.78, step_sd: 0.002, min: 0.70, max: 0.88 };
pub const ROC_AUC_WALK: WalkSpec = WalkSpec { start: 0.82, step_sd: 0.002, min: 0.74, max: 0.92 };
pub const F1_WALK: WalkSpec = WalkSpec { start: 0.66, step_sd: 0.003, min: 0.58, max: 0.80 };

/// Seeded generator of daily metric histories.
#[derive(Debug, Clone)]
pub struct SimulatedMetricsSource {
    days: usize,
    seed: u64,
    end: NaiveDate,
}

impl SimulatedMetricsSource {
    /// `days` of history ending today.
    #[must_use]
    pub fn new(days: usize, seed: u64) -> Self {
        Self::ending_on(days, seed, Local::now().date_naive())
    }

    #[must_use]
    pub fn ending_on(days: usize, seed: u64, end: NaiveDate) -> Self {
        Self { days, seed, end }
    }

    /// Sample N(0, sd) via Box-Muller.
    fn sample_normal(rng: &mut ChaCha20Rng, sd: f64) -> f64 {
        // Avoid ln(0) => -inf.
        let mut u1: f64 = rng.gen();
        if u1 == 0.0 {
            u1 = f64::MIN_POSITIVE;
        }
        let u2: f64 = rng.gen();
        sd * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Cumulative walk from `spec.start`, clipped per point.
    ///
    /// The underlying walk is not clipped, only the reported values.
    fn walk(rng: &mut ChaCha20Rng, spec: WalkSpec, len: usize) -> Vec<f64> {
        let mut level = spec.start;
        (0..len)
            .map(|_| {
                level += Self::sample_normal(rng, spec.step_sd);
                level.clamp(spec.min, spec.max)
            })
            .collect()
    }
}

impl MetricsSource for SimulatedMetricsSource {
    fn history(&self) -> Result<MetricHistory, MetricsError> {
        if self.days == 0 {
            return Err(MetricsError::Empty);
        }

        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        let accuracy = Self::walk(&mut rng, ACCURACY_WALK, self.days);
        let roc_auc = Self::walk(&mut rng, ROC_AUC_WALK, self.days);
        let f1 = Self::walk(&mut rng, F1_WALK, self.days);

        let first = self.end - Duration::days(self.days as i64 - 1);
        let samples = (0..self.days)
            .map(|i| MetricSample {
                date: first + Duration::days(i as i64),
                accuracy: accuracy[i],
                roc_auc: roc_auc[i],
                f1: f1[i],
            })
            .collect();

        tracing::info!(
            "DEMO: generated {} days of simulated metrics (seed={})",
            self.days,
            self.seed
        );

        Ok(MetricHistory {
            samples,
            simulated: true,
            origin: format!("DEMO: métricas simuladas (semilla {})", self.seed),
        })
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(seed: u64) -> SimulatedMetricsSource {
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date");
        SimulatedMetricsSource::ending_on(30, seed, end)
    }

    #[test]
    fn test_history_is_deterministic_per_seed() {
        let a = source(42).history().expect("history");
        let b = source(42).history().expect("history");
        let c = source(7).history().expect("history");

        assert_eq!(a, b);
        assert_ne!(a.samples, c.samples);
    }

    #[test]
    fn test_history_shape_and_bounds() {
        let history = source(42).history().expect("history");
        assert!(history.simulated);
        assert_eq!(history.len(), 30);
        assert_eq!(history.samples[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"));
        assert_eq!(history.samples[29].date, NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date"));

        for s in &history.samples {
            assert!((0.70..=0.88).contains(&s.accuracy));
            assert!((0.74..=0.92).contains(&s.roc_auc));
            assert!((0.58..=0.80).contains(&s.f1));
        }
    }

    #[test]
    fn test_walk_stays_near_start() {
        // 30 steps of sd 0.002 cannot plausibly drift more than a few hundredths.
        let history = source(1).history().expect("history");
        assert!((history.samples[29].accuracy - 0.78).abs() < 0.06);
    }

    #[test]
    fn test_zero_days_is_empty() {
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date");
        assert!(matches!(
            SimulatedMetricsSource::ending_on(0, 42, end).history(),
            Err(MetricsError::Empty)
        ));
        assert!(SimulatedMetricsSource::new(5, 1).is_simulated());
    }
}
