//! Runtime configuration from `CHURNLENS_*` environment variables.

use std::path::PathBuf;

use crate::application::{DEFAULT_WINDOW, MAX_WINDOW, MIN_WINDOW};

pub const MODEL_DIR_ENV: &str = "CHURNLENS_MODEL_DIR";
pub const REQUIRE_MANIFEST_ENV: &str = "CHURNLENS_REQUIRE_MANIFEST";
pub const MONITOR_WINDOW_ENV: &str = "CHURNLENS_MONITOR_WINDOW";
pub const MONITOR_SEED_ENV: &str = "CHURNLENS_MONITOR_SEED";
pub const METRICS_CSV_ENV: &str = "CHURNLENS_METRICS_CSV";
pub const TOP_FEATURES_ENV: &str = "CHURNLENS_TOP_FEATURES";

const DEFAULT_MODEL_DIR: &str = "models";
const DEFAULT_SEED: u64 = 42;
const DEFAULT_TOP_FEATURES: usize = 10;

/// Days of history the simulated monitor generates.
pub const SIMULATED_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_dir: PathBuf,
    pub require_manifest: bool,
    pub monitor_window: usize,
    pub monitor_seed: u64,

    /// Real metric history; the monitor falls back to simulated data without it.
    pub metrics_csv: Option<PathBuf>,
    pub top_features: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            require_manifest: false,
            monitor_window: DEFAULT_WINDOW,
            monitor_seed: DEFAULT_SEED,
            metrics_csv: None,
            top_features: DEFAULT_TOP_FEATURES,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

fn parse_or<T: std::str::FromStr>(name: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}='{}', using default", name, raw);
            default
        }),
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let model_dir = lookup(MODEL_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.model_dir, PathBuf::from);

        let window = parse_or(MONITOR_WINDOW_ENV, lookup(MONITOR_WINDOW_ENV), defaults.monitor_window);

        Self {
            model_dir,
            require_manifest: lookup(REQUIRE_MANIFEST_ENV).is_some_and(|v| parse_bool(&v)),
            monitor_window: window.clamp(MIN_WINDOW, MAX_WINDOW),
            monitor_seed: parse_or(MONITOR_SEED_ENV, lookup(MONITOR_SEED_ENV), defaults.monitor_seed),
            metrics_csv: lookup(METRICS_CSV_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            top_features: parse_or(TOP_FEATURES_ENV, lookup(TOP_FEATURES_ENV), defaults.top_features)
                .max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.model_dir, PathBuf::from("models"));
        assert_eq!(cfg.monitor_window, 7);
        assert_eq!(cfg.monitor_seed, 42);
        assert!(!cfg.require_manifest);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            (MODEL_DIR_ENV, "/srv/models"),
            (REQUIRE_MANIFEST_ENV, "true"),
            (MONITOR_SEED_ENV, "7"),
            (METRICS_CSV_ENV, "history.csv"),
            (TOP_FEATURES_ENV, "5"),
        ]);
        assert_eq!(cfg.model_dir, PathBuf::from("/srv/models"));
        assert!(cfg.require_manifest);
        assert_eq!(cfg.monitor_seed, 7);
        assert_eq!(cfg.metrics_csv, Some(PathBuf::from("history.csv")));
        assert_eq!(cfg.top_features, 5);
    }

    #[test]
    fn test_window_clamped_and_invalid_ignored() {
        assert_eq!(config(&[(MONITOR_WINDOW_ENV, "100")]).monitor_window, 30);
        assert_eq!(config(&[(MONITOR_WINDOW_ENV, "1")]).monitor_window, 3);
        assert_eq!(config(&[(MONITOR_WINDOW_ENV, "week")]).monitor_window, 7);
        assert_eq!(config(&[(MONITOR_SEED_ENV, "-1")]).monitor_seed, 42);
    }
}
