//! Prediction results and risk tiers.

use serde::{Deserialize, Serialize};

/// Churn probability below which a customer is low risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;

/// Churn probability at or above which a customer is high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.6;

/// Ordinal churn risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "BAJO")]
    Bajo,
    #[serde(rename = "MEDIO")]
    Medio,
    #[serde(rename = "ALTO")]
    Alto,
}

impl RiskTier {
    pub const ALL: [Self; 3] = [Self::Bajo, Self::Medio, Self::Alto];

    /// Classify a churn probability. Used by every scoring path.
    #[must_use]
    pub fn classify(churn_probability: f64) -> Self {
        if churn_probability < MEDIUM_RISK_THRESHOLD {
            Self::Bajo
        } else if churn_probability < HIGH_RISK_THRESHOLD {
            Self::Medio
        } else {
            Self::Alto
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bajo => "BAJO",
            Self::Medio => "MEDIO",
            Self::Alto => "ALTO",
        }
    }

    /// Parse the exported label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label.trim())
    }

    /// Short assessment shown next to the probability.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Bajo => "Cliente estable. Continuar con servicio regular.",
            Self::Medio => "Cliente en riesgo moderado. Considerar ofertas de retención.",
            Self::Alto => "Cliente en alto riesgo. Acción inmediata requerida.",
        }
    }

    /// Suggested retention action.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Bajo => "Continuar con el servicio habitual.",
            Self::Medio => "Mantener comunicación activa y monitorear satisfacción.",
            Self::Alto => "Contactar al cliente y ofrecer beneficios exclusivos.",
        }
    }

    /// Associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Bajo => (16, 185, 129),  // Emerald
            Self::Medio => (251, 191, 36), // Amber
            Self::Alto => (244, 63, 94),   // Rose
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model output for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 0 = retained, 1 = churn
    pub label: u8,

    /// `[P(stay), P(churn)]`, summing to 1.0
    pub probabilities: [f64; 2],
}

impl Prediction {
    #[must_use]
    pub fn new(label: u8, probabilities: [f64; 2]) -> Self {
        Self { label, probabilities }
    }

    #[must_use]
    pub fn churn_probability(&self) -> f64 {
        self.probabilities[1]
    }

    #[must_use]
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::classify(self.churn_probability())
    }

    /// Probability of the predicted class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.probabilities[0].max(self.probabilities[1])
    }

    #[must_use]
    pub fn will_churn(&self) -> bool {
        self.label == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskTier::classify(0.0), RiskTier::Bajo);
        assert_eq!(RiskTier::classify(0.2999), RiskTier::Bajo);
        assert_eq!(RiskTier::classify(0.3), RiskTier::Medio);
        assert_eq!(RiskTier::classify(0.5999), RiskTier::Medio);
        assert_eq!(RiskTier::classify(0.6), RiskTier::Alto);
        assert_eq!(RiskTier::classify(1.0), RiskTier::Alto);
    }

    #[test]
    fn test_tiers_partition_unit_interval() {
        let mut previous = RiskTier::Bajo;
        for i in 0..=10_000 {
            let p = f64::from(i) / 10_000.0;
            let tier = RiskTier::classify(p);
            assert!(tier >= previous, "tiers must be monotonic at p={p}");
            let expected = if p < 0.3 {
                RiskTier::Bajo
            } else if p < 0.6 {
                RiskTier::Medio
            } else {
                RiskTier::Alto
            };
            assert_eq!(tier, expected);
            previous = tier;
        }
    }

    #[test]
    fn test_tier_labels_round_trip() {
        for tier in RiskTier::ALL {
            assert_eq!(RiskTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(RiskTier::parse("CRITICO"), None);
    }

    #[test]
    fn test_prediction_accessors() {
        let prediction = Prediction::new(1, [0.25, 0.75]);
        assert_eq!(prediction.churn_probability(), 0.75);
        assert_eq!(prediction.confidence(), 0.75);
        assert_eq!(prediction.risk_tier(), RiskTier::Alto);
        assert!(prediction.will_churn());
    }
}
