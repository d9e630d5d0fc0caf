use agentready_types::ConfigError;
use agentready_types::assessment::CertificationLevel;
use serde::Serialize;

/// Lower bounds (inclusive) of each certification band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CertificationThresholds {
    platinum: f64,
    gold: f64,
    silver: f64,
    bronze: f64,
}

impl Default for CertificationThresholds {
    fn default() -> Self {
        Self {
            platinum: 90.0,
            gold: 75.0,
            silver: 60.0,
            bronze: 40.0,
        }
    }
}

impl CertificationThresholds {
    /// Thresholds must lie in `[0, 100]` and be strictly descending.
    pub fn new(platinum: f64, gold: f64, silver: f64, bronze: f64) -> Result<Self, ConfigError> {
        let ordered = [platinum, gold, silver, bronze];
        if let Some(bad) = ordered
            .iter()
            .find(|t| !t.is_finite() || **t < 0.0 || **t > 100.0)
        {
            return Err(ConfigError::Thresholds {
                message: format!("threshold {bad} is outside [0, 100]"),
            });
        }
        if ordered.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ConfigError::Thresholds {
                message: format!(
                    "thresholds must be strictly descending, got {platinum}/{gold}/{silver}/{bronze}"
                ),
            });
        }
        Ok(Self {
            platinum,
            gold,
            silver,
            bronze,
        })
    }

    pub fn level(&self, score: f64) -> CertificationLevel {
        if score >= self.platinum {
            CertificationLevel::Platinum
        } else if score >= self.gold {
            CertificationLevel::Gold
        } else if score >= self.silver {
            CertificationLevel::Silver
        } else if score >= self.bronze {
            CertificationLevel::Bronze
        } else {
            CertificationLevel::NeedsImprovement
        }
    }
}
