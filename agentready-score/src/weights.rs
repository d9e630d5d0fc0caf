use crate::WEIGHT_SUM_TOLERANCE;
use agentready_types::{ConfigError, Tier};
use serde::Serialize;

/// Share of the 100-point total assigned to each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierWeights {
    tier1: f64,
    tier2: f64,
    tier3: f64,
    tier4: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            tier1: 50.0,
            tier2: 30.0,
            tier3: 15.0,
            tier4: 5.0,
        }
    }
}

impl TierWeights {
    pub fn new(tier1: f64, tier2: f64, tier3: f64, tier4: f64) -> Result<Self, ConfigError> {
        let weights = Self {
            tier1,
            tier2,
            tier3,
            tier4,
        };
        for tier in Tier::ALL {
            let w = weights.weight(tier);
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    tier: tier.number(),
                    weight: w,
                });
            }
        }
        let sum = weights.total();
        if (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(weights)
    }

    pub fn weight(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Essential => self.tier1,
            Tier::Critical => self.tier2,
            Tier::Important => self.tier3,
            Tier::Advanced => self.tier4,
        }
    }

    pub fn total(&self) -> f64 {
        self.tier1 + self.tier2 + self.tier3 + self.tier4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sum_to_100() {
        let w = TierWeights::default();
        assert_eq!(w.total(), 100.0);
        assert_eq!(w.weight(Tier::Essential), 50.0);
        assert_eq!(w.weight(Tier::Advanced), 5.0);
    }

    #[test]
    fn rejects_bad_sums_and_values() {
        assert!(matches!(
            TierWeights::new(50.0, 30.0, 15.0, 6.0),
            Err(ConfigError::WeightSum { .. })
        ));
        assert!(matches!(
            TierWeights::new(110.0, -10.0, 0.0, 0.0),
            Err(ConfigError::InvalidWeight { tier: 2, .. })
        ));
        assert!(matches!(
            TierWeights::new(f64::NAN, 30.0, 15.0, 5.0),
            Err(ConfigError::InvalidWeight { tier: 1, .. })
        ));
        assert!(TierWeights::new(25.0, 25.0, 25.0, 25.0).is_ok());
        assert!(TierWeights::new(100.0, 0.0, 0.0, 0.0).is_ok());
    }
}
