//! Tier-weighted scorer.
//!
//! A pure function from findings to a score in `[0, 100]` and a
//! certification level. Weights and thresholds are validated configuration
//! values; invalid ones are rejected at construction, never renormalized.

mod scorer;
mod thresholds;
mod weights;

pub use scorer::Scorer;
pub use thresholds::CertificationThresholds;
pub use weights::TierWeights;

/// Tolerance used when checking that tier weights sum to 100.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
