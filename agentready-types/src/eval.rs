use crate::attribute::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A benchmark invocation that produced no usable score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedSample {
    pub iteration: u32,
    pub reason: String,
}

/// Benchmark score distribution for the unmodified repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRun {
    /// Raw scores, in iteration order, excluding dropped samples.
    pub samples: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
    pub n: usize,

    #[serde(default)]
    pub dropped: Vec<DroppedSample>,

    /// Content fingerprint of the measured tree.
    pub fingerprint: String,

    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Significance {
    Significant,
    NotSignificant,
    /// A statistic was undefined; never reported as a false negative.
    InsufficientData { reason: String },
}

/// Conventional Cohen's d bands on `|d|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectLabel {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectLabel {
    pub fn from_d(d: f64) -> Self {
        let d = d.abs();
        if d >= 0.8 {
            EffectLabel::Large
        } else if d >= 0.5 {
            EffectLabel::Medium
        } else if d >= 0.2 {
            EffectLabel::Small
        } else {
            EffectLabel::Negligible
        }
    }
}

/// Per-attribute outcome of one A/B trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub attribute_id: String,
    pub attribute_name: String,
    pub tier: Tier,
    pub baseline_mean: f64,
    pub post_mean: f64,

    /// Post mean minus baseline mean.
    pub delta: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_statistic: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohens_d: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectLabel>,

    pub significance: Significance,

    /// Requested iterations; `samples.len()` is the effective N.
    pub iterations: u32,

    #[serde(default)]
    pub samples: Vec<f64>,

    #[serde(default)]
    pub dropped_samples: Vec<DroppedSample>,

    pub fixes_applied: u32,

    #[serde(default)]
    pub remediation_log: Vec<String>,
}

impl ImpactResult {
    pub fn is_significant(&self) -> bool {
        self.significance == Significance::Significant
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAverage {
    pub tier: Tier,

    /// Mean delta over the tier's tested attributes; 0.0 when none.
    pub average_delta: f64,
    pub attributes_tested: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub schema: String,
    pub timestamp: DateTime<Utc>,
    pub baseline: BaselineRun,

    /// Ranked by delta, descending.
    pub impacts: Vec<ImpactResult>,
    pub tier_averages: Vec<TierAverage>,
    pub total_tested: u32,
    pub significant_improvements: u32,
}
