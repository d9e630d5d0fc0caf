use crate::attribute::Tier;
use crate::finding::Finding;
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named band derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationLevel {
    Platinum,
    Gold,
    Silver,
    Bronze,
    NeedsImprovement,
}

impl CertificationLevel {
    pub fn label(self) -> &'static str {
        match self {
            CertificationLevel::Platinum => "Platinum",
            CertificationLevel::Gold => "Gold",
            CertificationLevel::Silver => "Silver",
            CertificationLevel::Bronze => "Bronze",
            CertificationLevel::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn lowest() -> Self {
        CertificationLevel::NeedsImprovement
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pass: u32,
    pub fail: u32,
    pub partial: u32,
    pub skipped: u32,
    pub error: u32,
    pub not_applicable: u32,
}

impl StatusCounts {
    pub fn contributing(&self) -> u32 {
        self.pass + self.fail + self.partial
    }

    pub fn total(&self) -> u32 {
        self.contributing() + self.skipped + self.error + self.not_applicable
    }
}

/// Per-tier breakdown of an overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSubtotal {
    pub tier: Tier,

    /// Configured tier weight.
    pub configured_weight: f64,

    /// Weight after redistribution away from tiers without contributors.
    pub effective_weight: f64,

    /// Points earned within the effective weight.
    pub earned: f64,

    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Always within `[0, 100]`.
    pub overall: f64,
    pub certification: CertificationLevel,
    pub tiers: Vec<TierSubtotal>,
    pub counts: StatusCounts,
}

/// All findings for one repository at one point in time plus their score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub schema: String,
    pub catalog_version: u32,
    pub repository: Repository,
    pub timestamp: DateTime<Utc>,

    /// Sorted by attribute id.
    pub findings: Vec<Finding>,
    pub score: ScoreCard,
}

impl Assessment {
    pub fn new(
        repository: Repository,
        catalog_version: u32,
        findings: Vec<Finding>,
        score: ScoreCard,
    ) -> Self {
        Self {
            schema: crate::schema::AGENTREADY_ASSESSMENT_V1.to_string(),
            catalog_version,
            repository,
            timestamp: Utc::now(),
            findings,
            score,
        }
    }

    pub fn finding(&self, attribute_id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.attribute.id == attribute_id)
    }
}
