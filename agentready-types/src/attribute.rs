use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority bucket grouping attributes for weighted scoring.
///
/// Serialized as its number (1 is the highest weight, 4 the lowest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    Essential,
    Critical,
    Important,
    Advanced,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Essential,
        Tier::Critical,
        Tier::Important,
        Tier::Advanced,
    ];

    pub fn number(self) -> u8 {
        match self {
            Tier::Essential => 1,
            Tier::Critical => 2,
            Tier::Important => 3,
            Tier::Advanced => 4,
        }
    }

    pub fn from_number(n: u8) -> Result<Self, ConfigError> {
        match n {
            1 => Ok(Tier::Essential),
            2 => Ok(Tier::Critical),
            3 => Ok(Tier::Important),
            4 => Ok(Tier::Advanced),
            other => Err(ConfigError::InvalidValue {
                key: "tier".to_string(),
                message: format!("expected 1..=4, got {other}"),
            }),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Essential => "essential",
            Tier::Critical => "critical",
            Tier::Important => "important",
            Tier::Advanced => "advanced",
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tier::from_number(value)
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {}", self.number())
    }
}

/// Static catalog entry describing one best-practice criterion.
///
/// Weight is not stored here: an attribute's share is derived by the scorer
/// from its tier weight and the number of contributing attributes in the tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    pub category: String,
    pub tier: Tier,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub criteria: String,
}

impl Attribute {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        tier: Tier,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            tier,
            description: String::new(),
            criteria: String::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>, criteria: impl Into<String>) -> Self {
        self.description = description.into();
        self.criteria = criteria.into();
        self
    }
}
