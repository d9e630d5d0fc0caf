use crate::attribute::Attribute;
use serde::{Deserialize, Serialize};

/// Fractional completion of a `partial` finding, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Completion(f64);

impl Completion {
    /// Returns `None` for values outside `[0, 1]` or non-finite values.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(Self(value))
    }

    /// Clamps into range; non-finite input becomes zero.
    pub fn saturating(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// Completion expressed as `found / total`; zero when `total` is zero.
    pub fn ratio(found: usize, total: usize) -> Self {
        if total == 0 {
            Self(0.0)
        } else {
            Self::saturating(found as f64 / total as f64)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Completion {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Completion::new(value).ok_or_else(|| format!("completion {value} is outside [0, 1]"))
    }
}

impl From<Completion> for f64 {
    fn from(c: Completion) -> Self {
        c.0
    }
}

/// Closed set of assessment outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FindingStatus {
    Pass,
    Fail,
    Partial { completion: Completion },
    /// A required external tool is missing.
    Skipped { reason: String },
    /// Unexpected failure inside one assessor, isolated to that attribute.
    Error { detail: String },
    NotApplicable { reason: String },
}

impl FindingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FindingStatus::Pass => "pass",
            FindingStatus::Fail => "fail",
            FindingStatus::Partial { .. } => "partial",
            FindingStatus::Skipped { .. } => "skipped",
            FindingStatus::Error { .. } => "error",
            FindingStatus::NotApplicable { .. } => "not_applicable",
        }
    }

    /// Fraction of the attribute's share earned, for contributing statuses.
    ///
    /// `skipped`, `error` and `not_applicable` never contribute and yield `None`.
    pub fn credit(&self) -> Option<f64> {
        match self {
            FindingStatus::Pass => Some(1.0),
            FindingStatus::Fail => Some(0.0),
            FindingStatus::Partial { completion } => Some(completion.value()),
            _ => None,
        }
    }

    pub fn is_contributing(&self) -> bool {
        self.credit().is_some()
    }

    /// `fail` and `partial` findings are candidates for remediation.
    pub fn needs_remediation(&self) -> bool {
        matches!(self, FindingStatus::Fail | FindingStatus::Partial { .. })
    }
}

/// Actionable remediation guidance attached to a failing finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remediation {
    pub summary: String,

    #[serde(default)]
    pub steps: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

impl Remediation {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }
}

/// Outcome of evaluating one attribute against one repository snapshot.
///
/// Built once per assessor run through the status constructors and never
/// mutated afterwards (the builder methods consume `self`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub attribute: Attribute,
    pub status: FindingStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<String>,

    #[serde(default)]
    pub evidence: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
}

impl Finding {
    fn with_status(attribute: &Attribute, status: FindingStatus) -> Self {
        Self {
            attribute: attribute.clone(),
            status,
            measured_value: None,
            threshold: None,
            evidence: vec![],
            remediation: None,
        }
    }

    pub fn pass(attribute: &Attribute) -> Self {
        Self::with_status(attribute, FindingStatus::Pass)
    }

    pub fn fail(attribute: &Attribute, remediation: Remediation) -> Self {
        Self::with_status(attribute, FindingStatus::Fail).remediation(remediation)
    }

    pub fn partial(attribute: &Attribute, completion: Completion, remediation: Remediation) -> Self {
        Self::with_status(attribute, FindingStatus::Partial { completion }).remediation(remediation)
    }

    pub fn skipped(attribute: &Attribute, reason: impl Into<String>) -> Self {
        Self::with_status(
            attribute,
            FindingStatus::Skipped {
                reason: reason.into(),
            },
        )
    }

    pub fn error(attribute: &Attribute, detail: impl Into<String>) -> Self {
        Self::with_status(
            attribute,
            FindingStatus::Error {
                detail: detail.into(),
            },
        )
    }

    pub fn not_applicable(attribute: &Attribute, reason: impl Into<String>) -> Self {
        Self::with_status(
            attribute,
            FindingStatus::NotApplicable {
                reason: reason.into(),
            },
        )
    }

    pub fn evidence(mut self, line: impl Into<String>) -> Self {
        self.evidence.push(line.into());
        self
    }

    pub fn measured(mut self, value: impl Into<String>, threshold: impl Into<String>) -> Self {
        self.measured_value = Some(value.into());
        self.threshold = Some(threshold.into());
        self
    }

    fn remediation(mut self, remediation: Remediation) -> Self {
        self.remediation = Some(remediation);
        self
    }

    pub fn attribute_id(&self) -> &str {
        &self.attribute.id
    }

    /// The same finding promoted to `pass`, used for projected scoring.
    pub fn promoted(&self) -> Self {
        let mut promoted = self.clone();
        promoted.status = FindingStatus::Pass;
        promoted.remediation = None;
        promoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Tier;

    fn attr() -> Attribute {
        Attribute::new("claude_md_file", "CLAUDE.md File", "documentation", Tier::Essential)
    }

    #[test]
    fn completion_rejects_out_of_range() {
        assert!(Completion::new(-0.01).is_none());
        assert!(Completion::new(1.01).is_none());
        assert!(Completion::new(f64::NAN).is_none());
        assert_eq!(Completion::new(0.7).map(Completion::value), Some(0.7));
        assert_eq!(Completion::saturating(3.0).value(), 1.0);
        assert_eq!(Completion::ratio(1, 0).value(), 0.0);
        assert_eq!(Completion::ratio(1, 4).value(), 0.25);
    }

    #[test]
    fn completion_out_of_range_fails_to_deserialize() {
        let bad = r#"{"status":"partial","completion":1.5}"#;
        assert!(serde_json::from_str::<FindingStatus>(bad).is_err());
        let good = r#"{"status":"partial","completion":0.5}"#;
        let status: FindingStatus = serde_json::from_str(good).expect("parse");
        assert_eq!(status.credit(), Some(0.5));
    }

    #[test]
    fn only_pass_fail_partial_contribute() {
        let a = attr();
        assert_eq!(Finding::pass(&a).status.credit(), Some(1.0));
        assert_eq!(Finding::fail(&a, Remediation::new("x")).status.credit(), Some(0.0));
        assert!(!Finding::skipped(&a, "no git").status.is_contributing());
        assert!(!Finding::error(&a, "eio").status.is_contributing());
        assert!(!Finding::not_applicable(&a, "n/a").status.is_contributing());
    }

    #[test]
    fn promoted_finding_drops_remediation() {
        let a = attr();
        let f = Finding::fail(&a, Remediation::new("create it")).evidence("missing");
        let p = f.promoted();
        assert_eq!(p.status, FindingStatus::Pass);
        assert!(p.remediation.is_none());
        assert_eq!(p.evidence, f.evidence);
    }
}
