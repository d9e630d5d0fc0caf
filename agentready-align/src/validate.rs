use agentready_assess::Registry;
use agentready_assess::scanner::run_assessor;
use agentready_types::fix::PlannedFix;
use agentready_types::{Finding, FindingStatus, Repository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Passed,
    Failed(String),
}

/// Post-apply check for a single fix; a failure rolls the fix back.
pub trait FixValidator: Send + Sync {
    fn validate(&self, repo: &Repository, planned: &PlannedFix, before: &Finding) -> Validation;
}

/// Re-runs the targeted assessor and requires its credit to improve.
#[derive(Debug, Clone)]
pub struct ReassessValidator {
    registry: Registry,
}

impl ReassessValidator {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }
}

impl FixValidator for ReassessValidator {
    fn validate(&self, repo: &Repository, planned: &PlannedFix, before: &Finding) -> Validation {
        let Some(assessor) = self.registry.get(&planned.attribute_id) else {
            return Validation::Failed(format!(
                "no assessor registered for {}",
                planned.attribute_id
            ));
        };
        let after = run_assessor(assessor, repo);
        if let FindingStatus::Error { detail } = &after.status {
            return Validation::Failed(format!("re-assessment errored: {detail}"));
        }
        let old = before.status.credit().unwrap_or(0.0);
        match after.status.credit() {
            Some(new) if new > old => Validation::Passed,
            _ => Validation::Failed(format!(
                "{} did not improve ({} -> {})",
                planned.attribute_id,
                before.status.label(),
                after.status.label()
            )),
        }
    }
}
