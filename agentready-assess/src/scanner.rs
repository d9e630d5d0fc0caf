//! Runs a registry over one repository and assembles the assessment.

use crate::assessor::Assessor;
use crate::registry::{CATALOG_VERSION, Registry};
use agentready_score::Scorer;
use agentready_types::assessment::Assessment;
use agentready_types::{Finding, FindingStatus, Repository};
use rayon::prelude::*;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scanner parallelism must be at least 1")]
    ZeroParallelism,

    #[error("failed to start scanner worker pool: {0}")]
    Pool(String),
}

/// Runs every applicable assessor of a registry concurrently, bounded by
/// `parallelism`, and joins all findings before building the assessment.
#[derive(Debug, Clone)]
pub struct Scanner {
    registry: Registry,
    scorer: Scorer,
    parallelism: usize,
}

impl Scanner {
    pub fn new(registry: Registry, scorer: Scorer) -> Self {
        Self {
            registry,
            scorer,
            parallelism: std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Same scanner restricted to another registry.
    pub fn with_registry(&self, registry: Registry) -> Self {
        Self {
            registry,
            scorer: self.scorer,
            parallelism: self.parallelism,
        }
    }

    pub fn scan(&self, repo: &Repository) -> Result<Assessment, ScanError> {
        let findings = self.findings(repo)?;
        let score = self.scorer.score_findings(&findings);
        debug!(
            root = %repo.root,
            overall = score.overall,
            findings = findings.len(),
            "assessment complete"
        );
        Ok(Assessment::new(repo.clone(), CATALOG_VERSION, findings, score))
    }

    /// Findings sorted by attribute id.
    pub fn findings(&self, repo: &Repository) -> Result<Vec<Finding>, ScanError> {
        if self.parallelism == 0 {
            return Err(ScanError::ZeroParallelism);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallelism)
            .thread_name(|i| format!("agentready-scan-{i}"))
            .build()
            .map_err(|e| ScanError::Pool(e.to_string()))?;

        let mut findings: Vec<Finding> = pool.install(|| {
            self.registry
                .assessors()
                .par_iter()
                .map(|a| run_assessor(a, repo))
                .collect()
        });
        findings.sort_by(|a, b| a.attribute.id.cmp(&b.attribute.id));
        Ok(findings)
    }
}

/// Runs one assessor with its failure isolated to its own finding.
pub fn run_assessor(assessor: &Arc<dyn Assessor>, repo: &Repository) -> Finding {
    let attribute = assessor.attribute();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if assessor.is_applicable(repo) {
            assessor.assess(repo)
        } else {
            Finding::not_applicable(attribute, "attribute does not apply to this repository")
        }
    }));

    let finding = match outcome {
        Ok(finding) => finding,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Finding::error(attribute, format!("assessor panicked: {message}"))
        }
    };

    if let FindingStatus::Error { detail } = &finding.status {
        warn!(attribute_id = %attribute.id, detail = %detail, "assessor error");
    }
    finding
}
