//! Built-in attribute checks.
//!
//! The catalog is an explicit list: adding an assessor means adding it to
//! [`builtin_assessors`]. Ids are stable and sorted order is the scan order.

mod code_quality;
mod dependencies;
mod documentation;
mod structure;
mod tooling;

use crate::assessor::Assessor;
use std::sync::Arc;

pub use code_quality::TypeAnnotationsAssessor;
pub use dependencies::{
    DependencyPinningAssessor, LOCKFILE_RULES, LockfileRule, unpinned_manifests,
};
pub use documentation::{
    ADR_DIRS, ADR_SECTIONS, ArchitectureDecisionsAssessor, CLAUDE_MD_MIN_BYTES, ClaudeMdAssessor,
    README_SECTIONS, ReadmeAssessor, missing_readme_sections,
};
pub use structure::{
    GitignoreAssessor, SOURCE_DIRS, StandardLayoutAssessor, TEST_DIRS, TestSuiteAssessor,
    gitignore_covers, recommended_gitignore_patterns,
};
pub use tooling::{
    CiConfigurationAssessor, ContainerSetupAssessor, ConventionalCommitsAssessor,
    IssueTemplatesAssessor, PreCommitHooksAssessor, is_conventional_subject,
};

pub fn builtin_assessors() -> Vec<Arc<dyn Assessor>> {
    vec![
        // Tier 1
        Arc::new(ClaudeMdAssessor::new()),
        Arc::new(ReadmeAssessor::new()),
        Arc::new(DependencyPinningAssessor::new()),
        Arc::new(StandardLayoutAssessor::new()),
        // Tier 2
        Arc::new(TypeAnnotationsAssessor::new()),
        Arc::new(GitignoreAssessor::new()),
        Arc::new(PreCommitHooksAssessor::new()),
        Arc::new(TestSuiteAssessor::new()),
        // Tier 3
        Arc::new(ArchitectureDecisionsAssessor::new()),
        Arc::new(CiConfigurationAssessor::new()),
        Arc::new(ConventionalCommitsAssessor::new()),
        // Tier 4
        Arc::new(IssueTemplatesAssessor::new()),
        Arc::new(ContainerSetupAssessor::new()),
    ]
}
