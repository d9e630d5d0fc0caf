//! Port traits for the side effects the engine does not own.

use agentready_types::fix::PlannedFix;
use camino::Utf8Path;

/// Version control used by review-request mode.
pub trait VcsPort: Send + Sync {
    fn create_branch(&self, repo_root: &Utf8Path, name: &str) -> anyhow::Result<()>;

    /// Stages `paths` and commits them, returning the commit id.
    fn commit_all(&self, repo_root: &Utf8Path, message: &str, paths: &[String]) -> anyhow::Result<String>;

    /// Publishes `branch` to the remote the review request is opened against.
    fn push(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<()>;
}

/// Opens a review request (pull/merge request) for a pushed branch.
pub trait ReviewPort: Send + Sync {
    /// Returns the review URL when the backend reports one.
    fn open_review(
        &self,
        repo_root: &Utf8Path,
        branch: &str,
        title: &str,
        body: &str,
    ) -> anyhow::Result<Option<String>>;
}

/// What the user is shown before deciding on a fix.
#[derive(Debug, Clone, PartialEq)]
pub struct FixPreview {
    pub preview: String,
    pub patch: String,
    pub points_gained: f64,
}

/// Interactive per-fix confirmation.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, planned: &PlannedFix, preview: &FixPreview) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Confirmer for AcceptAll {
    fn confirm(&self, _planned: &PlannedFix, _preview: &FixPreview) -> bool {
        true
    }
}
