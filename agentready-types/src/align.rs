use crate::assessment::{CertificationLevel, ScoreCard};
use serde::{Deserialize, Serialize};

/// Caller-selected align mode; never inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignMode {
    #[default]
    Preview,
    DirectApply,
    ReviewRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignState {
    Planning,
    Previewing,
    Confirming,
    Applying,
    Verifying,
    Committed,
    RolledBack,
    /// Nothing reached the apply step: the plan was empty, or every fix was
    /// skipped or failed its preview.
    NoChanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStatus {
    Previewed,
    Applied,
    Skipped,
    RolledBack,
    Failed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_sha256: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixOutcome {
    pub fix_id: String,
    pub attribute_id: String,
    pub generator: String,
    pub status: FixStatus,
    pub preview: String,
    pub points_gained: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileChange>,
}

/// A failing finding no generator could remediate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unfixable {
    pub attribute_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub overall: f64,
    pub certification: CertificationLevel,
}

impl From<&ScoreCard> for ScoreSnapshot {
    fn from(card: &ScoreCard) -> Self {
        Self {
            overall: card.overall,
            certification: card.certification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub branch: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignReport {
    pub schema: String,
    pub mode: AlignMode,
    pub repo_root: String,

    /// Every state the engine passed through, in order.
    pub states: Vec<AlignState>,

    pub before: ScoreSnapshot,
    pub projected: ScoreSnapshot,

    /// Absent in preview mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<ScoreSnapshot>,

    #[serde(default)]
    pub outcomes: Vec<FixOutcome>,

    #[serde(default)]
    pub unfixable: Vec<Unfixable>,

    /// Unified diff of the file-level changes (commands are not simulated).
    #[serde(default)]
    pub patch: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewRequest>,

    /// Set when the run stopped early (cancellation, repository removed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl AlignReport {
    pub fn terminal_state(&self) -> Option<AlignState> {
        self.states.last().copied()
    }

    pub fn count(&self, status: FixStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// After minus before; `None` until the run verified.
    pub fn delta(&self) -> Option<f64> {
        self.after.map(|a| a.overall - self.before.overall)
    }
}
