//! The align state machine.
//!
//! One invocation walks `Planning → Previewing → Confirming → Applying →
//! Verifying → Committed | RolledBack | NoChanges` and records the trail in
//! the report.
//! Preview mode stops after `Previewing` without touching the filesystem.
//! Fixes apply strictly one at a time in plan order; each is bracketed by a
//! [`Snapshot`] so a failed or unvalidated fix is restored byte-for-byte
//! while the run continues with the next one.

use crate::edit::{Overlay, apply_fix, ensure_relative};
use crate::error::AlignError;
use crate::generator::GeneratorCatalog;
use crate::planner::{Plan, Planner};
use crate::ports::{AcceptAll, Confirmer, FixPreview, ReviewPort, VcsPort};
use crate::runner::{CommandRunner, ShellCommandRunner};
use crate::snapshot::Snapshot;
use crate::validate::{FixValidator, ReassessValidator, Validation};
use agentready_assess::Scanner;
use agentready_types::align::{
    AlignMode, AlignReport, AlignState, FixOutcome, FixStatus, ReviewRequest, ScoreSnapshot,
};
use agentready_types::assessment::Assessment;
use agentready_types::fix::PlannedFix;
use agentready_types::{CancelFlag, ConfigError, Repository};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct AlignSettings {
    pub mode: AlignMode,

    /// Restrict planning to these attribute ids.
    pub attributes: Option<BTreeSet<String>>,

    pub interactive: bool,
    pub validate_each_fix: bool,
    pub allow_ai_assisted: bool,
    pub branch_prefix: String,
    pub commit_message: String,
}

impl Default for AlignSettings {
    fn default() -> Self {
        Self {
            mode: AlignMode::Preview,
            attributes: None,
            interactive: false,
            validate_each_fix: true,
            allow_ai_assisted: false,
            branch_prefix: "agentready/align-".to_string(),
            commit_message: "chore: apply agentready remediations".to_string(),
        }
    }
}

/// A planned fix together with its preview, or the reason it could not be
/// previewed.
struct Previewed {
    planned: PlannedFix,
    preview: Result<FixPreview, String>,
}

pub struct AlignEngine {
    scanner: Scanner,
    catalog: GeneratorCatalog,
    runner: Arc<dyn CommandRunner>,
    validator: Option<Arc<dyn FixValidator>>,
    confirmer: Arc<dyn Confirmer>,
    vcs: Option<Arc<dyn VcsPort>>,
    review: Option<Arc<dyn ReviewPort>>,
    cancel: CancelFlag,
}

impl AlignEngine {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner,
            catalog: GeneratorCatalog::builtin(),
            runner: Arc::new(ShellCommandRunner),
            validator: None,
            confirmer: Arc::new(AcceptAll),
            vcs: None,
            review: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: GeneratorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replaces the default re-assessing validator.
    pub fn with_validator(mut self, validator: Arc<dyn FixValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn with_review(mut self, vcs: Arc<dyn VcsPort>, review: Arc<dyn ReviewPort>) -> Self {
        self.vcs = Some(vcs);
        self.review = Some(review);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn run(&self, repo: &Repository, settings: &AlignSettings) -> Result<AlignReport, AlignError> {
        let mut states = vec![AlignState::Planning];

        if !repo.root.is_dir() {
            return Err(AlignError::RepositoryUnavailable {
                path: repo.root.clone(),
                message: "not a directory".to_string(),
            });
        }
        if let Some(ids) = &settings.attributes {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            self.scanner.registry().restrict(&ids)?;
        }
        let review_ports = self.review_ports(repo, settings)?;

        let assessment = self.scanner.scan(repo)?;
        let scorer = self.scanner.scorer();
        let before = ScoreSnapshot::from(&assessment.score);
        let plan = Planner::new(self.catalog.clone(), settings.allow_ai_assisted).plan(
            &assessment,
            scorer,
            settings.attributes.as_ref(),
        );
        info!(
            fixes = plan.fixes.len(),
            unfixable = plan.unfixable.len(),
            "align plan ready"
        );

        states.push(AlignState::Previewing);
        let (previewed, patch) = preview_plan(repo, &plan);
        let previewable: BTreeSet<String> = previewed
            .iter()
            .filter(|p| p.preview.is_ok())
            .map(|p| p.planned.attribute_id.clone())
            .collect();
        let projected = ScoreSnapshot::from(&scorer.project(&assessment.findings, &previewable));

        let mut report = AlignReport {
            schema: agentready_types::schema::AGENTREADY_ALIGN_V1.to_string(),
            mode: settings.mode,
            repo_root: repo.root.to_string(),
            states,
            before,
            projected,
            after: None,
            outcomes: Vec::new(),
            unfixable: plan.unfixable.clone(),
            patch,
            review: None,
            aborted: None,
        };

        if settings.mode == AlignMode::Preview {
            report.outcomes = previewed
                .into_iter()
                .map(|p| match p.preview {
                    Ok(_) => outcome(&p.planned, FixStatus::Previewed, None),
                    Err(e) => outcome(&p.planned, FixStatus::Failed, Some(e)),
                })
                .collect();
            return Ok(report);
        }

        // Confirmation, then the apply set in plan order.
        if settings.interactive {
            report.states.push(AlignState::Confirming);
        }
        let mut apply_set = Vec::new();
        for p in previewed {
            match p.preview {
                Err(e) => report
                    .outcomes
                    .push(outcome(&p.planned, FixStatus::Failed, Some(e))),
                Ok(preview) => {
                    if settings.interactive && !self.confirmer.confirm(&p.planned, &preview) {
                        debug!(attribute_id = %p.planned.attribute_id, "fix skipped by user");
                        report.outcomes.push(outcome(&p.planned, FixStatus::Skipped, None));
                    } else {
                        apply_set.push(p.planned);
                    }
                }
            }
        }

        let mut review = None;
        if let Some((vcs, _)) = &review_ports {
            let branch = format!(
                "{}{}",
                settings.branch_prefix,
                Utc::now().format("%Y%m%d%H%M%S")
            );
            vcs.create_branch(&repo.root, &branch)
                .map_err(AlignError::Vcs)?;
            review = Some(ReviewRequest {
                branch,
                commit: None,
                url: None,
            });
        }

        report.states.push(AlignState::Applying);
        let attempted = !apply_set.is_empty();
        let validator = self.validator(settings);
        let mut applied = 0usize;
        for (index, planned) in apply_set.iter().enumerate() {
            let stop = if self.cancel.is_cancelled() {
                Some("align run cancelled".to_string())
            } else if !repo.root.is_dir() {
                Some(format!("repository {} disappeared", repo.root))
            } else {
                None
            };
            if let Some(reason) = stop {
                warn!(reason = %reason, "aborting remaining fixes");
                for rest in &apply_set[index..] {
                    report
                        .outcomes
                        .push(outcome(rest, FixStatus::Aborted, Some(reason.clone())));
                }
                report.aborted = Some(reason);
                break;
            }

            let result = self.apply_one(repo, &assessment, planned, validator.as_deref());
            if result.status == FixStatus::Applied {
                applied += 1;
            }
            report.outcomes.push(result);
        }

        // Verification needs the tree; an engine-level abort on a vanished
        // repository leaves `after` unset.
        report.states.push(AlignState::Verifying);
        if repo.root.is_dir() {
            let fresh = self.scanner.scan(repo)?;
            report.after = Some(ScoreSnapshot::from(&fresh.score));
        }

        if let (Some((vcs, reviewer)), Some(mut request)) = (&review_ports, review) {
            let paths: Vec<String> = report
                .outcomes
                .iter()
                .filter(|o| o.status == FixStatus::Applied)
                .flat_map(|o| o.files.iter().map(|f| f.path.clone()))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if !paths.is_empty() {
                let commit = vcs
                    .commit_all(&repo.root, &settings.commit_message, &paths)
                    .map_err(AlignError::Vcs)?;
                request.commit = Some(commit);
                vcs.push(&repo.root, &request.branch)
                    .map_err(AlignError::Vcs)?;
                let body = review_body(&report);
                request.url = reviewer
                    .open_review(&repo.root, &request.branch, &settings.commit_message, &body)
                    .map_err(AlignError::Review)?;
            }
            report.review = Some(request);
        }

        report.states.push(if applied > 0 {
            AlignState::Committed
        } else if attempted {
            AlignState::RolledBack
        } else {
            AlignState::NoChanges
        });
        info!(
            applied,
            rolled_back = report.count(FixStatus::RolledBack),
            failed = report.count(FixStatus::Failed),
            "align run finished"
        );
        Ok(report)
    }

    /// Review mode needs both ports and a git repository; checked before any
    /// mutation.
    #[allow(clippy::type_complexity)]
    fn review_ports(
        &self,
        repo: &Repository,
        settings: &AlignSettings,
    ) -> Result<Option<(Arc<dyn VcsPort>, Arc<dyn ReviewPort>)>, AlignError> {
        if settings.mode != AlignMode::ReviewRequest {
            return Ok(None);
        }
        let invalid = |message: &str| {
            AlignError::Config(ConfigError::InvalidValue {
                key: "align.mode".to_string(),
                message: message.to_string(),
            })
        };
        if !repo.is_git_repo() {
            return Err(invalid("review-request mode requires a git repository"));
        }
        match (&self.vcs, &self.review) {
            (Some(vcs), Some(review)) => Ok(Some((vcs.clone(), review.clone()))),
            _ => Err(invalid(
                "review-request mode requires version control and review ports",
            )),
        }
    }

    fn validator(&self, settings: &AlignSettings) -> Option<Arc<dyn FixValidator>> {
        if !settings.validate_each_fix {
            return None;
        }
        Some(self.validator.clone().unwrap_or_else(|| {
            Arc::new(ReassessValidator::new(self.scanner.registry().clone()))
        }))
    }

    fn apply_one(
        &self,
        repo: &Repository,
        assessment: &Assessment,
        planned: &PlannedFix,
        validator: Option<&dyn FixValidator>,
    ) -> FixOutcome {
        let touched = planned.fix.touched_paths();
        if let Some(err) = touched.iter().find_map(|p| ensure_relative(p).err()) {
            return outcome(planned, FixStatus::Failed, Some(err.to_string()));
        }

        let snapshot = match Snapshot::capture(&repo.root, &touched) {
            Ok(s) => s,
            Err(e) => {
                warn!(attribute_id = %planned.attribute_id, error = %format!("{e:#}"), "snapshot failed; fix not applied");
                return outcome(planned, FixStatus::Failed, Some(format!("snapshot failed: {e:#}")));
            }
        };

        if let Err(e) = apply_fix(&repo.root, &planned.fix, self.runner.as_ref()) {
            warn!(attribute_id = %planned.attribute_id, error = %e, "fix failed; rolling back");
            return rolled_back(planned, &snapshot, e.to_string());
        }

        if let (Some(validator), Some(before)) = (validator, assessment.finding(&planned.attribute_id))
            && let Validation::Failed(reason) = validator.validate(repo, planned, before)
        {
            warn!(attribute_id = %planned.attribute_id, reason = %reason, "validation failed; rolling back");
            return rolled_back(planned, &snapshot, format!("validation failed: {reason}"));
        }

        let mut result = outcome(planned, FixStatus::Applied, None);
        match snapshot.changes() {
            Ok(files) => result.files = files,
            Err(e) => result.message = Some(format!("could not hash changed files: {e:#}")),
        }
        debug!(attribute_id = %planned.attribute_id, files = result.files.len(), "fix applied");
        result
    }
}

fn rolled_back(planned: &PlannedFix, snapshot: &Snapshot, reason: String) -> FixOutcome {
    match snapshot.restore() {
        Ok(()) => outcome(planned, FixStatus::RolledBack, Some(reason)),
        Err(e) => outcome(
            planned,
            FixStatus::Failed,
            Some(format!("{reason}; restore failed: {e:#}")),
        ),
    }
}

/// Simulates the plan in order against an in-memory overlay.
fn preview_plan(repo: &Repository, plan: &Plan) -> (Vec<Previewed>, String) {
    let mut overlay = Overlay::new(&repo.root);
    let previewed = plan
        .fixes
        .iter()
        .map(|planned| {
            let preview = overlay
                .simulate(&planned.fix)
                .map(|patch| FixPreview {
                    preview: planned.fix.preview(),
                    patch,
                    points_gained: planned.points_gained,
                })
                .map_err(|e| format!("preview failed: {e}"));
            Previewed {
                planned: planned.clone(),
                preview,
            }
        })
        .collect();
    (previewed, overlay.patch())
}

fn outcome(planned: &PlannedFix, status: FixStatus, message: Option<String>) -> FixOutcome {
    FixOutcome {
        fix_id: planned.id.clone(),
        attribute_id: planned.attribute_id.clone(),
        generator: planned.generator.clone(),
        status,
        preview: planned.fix.preview(),
        points_gained: planned.points_gained,
        message,
        files: Vec::new(),
    }
}

fn review_body(report: &AlignReport) -> String {
    let mut body = format!(
        "Score {:.1} -> {}\n\n",
        report.before.overall,
        report
            .after
            .map(|a| format!("{:.1}", a.overall))
            .unwrap_or_else(|| "n/a".to_string())
    );
    for o in report.outcomes.iter().filter(|o| o.status == FixStatus::Applied) {
        body.push_str(&format!("- {}: {}\n", o.attribute_id, o.preview));
    }
    body
}
