//! Assess, align and eval pipelines.
//!
//! Configuration is resolved and validated first, then the repository is
//! discovered; only after both succeed does any scanning or mutation
//! happen. Artifact writing is separate and goes through [`WritePort`].

use crate::adapters::{ShellGitPort, ShellReviewPort};
use crate::config::{AgentreadyConfig, load_config, load_or_default};
use crate::error::ToolError;
use crate::ports::{BenchmarkRunner, CommandRunner, Confirmer, ReviewPort, VcsPort, WritePort};
use crate::settings::{AlignRunSettings, AssessSettings, EvalRunSettings};
use agentready_align::{AcceptAll, AlignEngine, ShellCommandRunner};
use agentready_assess::{Registry, Scanner, discover_repository};
use agentready_eval::{EvalHarness, ImpactLedger};
use agentready_types::CancelFlag;
use agentready_types::align::AlignReport;
use agentready_types::assessment::Assessment;
use agentready_types::eval::EvalSummary;
use anyhow::Context;
use camino::Utf8Path;
use std::sync::Arc;
use tracing::info;

fn resolve_config(repo_root: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<AgentreadyConfig, ToolError> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => load_or_default(repo_root)?,
    };
    Ok(config)
}

fn build_scanner(config: &AgentreadyConfig, attributes: &[String]) -> Result<Scanner, ToolError> {
    let registry = if attributes.is_empty() {
        Registry::builtin()
    } else {
        Registry::builtin().restrict(attributes)?
    };
    Ok(Scanner::new(registry, config.scorer()?).with_parallelism(config.scanner.parallelism))
}

/// Outcome of `run_assess`.
pub struct AssessOutcome {
    pub assessment: Assessment,
    pub json: String,
}

pub fn run_assess(settings: &AssessSettings) -> Result<AssessOutcome, ToolError> {
    let config = resolve_config(&settings.repo_root, settings.config_path.as_deref())?;
    let scanner = build_scanner(&config, &settings.attributes)?;
    let repo = discover_repository(&settings.repo_root)?;

    let assessment = scanner.scan(&repo)?;
    let json = serde_json::to_string_pretty(&assessment).context("serialize assessment")?;
    info!(
        repo = %repo.root,
        overall = assessment.score.overall,
        certification = assessment.score.certification.label(),
        "assessment complete"
    );
    Ok(AssessOutcome { assessment, json })
}

pub fn write_assess_artifacts(
    outcome: &AssessOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    writer.write_file(&out_dir.join("assessment.json"), outcome.json.as_bytes())
}

/// Collaborators of an align run.
pub struct AlignPorts {
    pub commands: Arc<dyn CommandRunner>,
    pub confirmer: Arc<dyn Confirmer>,
    pub review: Option<(Arc<dyn VcsPort>, Arc<dyn ReviewPort>)>,
    pub cancel: CancelFlag,
}

impl Default for AlignPorts {
    fn default() -> Self {
        Self {
            commands: Arc::new(ShellCommandRunner),
            confirmer: Arc::new(AcceptAll),
            review: None,
            cancel: CancelFlag::new(),
        }
    }
}

impl AlignPorts {
    /// Process-backed ports: fix commands, `git` and `gh`.
    pub fn shell() -> Self {
        Self {
            review: Some((Arc::new(ShellGitPort), Arc::new(ShellReviewPort))),
            ..Self::default()
        }
    }
}

/// Outcome of `run_align`.
pub struct AlignOutcome {
    pub report: AlignReport,
    pub json: String,
}

pub fn run_align(settings: &AlignRunSettings, ports: &AlignPorts) -> Result<AlignOutcome, ToolError> {
    let config = resolve_config(&settings.repo_root, settings.config_path.as_deref())?;
    let scanner = build_scanner(&config, &[])?;
    let repo = discover_repository(&settings.repo_root)?;

    let mut engine = AlignEngine::new(scanner)
        .with_runner(ports.commands.clone())
        .with_confirmer(ports.confirmer.clone())
        .with_cancel(ports.cancel.clone());
    if let Some((vcs, review)) = &ports.review {
        engine = engine.with_review(vcs.clone(), review.clone());
    }

    let align_settings = agentready_align::AlignSettings {
        mode: settings.mode,
        attributes: settings.attributes.clone(),
        interactive: settings.interactive,
        ..config.align_settings()
    };
    let report = engine.run(&repo, &align_settings)?;
    let json = serde_json::to_string_pretty(&report).context("serialize align report")?;
    info!(
        repo = %repo.root,
        mode = ?report.mode,
        before = report.before.overall,
        after = ?report.after.map(|a| a.overall),
        "align complete"
    );
    Ok(AlignOutcome { report, json })
}

pub fn write_align_artifacts(
    outcome: &AlignOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    writer.write_file(&out_dir.join("align.json"), outcome.json.as_bytes())?;
    writer.write_file(&out_dir.join("patch.diff"), outcome.report.patch.as_bytes())
}

/// Collaborators of an eval run.
pub struct EvalPorts {
    pub runner: Arc<dyn BenchmarkRunner>,
    pub commands: Arc<dyn CommandRunner>,
    pub cancel: CancelFlag,
}

impl EvalPorts {
    pub fn new(runner: Arc<dyn BenchmarkRunner>) -> Self {
        Self {
            runner,
            commands: Arc::new(ShellCommandRunner),
            cancel: CancelFlag::new(),
        }
    }
}

/// Outcome of `run_eval`.
pub struct EvalOutcome {
    pub summary: EvalSummary,
    pub json: String,
}

pub async fn run_eval(settings: &EvalRunSettings, ports: &EvalPorts) -> Result<EvalOutcome, ToolError> {
    let config = resolve_config(&settings.repo_root, settings.config_path.as_deref())?;
    let scanner = build_scanner(&config, &[])?;
    let repo = discover_repository(&settings.repo_root)?;

    let ledger = match &settings.ledger_dir {
        Some(dir) => ImpactLedger::persistent(dir.clone()),
        None => ImpactLedger::in_memory(),
    };
    let harness = EvalHarness::new(repo.root.clone(), scanner, ports.runner.clone(), config.eval_settings())
        .with_ledger(Arc::new(ledger))
        .with_command_runner(ports.commands.clone())
        .with_cancel(ports.cancel.clone());

    let summary = harness.run(&settings.selection).await?;
    let json = serde_json::to_string_pretty(&summary).context("serialize eval summary")?;
    info!(
        repo = %repo.root,
        benchmark = ports.runner.name(),
        tested = summary.total_tested,
        significant = summary.significant_improvements,
        "evaluation complete"
    );
    Ok(EvalOutcome { summary, json })
}

pub fn write_eval_artifacts(
    outcome: &EvalOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    writer.write_file(&out_dir.join("eval-summary.json"), outcome.json.as_bytes())
}
