//! Three-phase A/B evaluation: baseline, per-attribute trials, aggregation.
//!
//! The baseline is measured once and recorded in the ledger before any trial
//! is spawned. Trials run concurrently, bounded by a semaphore, each in its
//! own [`IsolatedWorkspace`]; their results are appended to the ledger in
//! completion order.

use crate::aggregate::summarize;
use crate::error::{BenchmarkError, EvalError};
use crate::ledger::ImpactLedger;
use crate::runner::BenchmarkRunner;
use crate::sampling::collect_samples;
use crate::stats::{SignificanceCriteria, compare, mean, std_dev};
use crate::workspace::IsolatedWorkspace;
use agentready_align::{AlignEngine, AlignSettings, CommandRunner, GeneratorCatalog, ShellCommandRunner};
use agentready_assess::{Scanner, discover_repository};
use agentready_hash::tree_fingerprint;
use agentready_types::align::{AlignMode, FixStatus};
use agentready_types::eval::{BaselineRun, EvalSummary, ImpactResult, Significance};
use agentready_types::{Attribute, CancelFlag, ConfigError, Tier};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct EvalSettings {
    /// Benchmark invocations per phase.
    pub iterations: u32,
    /// Upper bound for one benchmark invocation.
    pub timeout: Duration,
    /// Maximum concurrent trials.
    pub parallelism: usize,
    pub criteria: SignificanceCriteria,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            iterations: 5,
            timeout: Duration::from_secs(600),
            parallelism: 2,
            criteria: SignificanceCriteria::default(),
        }
    }
}

impl EvalSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if self.iterations == 0 {
            return Err(invalid("eval.iterations", "must be at least 1".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(invalid("eval.timeout_secs", "must be at least 1".to_string()));
        }
        if self.parallelism == 0 {
            return Err(invalid("eval.parallelism", "must be at least 1".to_string()));
        }
        let p = self.criteria.p_threshold;
        if !(p > 0.0 && p < 1.0) {
            return Err(invalid("eval.p_threshold", format!("must be in (0, 1), got {p}")));
        }
        let d = self.criteria.effect_threshold;
        if !d.is_finite() || d < 0.0 {
            return Err(invalid(
                "eval.effect_threshold",
                format!("must be a non-negative number, got {d}"),
            ));
        }
        Ok(())
    }
}

/// Which attributes a harness run trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Attributes(Vec<String>),
    Tier(Tier),
}

/// Everything a spawned trial needs, shared read-only across tasks.
struct TrialContext {
    source: Utf8PathBuf,
    scanner: Scanner,
    runner: Arc<dyn BenchmarkRunner>,
    catalog: GeneratorCatalog,
    commands: Arc<dyn CommandRunner>,
    settings: EvalSettings,
}

pub struct EvalHarness {
    source: Utf8PathBuf,
    scanner: Scanner,
    runner: Arc<dyn BenchmarkRunner>,
    ledger: Arc<ImpactLedger>,
    catalog: GeneratorCatalog,
    commands: Arc<dyn CommandRunner>,
    settings: EvalSettings,
    cancel: CancelFlag,
}

impl EvalHarness {
    pub fn new(
        source: impl Into<Utf8PathBuf>,
        scanner: Scanner,
        runner: Arc<dyn BenchmarkRunner>,
        settings: EvalSettings,
    ) -> Self {
        Self {
            source: source.into(),
            scanner,
            runner,
            ledger: Arc::new(ImpactLedger::in_memory()),
            catalog: GeneratorCatalog::builtin(),
            commands: Arc::new(ShellCommandRunner),
            settings,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<ImpactLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_catalog(mut self, catalog: GeneratorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Runner used by command fixes inside trial workspaces.
    pub fn with_command_runner(mut self, commands: Arc<dyn CommandRunner>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn ledger(&self) -> &Arc<ImpactLedger> {
        &self.ledger
    }

    pub fn settings(&self) -> &EvalSettings {
        &self.settings
    }

    fn context(&self) -> Arc<TrialContext> {
        Arc::new(TrialContext {
            source: self.source.clone(),
            scanner: self.scanner.clone(),
            runner: self.runner.clone(),
            catalog: self.catalog.clone(),
            commands: self.commands.clone(),
            settings: self.settings.clone(),
        })
    }

    /// Measures the unmodified repository. Does not touch the ledger.
    pub async fn establish_baseline(&self) -> Result<BaselineRun, EvalError> {
        self.settings.validate()?;
        let source = self.source.clone();
        let (workspace, fingerprint) = tokio::task::spawn_blocking(move || {
            discover_repository(&source)?;
            let fingerprint = tree_fingerprint(&source).map_err(EvalError::Workspace)?;
            let workspace = IsolatedWorkspace::clone_from(&source).map_err(EvalError::Workspace)?;
            Ok::<_, EvalError>((workspace, fingerprint))
        })
        .await
        .map_err(|e| EvalError::Task(format!("baseline setup: {e}")))??;

        let samples = collect_samples(
            self.runner.as_ref(),
            workspace.root(),
            self.settings.iterations,
            self.settings.timeout,
        )
        .await
        .map_err(unavailable)?;

        let baseline = BaselineRun {
            mean: mean(&samples.scores).unwrap_or(0.0),
            std_dev: std_dev(&samples.scores).unwrap_or(0.0),
            n: samples.scores.len(),
            samples: samples.scores,
            dropped: samples.dropped,
            fingerprint,
            recorded_at: Utc::now(),
        };
        info!(
            benchmark = self.runner.name(),
            mean = baseline.mean,
            std_dev = baseline.std_dev,
            n = baseline.n,
            dropped = baseline.dropped.len(),
            "baseline established"
        );
        Ok(baseline)
    }

    /// Remediates a single attribute in a fresh workspace and measures it
    /// against `baseline`. Does not touch the ledger.
    pub async fn run_trial(
        &self,
        attribute_id: &str,
        baseline: &BaselineRun,
    ) -> Result<ImpactResult, EvalError> {
        self.settings.validate()?;
        self.context().trial(attribute_id, baseline).await
    }

    /// Runs baseline, every selected trial and aggregation.
    ///
    /// A trial that fails for any reason other than an unavailable benchmark
    /// is recorded as insufficient data. After cancellation no further trial
    /// starts; results already recorded stay in the ledger and the summary
    /// covers them.
    pub async fn run(&self, selection: &Selection) -> Result<EvalSummary, EvalError> {
        self.settings.validate()?;
        let attributes = self.resolve(selection)?;

        let baseline = self.establish_baseline().await?;
        self.ledger
            .record_baseline(baseline.clone())
            .map_err(EvalError::Ledger)?;
        let baseline = Arc::new(baseline);

        let context = self.context();
        let semaphore = Arc::new(Semaphore::new(self.settings.parallelism));
        let mut trials = JoinSet::new();
        let mut spawned: HashMap<tokio::task::Id, Attribute> = HashMap::new();

        for attribute in attributes {
            if self.cancel.is_cancelled() {
                break;
            }
            let (context, baseline, semaphore) = (context.clone(), baseline.clone(), semaphore.clone());
            let cancel = self.cancel.clone();
            let id = attribute.id.clone();
            let handle = trials.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                if cancel.is_cancelled() {
                    debug!(attribute_id = %id, "trial not started");
                    return None;
                }
                Some(context.trial(&id, &baseline).await)
            });
            spawned.insert(handle.id(), attribute);
        }

        while let Some(joined) = trials.join_next_with_id().await {
            let (task, outcome) = match joined {
                Ok((task, outcome)) => (task, outcome),
                Err(e) => {
                    let task = e.id();
                    (task, Some(Err(EvalError::Task(e.to_string()))))
                }
            };
            let Some(attribute) = spawned.remove(&task) else {
                continue;
            };
            let impact = match outcome {
                None => continue,
                Some(Ok(impact)) => impact,
                Some(Err(EvalError::BenchmarkUnavailable(message))) => {
                    trials.abort_all();
                    warn!(attribute_id = %attribute.id, error = %message, "benchmark unavailable, aborting evaluation");
                    return Err(EvalError::BenchmarkUnavailable(message));
                }
                Some(Err(e)) => {
                    warn!(attribute_id = %attribute.id, error = %e, "trial failed");
                    failed_trial(&attribute, &baseline, self.settings.iterations, e.to_string())
                }
            };
            info!(
                attribute_id = %impact.attribute_id,
                delta = impact.delta,
                significance = ?impact.significance,
                "trial complete"
            );
            self.ledger.record_impact(impact).map_err(EvalError::Ledger)?;
        }

        if self.cancel.is_cancelled() {
            info!(completed = self.ledger.len(), "evaluation cancelled");
        }

        let summary = summarize((*baseline).clone(), self.ledger.impacts());
        self.ledger.write_summary(&summary).map_err(EvalError::Ledger)?;
        Ok(summary)
    }

    fn resolve(&self, selection: &Selection) -> Result<Vec<Attribute>, EvalError> {
        let registry = self.scanner.registry();
        let selected = match selection {
            Selection::All => registry.clone(),
            Selection::Attributes(ids) => registry.restrict(ids.as_slice())?,
            Selection::Tier(tier) => registry.for_tier(*tier),
        };
        Ok(selected.attributes())
    }
}

impl TrialContext {
    async fn trial(&self, attribute_id: &str, baseline: &BaselineRun) -> Result<ImpactResult, EvalError> {
        let registry = self.scanner.registry().restrict(&[attribute_id])?;
        let Some(attribute) = registry.attributes().into_iter().next() else {
            return Err(ConfigError::UnknownAttribute {
                id: attribute_id.to_string(),
            }
            .into());
        };

        let source = self.source.clone();
        let scanner = self.scanner.with_registry(registry);
        let catalog = self.catalog.clone();
        let commands = self.commands.clone();
        let id = attribute.id.clone();
        let (workspace, report) = tokio::task::spawn_blocking(move || {
            let workspace = IsolatedWorkspace::clone_from(&source).map_err(EvalError::Workspace)?;
            let repo = discover_repository(workspace.root())?;
            let engine = AlignEngine::new(scanner)
                .with_catalog(catalog)
                .with_runner(commands);
            let settings = AlignSettings {
                mode: AlignMode::DirectApply,
                attributes: Some(BTreeSet::from([id])),
                ..AlignSettings::default()
            };
            let report = engine.run(&repo, &settings)?;
            Ok::<_, EvalError>((workspace, report))
        })
        .await
        .map_err(|e| EvalError::Task(format!("remediation of {attribute_id}: {e}")))??;

        let applied: Vec<String> = report
            .outcomes
            .iter()
            .filter(|o| o.status == FixStatus::Applied)
            .map(|o| o.preview.clone())
            .collect();
        debug!(attribute_id, fixes_applied = applied.len(), "trial workspace remediated");

        let post = self.measure(workspace.root()).await?;
        let comparison = compare(&baseline.samples, &post.scores, &self.settings.criteria);
        let post_mean = mean(&post.scores).unwrap_or(baseline.mean);

        Ok(ImpactResult {
            attribute_id: attribute.id,
            attribute_name: attribute.name,
            tier: attribute.tier,
            baseline_mean: baseline.mean,
            post_mean,
            delta: post_mean - baseline.mean,
            t_statistic: comparison.t_statistic,
            p_value: comparison.p_value,
            cohens_d: comparison.cohens_d,
            effect: comparison.effect,
            significance: comparison.significance,
            iterations: self.settings.iterations,
            samples: post.scores,
            dropped_samples: post.dropped,
            fixes_applied: applied.len() as u32,
            remediation_log: applied,
        })
    }

    async fn measure(&self, root: &Utf8Path) -> Result<crate::sampling::Samples, EvalError> {
        collect_samples(
            self.runner.as_ref(),
            root,
            self.settings.iterations,
            self.settings.timeout,
        )
        .await
        .map_err(unavailable)
    }
}

fn unavailable(e: BenchmarkError) -> EvalError {
    match e {
        BenchmarkError::Unavailable(message) => EvalError::BenchmarkUnavailable(message),
        BenchmarkError::Failed(message) => EvalError::Task(message),
    }
}

fn failed_trial(attribute: &Attribute, baseline: &BaselineRun, iterations: u32, reason: String) -> ImpactResult {
    ImpactResult {
        attribute_id: attribute.id.clone(),
        attribute_name: attribute.name.clone(),
        tier: attribute.tier,
        baseline_mean: baseline.mean,
        post_mean: baseline.mean,
        delta: 0.0,
        t_statistic: None,
        p_value: None,
        cohens_d: None,
        effect: None,
        significance: Significance::InsufficientData { reason },
        iterations,
        samples: vec![],
        dropped_samples: vec![],
        fixes_applied: 0,
        remediation_log: vec![],
    }
}
