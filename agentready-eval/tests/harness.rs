//! Harness runs over the python_starter fixture with the deterministic mock
//! benchmark.

use agentready_align::CommandRunner;
use agentready_assess::{Registry, Scanner};
use agentready_eval::{
    BenchmarkError, BenchmarkRunner, EvalError, EvalHarness, EvalSettings, ImpactLedger,
    MockBenchmarkRunner, Selection,
};
use agentready_hash::hash_tree;
use agentready_score::Scorer;
use agentready_types::eval::Significance;
use agentready_types::{CancelFlag, Tier};
use anyhow::bail;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tempfile::TempDir;

fn fixture(name: &str) -> (TempDir, Utf8PathBuf) {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let src = manifest_dir
        .parent()
        .expect("workspace root")
        .join("tests")
        .join("fixtures")
        .join(name)
        .join("repo");
    let temp = TempDir::new().expect("temp dir");
    let root = temp.path().join(name);
    copy_dir_all(&src, &root).expect("copy fixture");
    let root = Utf8PathBuf::from_path_buf(root).expect("utf8 path");
    (temp, root)
}

fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

fn settings() -> EvalSettings {
    EvalSettings {
        iterations: 3,
        timeout: Duration::from_secs(30),
        ..EvalSettings::default()
    }
}

fn harness(root: &Utf8Path, runner: Arc<dyn BenchmarkRunner>) -> EvalHarness {
    let scanner = Scanner::new(Registry::builtin(), Scorer::default()).with_parallelism(2);
    EvalHarness::new(root, scanner, runner, settings()).with_command_runner(Arc::new(LockWriter))
}

fn ids(selection: &[&str]) -> Selection {
    Selection::Attributes(selection.iter().map(|s| s.to_string()).collect())
}

struct LockWriter;

impl CommandRunner for LockWriter {
    fn run(&self, argv: &[String], cwd: &Utf8Path) -> anyhow::Result<()> {
        match argv.first().map(String::as_str) {
            Some("uv") => {
                fs::write(cwd.join("uv.lock"), "version = 1\n")?;
                Ok(())
            }
            other => bail!("unexpected command {other:?}"),
        }
    }
}

struct Broken;

impl CommandRunner for Broken {
    fn run(&self, _argv: &[String], _cwd: &Utf8Path) -> anyhow::Result<()> {
        bail!("lock tool crashed")
    }
}

/// Behaves like the mock for the first `available` calls, then disappears.
struct Vanishing {
    available: u32,
    calls: AtomicU32,
}

#[async_trait]
impl BenchmarkRunner for Vanishing {
    fn name(&self) -> &str {
        "vanishing"
    }

    async fn run(&self, workspace: &Utf8Path, iteration: u32) -> Result<f64, BenchmarkError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.available {
            return Err(BenchmarkError::Unavailable("benchmark uninstalled".to_string()));
        }
        MockBenchmarkRunner.run(workspace, iteration).await
    }
}

#[tokio::test]
async fn trials_are_recorded_and_the_source_is_untouched() {
    let (_temp, root) = fixture("python_starter");
    let before = hash_tree(&root).expect("hash");
    let out = TempDir::new().expect("temp dir");
    let ledger_dir = Utf8PathBuf::from_path_buf(out.path().to_path_buf()).expect("utf8");
    let ledger = Arc::new(ImpactLedger::persistent(ledger_dir.clone()));

    let summary = harness(&root, Arc::new(MockBenchmarkRunner))
        .with_ledger(ledger.clone())
        .run(&ids(&["claude_md_file", "dependency_pinning"]))
        .await
        .expect("evaluation");

    assert_eq!(hash_tree(&root).expect("hash"), before);
    assert_eq!(summary.total_tested, 2);
    assert_eq!(summary.baseline.n, 3);
    assert_eq!(summary.tier_averages.len(), 4);
    assert!(summary.impacts[0].delta >= summary.impacts[1].delta);

    for impact in &summary.impacts {
        assert_eq!(impact.tier, Tier::Essential);
        assert_eq!(impact.fixes_applied, 1, "{}", impact.attribute_id);
        assert_eq!(impact.samples.len(), 3);
        assert_eq!(impact.delta, impact.post_mean - impact.baseline_mean);
    }
    let pinning = summary
        .impacts
        .iter()
        .find(|i| i.attribute_id == "dependency_pinning")
        .expect("pinning trial");
    assert_eq!(pinning.remediation_log, vec!["RUN uv lock".to_string()]);

    assert_eq!(ledger.baseline().map(|b| b.n), Some(3));
    assert!(ledger_dir.join("baseline/summary.json").is_file());
    assert!(ledger_dir.join("assessors/claude_md_file/impact.json").is_file());
    assert!(ledger_dir.join("summary.json").is_file());

    let reloaded = ImpactLedger::load(ledger_dir).expect("load");
    assert_eq!(reloaded.len(), 2);
}

#[tokio::test]
async fn baseline_is_a_function_of_the_tree() {
    let (_temp, root) = fixture("python_starter");
    let harness = harness(&root, Arc::new(MockBenchmarkRunner));

    let first = harness.establish_baseline().await.expect("baseline");
    let second = harness.establish_baseline().await.expect("baseline");
    assert_eq!(first.samples, second.samples);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.n, 3);
    assert!(first.dropped.is_empty());
}

#[tokio::test]
async fn trial_without_an_applicable_fix_still_measures() {
    let (_temp, root) = fixture("python_starter");
    let harness = harness(&root, Arc::new(MockBenchmarkRunner)).with_command_runner(Arc::new(Broken));
    let baseline = harness.establish_baseline().await.expect("baseline");

    let impact = harness
        .run_trial("dependency_pinning", &baseline)
        .await
        .expect("trial");

    assert_eq!(impact.fixes_applied, 0);
    assert!(impact.remediation_log.is_empty());
    assert_eq!(impact.samples.len(), 3);
    // Nothing changed, so the mock reproduces the baseline exactly.
    assert_eq!(impact.samples, baseline.samples);
    assert_eq!(impact.delta, 0.0);
    assert_eq!(impact.significance, Significance::NotSignificant);
}

#[tokio::test]
async fn unknown_attribute_fails_before_measuring() {
    let (_temp, root) = fixture("python_starter");
    let runner = Arc::new(Vanishing {
        available: 100,
        calls: AtomicU32::new(0),
    });
    let err = harness(&root, runner.clone())
        .run(&ids(&["no_such_attribute"]))
        .await
        .expect_err("unknown id");

    assert!(matches!(err, EvalError::Config(_)));
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_benchmark_aborts_after_the_baseline() {
    let (_temp, root) = fixture("python_starter");
    let ledger = Arc::new(ImpactLedger::in_memory());
    let runner = Arc::new(Vanishing {
        available: 3,
        calls: AtomicU32::new(0),
    });

    let err = harness(&root, runner)
        .with_ledger(ledger.clone())
        .run(&ids(&["claude_md_file"]))
        .await
        .expect_err("benchmark vanished");

    assert!(matches!(err, EvalError::BenchmarkUnavailable(_)));
    assert!(ledger.baseline().is_some());
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn cancelled_run_keeps_the_baseline_and_starts_no_trials() {
    let (_temp, root) = fixture("python_starter");
    let ledger = Arc::new(ImpactLedger::in_memory());
    let cancel = CancelFlag::new();
    cancel.cancel();

    let summary = harness(&root, Arc::new(MockBenchmarkRunner))
        .with_ledger(ledger.clone())
        .with_cancel(cancel)
        .run(&Selection::All)
        .await
        .expect("cancelled run still summarises");

    assert_eq!(summary.total_tested, 0);
    assert!(ledger.baseline().is_some());
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn tier_selection_only_trials_that_tier() {
    let (_temp, root) = fixture("python_starter");
    let expected = Registry::builtin().for_tier(Tier::Advanced).len();

    let summary = harness(&root, Arc::new(MockBenchmarkRunner))
        .run(&Selection::Tier(Tier::Advanced))
        .await
        .expect("evaluation");

    assert_eq!(summary.total_tested as usize, expected);
    assert!(summary.impacts.iter().all(|i| i.tier == Tier::Advanced));
    let advanced = &summary.tier_averages[3];
    assert_eq!(advanced.tier, Tier::Advanced);
    assert_eq!(advanced.attributes_tested as usize, expected);
}
