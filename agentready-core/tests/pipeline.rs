//! End-to-end pipeline runs over the golden fixture repositories.

use agentready_core::ToolError;
use agentready_core::adapters::FsWritePort;
use agentready_core::config::CONFIG_FILE_NAME;
use agentready_core::pipeline::{
    AlignPorts, EvalPorts, run_align, run_assess, run_eval, write_align_artifacts,
    write_assess_artifacts, write_eval_artifacts,
};
use agentready_core::settings::{AlignRunSettings, AssessSettings, EvalRunSettings};
use agentready_eval::{MockBenchmarkRunner, Selection};
use agentready_hash::hash_tree;
use agentready_types::align::{AlignMode, AlignState};
use agentready_types::schema::{AGENTREADY_ALIGN_V1, AGENTREADY_ASSESSMENT_V1, AGENTREADY_EVAL_V1};
use camino::Utf8PathBuf;
use fs_err as fs;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
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
    let root = temp.path().join("repo");
    copy_dir_all(&src, &root).expect("copy fixture");
    (temp, Utf8PathBuf::from_path_buf(root).expect("utf8 path"))
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

fn out_dir(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("out")).expect("utf8 path")
}

#[test]
fn assess_scores_and_writes_the_assessment() {
    let (temp, root) = fixture("near_ready");
    let settings = AssessSettings {
        repo_root: root,
        ..AssessSettings::default()
    };

    let outcome = run_assess(&settings).expect("assess");
    assert_eq!(outcome.assessment.schema, AGENTREADY_ASSESSMENT_V1);
    assert_eq!(outcome.assessment.score.overall, 87.5);

    let out = out_dir(&temp);
    write_assess_artifacts(&outcome, &out, &FsWritePort).expect("write");
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("assessment.json")).expect("read")).expect("json");
    assert_eq!(written["schema"], AGENTREADY_ASSESSMENT_V1);
}

#[test]
fn config_weights_change_the_score() {
    let (_temp, root) = fixture("near_ready");
    fs::write(
        root.join(CONFIG_FILE_NAME),
        "[scoring.tier_weights]\ntier1 = 25.0\ntier2 = 25.0\ntier3 = 25.0\ntier4 = 25.0\n",
    )
    .expect("write config");

    let outcome = run_assess(&AssessSettings {
        repo_root: root,
        ..AssessSettings::default()
    })
    .expect("assess");
    assert!(outcome.assessment.score.overall != 87.5);
}

#[test]
fn invalid_config_fails_with_exit_code_two() {
    let (_temp, root) = fixture("near_ready");
    fs::write(root.join(CONFIG_FILE_NAME), "[scoring.tier_weights]\ntier1 = 90.0\n").expect("write");

    let err = run_assess(&AssessSettings {
        repo_root: root,
        ..AssessSettings::default()
    })
    .err()
    .expect("invalid weights");
    assert_eq!(err.label(), "ConfigurationError");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn missing_repository_is_unavailable() {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().join("gone")).expect("utf8 path");

    let err = run_assess(&AssessSettings {
        repo_root: root,
        ..AssessSettings::default()
    })
    .err()
    .expect("missing root");
    assert!(matches!(err, ToolError::RepositoryUnavailable(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn align_preview_writes_report_and_patch_without_touching_the_tree() {
    let (temp, root) = fixture("python_starter");
    let before = hash_tree(&root).expect("hash");

    let outcome = run_align(
        &AlignRunSettings {
            repo_root: root.clone(),
            ..AlignRunSettings::default()
        },
        &AlignPorts::default(),
    )
    .expect("preview");

    assert_eq!(hash_tree(&root).expect("hash"), before);
    assert_eq!(outcome.report.schema, AGENTREADY_ALIGN_V1);
    assert_eq!(outcome.report.terminal_state(), Some(AlignState::Previewing));

    let out = out_dir(&temp);
    write_align_artifacts(&outcome, &out, &FsWritePort).expect("write");
    let patch = fs::read_to_string(out.join("patch.diff")).expect("read patch");
    assert!(patch.contains("+++ b/CLAUDE.md"));
    assert!(out.join("align.json").is_file());
}

#[test]
fn align_direct_apply_honours_the_subset() {
    let (_temp, root) = fixture("near_ready");

    let outcome = run_align(
        &AlignRunSettings {
            repo_root: root.clone(),
            mode: AlignMode::DirectApply,
            attributes: Some(BTreeSet::from(["claude_md_file".to_string()])),
            ..AlignRunSettings::default()
        },
        &AlignPorts::default(),
    )
    .expect("align");

    assert_eq!(outcome.report.after.map(|a| a.overall), Some(100.0));
    assert!(root.join("CLAUDE.md").is_file());
}

#[test]
fn review_mode_outside_git_is_a_configuration_error() {
    let (_temp, root) = fixture("near_ready");
    let err = run_align(
        &AlignRunSettings {
            repo_root: root,
            mode: AlignMode::ReviewRequest,
            ..AlignRunSettings::default()
        },
        &AlignPorts::shell(),
    )
    .err()
    .expect("no git");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn eval_with_the_mock_benchmark_writes_a_summary() {
    let (temp, root) = fixture("near_ready");
    fs::write(root.join(CONFIG_FILE_NAME), "[eval]\niterations = 3\n").expect("write config");
    let ledger_dir = Utf8PathBuf::from_path_buf(temp.path().join("ledger")).expect("utf8 path");

    let outcome = run_eval(
        &EvalRunSettings {
            repo_root: root,
            selection: Selection::Attributes(vec!["claude_md_file".to_string()]),
            ledger_dir: Some(ledger_dir.clone()),
            ..EvalRunSettings::default()
        },
        &EvalPorts::new(Arc::new(MockBenchmarkRunner)),
    )
    .await
    .expect("eval");

    assert_eq!(outcome.summary.schema, AGENTREADY_EVAL_V1);
    assert_eq!(outcome.summary.total_tested, 1);
    assert_eq!(outcome.summary.baseline.n, 3);
    assert_eq!(outcome.summary.impacts[0].fixes_applied, 1);
    assert!(ledger_dir.join("assessors/claude_md_file/impact.json").is_file());

    let out = out_dir(&temp);
    write_eval_artifacts(&outcome, &out, &FsWritePort).expect("write");
    assert!(out.join("eval-summary.json").is_file());
}
