//! Benchmark runner contract and the built-in runners.

use crate::error::BenchmarkError;
use agentready_assess::discovery::{MAX_SCANNED_FILES, SKIP_DIRS, language_for};
use agentready_hash::{sha256_hex, tree_fingerprint, walk_files};
use async_trait::async_trait;
use camino::Utf8Path;
use fs_err as fs;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use tokio::process::Command;
use tracing::debug;

/// Produces one score in `[0, 100]` for a workspace.
///
/// Calls may block for minutes; the harness wraps every call in a timeout.
#[async_trait]
pub trait BenchmarkRunner: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, workspace: &Utf8Path, iteration: u32) -> Result<f64, BenchmarkError>;
}

/// Deterministic stand-in benchmark.
///
/// Score = 50 + size bonus + 2 per detected language (at most 10) + a
/// variance in `[-10, 10]` derived from the tree fingerprint and the
/// iteration, clamped to `[0, 100]` and rounded to two decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBenchmarkRunner;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeProfile {
    pub lines: u64,
    pub languages: usize,
    pub fingerprint: String,
}

impl MockBenchmarkRunner {
    pub fn profile(root: &Utf8Path) -> anyhow::Result<TreeProfile> {
        let files = walk_files(root, SKIP_DIRS, MAX_SCANNED_FILES)?;
        let mut lines = 0u64;
        let mut languages = BTreeSet::new();
        for rel in &files {
            if let Some(lang) = language_for(rel) {
                languages.insert(lang);
            }
            // Binary and unreadable files contribute no lines.
            if let Ok(text) = fs::read_to_string(root.join(rel)) {
                lines += text.lines().count() as u64;
            }
        }
        Ok(TreeProfile {
            lines,
            languages: languages.len(),
            fingerprint: tree_fingerprint(root)?,
        })
    }

    pub fn score(profile: &TreeProfile, iteration: u32) -> f64 {
        let size_bonus = match profile.lines {
            n if n > 10_000 => 10.0,
            n if n > 5_000 => 5.0,
            n if n > 1_000 => 2.0,
            _ => 0.0,
        };
        let language_bonus = (profile.languages as f64 * 2.0).min(10.0);

        let seed = sha256_hex(format!("{}|{}", profile.fingerprint, iteration).as_bytes());
        let raw = u64::from_str_radix(&seed[..16], 16).unwrap_or(0);
        let unit = raw as f64 / u64::MAX as f64;
        let variance = unit * 20.0 - 10.0;

        let score = (50.0 + size_bonus + language_bonus + variance).clamp(0.0, 100.0);
        (score * 100.0).round() / 100.0
    }
}

#[async_trait]
impl BenchmarkRunner for MockBenchmarkRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, workspace: &Utf8Path, iteration: u32) -> Result<f64, BenchmarkError> {
        let root = workspace.to_path_buf();
        let profile = tokio::task::spawn_blocking(move || Self::profile(&root))
            .await
            .map_err(|e| BenchmarkError::Failed(format!("profiling task: {e}")))?
            .map_err(|e| BenchmarkError::Failed(format!("{e:#}")))?;
        Ok(Self::score(&profile, iteration))
    }
}

/// Runs an external benchmark program as `program [args..] <workspace>` and
/// reads the score from the last non-empty stdout line.
#[derive(Debug, Clone)]
pub struct ShellBenchmarkRunner {
    program: String,
    args: Vec<String>,
}

impl ShellBenchmarkRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn parse_score(stdout: &str) -> Result<f64, BenchmarkError> {
        let last = stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .ok_or_else(|| BenchmarkError::Failed("benchmark printed no score".to_string()))?;
        let score: f64 = last
            .parse()
            .map_err(|_| BenchmarkError::Failed(format!("unparseable score `{last}`")))?;
        if !(0.0..=100.0).contains(&score) {
            return Err(BenchmarkError::Failed(format!("score {score} outside [0, 100]")));
        }
        Ok(score)
    }
}

#[async_trait]
impl BenchmarkRunner for ShellBenchmarkRunner {
    fn name(&self) -> &str {
        &self.program
    }

    async fn run(&self, workspace: &Utf8Path, iteration: u32) -> Result<f64, BenchmarkError> {
        debug!(program = %self.program, workspace = %workspace, iteration, "running benchmark");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(workspace.as_str())
            .current_dir(workspace)
            .env("AGENTREADY_ITERATION", iteration.to_string())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    BenchmarkError::Unavailable(format!("{}: {e}", self.program))
                }
                _ => BenchmarkError::Failed(format!("spawn {}: {e}", self.program)),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BenchmarkError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Self::parse_score(&String::from_utf8_lossy(&output.stdout))
    }
}
