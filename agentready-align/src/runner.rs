use anyhow::{Context, bail};
use camino::Utf8Path;
use std::process::Command;
use tracing::debug;

/// Executes `Fix::Command` steps. Swapped out in tests.
pub trait CommandRunner: Send + Sync {
    fn run(&self, argv: &[String], cwd: &Utf8Path) -> anyhow::Result<()>;
}

/// Spawns the program directly (no shell) and treats a non-zero exit as
/// failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&self, argv: &[String], cwd: &Utf8Path) -> anyhow::Result<()> {
        let Some((program, args)) = argv.split_first() else {
            bail!("empty command");
        };
        debug!(program = %program, cwd = %cwd, "running fix command");
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .with_context(|| format!("spawn {program}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} exited with {}: {}", program, output.status, stderr.trim());
        }
        Ok(())
    }
}
