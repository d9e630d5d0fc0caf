//! Default process- and filesystem-backed port implementations.

use crate::ports::{ReviewPort, VcsPort, WritePort};
use anyhow::{Context, bail};
use camino::Utf8Path;
use fs_err as fs;
use std::io::ErrorKind;
use std::process::{Command, Output};
use tracing::{debug, warn};

fn git(repo_root: &Utf8Path, args: &[&str]) -> anyhow::Result<Output> {
    debug!(repo_root = %repo_root, args = ?args, "git");
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .context("spawn git")?;
    if !output.status.success() {
        bail!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output)
}

/// Branch, commit and push through the `git` binary.
#[derive(Debug, Clone, Default)]
pub struct ShellGitPort;

impl VcsPort for ShellGitPort {
    fn create_branch(&self, repo_root: &Utf8Path, name: &str) -> anyhow::Result<()> {
        git(repo_root, &["checkout", "-b", name])?;
        Ok(())
    }

    fn commit_all(&self, repo_root: &Utf8Path, message: &str, paths: &[String]) -> anyhow::Result<String> {
        if paths.is_empty() {
            bail!("nothing to commit");
        }
        let mut add = vec!["add", "--all", "--"];
        add.extend(paths.iter().map(String::as_str));
        git(repo_root, &add)?;
        git(repo_root, &["commit", "--no-verify", "-m", message])?;
        let head = git(repo_root, &["rev-parse", "HEAD"])?;
        Ok(String::from_utf8_lossy(&head.stdout).trim().to_string())
    }

    fn push(&self, repo_root: &Utf8Path, branch: &str) -> anyhow::Result<()> {
        git(repo_root, &["push", "-u", "origin", branch])?;
        Ok(())
    }
}

/// Opens a pull request with the GitHub CLI (`gh pr create`).
///
/// A missing `gh` binary is not an error: the branch and commit stay in
/// place and no URL is reported.
#[derive(Debug, Clone, Default)]
pub struct ShellReviewPort;

impl ReviewPort for ShellReviewPort {
    fn open_review(
        &self,
        repo_root: &Utf8Path,
        branch: &str,
        title: &str,
        body: &str,
    ) -> anyhow::Result<Option<String>> {
        let output = match Command::new("gh")
            .args(["pr", "create", "--head", branch, "--title", title, "--body", body])
            .current_dir(repo_root)
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(branch, "gh not installed, review request not opened");
                return Ok(None);
            }
            Err(e) => return Err(e).context("spawn gh"),
        };
        if !output.status.success() {
            bail!(
                "gh pr create exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .rfind(|l| l.starts_with("http"))
            .map(str::to_string))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create parent dir for {path}"))?;
        }
        fs::write(path, contents).with_context(|| format!("write {path}"))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::process::Command;
    use tempfile::TempDir;

    fn root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8")
    }

    fn run_git(root: &Utf8Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(root)
            .status()
            .expect("run git");
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn fs_write_port_writes_and_creates_dirs() {
        let temp = TempDir::new().expect("temp dir");
        let root = root(&temp);
        let target = root.join("nested").join("assessment.json");

        FsWritePort.write_file(&target, b"{}").expect("write");
        assert_eq!(fs::read_to_string(&target).expect("read"), "{}");

        FsWritePort.create_dir_all(&root.join("extra")).expect("mkdir");
        assert!(root.join("extra").is_dir());
    }

    #[test]
    fn shell_git_port_fails_outside_a_repository() {
        let temp = TempDir::new().expect("temp dir");
        assert!(ShellGitPort.create_branch(&root(&temp), "agentready/x").is_err());
    }

    #[test]
    fn shell_git_port_branches_and_commits() {
        let temp = TempDir::new().expect("temp dir");
        let root = root(&temp);
        fs::write(root.join("README.md"), "# demo\n").expect("write");
        run_git(&root, &["init", "-q"]);
        run_git(&root, &["config", "user.email", "test@example.com"]);
        run_git(&root, &["config", "user.name", "Test User"]);
        run_git(&root, &["add", "."]);
        run_git(&root, &["commit", "-q", "-m", "init"]);

        ShellGitPort
            .create_branch(&root, "agentready/align-test")
            .expect("branch");
        fs::write(root.join("CLAUDE.md"), "# demo\n").expect("write");
        let sha = ShellGitPort
            .commit_all(&root, "chore: add CLAUDE.md", &["CLAUDE.md".to_string()])
            .expect("commit");
        assert_eq!(sha.len(), 40);

        let head = Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .current_dir(&root)
            .output()
            .expect("git");
        assert_eq!(String::from_utf8_lossy(&head.stdout).trim(), "agentready/align-test");
    }

    #[test]
    fn shell_git_port_pushes_the_branch_to_origin() {
        let remote_temp = TempDir::new().expect("temp dir");
        let remote = root(&remote_temp);
        run_git(&remote, &["init", "-q", "--bare"]);

        let temp = TempDir::new().expect("temp dir");
        let root = root(&temp);
        fs::write(root.join("README.md"), "# demo\n").expect("write");
        run_git(&root, &["init", "-q"]);
        run_git(&root, &["config", "user.email", "test@example.com"]);
        run_git(&root, &["config", "user.name", "Test User"]);
        run_git(&root, &["add", "."]);
        run_git(&root, &["commit", "-q", "-m", "init"]);
        run_git(&root, &["remote", "add", "origin", remote.as_str()]);

        ShellGitPort
            .create_branch(&root, "agentready/align-push")
            .expect("branch");
        fs::write(root.join("CLAUDE.md"), "# demo\n").expect("write");
        let sha = ShellGitPort
            .commit_all(&root, "chore: add CLAUDE.md", &["CLAUDE.md".to_string()])
            .expect("commit");
        ShellGitPort.push(&root, "agentready/align-push").expect("push");

        let pushed = Command::new("git")
            .args(["rev-parse", "refs/heads/agentready/align-push"])
            .current_dir(&remote)
            .output()
            .expect("git");
        assert!(pushed.status.success());
        assert_eq!(String::from_utf8_lossy(&pushed.stdout).trim(), sha);
    }

    #[test]
    fn shell_git_port_push_without_a_remote_fails() {
        let temp = TempDir::new().expect("temp dir");
        let root = root(&temp);
        run_git(&root, &["init", "-q"]);
        assert!(ShellGitPort.push(&root, "agentready/align-x").is_err());
    }
}
