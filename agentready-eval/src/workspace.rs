use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use tempfile::TempDir;
use tracing::debug;

/// Private copy of a repository that a single trial may mutate freely.
///
/// The copy lives in a temporary directory removed on drop. VCS metadata is
/// copied too so git-aware assessors see the same repository.
#[derive(Debug)]
pub struct IsolatedWorkspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl IsolatedWorkspace {
    pub fn clone_from(source: &Utf8Path) -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("agentready-trial-")
            .tempdir()
            .context("create trial workspace")?;
        let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir {}", p.display()))?;
        let name = source.file_name().unwrap_or("repo");
        let root = base.join(name);
        copy_tree(source, &root).with_context(|| format!("copy {source} into {root}"))?;
        debug!(source = %source, root = %root, "isolated workspace ready");
        Ok(Self { _dir: dir, root })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

fn copy_tree(src: &Utf8Path, dst: &Utf8Path) -> anyhow::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            debug!(dir = %src, "skipping non-utf8 entry");
            continue;
        };
        let file_type = entry.file_type()?;
        let (from, to) = (src.join(&name), dst.join(&name));
        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else if file_type.is_file() {
            fs::copy(&from, &to)?;
        } else {
            debug!(path = %from, "skipping non-regular file");
        }
    }
    Ok(())
}
