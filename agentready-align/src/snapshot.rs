use agentready_hash::sha256_hex;
use agentready_types::align::FileChange;
use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use tracing::debug;

/// Pre-apply contents of every path a fix may write.
///
/// `None` records a path that did not exist; restoring deletes it again.
/// Directories the fix had to create are removed on restore when empty.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Utf8PathBuf,
    files: BTreeMap<Utf8PathBuf, Option<Vec<u8>>>,
    missing_dirs: Vec<Utf8PathBuf>,
}

impl Snapshot {
    pub fn capture<'a>(
        root: &Utf8Path,
        paths: impl IntoIterator<Item = &'a Utf8PathBuf>,
    ) -> anyhow::Result<Self> {
        let mut files = BTreeMap::new();
        let mut missing_dirs = Vec::new();
        for rel in paths {
            let abs = root.join(rel);
            let bytes = match fs::read(&abs) {
                Ok(b) => Some(b),
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => return Err(e).with_context(|| format!("snapshot {rel}")),
            };
            let mut dir = rel.parent();
            while let Some(d) = dir {
                if d.as_str().is_empty() {
                    break;
                }
                if !root.join(d).exists() && !missing_dirs.contains(&d.to_path_buf()) {
                    missing_dirs.push(d.to_path_buf());
                }
                dir = d.parent();
            }
            files.insert(rel.clone(), bytes);
        }
        // Deepest first so children go before parents.
        missing_dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        Ok(Self {
            root: root.to_path_buf(),
            files,
            missing_dirs,
        })
    }

    /// Puts every recorded path back to its captured state.
    ///
    /// Refuses to run once the root itself is gone, so a vanished repository
    /// is never recreated piecemeal.
    pub fn restore(&self) -> anyhow::Result<()> {
        if !self.root.is_dir() {
            bail!("repository root {} no longer exists", self.root);
        }
        for (rel, bytes) in &self.files {
            let abs = self.root.join(rel);
            match bytes {
                Some(b) => {
                    if let Some(parent) = abs.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&abs, b).with_context(|| format!("restore {rel}"))?;
                }
                None => match fs::remove_file(&abs) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e).with_context(|| format!("remove {rel}")),
                },
            }
        }
        for dir in &self.missing_dirs {
            // Non-empty means something else now lives there; leave it.
            if fs::remove_dir(self.root.join(dir)).is_ok() {
                debug!(dir = %dir, "removed directory created by fix");
            }
        }
        Ok(())
    }

    /// Before/after hashes for every path whose content changed.
    pub fn changes(&self) -> anyhow::Result<Vec<FileChange>> {
        let mut out = Vec::new();
        for (rel, before) in &self.files {
            let after = match fs::read(self.root.join(rel)) {
                Ok(b) => Some(b),
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => return Err(e).with_context(|| format!("read {rel}")),
            };
            if &after == before {
                continue;
            }
            out.push(FileChange {
                path: rel.to_string(),
                before_sha256: before.as_deref().map(sha256_hex),
                after_sha256: after.as_deref().map(sha256_hex),
            });
        }
        Ok(out)
    }
}
