//! Builds the [`Repository`] descriptor handed to assessors.

use agentready_types::{GitMetadata, Repository};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use thiserror::Error;
use tracing::debug;

/// Directories never scanned for language detection.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "target",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    "dist",
    "build",
];

/// Cap on files visited while detecting languages.
pub const MAX_SCANNED_FILES: usize = 10_000;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("repository root {path} is unavailable: {message}")]
    Unavailable { path: Utf8PathBuf, message: String },

    #[error("failed to walk repository {path}: {source}")]
    Walk {
        path: Utf8PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

const EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "Rust"),
    ("py", "Python"),
    ("pyi", "Python"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("js", "JavaScript"),
    ("jsx", "JavaScript"),
    ("mjs", "JavaScript"),
    ("go", "Go"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("rb", "Ruby"),
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("hpp", "C++"),
    ("cs", "C#"),
    ("swift", "Swift"),
    ("php", "PHP"),
    ("sh", "Shell"),
];

pub fn language_for(path: &Utf8Path) -> Option<&'static str> {
    let ext = path.extension()?;
    EXTENSIONS
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, lang)| *lang)
}

/// Describes the repository at `root`.
///
/// Fails only when the root itself cannot be read; unreadable git metadata is
/// treated as "not a git repository".
pub fn discover_repository(root: &Utf8Path) -> Result<Repository, DiscoveryError> {
    let meta = fs::metadata(root).map_err(|e| DiscoveryError::Unavailable {
        path: root.to_path_buf(),
        message: e.to_string(),
    })?;
    if !meta.is_dir() {
        return Err(DiscoveryError::Unavailable {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let files = agentready_hash::walk_files(root, SKIP_DIRS, MAX_SCANNED_FILES).map_err(|e| {
        DiscoveryError::Walk {
            path: root.to_path_buf(),
            source: e,
        }
    })?;

    let mut languages: BTreeMap<String, u64> = BTreeMap::new();
    for f in &files {
        if let Some(lang) = language_for(f) {
            *languages.entry(lang.to_string()).or_default() += 1;
        }
    }

    let mut repo = Repository::new(root.to_path_buf());
    repo.languages = languages;
    repo.total_files = files.len() as u64;
    repo.git = read_git_metadata(root);

    debug!(
        root = %root,
        files = repo.total_files,
        languages = repo.languages.len(),
        git = repo.git.is_some(),
        "discovered repository"
    );
    Ok(repo)
}

/// Reads `.git/HEAD` and the ref it points at, without invoking git.
pub fn read_git_metadata(root: &Utf8Path) -> Option<GitMetadata> {
    let git_dir = root.join(".git");
    let head = match fs::read_to_string(git_dir.join("HEAD")) {
        Ok(s) => s,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                debug!(root = %root, error = %e, "unreadable git HEAD");
            }
            return None;
        }
    };
    let head = head.trim();

    if let Some(reference) = head.strip_prefix("ref: ") {
        let branch = reference
            .strip_prefix("refs/heads/")
            .unwrap_or(reference)
            .to_string();
        let commit = fs::read_to_string(git_dir.join(reference))
            .ok()
            .map(|s| s.trim().to_string())
            .or_else(|| packed_ref(&git_dir, reference));
        Some(GitMetadata {
            branch: Some(branch),
            commit,
        })
    } else {
        Some(GitMetadata {
            branch: None,
            commit: Some(head.to_string()),
        })
    }
}

fn packed_ref(git_dir: &Utf8Path, reference: &str) -> Option<String> {
    let packed = fs::read_to_string(git_dir.join("packed-refs")).ok()?;
    packed.lines().find_map(|line| {
        let (sha, name) = line.split_once(' ')?;
        (name.trim() == reference).then(|| sha.to_string())
    })
}
