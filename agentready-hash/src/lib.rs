//! Small hashing primitives and deterministic repository traversal.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::debug;

/// Directories never descended into when fingerprinting.
pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Lists regular files under `root` as root-relative, `/`-separated paths in
/// sorted order. Directories named in `skip_dirs` are not descended into.
/// Symlinks are not followed. At most `limit` files are returned.
pub fn walk_files(
    root: &Utf8Path,
    skip_dirs: &[&str],
    limit: usize,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![Utf8PathBuf::new()];

    while let Some(rel_dir) = stack.pop() {
        let abs_dir = root.join(&rel_dir);
        let mut entries = fs::read_dir(&abs_dir)
            .with_context(|| format!("read dir {}", abs_dir))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("list dir {}", abs_dir))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let Ok(name) = entry.file_name().into_string() else {
                debug!(dir = %abs_dir, "skipping non-utf8 entry");
                continue;
            };
            let file_type = entry
                .file_type()
                .with_context(|| format!("stat {}/{}", abs_dir, name))?;
            let rel = rel_dir.join(&name);

            if file_type.is_dir() {
                if !skip_dirs.contains(&name.as_str()) {
                    stack.push(rel);
                }
            } else if file_type.is_file() {
                out.push(rel);
                if out.len() >= limit {
                    out.sort();
                    return Ok(out);
                }
            }
        }
    }

    out.sort();
    Ok(out)
}

/// Maps every file (outside VCS metadata) to the sha256 of its contents.
pub fn hash_tree(root: &Utf8Path) -> anyhow::Result<BTreeMap<Utf8PathBuf, String>> {
    let mut out = BTreeMap::new();
    for rel in walk_files(root, VCS_DIRS, usize::MAX)? {
        let bytes = fs::read(root.join(&rel)).with_context(|| format!("read {}", rel))?;
        out.insert(rel, sha256_hex(&bytes));
    }
    Ok(out)
}

/// Stable content fingerprint of a tree: identical file paths and contents
/// always yield the same value, independent of where the tree lives.
pub fn tree_fingerprint(root: &Utf8Path) -> anyhow::Result<String> {
    let mut hasher = Sha256::new();
    for (rel, sha) in hash_tree(root)? {
        hasher.update(rel.as_str().replace('\\', "/").as_bytes());
        hasher.update([0u8]);
        hasher.update(sha.as_bytes());
        hasher.update([b'\n']);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path")
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_ignores_location_and_vcs_metadata() {
        let a = TempDir::new().expect("temp");
        let b = TempDir::new().expect("temp");
        for temp in [&a, &b] {
            let root = utf8_root(temp);
            fs::create_dir_all(root.join("src")).expect("mkdir");
            fs::write(root.join("src/lib.rs"), "pub fn x() {}\n").expect("write");
            fs::write(root.join("README.md"), "# demo\n").expect("write");
        }
        let root_b = utf8_root(&b);
        fs::create_dir_all(root_b.join(".git")).expect("mkdir");
        fs::write(root_b.join(".git/HEAD"), "ref: refs/heads/main\n").expect("write");

        let fa = tree_fingerprint(&utf8_root(&a)).expect("fingerprint");
        let fb = tree_fingerprint(&root_b).expect("fingerprint");
        assert_eq!(fa, fb);

        fs::write(root_b.join("README.md"), "# changed\n").expect("write");
        assert_ne!(fa, tree_fingerprint(&root_b).expect("fingerprint"));
    }

    #[test]
    fn walk_files_is_sorted_and_respects_skip_and_limit() {
        let temp = TempDir::new().expect("temp");
        let root = utf8_root(&temp);
        fs::create_dir_all(root.join("b/target")).expect("mkdir");
        fs::write(root.join("b/target/out.bin"), "x").expect("write");
        fs::write(root.join("b/z.rs"), "x").expect("write");
        fs::write(root.join("a.txt"), "x").expect("write");

        let files = walk_files(&root, &["target"], usize::MAX).expect("walk");
        assert_eq!(
            files,
            vec![Utf8PathBuf::from("a.txt"), Utf8PathBuf::from("b/z.rs")]
        );

        let limited = walk_files(&root, &[], 1).expect("walk");
        assert_eq!(limited.len(), 1);
    }
}
