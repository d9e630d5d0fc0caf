//! The assessor contract and read-only probes shared by the catalog.
//!
//! Probes attempt the read directly and classify the outcome; callers never
//! check for existence first.

use agentready_types::{Attribute, Finding, Repository};
use camino::Utf8Path;
use fs_err as fs;
use std::io::ErrorKind;

/// One independent attribute check.
///
/// `assess` never mutates the repository and never panics on expected
/// absence: a missing artifact is `fail`, a missing tool is `skipped`, and
/// only unexpected I/O failures become `error`.
pub trait Assessor: Send + Sync {
    fn attribute(&self) -> &Attribute;

    fn id(&self) -> &str {
        &self.attribute().id
    }

    /// Read-only predicate; assessors that apply everywhere keep the default.
    fn is_applicable(&self, _repo: &Repository) -> bool {
        true
    }

    fn assess(&self, repo: &Repository) -> Finding;
}

/// Outcome of a single read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    Missing,
    Failed(String),
}

impl<T> Probe<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found(v) => Some(v),
            _ => None,
        }
    }
}

/// Directory entry as seen by [`list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

fn is_absence(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NotFound | ErrorKind::NotADirectory)
}

pub fn read_text(root: &Utf8Path, rel: &str) -> Probe<String> {
    match fs::read_to_string(root.join(rel)) {
        Ok(s) => Probe::Found(s),
        Err(e) if is_absence(e.kind()) => Probe::Missing,
        Err(e) => Probe::Failed(e.to_string()),
    }
}

/// Sorted entries of a directory; a missing directory (or a file in its
/// place) is `Missing`.
pub fn list_dir(root: &Utf8Path, rel: &str) -> Probe<Vec<Entry>> {
    let dir = if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    };
    let iter = match fs::read_dir(&dir) {
        Ok(iter) => iter,
        Err(e) if is_absence(e.kind()) => return Probe::Missing,
        Err(e) => return Probe::Failed(e.to_string()),
    };

    let mut out = Vec::new();
    for entry in iter {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return Probe::Failed(e.to_string()),
        };
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_dir = match entry.file_type() {
            Ok(t) => t.is_dir(),
            Err(e) if is_absence(e.kind()) => continue,
            Err(e) => return Probe::Failed(e.to_string()),
        };
        out.push(Entry { name, is_dir });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Probe::Found(out)
}

/// First directory among `candidates` that can be listed.
pub fn first_dir(root: &Utf8Path, candidates: &[&str]) -> Probe<(String, Vec<Entry>)> {
    for candidate in candidates {
        match list_dir(root, candidate) {
            Probe::Found(entries) => return Probe::Found((candidate.to_string(), entries)),
            Probe::Missing => continue,
            Probe::Failed(e) => return Probe::Failed(e),
        }
    }
    Probe::Missing
}

/// `found / total` formatted for `measured_value`.
pub(crate) fn fraction(found: usize, total: usize) -> String {
    format!("{found}/{total}")
}

pub(crate) fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}
