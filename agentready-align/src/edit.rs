//! Text edits, in-memory simulation and on-disk application of fixes.

use crate::error::ApplyError;
use crate::runner::CommandRunner;
use agentready_types::fix::{Fix, TextChange};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{ErrorKind, Write};

/// Rejects absolute paths and any `..` component.
pub fn ensure_relative(path: &Utf8Path) -> Result<(), ApplyError> {
    let escapes = path.as_str().is_empty()
        || path.is_absolute()
        || path
            .components()
            .any(|c| !matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));
    if escapes {
        return Err(ApplyError::PathEscape {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

pub fn apply_text_changes(
    path: &Utf8Path,
    contents: &str,
    changes: &[TextChange],
) -> Result<String, ApplyError> {
    let mut out = contents.to_string();
    for change in changes {
        match change {
            TextChange::AppendLines {
                lines,
                skip_existing,
            } => {
                let mut present: BTreeSet<String> =
                    out.lines().map(|l| l.trim().to_string()).collect();
                let mut appended = String::new();
                for line in lines {
                    let trimmed = line.trim();
                    if *skip_existing && !trimmed.is_empty() && present.contains(trimmed) {
                        continue;
                    }
                    present.insert(trimmed.to_string());
                    appended.push_str(line);
                    appended.push('\n');
                }
                if !appended.is_empty() {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&appended);
                }
            }
            TextChange::ReplaceText { find, replace } => {
                if find.is_empty() || !out.contains(find.as_str()) {
                    return Err(ApplyError::PatternNotFound {
                        path: path.to_path_buf(),
                        find: find.clone(),
                    });
                }
                out = out.replacen(find.as_str(), replace, 1);
            }
        }
    }
    Ok(out)
}

fn io_error(path: &Utf8Path, e: std::io::Error) -> ApplyError {
    ApplyError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn read_optional(root: &Utf8Path, rel: &Utf8Path) -> Result<Option<String>, ApplyError> {
    match fs::read_to_string(root.join(rel)) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(rel, e)),
    }
}

/// Copy-on-read view of the working tree used for previews.
///
/// Reads fall through to disk the first time a path is touched; every write
/// stays in memory. Nothing here creates, modifies or deletes files.
#[derive(Debug)]
pub struct Overlay<'a> {
    root: &'a Utf8Path,
    original: BTreeMap<Utf8PathBuf, Option<String>>,
    current: BTreeMap<Utf8PathBuf, Option<String>>,
}

impl<'a> Overlay<'a> {
    pub fn new(root: &'a Utf8Path) -> Self {
        Self {
            root,
            original: BTreeMap::new(),
            current: BTreeMap::new(),
        }
    }

    fn load(&mut self, rel: &Utf8Path) -> Result<Option<String>, ApplyError> {
        if let Some(v) = self.current.get(rel) {
            return Ok(v.clone());
        }
        let on_disk = read_optional(self.root, rel)?;
        self.original.insert(rel.to_path_buf(), on_disk.clone());
        self.current.insert(rel.to_path_buf(), on_disk.clone());
        Ok(on_disk)
    }

    /// Simulates `fix` and returns the unified diff of just this fix.
    pub fn simulate(&mut self, fix: &Fix) -> Result<String, ApplyError> {
        for path in fix.touched_paths() {
            ensure_relative(&path)?;
            self.load(&path)?;
        }
        let before: BTreeMap<Utf8PathBuf, Option<String>> = fix
            .touched_paths()
            .into_iter()
            .map(|p| {
                let v = self.current.get(&p).cloned().flatten();
                (p, v)
            })
            .collect();

        let mut staged = self.current.clone();
        simulate_into(self.root, fix, &mut staged)?;
        self.current = staged;

        let after: BTreeMap<Utf8PathBuf, Option<String>> = before
            .keys()
            .map(|p| (p.clone(), self.current.get(p).cloned().flatten()))
            .collect();
        Ok(render_patch(&before, &after))
    }

    /// Unified diff of everything simulated so far.
    pub fn patch(&self) -> String {
        render_patch(&self.original, &self.current)
    }
}

fn simulate_into(
    root: &Utf8Path,
    fix: &Fix,
    state: &mut BTreeMap<Utf8PathBuf, Option<String>>,
) -> Result<(), ApplyError> {
    match fix {
        Fix::FileCreation { path, content } => {
            let existing = match state.get(path) {
                Some(v) => v.clone(),
                None => read_optional(root, path)?,
            };
            if existing.is_some() {
                return Err(ApplyError::AlreadyExists { path: path.clone() });
            }
            state.insert(path.clone(), Some(content.clone()));
        }
        Fix::FileModification { path, changes } => {
            let existing = match state.get(path) {
                Some(v) => v.clone(),
                None => read_optional(root, path)?,
            };
            let Some(existing) = existing else {
                return Err(ApplyError::Missing { path: path.clone() });
            };
            let updated = apply_text_changes(path, &existing, changes)?;
            state.insert(path.clone(), Some(updated));
        }
        // Commands cannot be simulated; their preview line stands in.
        Fix::Command { .. } => {}
        Fix::MultiStep { steps } => {
            for step in steps {
                simulate_into(root, step, state)?;
            }
        }
    }
    Ok(())
}

/// Applies `fix` to the working tree. Callers snapshot first; a failure
/// part-way through a multi-step fix leaves earlier steps on disk.
pub fn apply_fix(root: &Utf8Path, fix: &Fix, runner: &dyn CommandRunner) -> Result<(), ApplyError> {
    match fix {
        Fix::FileCreation { path, content } => {
            ensure_relative(path)?;
            let abs = root.join(path);
            if let Some(parent) = abs.parent() {
                fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
            }
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&abs)
            {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(ApplyError::AlreadyExists { path: path.clone() });
                }
                Err(e) => return Err(io_error(path, e)),
            };
            file.write_all(content.as_bytes())
                .map_err(|e| io_error(path, e))?;
        }
        Fix::FileModification { path, changes } => {
            ensure_relative(path)?;
            let existing = read_optional(root, path)?
                .ok_or_else(|| ApplyError::Missing { path: path.clone() })?;
            let updated = apply_text_changes(path, &existing, changes)?;
            fs::write(root.join(path), updated).map_err(|e| io_error(path, e))?;
        }
        Fix::Command {
            argv, working_dir, ..
        } => {
            if !working_dir.as_str().is_empty() {
                ensure_relative(working_dir)?;
            }
            runner
                .run(argv, &root.join(working_dir))
                .map_err(|e| ApplyError::Command {
                    command: argv.join(" "),
                    message: format!("{e:#}"),
                })?;
        }
        Fix::MultiStep { steps } => {
            for step in steps {
                apply_fix(root, step, runner)?;
            }
        }
    }
    Ok(())
}

/// Unified diff between two path → content maps (`None` = absent).
pub fn render_patch(
    before: &BTreeMap<Utf8PathBuf, Option<String>>,
    after: &BTreeMap<Utf8PathBuf, Option<String>>,
) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for (path, old) in before {
        let new = after.get(path).unwrap_or(old);
        if old == new {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
        match old {
            Some(_) => out.push_str(&format!("--- a/{0}\n", path)),
            None => out.push_str("--- /dev/null\n"),
        }
        match new {
            Some(_) => out.push_str(&format!("+++ b/{0}\n", path)),
            None => out.push_str("+++ /dev/null\n"),
        }

        let old_text = old.as_deref().unwrap_or("");
        let new_text = new.as_deref().unwrap_or("");
        let patch = diffy::create_patch(old_text, new_text);
        let body = formatter.fmt_patch(&patch).to_string();
        // diffy emits its own `--- original` / `+++ modified` header.
        for line in body.lines().skip_while(|l| !l.starts_with("@@")) {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}
