use crate::attribute::Tier;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One ordered edit inside a [`Fix::FileModification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextChange {
    /// Append lines at the end of the file. With `skip_existing`, lines
    /// already present (trimmed comparison) are not appended again.
    AppendLines {
        lines: Vec<String>,
        #[serde(default)]
        skip_existing: bool,
    },
    /// Replace the first occurrence of `find`; a missing needle is an error.
    ReplaceText { find: String, replace: String },
}

/// Concrete, typed change remediating a failing finding.
///
/// Paths are relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fix {
    FileCreation {
        path: Utf8PathBuf,
        content: String,
    },
    FileModification {
        path: Utf8PathBuf,
        changes: Vec<TextChange>,
    },
    Command {
        argv: Vec<String>,
        #[serde(default)]
        working_dir: Utf8PathBuf,
        /// Files the command is expected to write; snapshotted for rollback.
        #[serde(default)]
        outputs: Vec<Utf8PathBuf>,
    },
    MultiStep {
        steps: Vec<Fix>,
    },
}

impl Fix {
    /// Every path this fix may write, used to take the pre-apply snapshot.
    pub fn touched_paths(&self) -> BTreeSet<Utf8PathBuf> {
        let mut out = BTreeSet::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths(&self, out: &mut BTreeSet<Utf8PathBuf>) {
        match self {
            Fix::FileCreation { path, .. } | Fix::FileModification { path, .. } => {
                out.insert(path.clone());
            }
            Fix::Command {
                working_dir,
                outputs,
                ..
            } => {
                for o in outputs {
                    out.insert(working_dir.join(o));
                }
            }
            Fix::MultiStep { steps } => {
                for s in steps {
                    s.collect_paths(out);
                }
            }
        }
    }

    pub fn has_commands(&self) -> bool {
        match self {
            Fix::Command { .. } => true,
            Fix::MultiStep { steps } => steps.iter().any(Fix::has_commands),
            _ => false,
        }
    }

    /// Human-readable one-screen description.
    pub fn preview(&self) -> String {
        match self {
            Fix::FileCreation { path, content } => {
                format!("CREATE {} ({:.1} KB)", path, content.len() as f64 / 1024.0)
            }
            Fix::FileModification { path, changes } => {
                let added: usize = changes
                    .iter()
                    .map(|c| match c {
                        TextChange::AppendLines { lines, .. } => lines.len(),
                        TextChange::ReplaceText { .. } => 1,
                    })
                    .sum();
                format!("MODIFY {} (+{} changes)", path, added)
            }
            Fix::Command {
                argv, working_dir, ..
            } => {
                if working_dir.as_str().is_empty() || working_dir.as_str() == "." {
                    format!("RUN {}", argv.join(" "))
                } else {
                    format!("RUN {} (in {})", argv.join(" "), working_dir)
                }
            }
            Fix::MultiStep { steps } => {
                let mut out = format!("MULTI-STEP FIX ({} steps):", steps.len());
                for (i, s) in steps.iter().enumerate() {
                    out.push_str(&format!("\n  {}. {}", i + 1, s.preview()));
                }
                out
            }
        }
    }
}

/// How a fix generator produces its fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Template,
    Command,
    /// Only participates after explicit opt-in.
    AiAssisted,
}

/// A fix bound to the finding it remediates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFix {
    pub id: String,
    pub attribute_id: String,
    pub attribute_name: String,
    pub tier: Tier,
    pub generator: String,
    pub generator_kind: GeneratorKind,
    pub description: String,

    /// Weighted points the attribute would gain by moving to `pass`.
    pub points_gained: f64,

    pub fix: Fix,
}
