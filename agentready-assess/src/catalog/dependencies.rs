use crate::assessor::{Assessor, Probe, fraction, list_dir};
use agentready_types::{Attribute, Completion, Finding, Remediation, Repository, Tier};
use std::collections::BTreeSet;

/// A manifest and the lock files that pin it, plus the command that
/// produces a lock file.
#[derive(Debug, Clone, Copy)]
pub struct LockfileRule {
    pub manifest: &'static str,
    pub lockfiles: &'static [&'static str],
    pub lock_command: &'static [&'static str],
}

pub const LOCKFILE_RULES: &[LockfileRule] = &[
    LockfileRule {
        manifest: "Cargo.toml",
        lockfiles: &["Cargo.lock"],
        lock_command: &["cargo", "generate-lockfile"],
    },
    LockfileRule {
        manifest: "package.json",
        lockfiles: &["package-lock.json", "yarn.lock", "pnpm-lock.yaml", "bun.lockb"],
        lock_command: &["npm", "install", "--package-lock-only"],
    },
    LockfileRule {
        manifest: "pyproject.toml",
        lockfiles: &["uv.lock", "poetry.lock", "pdm.lock"],
        lock_command: &["uv", "lock"],
    },
    LockfileRule {
        manifest: "go.mod",
        lockfiles: &["go.sum"],
        lock_command: &["go", "mod", "tidy"],
    },
    LockfileRule {
        manifest: "Gemfile",
        lockfiles: &["Gemfile.lock"],
        lock_command: &["bundle", "lock"],
    },
];

/// Rules whose manifest is present at the root but whose lock file is not.
pub fn unpinned_manifests(root_files: &BTreeSet<String>) -> Vec<&'static LockfileRule> {
    LOCKFILE_RULES
        .iter()
        .filter(|r| root_files.contains(r.manifest))
        .filter(|r| !r.lockfiles.iter().any(|l| root_files.contains(*l)))
        .collect()
}

pub struct DependencyPinningAssessor {
    attribute: Attribute,
}

impl DependencyPinningAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "dependency_pinning",
                "Dependency Lock Files",
                "dependency_management",
                Tier::Essential,
            )
            .describe(
                "Reproducible dependency resolution through committed lock files",
                "Every detected dependency manifest has a matching lock file",
            ),
        }
    }
}

impl Default for DependencyPinningAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for DependencyPinningAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let entries = match list_dir(&repo.root, "") {
            Probe::Found(entries) => entries,
            Probe::Missing => {
                return Finding::error(&self.attribute, format!("repository root {} vanished", repo.root));
            }
            Probe::Failed(e) => {
                return Finding::error(&self.attribute, format!("could not list repository root: {e}"));
            }
        };
        let files: BTreeSet<String> = entries
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name)
            .collect();

        let manifests: Vec<&LockfileRule> = LOCKFILE_RULES
            .iter()
            .filter(|r| files.contains(r.manifest))
            .collect();
        if manifests.is_empty() {
            return Finding::not_applicable(&self.attribute, "no dependency manifest found");
        }

        let unpinned = unpinned_manifests(&files);
        let total = manifests.len();
        let pinned = total - unpinned.len();

        let finding = if unpinned.is_empty() {
            Finding::pass(&self.attribute)
        } else {
            let mut remediation = Remediation::new("Generate and commit lock files");
            for rule in &unpinned {
                remediation = remediation
                    .step(format!("Create {} for {}", rule.lockfiles[0], rule.manifest))
                    .command(rule.lock_command.join(" "));
            }
            if pinned == 0 {
                Finding::fail(&self.attribute, remediation)
            } else {
                Finding::partial(&self.attribute, Completion::ratio(pinned, total), remediation)
            }
        };

        let mut finding = finding.measured(
            format!("{} manifests pinned", fraction(pinned, total)),
            "all manifests pinned",
        );
        for rule in manifests {
            let lock = rule.lockfiles.iter().find(|l| files.contains(**l));
            finding = finding.evidence(match lock {
                Some(l) => format!("{} pinned by {}", rule.manifest, l),
                None => format!("{} has no lock file", rule.manifest),
            });
        }
        finding
    }
}
