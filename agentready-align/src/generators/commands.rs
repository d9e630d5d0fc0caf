use crate::generator::FixGenerator;
use agentready_assess::assessor::{Probe, list_dir};
use agentready_assess::catalog::unpinned_manifests;
use agentready_types::fix::{Fix, GeneratorKind};
use agentready_types::{Finding, Repository};
use anyhow::bail;
use camino::Utf8PathBuf;
use std::collections::BTreeSet;

/// Runs each ecosystem's lock command for manifests without a lock file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockFileGenerator;

impl FixGenerator for LockFileGenerator {
    fn id(&self) -> &str {
        "lock_files"
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Command
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        finding.attribute_id() == "dependency_pinning" && finding.status.needs_remediation()
    }

    fn generate_fix(&self, repo: &Repository, _finding: &Finding) -> anyhow::Result<Fix> {
        let root_files: BTreeSet<String> = match list_dir(&repo.root, "") {
            Probe::Found(entries) => entries
                .into_iter()
                .filter(|e| !e.is_dir)
                .map(|e| e.name)
                .collect(),
            Probe::Missing => bail!("repository root {} is missing", repo.root),
            Probe::Failed(e) => bail!("could not list repository root: {e}"),
        };

        let mut steps: Vec<Fix> = unpinned_manifests(&root_files)
            .into_iter()
            .map(|rule| Fix::Command {
                argv: rule.lock_command.iter().map(|s| s.to_string()).collect(),
                working_dir: Utf8PathBuf::new(),
                // Lock tools may rewrite the manifest too.
                outputs: std::iter::once(rule.manifest)
                    .chain(rule.lockfiles.iter().copied())
                    .map(Utf8PathBuf::from)
                    .collect(),
            })
            .collect();

        match steps.len() {
            0 => bail!("every manifest already has a lock file"),
            1 => Ok(steps.remove(0)),
            _ => Ok(Fix::MultiStep { steps }),
        }
    }
}
