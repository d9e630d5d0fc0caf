use crate::assessor::{Assessor, Probe, list_dir, percent, read_text};
use agentready_types::{Attribute, Completion, Finding, Remediation, Repository, Tier};
use camino::Utf8Path;
use regex::Regex;
use std::io::ErrorKind;
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

const COMMIT_SAMPLE: usize = 20;
const CONVENTIONAL_PASS_RATIO: f64 = 0.8;

static CONVENTIONAL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert)(\([\w\-./ ]+\))?!?: \S",
    )
    .ok()
});

pub fn is_conventional_subject(subject: &str) -> bool {
    CONVENTIONAL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(subject.trim()))
}

pub struct PreCommitHooksAssessor {
    attribute: Attribute,
}

impl PreCommitHooksAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "pre_commit_hooks",
                "Pre-commit Hooks",
                "code_quality",
                Tier::Critical,
            )
            .describe(
                "Automated formatting and lint checks before each commit",
                ".pre-commit-config.yaml with at least one hook repository",
            ),
        }
    }

    fn remediation() -> Remediation {
        Remediation::new("Configure pre-commit hooks")
            .step("Add .pre-commit-config.yaml with formatter and linter hooks")
            .command("pre-commit install")
            .tool("pre-commit")
    }
}

impl Default for PreCommitHooksAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for PreCommitHooksAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let content = match read_text(&repo.root, ".pre-commit-config.yaml") {
            Probe::Found(c) => c,
            Probe::Missing => {
                return Finding::fail(&self.attribute, Self::remediation())
                    .measured("missing", "configured")
                    .evidence(".pre-commit-config.yaml not found");
            }
            Probe::Failed(e) => {
                return Finding::error(
                    &self.attribute,
                    format!("could not read .pre-commit-config.yaml: {e}"),
                );
            }
        };

        let doc: serde_yaml::Value = match serde_yaml::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                return Finding::partial(&self.attribute, Completion::saturating(0.25), Self::remediation())
                    .measured("invalid", "configured")
                    .evidence(format!(".pre-commit-config.yaml is not valid YAML: {e}"));
            }
        };
        let repos = doc
            .get("repos")
            .and_then(serde_yaml::Value::as_sequence)
            .map_or(0, Vec::len);

        if repos == 0 {
            return Finding::partial(&self.attribute, Completion::saturating(0.5), Self::remediation())
                .measured("0 hook repositories", ">=1 hook repository")
                .evidence(".pre-commit-config.yaml has no hook repositories");
        }
        Finding::pass(&self.attribute)
            .measured(format!("{repos} hook repositories"), ">=1 hook repository")
            .evidence(".pre-commit-config.yaml found")
    }
}

const CI_FILES: &[&str] = &[
    ".gitlab-ci.yml",
    ".circleci/config.yml",
    "azure-pipelines.yml",
    "Jenkinsfile",
];

pub struct CiConfigurationAssessor {
    attribute: Attribute,
}

impl CiConfigurationAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "ci_configuration",
                "Continuous Integration",
                "testing",
                Tier::Important,
            )
            .describe(
                "Changes are verified automatically on every push",
                "A CI pipeline definition (GitHub Actions, GitLab CI, CircleCI, ...)",
            ),
        }
    }

    fn workflows(root: &Utf8Path) -> anyhow::Result<Vec<String>> {
        let base = glob::Pattern::escape(root.as_str());
        let mut out = Vec::new();
        for ext in ["yml", "yaml"] {
            let pattern = format!("{base}/.github/workflows/*.{ext}");
            for entry in glob::glob(&pattern)? {
                let path = entry?;
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    out.push(format!(".github/workflows/{name}"));
                }
            }
        }
        out.sort();
        Ok(out)
    }
}

impl Default for CiConfigurationAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for CiConfigurationAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let mut found = match Self::workflows(&repo.root) {
            Ok(w) => w,
            Err(e) => {
                return Finding::error(&self.attribute, format!("could not list CI workflows: {e}"));
            }
        };
        for file in CI_FILES {
            match read_text(&repo.root, file) {
                Probe::Found(_) => found.push((*file).to_string()),
                Probe::Missing => {}
                Probe::Failed(e) => {
                    return Finding::error(&self.attribute, format!("could not read {file}: {e}"));
                }
            }
        }

        if found.is_empty() {
            return Finding::fail(
                &self.attribute,
                Remediation::new("Add a CI pipeline")
                    .step("Create .github/workflows/ci.yml running build and tests")
                    .tool("GitHub Actions"),
            )
            .measured("none", "at least one pipeline")
            .evidence("No CI configuration found");
        }

        let mut finding = Finding::pass(&self.attribute)
            .measured(format!("{} pipeline files", found.len()), "at least one pipeline");
        for f in found {
            finding = finding.evidence(format!("CI config: {f}"));
        }
        finding
    }
}

pub struct ConventionalCommitsAssessor {
    attribute: Attribute,
}

impl ConventionalCommitsAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "conventional_commits",
                "Conventional Commits",
                "git_and_version_control",
                Tier::Important,
            )
            .describe(
                "Structured commit messages agents can parse and produce",
                ">=80% of the last 20 commit subjects follow Conventional Commits",
            ),
        }
    }
}

impl Default for ConventionalCommitsAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for ConventionalCommitsAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn is_applicable(&self, repo: &Repository) -> bool {
        repo.is_git_repo()
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let output = Command::new("git")
            .arg("-C")
            .arg(repo.root.as_str())
            .args(["log", "-n", &COMMIT_SAMPLE.to_string(), "--format=%s"])
            .output();
        let output = match output {
            Ok(o) => o,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Finding::skipped(&self.attribute, "git executable not available");
            }
            Err(e) => {
                return Finding::error(&self.attribute, format!("could not run git log: {e}"));
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(root = %repo.root, stderr = %stderr.trim(), "git log failed");
            return Finding::not_applicable(&self.attribute, "no readable commit history");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let subjects: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
        if subjects.is_empty() {
            return Finding::not_applicable(&self.attribute, "no commits yet");
        }

        let conventional = subjects.iter().filter(|s| is_conventional_subject(s)).count();
        let ratio = Completion::ratio(conventional, subjects.len());
        let remediation = Remediation::new("Adopt Conventional Commits")
            .step("Prefix commit subjects with a type such as feat:, fix:, docs:")
            .tool("commitlint");

        let finding = if ratio.value() >= CONVENTIONAL_PASS_RATIO {
            Finding::pass(&self.attribute)
        } else if conventional == 0 {
            Finding::fail(&self.attribute, remediation)
        } else {
            Finding::partial(&self.attribute, ratio, remediation)
        };
        finding.measured(percent(ratio.value()), ">=80%").evidence(format!(
            "{conventional}/{} recent commits follow the convention",
            subjects.len()
        ))
    }
}

pub struct IssueTemplatesAssessor {
    attribute: Attribute,
}

impl IssueTemplatesAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "issue_templates",
                "Issue & PR Templates",
                "repository_structure",
                Tier::Advanced,
            )
            .describe(
                "Structured issue and pull request descriptions",
                ".github/ISSUE_TEMPLATE/ with a template and a pull request template",
            ),
        }
    }
}

impl Default for IssueTemplatesAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for IssueTemplatesAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let issue_templates = match list_dir(&repo.root, ".github/ISSUE_TEMPLATE") {
            Probe::Found(entries) => entries.iter().filter(|e| !e.is_dir).count(),
            Probe::Missing => 0,
            Probe::Failed(e) => {
                return Finding::error(&self.attribute, format!("could not list issue templates: {e}"));
            }
        };
        let pr_template = match read_text(&repo.root, ".github/pull_request_template.md") {
            Probe::Found(_) => true,
            Probe::Missing => false,
            Probe::Failed(e) => {
                return Finding::error(
                    &self.attribute,
                    format!("could not read pull request template: {e}"),
                );
            }
        };

        let mut remediation = Remediation::new("Add issue and pull request templates");
        if issue_templates == 0 {
            remediation = remediation.step("Add bug report and feature request templates under .github/ISSUE_TEMPLATE/");
        }
        if !pr_template {
            remediation = remediation.step("Add .github/pull_request_template.md");
        }

        let present = usize::from(issue_templates > 0) + usize::from(pr_template);
        let finding = match present {
            2 => Finding::pass(&self.attribute),
            1 => Finding::partial(&self.attribute, Completion::ratio(1, 2), remediation),
            _ => Finding::fail(&self.attribute, remediation),
        };
        finding
            .measured(format!("{issue_templates} issue templates"), ">=1 issue template")
            .evidence(format!("issue templates: {issue_templates}"))
            .evidence(format!(
                "pull request template: {}",
                if pr_template { "present" } else { "missing" }
            ))
    }
}

const CONTAINER_FILES: &[&str] = &[
    "Dockerfile",
    "Containerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

pub struct ContainerSetupAssessor {
    attribute: Attribute,
}

impl ContainerSetupAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "container_setup",
                "Container Setup",
                "build_and_development",
                Tier::Advanced,
            )
            .describe(
                "Reproducible development environment",
                "A Dockerfile, Containerfile, compose file or devcontainer definition",
            ),
        }
    }
}

impl Default for ContainerSetupAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for ContainerSetupAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn is_applicable(&self, repo: &Repository) -> bool {
        !repo.languages.is_empty()
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let root_files = match list_dir(&repo.root, "") {
            Probe::Found(entries) => entries,
            Probe::Missing => {
                return Finding::error(&self.attribute, format!("repository root {} vanished", repo.root));
            }
            Probe::Failed(e) => {
                return Finding::error(&self.attribute, format!("could not list repository root: {e}"));
            }
        };
        let mut found: Vec<String> = root_files
            .iter()
            .filter(|e| !e.is_dir && CONTAINER_FILES.contains(&e.name.as_str()))
            .map(|e| e.name.clone())
            .collect();
        match read_text(&repo.root, ".devcontainer/devcontainer.json") {
            Probe::Found(_) => found.push(".devcontainer/devcontainer.json".to_string()),
            Probe::Missing => {}
            Probe::Failed(e) => {
                return Finding::error(&self.attribute, format!("could not read devcontainer: {e}"));
            }
        }

        if found.is_empty() {
            return Finding::fail(
                &self.attribute,
                Remediation::new("Provide a container definition")
                    .step("Add a Dockerfile or .devcontainer/devcontainer.json")
                    .tool("docker"),
            )
            .measured("none", "container definition")
            .evidence("No container definition found");
        }
        Finding::pass(&self.attribute)
            .measured(found.join(", "), "container definition")
            .evidence(format!("container files: {}", found.join(", ")))
    }
}
