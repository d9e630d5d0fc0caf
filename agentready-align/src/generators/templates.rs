//! File-template generators. Every fix here is a pure function of the
//! repository descriptor and the files it reads.

use crate::generator::FixGenerator;
use agentready_assess::assessor::{Probe, first_dir, list_dir, read_text};
use agentready_assess::catalog::{
    ADR_DIRS, SOURCE_DIRS, TEST_DIRS, gitignore_covers, missing_readme_sections,
    recommended_gitignore_patterns,
};
use agentready_types::fix::{Fix, GeneratorKind, TextChange};
use agentready_types::{Finding, Repository};
use anyhow::bail;
use camino::Utf8PathBuf;

pub const GITIGNORE_HEADER: &str = "# AgentReady recommended patterns";

/// Build and test commands for a detected language.
fn language_commands(language: &str) -> Option<(&'static str, &'static str)> {
    Some(match language {
        "Rust" => ("cargo build", "cargo test"),
        "Python" => ("uv sync", "pytest"),
        "JavaScript" | "TypeScript" => ("npm install", "npm test"),
        "Go" => ("go build ./...", "go test ./..."),
        "Java" => ("mvn package", "mvn test"),
        "Ruby" => ("bundle install", "bundle exec rake test"),
        _ => return None,
    })
}

fn commands_for(repo: &Repository) -> Vec<(&'static str, &'static str)> {
    let mut out = Vec::new();
    for lang in repo.languages.keys() {
        if let Some(cmds) = language_commands(lang)
            && !out.contains(&cmds)
        {
            out.push(cmds);
        }
    }
    out
}

fn accepts(finding: &Finding, attribute_id: &str) -> bool {
    finding.attribute_id() == attribute_id && finding.status.needs_remediation()
}

fn read_existing(repo: &Repository, rel: &str) -> anyhow::Result<Option<String>> {
    match read_text(&repo.root, rel) {
        Probe::Found(s) => Ok(Some(s)),
        Probe::Missing => Ok(None),
        Probe::Failed(e) => bail!("could not read {rel}: {e}"),
    }
}

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeMdGenerator;

impl ClaudeMdGenerator {
    fn render(repo: &Repository) -> String {
        let mut out = format!("# {}\n\n", repo.name);
        out.push_str("Context for AI coding agents working in this repository.\n\n");

        out.push_str("## Tech stack\n\n");
        if repo.languages.is_empty() {
            out.push_str("- No source languages detected yet\n");
        }
        for (lang, files) in &repo.languages {
            out.push_str(&format!("- {lang} ({files} files)\n"));
        }

        let commands = commands_for(repo);
        out.push_str("\n## Commands\n\n");
        if commands.is_empty() {
            out.push_str("- Document how to build and test the project here\n");
        }
        for (build, test) in commands {
            out.push_str(&format!("- Build: `{build}`\n- Test: `{test}`\n"));
        }

        out.push_str("\n## Conventions\n\n");
        out.push_str("- Keep changes small and covered by tests\n");
        out.push_str("- Run the test suite before committing\n");
        out
    }
}

impl FixGenerator for ClaudeMdGenerator {
    fn id(&self) -> &str {
        "claude_md_template"
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Template
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        accepts(finding, "claude_md_file")
    }

    fn generate_fix(&self, repo: &Repository, _finding: &Finding) -> anyhow::Result<Fix> {
        let content = Self::render(repo);
        Ok(match read_existing(repo, "CLAUDE.md")? {
            None => Fix::FileCreation {
                path: "CLAUDE.md".into(),
                content,
            },
            Some(_) => Fix::FileModification {
                path: "CLAUDE.md".into(),
                changes: vec![TextChange::AppendLines {
                    lines: lines(&content),
                    skip_existing: false,
                }],
            },
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadmeGenerator;

impl ReadmeGenerator {
    fn section(repo: &Repository, name: &str) -> String {
        let commands = commands_for(repo);
        let (build, test) = commands.first().copied().unwrap_or(("make", "make test"));
        match name {
            "installation" => format!("## Installation\n\n```sh\n{build}\n```\n"),
            "usage" => format!(
                "## Usage\n\nDescribe how to run {} and show a minimal example.\n",
                repo.name
            ),
            _ => format!("## Development\n\nRun the tests with:\n\n```sh\n{test}\n```\n"),
        }
    }
}

impl FixGenerator for ReadmeGenerator {
    fn id(&self) -> &str {
        "readme_template"
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Template
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        accepts(finding, "readme_structure")
    }

    fn generate_fix(&self, repo: &Repository, _finding: &Finding) -> anyhow::Result<Fix> {
        match read_existing(repo, "README.md")? {
            None => {
                let mut content = format!("# {}\n", repo.name);
                for name in ["installation", "usage", "development"] {
                    content.push('\n');
                    content.push_str(&Self::section(repo, name));
                }
                Ok(Fix::FileCreation {
                    path: "README.md".into(),
                    content,
                })
            }
            Some(existing) => {
                let missing = missing_readme_sections(&existing);
                if missing.is_empty() {
                    bail!("README.md already has every essential section");
                }
                let mut appended = Vec::new();
                for name in missing {
                    appended.push(String::new());
                    appended.extend(lines(&Self::section(repo, name)));
                }
                Ok(Fix::FileModification {
                    path: "README.md".into(),
                    changes: vec![TextChange::AppendLines {
                        lines: appended,
                        skip_existing: false,
                    }],
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitignoreGenerator;

impl FixGenerator for GitignoreGenerator {
    fn id(&self) -> &str {
        "gitignore_template"
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Template
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        accepts(finding, "gitignore_completeness")
    }

    fn generate_fix(&self, repo: &Repository, _finding: &Finding) -> anyhow::Result<Fix> {
        let recommended = recommended_gitignore_patterns(repo);
        match read_existing(repo, ".gitignore")? {
            None => {
                let mut content = format!("{GITIGNORE_HEADER}\n");
                for p in recommended {
                    content.push_str(p);
                    content.push('\n');
                }
                Ok(Fix::FileCreation {
                    path: ".gitignore".into(),
                    content,
                })
            }
            Some(existing) => {
                let missing: Vec<String> = recommended
                    .into_iter()
                    .filter(|p| !gitignore_covers(&existing, p))
                    .map(str::to_string)
                    .collect();
                if missing.is_empty() {
                    bail!(".gitignore already covers every recommended pattern");
                }
                let mut appended = vec![String::new(), GITIGNORE_HEADER.to_string()];
                appended.extend(missing);
                Ok(Fix::FileModification {
                    path: ".gitignore".into(),
                    changes: vec![TextChange::AppendLines {
                        lines: appended,
                        skip_existing: true,
                    }],
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PreCommitGenerator;

impl PreCommitGenerator {
    fn render(repo: &Repository) -> String {
        let mut out = String::from(
            "repos:\n  - repo: https://github.com/pre-commit/pre-commit-hooks\n    rev: v4.6.0\n    hooks:\n      - id: trailing-whitespace\n      - id: end-of-file-fixer\n      - id: check-yaml\n",
        );
        if repo.has_language("Python") {
            out.push_str(
                "  - repo: https://github.com/astral-sh/ruff-pre-commit\n    rev: v0.6.9\n    hooks:\n      - id: ruff\n      - id: ruff-format\n",
            );
        }
        if repo.has_language("Rust") {
            out.push_str(
                "  - repo: local\n    hooks:\n      - id: cargo-fmt\n        name: cargo fmt\n        entry: cargo fmt --all --\n        language: system\n        types: [rust]\n",
            );
        }
        out
    }
}

impl FixGenerator for PreCommitGenerator {
    fn id(&self) -> &str {
        "pre_commit_template"
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Template
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        accepts(finding, "pre_commit_hooks")
    }

    fn generate_fix(&self, repo: &Repository, _finding: &Finding) -> anyhow::Result<Fix> {
        if read_existing(repo, ".pre-commit-config.yaml")?.is_some() {
            bail!(".pre-commit-config.yaml exists; refusing to rewrite a hand-edited config");
        }
        Ok(Fix::FileCreation {
            path: ".pre-commit-config.yaml".into(),
            content: Self::render(repo),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLayoutGenerator;

impl FixGenerator for StandardLayoutGenerator {
    fn id(&self) -> &str {
        "standard_layout_scaffold"
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Template
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        accepts(finding, "standard_layout")
    }

    fn generate_fix(&self, repo: &Repository, _finding: &Finding) -> anyhow::Result<Fix> {
        let entries = match list_dir(&repo.root, "") {
            Probe::Found(entries) => entries,
            Probe::Missing => bail!("repository root {} is missing", repo.root),
            Probe::Failed(e) => bail!("could not list repository root: {e}"),
        };
        let has_dir = |candidates: &[&str]| {
            entries
                .iter()
                .any(|e| e.is_dir && candidates.contains(&e.name.as_str()))
        };

        let mut steps = Vec::new();
        for (candidates, dir) in [(SOURCE_DIRS, "src"), (TEST_DIRS, "tests")] {
            if !has_dir(candidates) {
                steps.push(Fix::FileCreation {
                    path: Utf8PathBuf::from(dir).join(".gitkeep"),
                    content: String::new(),
                });
            }
        }
        match steps.len() {
            0 => bail!("source and test directories already exist"),
            1 => Ok(steps.remove(0)),
            _ => Ok(Fix::MultiStep { steps }),
        }
    }
}

const ADR_TEMPLATES: &[(&str, &str, &str, &str)] = &[
    (
        "record-architecture-decisions",
        "Record architecture decisions",
        "We need to record the architectural decisions made on this project.",
        "We will use Architecture Decision Records, as described by Michael Nygard.",
    ),
    (
        "adopt-agent-readiness-practices",
        "Adopt agent readiness practices",
        "AI coding agents work best with explicit context, pinned dependencies and fast feedback.",
        "We will keep CLAUDE.md, lock files and the test suite current as part of every change.",
    ),
];

/// Minimum number of ADRs the generator tops a directory up to.
const ADR_TARGET: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct AdrGenerator;

impl AdrGenerator {
    fn render(number: usize, title: &str, context: &str, decision: &str) -> String {
        format!(
            "# {number}. {title}\n\n## Status\n\nAccepted\n\n## Context\n\n{context}\n\n## Decision\n\n{decision}\n\n## Consequences\n\nFuture decisions are recorded alongside the code they affect.\n"
        )
    }
}

/// Leading decimal number of an ADR file name (`0003-split.md` -> 3).
fn adr_number(name: &str) -> Option<usize> {
    let digits: String = name.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

impl FixGenerator for AdrGenerator {
    fn id(&self) -> &str {
        "adr_template"
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Template
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        accepts(finding, "architecture_decisions")
    }

    fn generate_fix(&self, repo: &Repository, _finding: &Finding) -> anyhow::Result<Fix> {
        let (dir, existing) = match first_dir(&repo.root, ADR_DIRS) {
            Probe::Found((dir, entries)) => {
                let names: Vec<String> = entries
                    .into_iter()
                    .filter(|e| !e.is_dir && e.name.ends_with(".md"))
                    .map(|e| e.name)
                    .collect();
                (dir, names)
            }
            Probe::Missing => ("docs/adr".to_string(), Vec::new()),
            Probe::Failed(e) => bail!("could not read ADR directory: {e}"),
        };

        let wanted = ADR_TARGET.saturating_sub(existing.len()).max(1);
        let last = existing
            .iter()
            .filter_map(|n| adr_number(n))
            .max()
            .unwrap_or(existing.len());
        let mut steps = Vec::new();
        for (slug, title, context, decision) in ADR_TEMPLATES {
            if steps.len() == wanted {
                break;
            }
            if existing.iter().any(|n| n.contains(slug)) {
                continue;
            }
            let number = last + steps.len() + 1;
            steps.push(Fix::FileCreation {
                path: Utf8PathBuf::from(&dir).join(format!("{number:04}-{slug}.md")),
                content: Self::render(number, title, context, decision),
            });
        }
        match steps.len() {
            0 => bail!("every ADR template already exists in {dir}"),
            1 => Ok(steps.remove(0)),
            _ => Ok(Fix::MultiStep { steps }),
        }
    }
}
