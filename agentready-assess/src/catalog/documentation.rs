use crate::assessor::{Assessor, Probe, first_dir, fraction, read_text};
use agentready_types::{Attribute, Completion, Finding, Remediation, Repository, Tier};

pub const CLAUDE_MD_MIN_BYTES: usize = 50;

/// README section name and the keywords that count as that section.
pub const README_SECTIONS: &[(&str, &[&str])] = &[
    ("installation", &["install", "setup", "getting started"]),
    ("usage", &["usage", "quickstart", "example"]),
    ("development", &["development", "contributing", "build"]),
];

pub const ADR_DIRS: &[&str] = &["docs/adr", ".adr", "adr", "docs/decisions"];
pub const ADR_SECTIONS: &[&str] = &["status", "context", "decision", "consequences"];

const ADR_PASS_SCORE: f64 = 75.0;

pub struct ClaudeMdAssessor {
    attribute: Attribute,
}

impl ClaudeMdAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "claude_md_file",
                "CLAUDE.md File",
                "context_window_optimization",
                Tier::Essential,
            )
            .describe(
                "Project context file for AI coding agents at the repository root",
                "CLAUDE.md present with at least 50 bytes of content",
            ),
        }
    }

    fn remediation() -> Remediation {
        Remediation::new("Create a CLAUDE.md describing the project for coding agents")
            .step("Add CLAUDE.md at the repository root")
            .step("Describe the tech stack, layout, build and test commands")
            .step("Document conventions agents must follow")
    }
}

impl Default for ClaudeMdAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for ClaudeMdAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        match read_text(&repo.root, "CLAUDE.md") {
            Probe::Found(content) if content.len() < CLAUDE_MD_MIN_BYTES => Finding::partial(
                &self.attribute,
                Completion::saturating(0.25),
                Self::remediation(),
            )
            .measured(format!("{} bytes", content.len()), ">50 bytes")
            .evidence(format!("CLAUDE.md exists but is minimal ({} bytes)", content.len())),
            Probe::Found(_) => Finding::pass(&self.attribute)
                .measured("present", "present")
                .evidence("CLAUDE.md found at repository root"),
            Probe::Missing => Finding::fail(&self.attribute, Self::remediation())
                .measured("missing", "present")
                .evidence("CLAUDE.md not found in repository root"),
            Probe::Failed(e) => Finding::error(&self.attribute, format!("could not read CLAUDE.md: {e}")),
        }
    }
}

pub struct ReadmeAssessor {
    attribute: Attribute,
}

impl ReadmeAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "readme_structure",
                "README Structure",
                "documentation",
                Tier::Essential,
            )
            .describe(
                "Well-structured README with key sections",
                "README.md with installation, usage, and development sections",
            ),
        }
    }

    fn remediation(missing: &[&str]) -> Remediation {
        let mut r = Remediation::new("Create or enhance README.md with essential sections");
        for section in missing {
            r = r.step(format!("Add a {section} section"));
        }
        r
    }
}

impl Default for ReadmeAssessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Section names from [`README_SECTIONS`] that `content` lacks.
pub fn missing_readme_sections(content: &str) -> Vec<&'static str> {
    let lower = content.to_lowercase();
    README_SECTIONS
        .iter()
        .filter(|(_, keywords)| !keywords.iter().any(|k| lower.contains(k)))
        .map(|(name, _)| *name)
        .collect()
}

impl Assessor for ReadmeAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let content = match read_text(&repo.root, "README.md") {
            Probe::Found(c) => c,
            Probe::Missing => {
                let all: Vec<&str> = README_SECTIONS.iter().map(|(n, _)| *n).collect();
                return Finding::fail(&self.attribute, Self::remediation(&all))
                    .measured("missing", "present with sections")
                    .evidence("README.md not found in repository root");
            }
            Probe::Failed(e) => {
                return Finding::error(&self.attribute, format!("could not read README.md: {e}"));
            }
        };

        let missing = missing_readme_sections(&content);
        let total = README_SECTIONS.len();
        let found = total - missing.len();
        let measured = format!("{} sections", fraction(found, total));
        let threshold = format!("{} sections", fraction(total, total));

        let finding = if missing.is_empty() {
            Finding::pass(&self.attribute)
        } else if found == 0 {
            Finding::fail(&self.attribute, Self::remediation(&missing))
        } else {
            Finding::partial(
                &self.attribute,
                Completion::ratio(found, total),
                Self::remediation(&missing),
            )
        };
        let mut finding = finding
            .measured(measured, threshold)
            .evidence(format!("Found {found}/{total} essential sections"));
        for (name, _) in README_SECTIONS {
            let mark = if missing.contains(name) { "missing" } else { "present" };
            finding = finding.evidence(format!("{name}: {mark}"));
        }
        finding
    }
}

pub struct ArchitectureDecisionsAssessor {
    attribute: Attribute,
}

impl ArchitectureDecisionsAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "architecture_decisions",
                "Architecture Decision Records",
                "documentation",
                Tier::Important,
            )
            .describe(
                "Lightweight records of significant architectural decisions",
                "ADR directory with decisions following the status/context/decision/consequences template",
            ),
        }
    }

    fn remediation() -> Remediation {
        Remediation::new("Record architecture decisions as ADRs")
            .step("Create docs/adr/")
            .step("Add numbered decision records such as 0001-record-architecture-decisions.md")
            .step("Include Status, Context, Decision, and Consequences sections")
            .tool("adr-tools")
    }
}

impl Default for ArchitectureDecisionsAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for ArchitectureDecisionsAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let (dir, entries) = match first_dir(&repo.root, ADR_DIRS) {
            Probe::Found(found) => found,
            Probe::Missing => {
                return Finding::fail(&self.attribute, Self::remediation())
                    .measured("no ADR directory", "ADR directory with decisions")
                    .evidence(format!(
                        "No ADR directory found (checked {})",
                        ADR_DIRS.join(", ")
                    ));
            }
            Probe::Failed(e) => {
                return Finding::error(&self.attribute, format!("could not read ADR directory: {e}"));
            }
        };

        let adrs: Vec<&str> = entries
            .iter()
            .filter(|e| !e.is_dir && e.name.ends_with(".md"))
            .map(|e| e.name.as_str())
            .collect();

        if adrs.is_empty() {
            return Finding::partial(&self.attribute, Completion::saturating(0.4), Self::remediation())
                .measured("0 ADRs", ">=2 ADRs with template")
                .evidence(format!("ADR directory found: {dir}"))
                .evidence("No ADR files (.md) found in directory");
        }

        let count_score = (adrs.len() as f64 * 8.0).min(40.0);

        let mut sampled = 0usize;
        let mut compliance = 0.0;
        for name in adrs.iter().take(3) {
            match read_text(&repo.root, &format!("{dir}/{name}")) {
                Probe::Found(content) => {
                    let lower = content.to_lowercase();
                    let hits = ADR_SECTIONS.iter().filter(|s| lower.contains(*s)).count();
                    compliance += hits as f64 / ADR_SECTIONS.len() as f64;
                    sampled += 1;
                }
                Probe::Missing => continue,
                Probe::Failed(e) => {
                    return Finding::error(&self.attribute, format!("could not read {dir}/{name}: {e}"));
                }
            }
        }
        let template_score = if sampled == 0 {
            0.0
        } else {
            20.0 * compliance / sampled as f64
        };

        let total = 40.0 + count_score + template_score;
        let finding = if total >= ADR_PASS_SCORE {
            Finding::pass(&self.attribute)
        } else {
            Finding::partial(
                &self.attribute,
                Completion::saturating(total / 100.0),
                Self::remediation(),
            )
        };
        finding
            .measured(format!("{} ADRs", adrs.len()), ">=2 ADRs with template")
            .evidence(format!("ADR directory found: {dir}"))
            .evidence(format!("{} architecture decision records", adrs.len()))
            .evidence(format!(
                "Sampled {sampled} ADRs: template compliance {template_score:.0}/20"
            ))
    }
}
