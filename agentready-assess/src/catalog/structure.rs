use crate::assessor::{Assessor, Probe, fraction, list_dir, percent, read_text};
use crate::discovery::{MAX_SCANNED_FILES, SKIP_DIRS};
use agentready_types::{Attribute, Completion, Finding, Remediation, Repository, Tier};
use camino::Utf8Path;

pub const SOURCE_DIRS: &[&str] = &["src", "lib", "app", "pkg", "cmd"];
pub const TEST_DIRS: &[&str] = &["tests", "test", "spec", "__tests__"];

const GITIGNORE_PASS_RATIO: f64 = 0.9;

pub struct StandardLayoutAssessor {
    attribute: Attribute,
}

impl StandardLayoutAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "standard_layout",
                "Standard Project Layout",
                "repository_structure",
                Tier::Essential,
            )
            .describe(
                "Conventional source and test directories agents can navigate",
                "A source directory (src/, lib/, ...) and a test directory (tests/, test/, ...)",
            ),
        }
    }
}

impl Default for StandardLayoutAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for StandardLayoutAssessor {
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
        let dir_named = |candidates: &[&str]| {
            entries
                .iter()
                .find(|e| e.is_dir && candidates.contains(&e.name.as_str()))
                .map(|e| e.name.clone())
        };
        let source = dir_named(SOURCE_DIRS);
        let tests = dir_named(TEST_DIRS);

        let found = usize::from(source.is_some()) + usize::from(tests.is_some());
        let mut remediation = Remediation::new("Adopt a conventional project layout");
        if source.is_none() {
            remediation = remediation.step("Move source code under src/");
        }
        if tests.is_none() {
            remediation = remediation.step("Put tests under tests/");
        }

        let finding = match found {
            2 => Finding::pass(&self.attribute),
            1 => Finding::partial(&self.attribute, Completion::ratio(1, 2), remediation),
            _ => Finding::fail(&self.attribute, remediation),
        };
        finding
            .measured(format!("{} directories", fraction(found, 2)), "2/2 directories")
            .evidence(match source {
                Some(d) => format!("source directory: {d}/"),
                None => "no source directory".to_string(),
            })
            .evidence(match tests {
                Some(d) => format!("test directory: {d}/"),
                None => "no test directory".to_string(),
            })
    }
}

/// True for paths that look like automated tests in any common ecosystem.
pub(crate) fn is_test_file(path: &Utf8Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let in_test_dir = path
        .components()
        .any(|c| TEST_DIRS.contains(&c.as_str()));
    let is_source = crate::discovery::language_for(path).is_some();

    let by_name = name.starts_with("test_")
        || name.contains("_test.")
        || name.contains(".test.")
        || name.contains(".spec.")
        || name.ends_with("Test.java");

    is_source && (by_name || in_test_dir)
}

pub struct TestSuiteAssessor {
    attribute: Attribute,
}

impl TestSuiteAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "test_suite",
                "Automated Test Suite",
                "testing",
                Tier::Critical,
            )
            .describe(
                "Automated tests agents can run to verify their changes",
                "At least one recognizable test file",
            ),
        }
    }
}

impl Default for TestSuiteAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for TestSuiteAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn is_applicable(&self, repo: &Repository) -> bool {
        !repo.languages.is_empty()
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let files = match agentready_hash::walk_files(&repo.root, SKIP_DIRS, MAX_SCANNED_FILES) {
            Ok(files) => files,
            Err(e) => {
                return Finding::error(&self.attribute, format!("could not walk repository: {e:#}"));
            }
        };
        let tests: Vec<_> = files.iter().filter(|p| is_test_file(p)).collect();

        if tests.is_empty() {
            return Finding::fail(
                &self.attribute,
                Remediation::new("Add an automated test suite")
                    .step("Create a tests/ directory")
                    .step("Add at least one test exercising the public entry points"),
            )
            .measured("0 test files", ">=1 test file")
            .evidence("No test files found");
        }

        let mut finding = Finding::pass(&self.attribute)
            .measured(format!("{} test files", tests.len()), ">=1 test file");
        for t in tests.iter().take(5) {
            finding = finding.evidence(format!("test file: {t}"));
        }
        finding
    }
}

const COMMON_IGNORES: &[&str] = &[".env", ".DS_Store", "*.log"];

const LANGUAGE_IGNORES: &[(&str, &[&str])] = &[
    ("Rust", &["target/"]),
    ("Python", &["__pycache__/", "*.pyc", ".venv/", "*.egg-info/"]),
    ("JavaScript", &["node_modules/", "dist/"]),
    ("TypeScript", &["node_modules/", "dist/"]),
    ("Go", &["*.test"]),
    ("Java", &["*.class", "target/"]),
];

/// Recommended ignore patterns for the repository's detected languages,
/// deduplicated in a stable order.
pub fn recommended_gitignore_patterns(repo: &Repository) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = COMMON_IGNORES.to_vec();
    for (lang, patterns) in LANGUAGE_IGNORES {
        if repo.has_language(lang) {
            for p in *patterns {
                if !out.contains(p) {
                    out.push(*p);
                }
            }
        }
    }
    out
}

/// Whether a `.gitignore` body already covers `pattern`, accepting the
/// common spelling variants (`target`, `/target`, `target/`).
pub fn gitignore_covers(content: &str, pattern: &str) -> bool {
    let normalize = |s: &str| s.trim().trim_start_matches('/').trim_end_matches('/').to_string();
    let wanted = normalize(pattern);
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .any(|l| normalize(l) == wanted || normalize(l.trim_end_matches("/*")) == wanted)
}

pub struct GitignoreAssessor {
    attribute: Attribute,
}

impl GitignoreAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "gitignore_completeness",
                ".gitignore Completeness",
                "repository_structure",
                Tier::Critical,
            )
            .describe(
                "Build output, secrets and caches are kept out of version control",
                ".gitignore covers >=90% of recommended patterns for detected languages",
            ),
        }
    }

    fn remediation(missing: &[&str]) -> Remediation {
        let mut r = Remediation::new("Add recommended patterns to .gitignore");
        for p in missing {
            r = r.step(format!("Ignore {p}"));
        }
        r
    }
}

impl Default for GitignoreAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for GitignoreAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let recommended = recommended_gitignore_patterns(repo);
        let content = match read_text(&repo.root, ".gitignore") {
            Probe::Found(c) => c,
            Probe::Missing => {
                return Finding::fail(&self.attribute, Self::remediation(&recommended))
                    .measured("missing", ">=90% of recommended patterns")
                    .evidence(".gitignore not found in repository root");
            }
            Probe::Failed(e) => {
                return Finding::error(&self.attribute, format!("could not read .gitignore: {e}"));
            }
        };

        let missing: Vec<&str> = recommended
            .iter()
            .copied()
            .filter(|p| !gitignore_covers(&content, p))
            .collect();
        let total = recommended.len();
        let covered = total - missing.len();
        let ratio = Completion::ratio(covered, total);

        let finding = if ratio.value() >= GITIGNORE_PASS_RATIO {
            Finding::pass(&self.attribute)
        } else if covered == 0 {
            Finding::fail(&self.attribute, Self::remediation(&missing))
        } else {
            Finding::partial(&self.attribute, ratio, Self::remediation(&missing))
        };
        let mut finding = finding
            .measured(percent(ratio.value()), ">=90%")
            .evidence(format!("{} recommended patterns covered", fraction(covered, total)));
        if !missing.is_empty() {
            finding = finding.evidence(format!("missing: {}", missing.join(", ")));
        }
        finding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentready_types::FindingStatus;
    use camino::Utf8PathBuf;
    use fs_err as fs;
    use tempfile::TempDir;

    fn repo(temp: &TempDir) -> Repository {
        Repository::new(Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8"))
    }

    #[test]
    fn layout_counts_source_and_test_dirs() {
        let temp = TempDir::new().expect("temp");
        let r = repo(&temp);
        let a = StandardLayoutAssessor::new();
        assert_eq!(a.assess(&r).status, FindingStatus::Fail);

        fs::create_dir_all(r.root.join("src")).expect("mkdir");
        assert_eq!(a.assess(&r).status.credit(), Some(0.5));

        // A file named like a test dir does not count.
        fs::write(r.root.join("tests"), "").expect("write");
        assert_eq!(a.assess(&r).status.credit(), Some(0.5));

        fs::remove_file(r.root.join("tests")).expect("rm");
        fs::create_dir_all(r.root.join("tests")).expect("mkdir");
        assert_eq!(a.assess(&r).status, FindingStatus::Pass);
    }

    #[test]
    fn test_file_detection() {
        assert!(is_test_file(Utf8Path::new("tests/it.rs")));
        assert!(is_test_file(Utf8Path::new("pkg/test_models.py")));
        assert!(is_test_file(Utf8Path::new("src/app.spec.ts")));
        assert!(is_test_file(Utf8Path::new("handler_test.go")));
        assert!(!is_test_file(Utf8Path::new("src/main.rs")));
        assert!(!is_test_file(Utf8Path::new("tests/README.md")));
    }

    #[test]
    fn gitignore_pattern_variants() {
        let body = "# build\n/target\nnode_modules/*\n.env\n";
        assert!(gitignore_covers(body, "target/"));
        assert!(gitignore_covers(body, "node_modules/"));
        assert!(gitignore_covers(body, ".env"));
        assert!(!gitignore_covers(body, "*.log"));
        assert!(!gitignore_covers("# .env\n", ".env"));
    }

    #[test]
    fn gitignore_coverage_for_rust_repo() {
        let temp = TempDir::new().expect("temp");
        let mut r = repo(&temp);
        r.languages.insert("Rust".to_string(), 3);
        let a = GitignoreAssessor::new();
        assert_eq!(a.assess(&r).status, FindingStatus::Fail);

        fs::write(r.root.join(".gitignore"), "target/\n.env\n").expect("write");
        assert_eq!(a.assess(&r).status.credit(), Some(0.5));

        fs::write(r.root.join(".gitignore"), "target/\n.env\n.DS_Store\n*.log\n").expect("write");
        assert_eq!(a.assess(&r).status, FindingStatus::Pass);
    }
}
