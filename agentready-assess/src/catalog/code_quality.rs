use crate::assessor::{Assessor, percent};
use crate::discovery::{MAX_SCANNED_FILES, SKIP_DIRS};
use agentready_types::{Attribute, Completion, Finding, Remediation, Repository, Tier};
use fs_err as fs;
use regex::Regex;
use std::io::ErrorKind;
use std::sync::LazyLock;

const ANNOTATION_PASS_RATIO: f64 = 0.8;

/// Lines of a signature inspected after `def` before giving up.
const MAX_SIGNATURE_LINES: usize = 20;

static DEF_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(async\s+)?def\s+\w+\s*\(").ok());

/// Counts `(functions, annotated)` where annotated means the signature
/// declares a return type.
pub(crate) fn count_annotations(source: &str) -> (usize, usize) {
    let Some(def_re) = DEF_RE.as_ref() else {
        return (0, 0);
    };
    let lines: Vec<&str> = source.lines().collect();
    let mut functions = 0;
    let mut annotated = 0;

    for (i, line) in lines.iter().enumerate() {
        if !def_re.is_match(line) {
            continue;
        }
        functions += 1;
        let mut signature = String::new();
        for l in lines.iter().skip(i).take(MAX_SIGNATURE_LINES) {
            signature.push_str(l.trim());
            if l.trim_end().ends_with(':') {
                break;
            }
        }
        if signature.contains("->") {
            annotated += 1;
        }
    }
    (functions, annotated)
}

pub struct TypeAnnotationsAssessor {
    attribute: Attribute,
}

impl TypeAnnotationsAssessor {
    pub fn new() -> Self {
        Self {
            attribute: Attribute::new(
                "type_annotations",
                "Type Annotations",
                "code_quality",
                Tier::Critical,
            )
            .describe(
                "Type hints give agents machine-checkable contracts",
                ">=80% of Python functions declare a return type",
            ),
        }
    }
}

impl Default for TypeAnnotationsAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessor for TypeAnnotationsAssessor {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn is_applicable(&self, repo: &Repository) -> bool {
        repo.has_language("Python")
    }

    fn assess(&self, repo: &Repository) -> Finding {
        let files = match agentready_hash::walk_files(&repo.root, SKIP_DIRS, MAX_SCANNED_FILES) {
            Ok(files) => files,
            Err(e) => {
                return Finding::error(&self.attribute, format!("could not walk repository: {e:#}"));
            }
        };

        let mut functions = 0usize;
        let mut annotated = 0usize;
        let mut scanned = 0usize;
        for rel in files.iter().filter(|p| p.extension() == Some("py")) {
            let source = match fs::read_to_string(repo.root.join(rel)) {
                Ok(s) => s,
                // Deleted between the walk and the read.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Finding::error(&self.attribute, format!("could not read {rel}: {e}"));
                }
            };
            let (f, a) = count_annotations(&source);
            functions += f;
            annotated += a;
            scanned += 1;
        }

        if functions == 0 {
            return Finding::not_applicable(&self.attribute, "no Python function definitions found");
        }

        let ratio = Completion::ratio(annotated, functions);
        let remediation = Remediation::new("Add type annotations to Python functions")
            .step("Annotate return types on public functions first")
            .step("Enable a type checker in CI")
            .tool("mypy")
            .tool("pyright");

        let finding = if ratio.value() >= ANNOTATION_PASS_RATIO {
            Finding::pass(&self.attribute)
        } else if annotated == 0 {
            Finding::fail(&self.attribute, remediation)
        } else {
            Finding::partial(&self.attribute, ratio, remediation)
        };
        finding
            .measured(percent(ratio.value()), ">=80%")
            .evidence(format!(
                "{annotated}/{functions} functions annotated across {scanned} files"
            ))
    }
}
