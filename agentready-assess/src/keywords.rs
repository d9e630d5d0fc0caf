//! Versioned lookup table from attribute ids to free-text terms.
//!
//! Used to attach free-text review comments or benchmark notes to the
//! attribute they are about. Matching is a pure function of the table.

use agentready_types::Attribute;

/// Bumped whenever a term is added, removed or moved between attributes.
pub const KEYWORD_TABLE_VERSION: u32 = 1;

pub const KEYWORD_TABLE: &[(&str, &[&str])] = &[
    ("architecture_decisions", &["adr", "architecture decision", "design decision"]),
    ("ci_configuration", &["continuous integration", "github actions", "ci pipeline", "workflow"]),
    ("claude_md_file", &["claude.md", "agent context", "claude"]),
    ("container_setup", &["dockerfile", "container", "devcontainer", "docker"]),
    ("conventional_commits", &["conventional commit", "commit message", "commitlint"]),
    ("dependency_pinning", &["lock file", "lockfile", "pinned dependencies", "dependency pinning"]),
    ("gitignore_completeness", &["gitignore", "ignored files"]),
    ("issue_templates", &["issue template", "pull request template", "pr template"]),
    ("pre_commit_hooks", &["pre-commit", "precommit", "git hook"]),
    ("readme_structure", &["readme", "installation instructions", "usage section"]),
    ("standard_layout", &["project layout", "directory structure", "src layout"]),
    ("test_suite", &["test coverage", "coverage", "pytest", "unit test", "test suite"]),
    ("type_annotations", &["type hints", "type annotations", "mypy", "typing"]),
];

pub fn terms_for(attribute_id: &str) -> &'static [&'static str] {
    KEYWORD_TABLE
        .iter()
        .find(|(id, _)| *id == attribute_id)
        .map(|(_, terms)| *terms)
        .unwrap_or(&[])
}

/// Attribute whose terms occur most often in `text`, restricted to
/// `attributes`. Ties resolve to the lowest id; no match yields `None`.
pub fn map_text_to_attribute<'a>(text: &str, attributes: &'a [Attribute]) -> Option<&'a Attribute> {
    let lower = text.to_lowercase();
    let mut best: Option<(&Attribute, usize)> = None;

    let mut candidates: Vec<&Attribute> = attributes.iter().collect();
    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    for attribute in candidates {
        let hits = terms_for(&attribute.id)
            .iter()
            .filter(|t| lower.contains(**t))
            .count();
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, best_hits)) if best_hits >= hits => {}
            _ => best = Some((attribute, hits)),
        }
    }
    best.map(|(a, _)| a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    #[test]
    fn table_is_sorted_and_covers_builtin_catalog() {
        let ids: Vec<&str> = KEYWORD_TABLE.iter().map(|(id, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        for id in Registry::builtin().ids() {
            assert!(!terms_for(id).is_empty(), "{id} has no terms");
        }
    }

    #[test]
    fn maps_free_text_to_best_attribute() {
        let attributes = Registry::builtin().attributes();
        let hit = map_text_to_attribute("Please add type hints and run mypy", &attributes)
            .expect("match");
        assert_eq!(hit.id, "type_annotations");

        let hit = map_text_to_attribute("Coverage is low; add pytest cases", &attributes)
            .expect("match");
        assert_eq!(hit.id, "test_suite");

        assert!(map_text_to_attribute("looks great", &attributes).is_none());
    }

    #[test]
    fn only_considers_given_attributes() {
        let attributes = Registry::builtin()
            .restrict(&["readme_structure"])
            .expect("known")
            .attributes();
        assert!(map_text_to_attribute("add type hints", &attributes).is_none());
    }
}
