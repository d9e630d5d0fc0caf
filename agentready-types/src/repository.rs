use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Immutable snapshot descriptor of the repository being assessed.
///
/// Owned by the caller; assessors only read through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub root: Utf8PathBuf,
    pub name: String,

    /// Language name to number of files detected.
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,

    #[serde(default)]
    pub total_files: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitMetadata>,
}

impl Repository {
    pub fn new(root: Utf8PathBuf) -> Self {
        let name = root.file_name().unwrap_or("repository").to_string();
        Self {
            root,
            name,
            languages: BTreeMap::new(),
            total_files: 0,
            git: None,
        }
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.languages.get(language).is_some_and(|n| *n > 0)
    }

    /// Language with the most files; ties resolve to the alphabetically first.
    pub fn primary_language(&self) -> Option<&str> {
        self.languages
            .iter()
            .filter(|(_, n)| **n > 0)
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.as_str())
    }

    pub fn is_git_repo(&self) -> bool {
        self.git.is_some()
    }
}
