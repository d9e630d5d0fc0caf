use crate::assessor::Assessor;
use crate::catalog;
use agentready_types::{Attribute, ConfigError, Tier};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Version of the built-in attribute catalog, recorded in every assessment.
pub const CATALOG_VERSION: u32 = 2;

/// Explicit, constructed set of assessors handed to a [`crate::Scanner`].
///
/// Assessors are kept sorted by attribute id; ids are unique.
#[derive(Clone)]
pub struct Registry {
    assessors: Vec<Arc<dyn Assessor>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("ids", &self.ids()).finish()
    }
}

impl Registry {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self::with_assessors(catalog::builtin_assessors())
    }

    /// Later duplicates of an id are dropped.
    pub fn with_assessors(assessors: Vec<Arc<dyn Assessor>>) -> Self {
        let mut seen = BTreeSet::new();
        let mut assessors: Vec<_> = assessors
            .into_iter()
            .filter(|a| seen.insert(a.id().to_string()))
            .collect();
        assessors.sort_by(|a, b| a.id().cmp(b.id()));
        Self { assessors }
    }

    /// Registry limited to `ids`; any unknown id fails the whole request.
    pub fn restrict<S: AsRef<str>>(&self, ids: &[S]) -> Result<Self, ConfigError> {
        let mut wanted = BTreeSet::new();
        for id in ids {
            let id = id.as_ref();
            if self.get(id).is_none() {
                return Err(ConfigError::UnknownAttribute { id: id.to_string() });
            }
            wanted.insert(id.to_string());
        }
        Ok(Self {
            assessors: self
                .assessors
                .iter()
                .filter(|a| wanted.contains(a.id()))
                .cloned()
                .collect(),
        })
    }

    pub fn for_tier(&self, tier: Tier) -> Self {
        Self {
            assessors: self
                .assessors
                .iter()
                .filter(|a| a.attribute().tier == tier)
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Assessor>> {
        self.assessors.iter().find(|a| a.id() == id)
    }

    pub fn assessors(&self) -> &[Arc<dyn Assessor>] {
        &self.assessors
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.assessors.iter().map(|a| a.attribute().clone()).collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.assessors.iter().map(|a| a.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.assessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessors.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_sorted_and_covers_every_tier() {
        let registry = Registry::builtin();
        let ids = registry.ids();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(registry.len(), 13);
        for tier in Tier::ALL {
            assert!(!registry.for_tier(tier).is_empty(), "{tier} has no attributes");
        }
        assert_eq!(registry.for_tier(Tier::Essential).len(), 4);
    }

    #[test]
    fn restrict_rejects_unknown_ids() {
        let registry = Registry::builtin();
        let only = registry
            .restrict(&["readme_structure", "claude_md_file"])
            .expect("known ids");
        assert_eq!(only.ids(), vec!["claude_md_file", "readme_structure"]);

        let err = registry.restrict(&["claude_md_file", "nope"]).expect_err("unknown");
        assert_eq!(
            err,
            ConfigError::UnknownAttribute {
                id: "nope".to_string()
            }
        );
    }
}
