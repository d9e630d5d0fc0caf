use crate::generators;
use agentready_types::fix::{Fix, GeneratorKind};
use agentready_types::{Finding, Repository};
use std::fmt;
use std::sync::Arc;

/// Produces a concrete [`Fix`] for findings it recognises.
///
/// Generators only read the repository; every write goes through the
/// engine so it can be previewed, snapshotted and rolled back.
pub trait FixGenerator: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> GeneratorKind;

    fn can_fix(&self, finding: &Finding) -> bool;

    fn generate_fix(&self, repo: &Repository, finding: &Finding) -> anyhow::Result<Fix>;
}

/// External source of suggested fixes (e.g. a model-backed service).
///
/// `Ok(None)` means the provider has nothing for this finding.
pub trait SuggestionProvider: Send + Sync {
    fn name(&self) -> &str;

    fn suggest(&self, repo: &Repository, finding: &Finding) -> anyhow::Result<Option<Fix>>;
}

/// Ordered set of generators; the first one accepting a finding wins.
#[derive(Clone)]
pub struct GeneratorCatalog {
    generators: Vec<Arc<dyn FixGenerator>>,
}

impl fmt::Debug for GeneratorCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.generators.iter().map(|g| g.id()))
            .finish()
    }
}

impl Default for GeneratorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GeneratorCatalog {
    pub fn builtin() -> Self {
        Self::with_generators(generators::builtin_generators())
    }

    pub fn with_generators(generators: Vec<Arc<dyn FixGenerator>>) -> Self {
        Self { generators }
    }

    /// Adds an AI-assisted generator backed by `provider`. It is always
    /// consulted after every template and command generator.
    pub fn with_ai_assisted(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.generators
            .push(Arc::new(generators::AiAssistedGenerator::new(provider)));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn FixGenerator>> {
        self.generators.iter()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}
