use crate::generator::{FixGenerator, SuggestionProvider};
use agentready_types::fix::{Fix, GeneratorKind};
use agentready_types::{Finding, Repository};
use anyhow::anyhow;
use std::sync::Arc;

/// Adapts a [`SuggestionProvider`] to the generator contract.
///
/// Accepts every finding that needs remediation; the planner only consults
/// it when AI-assisted generation was explicitly enabled.
pub struct AiAssistedGenerator {
    id: String,
    provider: Arc<dyn SuggestionProvider>,
}

impl AiAssistedGenerator {
    pub fn new(provider: Arc<dyn SuggestionProvider>) -> Self {
        Self {
            id: format!("ai_assisted:{}", provider.name()),
            provider,
        }
    }
}

impl FixGenerator for AiAssistedGenerator {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::AiAssisted
    }

    fn can_fix(&self, finding: &Finding) -> bool {
        finding.status.needs_remediation()
    }

    fn generate_fix(&self, repo: &Repository, finding: &Finding) -> anyhow::Result<Fix> {
        self.provider.suggest(repo, finding)?.ok_or_else(|| {
            anyhow!(
                "{} has no suggestion for {}",
                self.provider.name(),
                finding.attribute_id()
            )
        })
    }
}
