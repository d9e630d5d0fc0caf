use crate::generator::GeneratorCatalog;
use agentready_score::Scorer;
use agentready_types::align::Unfixable;
use agentready_types::assessment::Assessment;
use agentready_types::fix::{Fix, GeneratorKind, PlannedFix};
use agentready_types::Finding;
use std::collections::BTreeSet;
use tracing::debug;
use uuid::Uuid;

/// Deterministic fix ids: v5(namespace, attribute|generator|fix json).
const FIX_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6a, 0x1e, 0x53, 0x0c, 0x9d, 0x4f, 0x4e, 0x21, 0xa8, 0x37, 0x52, 0x0b, 0xe4, 0x91, 0x7c,
    0x3d,
]);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// At most one fix per attribute; AI-assisted fixes come last.
    pub fixes: Vec<PlannedFix>,
    pub unfixable: Vec<Unfixable>,
}

impl Plan {
    pub fn attribute_ids(&self) -> BTreeSet<String> {
        self.fixes.iter().map(|f| f.attribute_id.clone()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    catalog: GeneratorCatalog,
    allow_ai_assisted: bool,
}

impl Planner {
    pub fn new(catalog: GeneratorCatalog, allow_ai_assisted: bool) -> Self {
        Self {
            catalog,
            allow_ai_assisted,
        }
    }

    /// Maps every finding that needs remediation (optionally restricted to
    /// `only`) to one fix, or records why it cannot be fixed.
    pub fn plan(
        &self,
        assessment: &Assessment,
        scorer: &Scorer,
        only: Option<&BTreeSet<String>>,
    ) -> Plan {
        let mut targets: Vec<&Finding> = assessment
            .findings
            .iter()
            .filter(|f| f.status.needs_remediation())
            .filter(|f| only.is_none_or(|ids| ids.contains(f.attribute_id())))
            .collect();
        targets.sort_by(|a, b| a.attribute_id().cmp(b.attribute_id()));

        let mut plan = Plan::default();
        for finding in targets {
            let id = finding.attribute_id();
            let generator = self.catalog.iter().find(|g| {
                (self.allow_ai_assisted || g.kind() != GeneratorKind::AiAssisted) && g.can_fix(finding)
            });
            let Some(generator) = generator else {
                debug!(attribute = id, "no generator accepts finding");
                plan.unfixable.push(Unfixable {
                    attribute_id: id.to_string(),
                    reason: "no fix generator available".to_string(),
                });
                continue;
            };

            match generator.generate_fix(&assessment.repository, finding) {
                Ok(fix) => {
                    debug!(attribute = id, generator = generator.id(), "planned fix");
                    plan.fixes.push(PlannedFix {
                        id: fix_id(id, generator.id(), &fix),
                        attribute_id: id.to_string(),
                        attribute_name: finding.attribute.name.clone(),
                        tier: finding.attribute.tier,
                        generator: generator.id().to_string(),
                        generator_kind: generator.kind(),
                        description: fix.preview(),
                        points_gained: scorer.points_gained(&assessment.findings, id),
                        fix,
                    });
                }
                Err(e) => plan.unfixable.push(Unfixable {
                    attribute_id: id.to_string(),
                    reason: format!("{}: {e:#}", generator.id()),
                }),
            }
        }

        // Stable: attribute order is kept within each group.
        plan.fixes
            .sort_by_key(|f| f.generator_kind == GeneratorKind::AiAssisted);
        plan
    }
}

fn fix_id(attribute_id: &str, generator: &str, fix: &Fix) -> String {
    let body = serde_json::to_string(fix).unwrap_or_default();
    let key = format!("{attribute_id}|{generator}|{body}");
    Uuid::new_v5(&FIX_NAMESPACE, key.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FixGenerator, SuggestionProvider};
    use agentready_types::{Attribute, Remediation, Repository, Tier};
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Always(&'static str);

    impl FixGenerator for Always {
        fn id(&self) -> &str {
            self.0
        }
        fn kind(&self) -> GeneratorKind {
            GeneratorKind::Template
        }
        fn can_fix(&self, finding: &Finding) -> bool {
            finding.attribute_id() != "nothing_fixes_me"
        }
        fn generate_fix(&self, _repo: &Repository, finding: &Finding) -> anyhow::Result<Fix> {
            if finding.attribute_id() == "broken" {
                anyhow::bail!("template missing");
            }
            Ok(Fix::FileCreation {
                path: format!("{}.md", finding.attribute_id()).into(),
                content: "x\n".to_string(),
            })
        }
    }

    struct Oracle;

    impl SuggestionProvider for Oracle {
        fn name(&self) -> &str {
            "oracle"
        }
        fn suggest(&self, _repo: &Repository, _finding: &Finding) -> anyhow::Result<Option<Fix>> {
            Ok(Some(Fix::FileCreation {
                path: "SUGGESTED.md".into(),
                content: "y\n".to_string(),
            }))
        }
    }

    fn assessment(ids: &[(&str, Tier)]) -> Assessment {
        let findings = ids
            .iter()
            .map(|(id, tier)| {
                Finding::fail(&Attribute::new(*id, *id, "test", *tier), Remediation::new("fix"))
            })
            .collect::<Vec<_>>();
        let scorer = Scorer::default();
        let card = scorer.score_findings(&findings);
        Assessment::new(Repository::new(Utf8PathBuf::from("/repo")), 2, findings, card)
    }

    #[test]
    fn one_fix_per_attribute_sorted_with_unfixable_recorded() {
        let a = assessment(&[
            ("zeta", Tier::Essential),
            ("broken", Tier::Critical),
            ("alpha", Tier::Essential),
            ("nothing_fixes_me", Tier::Advanced),
        ]);
        let catalog = GeneratorCatalog::with_generators(vec![Arc::new(Always("first")), Arc::new(Always("second"))]);
        let plan = Planner::new(catalog, false).plan(&a, &Scorer::default(), None);

        let ids: Vec<&str> = plan.fixes.iter().map(|f| f.attribute_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert!(plan.fixes.iter().all(|f| f.generator == "first"));
        let unfixable: Vec<&str> = plan.unfixable.iter().map(|u| u.attribute_id.as_str()).collect();
        assert_eq!(unfixable, vec!["broken", "nothing_fixes_me"]);
        assert!(plan.unfixable[0].reason.contains("template missing"));
    }

    #[test]
    fn ids_are_stable_across_runs() {
        let a = assessment(&[("alpha", Tier::Essential)]);
        let catalog = GeneratorCatalog::with_generators(vec![Arc::new(Always("first"))]);
        let planner = Planner::new(catalog, false);
        let one = planner.plan(&a, &Scorer::default(), None);
        let two = planner.plan(&a, &Scorer::default(), None);
        assert_eq!(one, two);
        assert_eq!(one.fixes[0].points_gained, 100.0);
    }

    #[test]
    fn ai_assisted_requires_opt_in() {
        let a = assessment(&[("nothing_fixes_me", Tier::Essential)]);
        let catalog = GeneratorCatalog::with_generators(vec![Arc::new(Always("first"))])
            .with_ai_assisted(Arc::new(Oracle));

        let off = Planner::new(catalog.clone(), false).plan(&a, &Scorer::default(), None);
        assert!(off.fixes.is_empty());
        assert_eq!(off.unfixable.len(), 1);

        let on = Planner::new(catalog, true).plan(&a, &Scorer::default(), None);
        assert_eq!(on.fixes.len(), 1);
        assert_eq!(on.fixes[0].generator, "ai_assisted:oracle");
        assert_eq!(on.fixes[0].generator_kind, GeneratorKind::AiAssisted);
    }

    #[test]
    fn subset_restricts_planning() {
        let a = assessment(&[("alpha", Tier::Essential), ("zeta", Tier::Essential)]);
        let catalog = GeneratorCatalog::with_generators(vec![Arc::new(Always("first"))]);
        let only = BTreeSet::from(["zeta".to_string()]);
        let plan = Planner::new(catalog, false).plan(&a, &Scorer::default(), Some(&only));
        assert_eq!(plan.attribute_ids(), only);
    }
}
