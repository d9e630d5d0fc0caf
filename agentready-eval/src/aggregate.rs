use agentready_types::Tier;
use agentready_types::eval::{BaselineRun, EvalSummary, ImpactResult, TierAverage};
use agentready_types::schema::AGENTREADY_EVAL_V1;
use chrono::Utc;

/// Ranks impacts by delta (descending, ties by attribute id) and computes
/// per-tier averages. A tier with no tested attribute averages `0.0`.
pub fn summarize(baseline: BaselineRun, mut impacts: Vec<ImpactResult>) -> EvalSummary {
    impacts.sort_by(|a, b| {
        b.delta
            .total_cmp(&a.delta)
            .then_with(|| a.attribute_id.cmp(&b.attribute_id))
    });

    let tier_averages = Tier::ALL
        .iter()
        .map(|&tier| {
            let deltas: Vec<f64> = impacts
                .iter()
                .filter(|i| i.tier == tier)
                .map(|i| i.delta)
                .collect();
            let average_delta = if deltas.is_empty() {
                0.0
            } else {
                deltas.iter().sum::<f64>() / deltas.len() as f64
            };
            TierAverage {
                tier,
                average_delta,
                attributes_tested: deltas.len() as u32,
            }
        })
        .collect();

    let significant_improvements = impacts
        .iter()
        .filter(|i| i.is_significant() && i.delta > 0.0)
        .count() as u32;

    EvalSummary {
        schema: AGENTREADY_EVAL_V1.to_string(),
        timestamp: Utc::now(),
        baseline,
        total_tested: impacts.len() as u32,
        impacts,
        tier_averages,
        significant_improvements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentready_types::eval::Significance;
    use pretty_assertions::assert_eq;

    fn baseline() -> BaselineRun {
        BaselineRun {
            samples: vec![60.0, 61.0],
            mean: 60.5,
            std_dev: 0.7,
            n: 2,
            dropped: vec![],
            fingerprint: "f".to_string(),
            recorded_at: Utc::now(),
        }
    }

    fn impact(id: &str, tier: Tier, delta: f64, significance: Significance) -> ImpactResult {
        ImpactResult {
            attribute_id: id.to_string(),
            attribute_name: id.to_string(),
            tier,
            baseline_mean: 60.5,
            post_mean: 60.5 + delta,
            delta,
            t_statistic: None,
            p_value: None,
            cohens_d: None,
            effect: None,
            significance,
            iterations: 2,
            samples: vec![],
            dropped_samples: vec![],
            fixes_applied: 1,
            remediation_log: vec![],
        }
    }

    #[test]
    fn ranks_by_delta_and_averages_tiers() {
        let summary = summarize(
            baseline(),
            vec![
                impact("b", Tier::Essential, 2.0, Significance::NotSignificant),
                impact("a", Tier::Essential, 4.0, Significance::Significant),
                impact("c", Tier::Important, -1.0, Significance::Significant),
                impact("d", Tier::Important, 2.0, Significance::Significant),
            ],
        );

        let order: Vec<&str> = summary.impacts.iter().map(|i| i.attribute_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "d", "c"]);
        assert_eq!(summary.schema, AGENTREADY_EVAL_V1);
        assert_eq!(summary.total_tested, 4);
        assert_eq!(summary.significant_improvements, 2);

        let averages: Vec<(Tier, f64, u32)> = summary
            .tier_averages
            .iter()
            .map(|t| (t.tier, t.average_delta, t.attributes_tested))
            .collect();
        assert_eq!(
            averages,
            vec![
                (Tier::Essential, 3.0, 2),
                (Tier::Critical, 0.0, 0),
                (Tier::Important, 0.5, 2),
                (Tier::Advanced, 0.0, 0),
            ]
        );
    }

    #[test]
    fn empty_session_still_reports_every_tier() {
        let summary = summarize(baseline(), vec![]);
        assert_eq!(summary.total_tested, 0);
        assert_eq!(summary.tier_averages.len(), 4);
        assert!(summary.tier_averages.iter().all(|t| t.average_delta == 0.0));
    }
}
