use agentready_score::{CertificationThresholds, Scorer, TierWeights};
use agentready_types::{Attribute, Completion, Finding, Remediation, Tier};
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = u8> {
    0u8..6
}

fn build(statuses: &[(u8, u8, f64)]) -> Vec<Finding> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, (tier, status, completion))| {
            let tier = Tier::from_number(*tier).expect("tier in range");
            let a = Attribute::new(format!("attr_{i:02}"), "generated", "test", tier);
            match status {
                0 => Finding::pass(&a),
                1 => Finding::fail(&a, Remediation::new("fix")),
                2 => Finding::partial(&a, Completion::saturating(*completion), Remediation::new("fix")),
                3 => Finding::skipped(&a, "tool missing"),
                4 => Finding::error(&a, "io"),
                _ => Finding::not_applicable(&a, "n/a"),
            }
        })
        .collect()
}

fn weights_strategy() -> impl Strategy<Value = TierWeights> {
    (0u32..=100, 0u32..=100, 0u32..=100).prop_filter_map("sum <= 100", |(a, b, c)| {
        let rest = 100i64 - i64::from(a) - i64::from(b) - i64::from(c);
        (rest >= 0).then(|| {
            TierWeights::new(f64::from(a), f64::from(b), f64::from(c), rest as f64)
                .expect("weights sum to 100")
        })
    })
}

proptest! {
    #[test]
    fn score_is_always_within_bounds(
        statuses in prop::collection::vec((1u8..=4, status_strategy(), 0.0f64..=1.0), 0..24),
        weights in weights_strategy(),
    ) {
        let scorer = Scorer::new(weights, CertificationThresholds::default());
        let card = scorer.score_findings(&build(&statuses));
        prop_assert!(card.overall >= 0.0);
        prop_assert!(card.overall <= 100.0 + 1e-9);
    }

    #[test]
    fn only_skipped_or_error_scores_zero(
        statuses in prop::collection::vec((1u8..=4, 3u8..5, 0.0f64..=1.0), 1..16),
    ) {
        let card = Scorer::default().score_findings(&build(&statuses));
        prop_assert_eq!(card.overall, 0.0);
    }

    #[test]
    fn scoring_is_order_independent(
        statuses in prop::collection::vec((1u8..=4, status_strategy(), 0.0f64..=1.0), 0..16),
    ) {
        let scorer = Scorer::default();
        let findings = build(&statuses);
        let mut reversed = findings.clone();
        reversed.reverse();
        let a = scorer.score_findings(&findings);
        let b = scorer.score_findings(&reversed);
        prop_assert!((a.overall - b.overall).abs() < 1e-9);
        prop_assert_eq!(a.certification, b.certification);
    }

    #[test]
    fn partial_completion_is_linear(completion in 0.0f64..=1.0, tier in 1u8..=4) {
        let scorer = Scorer::default();
        let findings = build(&[(tier, 2, completion)]);
        let share = scorer.attribute_share(&findings, "attr_00").expect("contributing");
        let card = scorer.score_findings(&findings);
        prop_assert!((card.overall - share * completion).abs() < 1e-9);
    }

    #[test]
    fn weights_off_by_more_than_tolerance_are_rejected(delta in 0.001f64..50.0) {
        prop_assert!(TierWeights::new(50.0 + delta, 30.0, 15.0, 5.0).is_err());
    }
}
