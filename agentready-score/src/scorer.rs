use crate::{CertificationThresholds, TierWeights};
use agentready_types::assessment::{
    Assessment, CertificationLevel, ScoreCard, StatusCounts, TierSubtotal,
};
use agentready_types::{Finding, FindingStatus, Tier};
use std::collections::BTreeSet;

/// Pure, deterministic scorer.
///
/// Within a tier every contributing attribute (status `pass`, `fail` or
/// `partial`) gets `tier_weight / contributing_count`. A tier without any
/// contributing attribute hands its weight to the remaining tiers in
/// proportion to their configured weights. With no contributing attribute at
/// all (everything skipped, errored or not applicable) the score is exactly
/// `0.0` with the lowest certification.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scorer {
    weights: TierWeights,
    thresholds: CertificationThresholds,
}

#[derive(Default)]
struct TierTally {
    counts: StatusCounts,
    credit: f64,
}

impl Scorer {
    pub fn new(weights: TierWeights, thresholds: CertificationThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    pub fn weights(&self) -> &TierWeights {
        &self.weights
    }

    pub fn thresholds(&self) -> &CertificationThresholds {
        &self.thresholds
    }

    /// Rescores an existing assessment from its findings.
    pub fn score(&self, assessment: &Assessment) -> ScoreCard {
        self.score_findings(&assessment.findings)
    }

    pub fn score_findings(&self, findings: &[Finding]) -> ScoreCard {
        let tallies = tally(findings);

        let mut counts = StatusCounts::default();
        for t in &tallies {
            add_counts(&mut counts, &t.counts);
        }

        let active_weight: f64 = Tier::ALL
            .iter()
            .zip(&tallies)
            .filter(|(_, t)| t.counts.contributing() > 0)
            .map(|(tier, _)| self.weights.weight(*tier))
            .sum();

        let mut overall = 0.0;
        let mut tiers = Vec::with_capacity(Tier::ALL.len());
        for (tier, t) in Tier::ALL.iter().zip(&tallies) {
            let configured = self.weights.weight(*tier);
            let contributing = t.counts.contributing();
            let effective = if contributing > 0 && active_weight > 0.0 {
                configured * 100.0 / active_weight
            } else {
                0.0
            };
            let earned = if contributing > 0 {
                effective * t.credit / f64::from(contributing)
            } else {
                0.0
            };
            overall += earned;
            tiers.push(TierSubtotal {
                tier: *tier,
                configured_weight: configured,
                effective_weight: effective,
                earned,
                counts: t.counts,
            });
        }

        let (overall, certification) = if active_weight > 0.0 {
            let overall = overall.clamp(0.0, 100.0);
            (overall, self.thresholds.level(overall))
        } else {
            (0.0, CertificationLevel::lowest())
        };

        ScoreCard {
            overall,
            certification,
            tiers,
            counts,
        }
    }

    /// Full share of the tier weight one contributing attribute carries.
    ///
    /// `None` when the attribute is absent or not contributing.
    pub fn attribute_share(&self, findings: &[Finding], attribute_id: &str) -> Option<f64> {
        let finding = findings.iter().find(|f| f.attribute.id == attribute_id)?;
        if !finding.status.is_contributing() {
            return None;
        }
        let card = self.score_findings(findings);
        let subtotal = card.tiers.iter().find(|t| t.tier == finding.attribute.tier)?;
        Some(subtotal.effective_weight / f64::from(subtotal.counts.contributing()))
    }

    /// Score of a hypothetical assessment in which the targeted findings
    /// are promoted to `pass`.
    pub fn project(&self, findings: &[Finding], targets: &BTreeSet<String>) -> ScoreCard {
        let promoted: Vec<Finding> = findings
            .iter()
            .map(|f| {
                if targets.contains(&f.attribute.id) {
                    f.promoted()
                } else {
                    f.clone()
                }
            })
            .collect();
        self.score_findings(&promoted)
    }

    /// Weighted points the attribute would add by moving to `pass`.
    pub fn points_gained(&self, findings: &[Finding], attribute_id: &str) -> f64 {
        let Some(finding) = findings.iter().find(|f| f.attribute.id == attribute_id) else {
            return 0.0;
        };
        if finding.status == FindingStatus::Pass {
            return 0.0;
        }
        let targets = BTreeSet::from([attribute_id.to_string()]);
        let gained =
            self.project(findings, &targets).overall - self.score_findings(findings).overall;
        gained.max(0.0)
    }
}

fn tally(findings: &[Finding]) -> Vec<TierTally> {
    let mut tallies: Vec<TierTally> = Tier::ALL.iter().map(|_| TierTally::default()).collect();
    for f in findings {
        let idx = usize::from(f.attribute.tier.number() - 1);
        let t = &mut tallies[idx];
        match &f.status {
            FindingStatus::Pass => t.counts.pass += 1,
            FindingStatus::Fail => t.counts.fail += 1,
            FindingStatus::Partial { .. } => t.counts.partial += 1,
            FindingStatus::Skipped { .. } => t.counts.skipped += 1,
            FindingStatus::Error { .. } => t.counts.error += 1,
            FindingStatus::NotApplicable { .. } => t.counts.not_applicable += 1,
        }
        if let Some(credit) = f.status.credit() {
            t.credit += credit;
        }
    }
    tallies
}

fn add_counts(into: &mut StatusCounts, from: &StatusCounts) {
    into.pass += from.pass;
    into.fail += from.fail;
    into.partial += from.partial;
    into.skipped += from.skipped;
    into.error += from.error;
    into.not_applicable += from.not_applicable;
}
