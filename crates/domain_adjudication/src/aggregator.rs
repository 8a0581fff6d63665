//! Decision aggregator
//!
//! Merges the three independent verdicts into an outcome with one explicit
//! precedence table. Rules are evaluated top to bottom; the first applicable
//! one wins.
//!
//! | # | Condition | Outcome | Confidence |
//! |---|-----------|---------|------------|
//! | 1 | Tier 1 indicator | DENY | 0.95 |
//! | 2 | matched clause excluded | DENY | 0.70 + 0.25 × strength |
//! | 3 | no clause matched | UNCERTAIN | 0.50 − 0.05 × n, floor 0.20 |
//! | 4 | timeline inconsistent | DENY with Tier 2, else UNCERTAIN | 0.55 − 0.05 × n, floor 0.30 |
//! | 5 | timeline indeterminate or Tier 2 | UNCERTAIN | 0.70 − 0.05 × n, floor 0.40 |
//! | 6 | Tier 3 only | APPROVE | 0.90 − 0.05 × Tier 3, floor 0.60 |
//! | 7 | clean | APPROVE | 0.90 |
//!
//! `n` is the number of Tier 2 and Tier 3 indicators.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use domain_claims::{FraudAssessment, SeverityTier, TimelineVerdict};
use domain_policy::PolicyMatch;
use crate::decision::{Confidence, Outcome, PrecedenceRule};

const TIER1_CONFIDENCE: Decimal = dec!(0.95);
const EXCLUSION_BASE: Decimal = dec!(0.70);
const EXCLUSION_STRENGTH_WEIGHT: Decimal = dec!(0.25);
const INDICATOR_PENALTY: Decimal = dec!(0.05);
const APPROVE_CONFIDENCE: Decimal = dec!(0.90);
const APPROVE_FLOOR: Decimal = dec!(0.60);
const MALFORMED_CONFIDENCE: Decimal = dec!(0.30);

/// Outcome, confidence and the rule that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub confidence: Confidence,
    pub rule: PrecedenceRule,
}

impl Verdict {
    fn new(outcome: Outcome, confidence: Confidence, rule: PrecedenceRule) -> Self {
        Self {
            outcome,
            confidence,
            rule,
        }
    }

    /// Verdict for a structurally incomplete bundle with no Tier 1 indicator
    pub fn malformed() -> Self {
        Self::new(
            Outcome::Uncertain,
            Confidence::new(MALFORMED_CONFIDENCE),
            PrecedenceRule::MalformedBundle,
        )
    }
}

/// Applies the precedence table
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionAggregator;

impl DecisionAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Combines the verdicts
    ///
    /// `policy` is `None` when matching was skipped; without a Tier 1
    /// indicator that is treated like a missing match.
    pub fn aggregate(
        &self,
        fraud: &FraudAssessment,
        timeline: TimelineVerdict,
        policy: Option<&PolicyMatch>,
    ) -> Verdict {
        let tier2 = fraud.count(SeverityTier::Tier2Strong);
        let tier3 = fraud.count(SeverityTier::Tier3Weak);
        let weak_and_strong = tier2 + tier3;

        // 1
        if fraud.has_tier(SeverityTier::Tier1AutoDeny) {
            return Verdict::new(
                Outcome::Deny,
                Confidence::new(TIER1_CONFIDENCE),
                PrecedenceRule::Tier1Fraud,
            );
        }

        match policy.and_then(PolicyMatch::matched) {
            // 2
            Some(clause) if clause.is_excluded() => {
                let confidence =
                    EXCLUSION_BASE + EXCLUSION_STRENGTH_WEIGHT * clause.strength;
                return Verdict::new(
                    Outcome::Deny,
                    Confidence::new(confidence),
                    PrecedenceRule::PolicyExcluded,
                );
            }
            Some(_) => {}
            // 3
            None => {
                return Verdict::new(
                    Outcome::Uncertain,
                    Confidence::penalized(
                        dec!(0.50),
                        INDICATOR_PENALTY,
                        weak_and_strong,
                        dec!(0.20),
                    ),
                    PrecedenceRule::NoPolicyMatch,
                );
            }
        }

        // 4
        if timeline == TimelineVerdict::Inconsistent {
            let outcome = if tier2 > 0 {
                Outcome::Deny
            } else {
                Outcome::Uncertain
            };
            return Verdict::new(
                outcome,
                Confidence::penalized(dec!(0.55), INDICATOR_PENALTY, weak_and_strong, dec!(0.30)),
                PrecedenceRule::TimelineInconsistent,
            );
        }

        // 5
        if timeline == TimelineVerdict::Indeterminate || tier2 > 0 {
            return Verdict::new(
                Outcome::Uncertain,
                Confidence::penalized(dec!(0.70), INDICATOR_PENALTY, weak_and_strong, dec!(0.40)),
                PrecedenceRule::WeakEvidence,
            );
        }

        // 6
        if tier3 > 0 {
            return Verdict::new(
                Outcome::Approve,
                Confidence::penalized(APPROVE_CONFIDENCE, INDICATOR_PENALTY, tier3, APPROVE_FLOOR),
                PrecedenceRule::Tier3Only,
            );
        }

        // 7
        Verdict::new(
            Outcome::Approve,
            Confidence::new(APPROVE_CONFIDENCE),
            PrecedenceRule::Clean,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::{Evidence, FraudIndicator, IndicatorCode};
    use domain_policy::{ClauseMatch, TriggeredExclusion};

    fn indicator(code: IndicatorCode) -> FraudIndicator {
        FraudIndicator {
            code,
            severity: code.tier(),
            evidence: Evidence::in_claim("test evidence"),
        }
    }

    fn fraud(codes: &[IndicatorCode]) -> FraudAssessment {
        FraudAssessment::from_indicators(codes.iter().copied().map(indicator).collect())
    }

    fn covered(strength: Decimal) -> PolicyMatch {
        PolicyMatch::Matched(ClauseMatch {
            section: "3.1".into(),
            title: "Medical emergency".into(),
            category: None,
            strength,
            matched_keywords: vec!["hospitalised".into()],
            exclusion: None,
            payout: None,
        })
    }

    fn excluded(strength: Decimal) -> PolicyMatch {
        let PolicyMatch::Matched(mut clause) = covered(strength) else {
            unreachable!()
        };
        clause.exclusion = Some(TriggeredExclusion {
            code: "pre_existing_condition".into(),
            description: "Known conditions".into(),
            section: "3.1".into(),
            evidence: "chronic".into(),
        });
        PolicyMatch::Matched(clause)
    }

    fn no_match() -> PolicyMatch {
        PolicyMatch::NoMatch {
            reason: "nothing covered".into(),
        }
    }

    #[test]
    fn test_tier1_dominates_everything() {
        let verdict = DecisionAggregator.aggregate(
            &fraud(&[IndicatorCode::FileTypeMismatch, IndicatorCode::LowQualityScan]),
            TimelineVerdict::Consistent,
            Some(&covered(dec!(1))),
        );

        assert_eq!(verdict.outcome, Outcome::Deny);
        assert_eq!(verdict.rule, PrecedenceRule::Tier1Fraud);
        assert!(verdict.confidence.value() >= dec!(0.9));
    }

    #[test]
    fn test_exclusion_confidence_follows_strength() {
        let weak = DecisionAggregator.aggregate(
            &fraud(&[]),
            TimelineVerdict::Consistent,
            Some(&excluded(dec!(0.33))),
        );
        let strong = DecisionAggregator.aggregate(
            &fraud(&[]),
            TimelineVerdict::Consistent,
            Some(&excluded(dec!(1))),
        );

        assert_eq!(weak.outcome, Outcome::Deny);
        assert_eq!(weak.confidence.value(), dec!(0.78));
        assert_eq!(strong.confidence.value(), dec!(0.95));
    }

    #[test]
    fn test_no_match_is_uncertain() {
        let verdict = DecisionAggregator.aggregate(
            &fraud(&[IndicatorCode::MissingSignature]),
            TimelineVerdict::Consistent,
            Some(&no_match()),
        );

        assert_eq!(verdict.outcome, Outcome::Uncertain);
        assert_eq!(verdict.rule, PrecedenceRule::NoPolicyMatch);
        assert_eq!(verdict.confidence.value(), dec!(0.45));
    }

    #[test]
    fn test_skipped_match_without_tier1_is_uncertain() {
        let verdict =
            DecisionAggregator.aggregate(&fraud(&[]), TimelineVerdict::Consistent, None);

        assert_eq!(verdict.outcome, Outcome::Uncertain);
        assert_eq!(verdict.rule, PrecedenceRule::NoPolicyMatch);
    }

    #[test]
    fn test_inconsistent_timeline_needs_corroboration_to_deny() {
        let alone = DecisionAggregator.aggregate(
            &fraud(&[]),
            TimelineVerdict::Inconsistent,
            Some(&covered(dec!(1))),
        );
        let corroborated = DecisionAggregator.aggregate(
            &fraud(&[IndicatorCode::NameMismatch]),
            TimelineVerdict::Inconsistent,
            Some(&covered(dec!(1))),
        );

        assert_eq!(alone.outcome, Outcome::Uncertain);
        assert_eq!(alone.confidence.value(), dec!(0.55));
        assert_eq!(corroborated.outcome, Outcome::Deny);
        assert_eq!(corroborated.rule, PrecedenceRule::TimelineInconsistent);
    }

    #[test]
    fn test_weak_evidence_band() {
        let indeterminate = DecisionAggregator.aggregate(
            &fraud(&[]),
            TimelineVerdict::Indeterminate,
            Some(&covered(dec!(1))),
        );
        let many_strong = DecisionAggregator.aggregate(
            &fraud(&[
                IndicatorCode::MissingSignature,
                IndicatorCode::MissingOfficialMark,
                IndicatorCode::NameMismatch,
                IndicatorCode::VisualManipulation,
                IndicatorCode::UnverifiedFacility,
                IndicatorCode::LowQualityScan,
                IndicatorCode::FormattingInconsistency,
            ]),
            TimelineVerdict::Consistent,
            Some(&covered(dec!(1))),
        );

        assert_eq!(indeterminate.outcome, Outcome::Uncertain);
        assert_eq!(indeterminate.confidence.value(), dec!(0.70));
        assert_eq!(many_strong.rule, PrecedenceRule::WeakEvidence);
        assert_eq!(many_strong.confidence.value(), dec!(0.40));
    }

    #[test]
    fn test_tier3_only_approves_with_penalty() {
        let verdict = DecisionAggregator.aggregate(
            &fraud(&[IndicatorCode::LowQualityScan, IndicatorCode::DistantTravelDate]),
            TimelineVerdict::Consistent,
            Some(&covered(dec!(1))),
        );

        assert_eq!(verdict.outcome, Outcome::Approve);
        assert_eq!(verdict.rule, PrecedenceRule::Tier3Only);
        assert_eq!(verdict.confidence.value(), dec!(0.80));
    }

    #[test]
    fn test_clean_claim_approves() {
        let verdict = DecisionAggregator.aggregate(
            &fraud(&[]),
            TimelineVerdict::Consistent,
            Some(&covered(dec!(0.33))),
        );

        assert_eq!(verdict.outcome, Outcome::Approve);
        assert_eq!(verdict.rule, PrecedenceRule::Clean);
        assert!(verdict.confidence.value() >= dec!(0.85));
    }
}
