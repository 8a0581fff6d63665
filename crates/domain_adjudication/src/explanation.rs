//! Explanation composer
//!
//! Renders the reasoning trail of a decision. Steps come in evaluation order:
//!
//! ```text
//! fraud -> timeline -> policy -> degraded signals -> compensation -> outcome
//! ```
//!
//! Every step cites a concrete indicator, timeline finding or clause result.
//! Identical inputs always give identical steps.

use chrono::NaiveDate;

use core_kernel::Money;
use domain_claims::{Claim, FraudAssessment, TimelineAnalysis, TimelineVerdict};
use domain_policy::{ClauseMatch, PolicyMatch};
use crate::aggregator::Verdict;
use crate::decision::{DegradedSignal, PrecedenceRule};

/// Everything a decision was derived from
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub claim: &'a Claim,
    pub fraud: &'a FraudAssessment,
    pub timeline: &'a TimelineAnalysis,
    /// `None` when policy matching was skipped
    pub policy: Option<&'a PolicyMatch>,
    pub degraded: &'a [DegradedSignal],
    pub compensation: Option<&'a Money>,
    pub verdict: &'a Verdict,
}

/// Produces ordered, evidence-citing reasoning steps
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplanationComposer;

impl ExplanationComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, inputs: &DecisionInputs<'_>) -> Vec<String> {
        let mut steps = Vec::new();

        self.fraud_steps(inputs, &mut steps);
        self.timeline_steps(inputs.timeline, &mut steps);
        self.policy_steps(inputs, &mut steps);

        steps.extend(inputs.degraded.iter().map(ToString::to_string));

        if let (Some(amount), Some(clause)) = (
            inputs.compensation,
            inputs.policy.and_then(PolicyMatch::matched),
        ) {
            steps.push(compensation_step(amount, clause, inputs.claim));
        }

        let verdict = inputs.verdict;
        steps.push(format!(
            "Outcome {} (confidence {}) by {}: {}.",
            verdict.outcome,
            verdict.confidence,
            verdict.rule,
            verdict.rule.description()
        ));

        steps
    }

    fn fraud_steps(&self, inputs: &DecisionInputs<'_>, steps: &mut Vec<String>) {
        if inputs.fraud.is_empty() {
            steps.push(format!(
                "No fraud indicators were found across {} document(s).",
                inputs.claim.documents.len()
            ));
            return;
        }
        for indicator in &inputs.fraud.indicators {
            steps.push(format!(
                "{} indicator {}: {}.",
                indicator.severity, indicator.code, indicator.evidence.description
            ));
        }
    }

    fn timeline_steps(&self, timeline: &TimelineAnalysis, steps: &mut Vec<String>) {
        if timeline.verdict == TimelineVerdict::Consistent {
            let incident = optional_date(timeline.incident_date);
            let travel = optional_date(timeline.first_travel_date);
            steps.push(format!(
                "Timeline CONSISTENT: incident on {} precedes first travel on {}; claim submitted on {}.",
                incident, travel, timeline.submission_date
            ));
            return;
        }
        for finding in &timeline.findings {
            steps.push(format!("Timeline {}: {}.", timeline.verdict, finding));
        }
    }

    fn policy_steps(&self, inputs: &DecisionInputs<'_>, steps: &mut Vec<String>) {
        let Some(policy) = inputs.policy else {
            let reason = match inputs.verdict.rule {
                PrecedenceRule::MalformedBundle => "the fact bundle is incomplete",
                _ => "an auto-deny fraud indicator already settles the outcome",
            };
            steps.push(format!("Policy matching skipped: {}.", reason));
            return;
        };

        match policy {
            PolicyMatch::NoMatch { reason } => {
                steps.push(format!("No policy clause matched: {}.", reason));
            }
            PolicyMatch::Matched(clause) => {
                if clause.category.is_some() {
                    steps.push(format!(
                        "Claim matches section {} (match strength {:.2}) on: {}.",
                        clause.reference(),
                        clause.strength,
                        clause.matched_keywords.join(", ")
                    ));
                }
                if let Some(exclusion) = &clause.exclusion {
                    steps.push(format!(
                        "Exclusion {} of section {} applies: {} (\"{}\").",
                        exclusion.code, exclusion.section, exclusion.description, exclusion.evidence
                    ));
                }
            }
        }
    }
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "an unknown date".to_string(), |d| d.to_string())
}

fn compensation_step(amount: &Money, clause: &ClauseMatch, claim: &Claim) -> String {
    match &claim.reimbursable_amount() {
        Some(claimed) => format!(
            "Compensation of {} for a claimed {} under section {}.",
            amount, claimed, clause.section
        ),
        None => format!("Compensation of {} under section {}.", amount, clause.section),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use domain_claims::{Evidence, FraudIndicator, IndicatorCode, TimelineFinding};
    use crate::decision::{Confidence, Outcome};

    fn claim() -> Claim {
        Claim::new("I was hospitalised", Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).unwrap())
    }

    fn consistent() -> TimelineAnalysis {
        TimelineAnalysis {
            verdict: TimelineVerdict::Consistent,
            incident_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            first_travel_date: NaiveDate::from_ymd_opt(2024, 3, 12),
            submission_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            findings: vec![],
        }
    }

    #[test]
    fn test_steps_follow_evaluation_order() {
        let claim = claim();
        let fraud = FraudAssessment::from_indicators(vec![FraudIndicator {
            code: IndicatorCode::FileTypeMismatch,
            severity: IndicatorCode::FileTypeMismatch.tier(),
            evidence: Evidence::in_claim("medical_certificate 'note.txt' is a text file"),
        }]);
        let timeline = consistent();
        let verdict = Verdict {
            outcome: Outcome::Deny,
            confidence: Confidence::new(dec!(0.95)),
            rule: PrecedenceRule::Tier1Fraud,
        };

        let steps = ExplanationComposer.compose(&DecisionInputs {
            claim: &claim,
            fraud: &fraud,
            timeline: &timeline,
            policy: None,
            degraded: &[],
            compensation: None,
            verdict: &verdict,
        });

        assert_eq!(steps.len(), 4);
        assert!(steps[0].starts_with("Tier 1 (auto-deny) indicator file_type_mismatch"));
        assert!(steps[1].starts_with("Timeline CONSISTENT: incident on 2024-03-10"));
        assert!(steps[2].starts_with("Policy matching skipped"));
        assert_eq!(
            steps[3],
            "Outcome DENY (confidence 0.95) by rule 1: an auto-deny fraud indicator is present."
        );
    }

    #[test]
    fn test_one_step_per_timeline_finding() {
        let claim = claim();
        let fraud = FraudAssessment::default();
        let timeline = TimelineAnalysis {
            verdict: TimelineVerdict::Indeterminate,
            incident_date: None,
            first_travel_date: None,
            submission_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            findings: vec![
                TimelineFinding::MissingDate {
                    fact: "incident_date".into(),
                },
                TimelineFinding::MissingDate {
                    fact: "travel_date".into(),
                },
            ],
        };
        let policy = PolicyMatch::NoMatch {
            reason: "nothing covered".into(),
        };
        let verdict = Verdict {
            outcome: Outcome::Uncertain,
            confidence: Confidence::new(dec!(0.5)),
            rule: PrecedenceRule::NoPolicyMatch,
        };

        let steps = ExplanationComposer.compose(&DecisionInputs {
            claim: &claim,
            fraud: &fraud,
            timeline: &timeline,
            policy: Some(&policy),
            degraded: &[],
            compensation: None,
            verdict: &verdict,
        });

        assert!(steps[0].starts_with("No fraud indicators"));
        assert!(steps[1].starts_with("Timeline INDETERMINATE"));
        assert!(steps[2].starts_with("Timeline INDETERMINATE"));
        assert_eq!(steps[3], "No policy clause matched: nothing covered.");
    }
}
