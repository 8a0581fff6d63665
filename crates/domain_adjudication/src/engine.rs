//! Decision engine
//!
//! The synchronous, pure core: one fact bundle in, one complete [`Decision`]
//! out. Per-claim problems (missing documents, ambiguous dates, an
//! unavailable payout) are absorbed into the decision as lower confidence
//! and reasoning steps; nothing escapes as an error.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::Money;
use domain_claims::{
    FactBundle, FacilityVerifications, FraudRuleEngine, SeverityTier, TimelineAnalyzer,
};
use domain_policy::{
    ClauseMatch, FormulaPayoutCalculator, PayoutCalculator, PolicyClauseSet, PolicyMatch,
    PolicyMatcher,
};
use crate::aggregator::{DecisionAggregator, Verdict};
use crate::decision::{Decision, DegradedSignal, Outcome};
use crate::explanation::{DecisionInputs, ExplanationComposer};

/// Facade over the fraud, timeline and policy components
pub struct DecisionEngine {
    fraud: FraudRuleEngine,
    timeline: TimelineAnalyzer,
    matcher: PolicyMatcher,
    aggregator: DecisionAggregator,
    composer: ExplanationComposer,
    payout: Option<Arc<dyn PayoutCalculator>>,
}

impl DecisionEngine {
    /// Standard fraud registry and the formula payout calculator
    pub fn new(clause_set: Arc<PolicyClauseSet>) -> Self {
        Self {
            fraud: FraudRuleEngine::default(),
            timeline: TimelineAnalyzer::new(),
            matcher: PolicyMatcher::new(clause_set),
            aggregator: DecisionAggregator::new(),
            composer: ExplanationComposer::new(),
            payout: Some(Arc::new(FormulaPayoutCalculator)),
        }
    }

    pub fn with_fraud_engine(mut self, fraud: FraudRuleEngine) -> Self {
        self.fraud = fraud;
        self
    }

    pub fn with_payout_calculator(mut self, payout: Arc<dyn PayoutCalculator>) -> Self {
        self.payout = Some(payout);
        self
    }

    /// Approvals will carry no compensation
    pub fn without_payout(mut self) -> Self {
        self.payout = None;
        self
    }

    pub fn clause_set(&self) -> &PolicyClauseSet {
        self.matcher.clause_set()
    }

    /// Decides a claim without facility verification answers
    pub fn decide(&self, bundle: &FactBundle) -> Decision {
        self.decide_with(bundle, &FacilityVerifications::default())
    }

    /// Decides a claim using facility answers gathered beforehand
    #[instrument(skip_all, fields(claim_id = %bundle.claim.id))]
    pub fn decide_with(
        &self,
        bundle: &FactBundle,
        verifications: &FacilityVerifications,
    ) -> Decision {
        let fraud = self.fraud.evaluate_with(bundle, verifications);
        let timeline = self.timeline.analyze(bundle);
        let mut degraded = input_degradations(bundle, verifications);

        let (verdict, policy) = if fraud.has_tier(SeverityTier::Tier1AutoDeny) {
            (self.aggregator.aggregate(&fraud, timeline.verdict, None), None)
        } else if let Err(malformed) = bundle.validate() {
            warn!(error = %malformed, "fact bundle is malformed");
            degraded.push(DegradedSignal::MalformedBundle {
                missing: malformed.missing,
            });
            (Verdict::malformed(), None)
        } else {
            let policy = self.matcher.match_claim(bundle);
            let verdict = self.aggregator.aggregate(&fraud, timeline.verdict, Some(&policy));
            (verdict, Some(policy))
        };

        let compensation = match (verdict.outcome, policy.as_ref().and_then(PolicyMatch::matched)) {
            (Outcome::Approve, Some(clause)) => self.compensation(clause, bundle, &mut degraded),
            _ => None,
        };

        let reasoning_steps = self.composer.compose(&DecisionInputs {
            claim: &bundle.claim,
            fraud: &fraud,
            timeline: &timeline,
            policy: policy.as_ref(),
            degraded: &degraded,
            compensation: compensation.as_ref(),
            verdict: &verdict,
        });

        info!(
            outcome = %verdict.outcome,
            confidence = %verdict.confidence,
            rule = %verdict.rule,
            indicators = fraud.indicators.len(),
            "claim decided"
        );

        Decision {
            claim_id: bundle.claim.id,
            outcome: verdict.outcome,
            confidence: verdict.confidence,
            matched_policy_section: policy
                .as_ref()
                .and_then(PolicyMatch::section)
                .map(str::to_string),
            fraud_indicators: fraud.indicators,
            reasoning_steps,
            compensation,
            timeline_verdict: timeline.verdict,
            rule: verdict.rule,
            degraded_signals: degraded,
        }
    }

    fn compensation(
        &self,
        clause: &ClauseMatch,
        bundle: &FactBundle,
        degraded: &mut Vec<DegradedSignal>,
    ) -> Option<Money> {
        let Some(payout) = &self.payout else {
            degraded.push(DegradedSignal::PayoutUnavailable {
                reason: "no payout calculator is configured".to_string(),
            });
            return None;
        };

        match payout.compute(clause, &bundle.claim) {
            Ok(amount) => Some(amount),
            Err(e) => {
                warn!(section = %clause.section, error = %e, "payout unavailable");
                degraded.push(DegradedSignal::PayoutUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("fraud", &self.fraud)
            .field("clause_set", &self.matcher.clause_set().label())
            .field("payout", &self.payout.is_some())
            .finish()
    }
}

/// Signals missing before evaluation started
fn input_degradations(
    bundle: &FactBundle,
    verifications: &FacilityVerifications,
) -> Vec<DegradedSignal> {
    let failed_extractions = bundle
        .documents()
        .iter()
        .filter(|doc| doc.authenticity.extraction_failed)
        .map(|doc| DegradedSignal::AuthenticityExtractionFailed {
            document: doc.id,
            file_name: doc.file_name.clone(),
        });

    let unavailable = verifications.unavailable().map(|(document, reason)| {
        DegradedSignal::FacilityVerificationUnavailable {
            document: *document,
            reason: reason.to_string(),
        }
    });

    failed_extractions.chain(unavailable).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use core_kernel::{Currency, DateInput};
    use domain_claims::{
        fact_names, ArtifactSource, AuthenticityProfile, Claim, DeclaredDates, Document,
        DocumentKind, FactValue,
    };

    fn engine() -> DecisionEngine {
        DecisionEngine::new(Arc::new(PolicyClauseSet::cfsr_default().unwrap()))
    }

    fn hospital_bundle() -> FactBundle {
        let certificate =
            Document::new(DocumentKind::MedicalCertificate, ArtifactSource::Image, "cert.jpg")
                .with_text("Patient admitted to emergency, hospitalised for surgery")
                .with_authenticity(AuthenticityProfile::verified())
                .with_fact(fact_names::ISSUE_DATE, FactValue::Date(DateInput::new("2024-03-10")));
        let claim = Claim::new(
            "I was hospitalised for emergency surgery two days before my flight.",
            Utc.with_ymd_and_hms(2024, 3, 20, 10, 0, 0).unwrap(),
        )
        .with_claimed_amount(Money::new(dec!(1200), Currency::EUR))
        .with_declared_dates(DeclaredDates {
            incident: Some(DateInput::new("2024-03-10")),
            travel: vec![DateInput::new("2024-03-12")],
            coverage_start: Some(DateInput::new("2024-01-15")),
        })
        .with_document(certificate);
        FactBundle::new(claim)
    }

    #[test]
    fn test_clean_claim_is_approved_with_compensation() {
        let decision = engine().decide(&hospital_bundle());

        assert_eq!(decision.outcome, Outcome::Approve);
        assert_eq!(decision.matched_policy_section.as_deref(), Some("3.1"));
        assert_eq!(decision.compensation, Some(Money::new(dec!(1200), Currency::EUR)));
        assert!(decision.degraded_signals.is_empty());

        let justification = decision.justification();
        assert!(justification.starts_with(&decision.reasoning_steps[0]));
        assert!(decision
            .reasoning_steps
            .iter()
            .all(|step| justification.contains(step.as_str())));
    }

    #[test]
    fn test_approval_without_calculator_flags_missing_payout() {
        let decision = engine().without_payout().decide(&hospital_bundle());

        assert_eq!(decision.outcome, Outcome::Approve);
        assert!(decision.compensation.is_none());
        assert!(matches!(
            decision.degraded_signals.as_slice(),
            [DegradedSignal::PayoutUnavailable { .. }]
        ));
        assert!(decision
            .reasoning_steps
            .iter()
            .any(|step| step.starts_with("Compensation could not be computed")));
    }

    #[test]
    fn test_empty_claim_is_uncertain_not_an_error() {
        let bundle = FactBundle::new(Claim::new(
            "",
            Utc.with_ymd_and_hms(2024, 3, 20, 10, 0, 0).unwrap(),
        ));

        let decision = engine().decide(&bundle);

        assert_eq!(decision.outcome, Outcome::Uncertain);
        assert_eq!(decision.confidence.value(), dec!(0.30));
        assert!(decision.matched_policy_section.is_none());
        assert!(decision
            .reasoning_steps
            .iter()
            .any(|step| step.contains("missing a narrative")));
    }
}
