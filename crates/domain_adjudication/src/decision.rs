//! Decision model
//!
//! A [`Decision`] is produced once per engine invocation and never mutated.
//! It carries no timestamp and no random component: deciding the same fact
//! bundle twice yields equal values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ClaimId, DocumentId, Money};
use domain_claims::{FraudIndicator, MissingRequirement, TimelineVerdict};

/// Final outcome of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Approve,
    Deny,
    Uncertain,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Approve => "APPROVE",
            Outcome::Deny => "DENY",
            Outcome::Uncertain => "UNCERTAIN",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence in an outcome, in [0, 1] with two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(Decimal);

impl Confidence {
    pub const ZERO: Confidence = Confidence(Decimal::ZERO);
    pub const ONE: Confidence = Confidence(Decimal::ONE);

    /// Clamps into [0, 1] and rounds to two decimal places
    pub fn new(value: Decimal) -> Self {
        Self(value.clamp(Decimal::ZERO, Decimal::ONE).round_dp(2))
    }

    /// `base - penalty * count`, never below `floor`
    pub fn penalized(base: Decimal, penalty: Decimal, count: usize, floor: Decimal) -> Self {
        let reduced = base - penalty * Decimal::from(count);
        Self::new(reduced.max(floor))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::new(dec!(0.5))
    }
}

/// Precedence rule that settled a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecedenceRule {
    /// 1. a Tier 1 fraud indicator is present
    Tier1Fraud,
    /// 2. the matched clause is excluded
    PolicyExcluded,
    /// 3. no clause matched
    NoPolicyMatch,
    /// 4. the timeline contradicts itself
    TimelineInconsistent,
    /// 5. timeline indeterminate or strong indicators present
    WeakEvidence,
    /// 6. only weak indicators remain
    Tier3Only,
    /// 7. nothing against the claim
    Clean,
    /// The fact bundle is structurally incomplete
    MalformedBundle,
}

impl PrecedenceRule {
    /// Position in the precedence table; 0 for the malformed-bundle guard
    pub fn number(&self) -> u8 {
        match self {
            PrecedenceRule::MalformedBundle => 0,
            PrecedenceRule::Tier1Fraud => 1,
            PrecedenceRule::PolicyExcluded => 2,
            PrecedenceRule::NoPolicyMatch => 3,
            PrecedenceRule::TimelineInconsistent => 4,
            PrecedenceRule::WeakEvidence => 5,
            PrecedenceRule::Tier3Only => 6,
            PrecedenceRule::Clean => 7,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PrecedenceRule::Tier1Fraud => "an auto-deny fraud indicator is present",
            PrecedenceRule::PolicyExcluded => "a policy exclusion applies",
            PrecedenceRule::NoPolicyMatch => "no policy clause covers the claim",
            PrecedenceRule::TimelineInconsistent => "the claim timeline is inconsistent",
            PrecedenceRule::WeakEvidence => {
                "the timeline is indeterminate or strong fraud indicators are present"
            }
            PrecedenceRule::Tier3Only => "covered, with weak indicators only",
            PrecedenceRule::Clean => "covered, with no indicators and a consistent timeline",
            PrecedenceRule::MalformedBundle => "the fact bundle is incomplete",
        }
    }
}

impl fmt::Display for PrecedenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecedenceRule::MalformedBundle => write!(f, "malformed-bundle guard"),
            rule => write!(f, "rule {}", rule.number()),
        }
    }
}

/// A signal that could not be obtained and was dropped from the decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum DegradedSignal {
    /// The verification oracle failed or timed out
    FacilityVerificationUnavailable { document: DocumentId, reason: String },
    /// Authenticity cues are placeholders for this document
    AuthenticityExtractionFailed { document: DocumentId, file_name: String },
    /// The claim is covered but no amount could be computed
    PayoutUnavailable { reason: String },
    /// Structural requirements are missing
    MalformedBundle { missing: Vec<MissingRequirement> },
}

impl fmt::Display for DegradedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedSignal::FacilityVerificationUnavailable { document, reason } => write!(
                f,
                "Facility verification for {} was unavailable ({}); the signal was dropped.",
                document, reason
            ),
            DegradedSignal::AuthenticityExtractionFailed { file_name, .. } => write!(
                f,
                "Authenticity cues for '{}' could not be extracted; the document is treated as unreadable.",
                file_name
            ),
            DegradedSignal::PayoutUnavailable { reason } => write!(
                f,
                "Compensation could not be computed ({}); it is left unset.",
                reason
            ),
            DegradedSignal::MalformedBundle { missing } => {
                let missing: Vec<String> = missing.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "The claim cannot be assessed: it is missing {}.",
                    missing.join(", ")
                )
            }
        }
    }
}

/// The engine's output for one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub claim_id: ClaimId,
    pub outcome: Outcome,
    pub confidence: Confidence,
    /// Section of the clause the claim was classified under
    pub matched_policy_section: Option<String>,
    /// Most severe first
    pub fraud_indicators: Vec<FraudIndicator>,
    pub reasoning_steps: Vec<String>,
    /// Only set when the outcome is APPROVE
    pub compensation: Option<Money>,
    pub timeline_verdict: TimelineVerdict,
    pub rule: PrecedenceRule,
    #[serde(default)]
    pub degraded_signals: Vec<DegradedSignal>,
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        self.outcome == Outcome::Approve
    }

    /// The reasoning steps joined into one justification paragraph
    pub fn justification(&self) -> String {
        self.reasoning_steps.join(" ")
    }
}
