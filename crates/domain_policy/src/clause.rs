//! Policy clauses, their coverage predicates, exclusions and payout formulas

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Money, Rate};
use domain_claims::DocumentKind;

/// Covered peril families of the CFSR product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseCategory {
    /// Illness, injury or hospitalisation of the insured or a companion
    MedicalEmergency,
    /// Death of the insured's relative
    Bereavement,
    /// Court summons, jury duty and similar obligations
    LegalObligation,
    /// Theft or loss of travel documents
    TheftOrLoss,
    /// Carrier strike, cancellation or severe weather
    TravelDisruption,
    /// Serious damage to the insured's home
    HomeDamage,
}

impl fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClauseCategory::MedicalEmergency => "medical emergency",
            ClauseCategory::Bereavement => "bereavement",
            ClauseCategory::LegalObligation => "legal obligation",
            ClauseCategory::TheftOrLoss => "theft or loss",
            ClauseCategory::TravelDisruption => "travel disruption",
            ClauseCategory::HomeDamage => "home damage",
        };
        f.write_str(name)
    }
}

fn one() -> usize {
    1
}

/// What the narrative and documents must show for a clause to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveragePredicate {
    /// Narrative keywords signalling the covered event
    pub keywords: Vec<String>,
    /// Minimum number of distinct keywords that must appear
    #[serde(default = "one")]
    pub min_keyword_hits: usize,
    /// At least one document of these kinds must be present; empty means none
    #[serde(default)]
    pub document_kinds: Vec<DocumentKind>,
}

/// What makes an exclusion fire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum ExclusionTrigger {
    /// Any of these phrases is asserted in the narrative or a document
    Keywords { keywords: Vec<String> },
    /// The incident happened before the cover started
    IncidentBeforeCoverage,
}

/// A disqualifying condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Stable identifier, e.g. `pre_existing_condition`
    pub code: String,
    pub description: String,
    #[serde(flatten)]
    pub trigger: ExclusionTrigger,
}

/// Reimbursement rule of a clause
///
/// `payout = min((claimed − deductible) × percent, cap)`, never negative,
/// rounded to the currency's minor unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutFormula {
    pub reimbursement_percent: Decimal,
    #[serde(default)]
    pub cap: Option<Money>,
    #[serde(default)]
    pub deductible: Option<Money>,
}

impl PayoutFormula {
    pub fn full() -> Self {
        Self {
            reimbursement_percent: dec!(100),
            cap: None,
            deductible: None,
        }
    }

    pub fn rate(&self) -> Rate {
        Rate::from_percentage(self.reimbursement_percent)
    }
}

/// A unit of coverage policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyClause {
    /// Section reference in the policy wording, e.g. `3.1`
    pub section: String,
    pub title: String,
    pub category: ClauseCategory,
    pub covers: CoveragePredicate,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
    #[serde(default)]
    pub payout: Option<PayoutFormula>,
}

impl PolicyClause {
    /// `"3.1 Medical emergency"`
    pub fn reference(&self) -> String {
        format!("{} {}", self.section, self.title)
    }
}
