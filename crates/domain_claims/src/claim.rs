//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DateInput, Money};
use crate::document::{fact_names, Document};

/// Dates asserted by the claimant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDates {
    /// Date the cancelling event happened
    pub incident: Option<DateInput>,
    /// Planned travel dates affected by the cancellation
    #[serde(default)]
    pub travel: Vec<DateInput>,
    /// Date the trip and its cover were booked
    pub coverage_start: Option<DateInput>,
}

/// A submitted cancellation claim
///
/// Created once on submission and read-only afterwards; the decision engine
/// only ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Name of the insured person, if provided
    pub claimant_name: Option<String>,
    /// Free-text description of the incident
    pub narrative: String,
    /// Dates the claimant asserts
    #[serde(default)]
    pub declared_dates: DeclaredDates,
    /// When the claim was submitted
    pub submitted_at: DateTime<Utc>,
    /// Amount the claimant asks to be reimbursed
    pub claimed_amount: Option<Money>,
    /// Supporting documents in submission order
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Claim {
    /// Creates a claim with a narrative and submission timestamp
    pub fn new(narrative: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: ClaimId::new_v7(),
            claimant_name: None,
            narrative: narrative.into(),
            declared_dates: DeclaredDates::default(),
            submitted_at,
            claimed_amount: None,
            documents: Vec::new(),
        }
    }

    pub fn with_claimant(mut self, name: impl Into<String>) -> Self {
        self.claimant_name = Some(name.into());
        self
    }

    pub fn with_declared_dates(mut self, dates: DeclaredDates) -> Self {
        self.declared_dates = dates;
        self
    }

    pub fn with_claimed_amount(mut self, amount: Money) -> Self {
        self.claimed_amount = Some(amount);
        self
    }

    /// The amount to reimburse
    ///
    /// The declared amount wins; without one, the first `amount` fact on a
    /// receipt or booking record is used.
    pub fn reimbursable_amount(&self) -> Option<Money> {
        self.claimed_amount.or_else(|| {
            self.documents
                .iter()
                .filter(|doc| doc.kind.is_cost_evidence())
                .find_map(|doc| doc.fact(fact_names::AMOUNT)?.as_amount().copied())
        })
    }

    /// Appends a document, preserving submission order
    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }
}
