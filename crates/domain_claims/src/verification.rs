//! Facility verification port
//!
//! Medical certificates without a stamp or letterhead leave the issuing
//! facility as the only thing tying the document to a real practice. When a
//! verification oracle is configured, those facilities are looked up before
//! the fraud checks run and the answers are handed to the engine as plain data.
//!
//! ```text
//! ┌──────────────┐  queries   ┌─────────────────────┐  verify()  ┌──────────────┐
//! │  FactBundle  │ ─────────▶ │ adjudication gateway│ ─────────▶ │    Oracle    │
//! └──────────────┘            └─────────────────────┘  (timeout) └──────────────┘
//!                                       │
//!                                       ▼ FacilityVerifications
//!                              ┌─────────────────────┐
//!                              │  FraudRuleEngine    │
//!                              └─────────────────────┘
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{DocumentId, DomainPort, PortError};
use crate::bundle::FactBundle;
use crate::document::{fact_names, DocumentKind};

/// Minimum oracle confidence for a negative answer to count as evidence
pub const UNVERIFIED_CONFIDENCE_THRESHOLD: Decimal = dec!(0.6);

/// A search result backing an oracle answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceLink {
    pub title: String,
    pub uri: String,
}

/// Answer returned by a verification oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityVerification {
    /// `None` when the oracle could not decide
    pub verified: Option<bool>,
    pub confidence: Decimal,
    #[serde(default)]
    pub evidence: Vec<EvidenceLink>,
}

impl FacilityVerification {
    pub fn verified(confidence: Decimal) -> Self {
        Self {
            verified: Some(true),
            confidence,
            evidence: Vec::new(),
        }
    }

    pub fn not_verified(confidence: Decimal) -> Self {
        Self {
            verified: Some(false),
            confidence,
            evidence: Vec::new(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            verified: None,
            confidence: Decimal::ZERO,
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, title: impl Into<String>, uri: impl Into<String>) -> Self {
        self.evidence.push(EvidenceLink {
            title: title.into(),
            uri: uri.into(),
        });
        self
    }

    /// A confident negative answer
    pub fn is_confidently_unverified(&self) -> bool {
        self.verified == Some(false) && self.confidence >= UNVERIFIED_CONFIDENCE_THRESHOLD
    }
}

/// Outcome of consulting the oracle for one facility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FacilityCheck {
    Answered(FacilityVerification),
    /// The oracle failed or timed out; the signal is dropped
    Unavailable { reason: String },
}

/// A facility that needs corroboration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityQuery {
    pub document: DocumentId,
    pub facility: String,
    pub location: Option<String>,
}

/// Selects the facilities worth verifying: named on a medical certificate
/// that carries neither a stamp nor a letterhead
pub fn facility_queries(bundle: &FactBundle) -> Vec<FacilityQuery> {
    bundle
        .documents()
        .iter()
        .filter(|doc| doc.kind == DocumentKind::MedicalCertificate)
        .filter(|doc| !doc.authenticity.has_official_mark())
        .filter_map(|doc| {
            let facility = doc.text_fact(fact_names::FACILITY_NAME)?.trim();
            if facility.is_empty() {
                return None;
            }
            Some(FacilityQuery {
                document: doc.id,
                facility: facility.to_string(),
                location: doc
                    .text_fact(fact_names::FACILITY_LOCATION)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Oracle results keyed by the document that named the facility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityVerifications(BTreeMap<DocumentId, FacilityCheck>);

impl FacilityVerifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, document: DocumentId, check: FacilityCheck) {
        self.0.insert(document, check);
    }

    pub fn get(&self, document: &DocumentId) -> Option<&FacilityCheck> {
        self.0.get(document)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocumentId, &FacilityCheck)> {
        self.0.iter()
    }

    /// Documents whose check could not be completed, with the reason
    pub fn unavailable(&self) -> impl Iterator<Item = (&DocumentId, &str)> {
        self.0.iter().filter_map(|(doc, check)| match check {
            FacilityCheck::Unavailable { reason } => Some((doc, reason.as_str())),
            FacilityCheck::Answered(_) => None,
        })
    }
}

/// External facility lookup (search service, registry, ...)
#[async_trait]
pub trait VerificationOracle: DomainPort {
    async fn verify(
        &self,
        facility: &str,
        location: Option<&str>,
    ) -> Result<FacilityVerification, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::claim::Claim;
    use crate::document::{ArtifactSource, AuthenticityProfile, Document, FactValue};

    fn certificate(stamped: bool) -> Document {
        let mut authenticity = AuthenticityProfile::verified();
        authenticity.has_official_stamp = stamped;
        authenticity.has_letterhead = false;
        Document::new(DocumentKind::MedicalCertificate, ArtifactSource::Image, "cert.jpg")
            .with_text("Certificate")
            .with_authenticity(authenticity)
            .with_fact(fact_names::FACILITY_NAME, FactValue::Name("Clinique du Parc".into()))
            .with_fact(fact_names::FACILITY_LOCATION, FactValue::Location("Lyon".into()))
    }

    #[test]
    fn test_queries_only_unmarked_certificates() {
        let unmarked = certificate(false);
        let unmarked_id = unmarked.id;
        let claim = Claim::new("Hospitalised", Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
            .with_document(unmarked)
            .with_document(certificate(true));

        let queries = facility_queries(&FactBundle::new(claim));

        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].document, unmarked_id);
        assert_eq!(queries[0].facility, "Clinique du Parc");
        assert_eq!(queries[0].location.as_deref(), Some("Lyon"));
    }

    #[test]
    fn test_confidence_threshold() {
        assert!(FacilityVerification::not_verified(dec!(0.6)).is_confidently_unverified());
        assert!(!FacilityVerification::not_verified(dec!(0.5)).is_confidently_unverified());
        assert!(!FacilityVerification::verified(dec!(0.9)).is_confidently_unverified());
        assert!(!FacilityVerification::unknown().is_confidently_unverified());
    }

    #[test]
    fn test_unavailable_listing() {
        let mut checks = FacilityVerifications::new();
        let (a, b) = (DocumentId::new(), DocumentId::new());
        checks.record(a, FacilityCheck::Answered(FacilityVerification::verified(dec!(0.9))));
        checks.record(b, FacilityCheck::Unavailable { reason: "timed out".into() });

        let unavailable: Vec<_> = checks.unavailable().collect();
        assert_eq!(unavailable, vec![(&b, "timed out")]);
    }
}
