//! Pre-built Test Fixtures
//!
//! Consistent, predictable data for claim decision tests, including the
//! reference scenarios every engine change is checked against.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, Money};
use domain_adjudication::DecisionEngine;
use domain_claims::{DocumentQuality, FactBundle};
use domain_policy::PolicyClauseSet;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::builders::{ClaimBuilder, DocumentBuilder};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    /// Default claimed amount, below every clause cap
    pub fn eur_claimed() -> Money {
        Self::eur(dec!(1200.00))
    }
}

/// Fixture for dates used across the scenarios
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub const COVERAGE_START: &'static str = "2024-01-15";
    pub const INCIDENT_DATE: &'static str = "2024-03-10";
    pub const TRAVEL_DATE: &'static str = "2024-03-12";

    /// Claim submission timestamp, eight days after the incident
    pub fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 10, 0, 0).unwrap()
    }
}

/// Fixture for free-text content
pub struct StringFixtures;

impl StringFixtures {
    pub fn claimant_name() -> &'static str {
        "Marie Dupont"
    }

    pub fn medical_narrative() -> &'static str {
        "I was admitted to hospital with acute appendicitis and needed emergency surgery two days before my flight."
    }

    pub fn certificate_text() -> &'static str {
        "Patient admitted to hospital for acute appendicitis. Emergency surgery performed. Unable to travel."
    }

    pub fn healthy_certificate_text() -> &'static str {
        "Routine check-up. The patient is in good health and fit to travel."
    }
}

/// The reference scenarios
pub struct ScenarioFixtures;

impl ScenarioFixtures {
    pub fn clause_set() -> Arc<PolicyClauseSet> {
        Arc::new(PolicyClauseSet::cfsr_default().unwrap())
    }

    pub fn engine() -> DecisionEngine {
        DecisionEngine::new(Self::clause_set())
    }

    /// A: hospitalised two days before travel, fully marked certificate
    /// issued on the incident date
    pub fn hospitalised_before_travel() -> FactBundle {
        ClaimBuilder::new()
            .with_document(DocumentBuilder::medical_certificate())
            .build()
    }

    /// B: the medical certificate is a plain-text file
    pub fn text_file_certificate() -> FactBundle {
        ClaimBuilder::new()
            .with_document(
                DocumentBuilder::medical_certificate()
                    .with_source(domain_claims::ArtifactSource::Text)
                    .with_file_name("certificate.txt"),
            )
            .build()
    }

    /// C: incident dated ten days after the trip already started
    pub fn incident_after_travel() -> FactBundle {
        ClaimBuilder::new()
            .with_incident_date("2024-03-22")
            .submitted_at(Utc.with_ymd_and_hms(2024, 3, 25, 10, 0, 0).unwrap())
            .with_document(DocumentBuilder::medical_certificate().with_issue_date("2024-03-22"))
            .build()
    }

    /// D: everything consistent but the scan is low quality
    pub fn low_quality_scan() -> FactBundle {
        ClaimBuilder::new()
            .with_document(
                DocumentBuilder::medical_certificate().with_quality(DocumentQuality::Low),
            )
            .build()
    }

    /// E: certificate without stamp or letterhead naming a facility to verify
    pub fn unmarked_facility_certificate() -> FactBundle {
        ClaimBuilder::new()
            .with_document(
                DocumentBuilder::medical_certificate()
                    .without_official_mark()
                    .with_facility("Clinique Saint-Jean", Some("Lyon")),
            )
            .build()
    }

    /// Certificate says the patient is healthy while the narrative claims surgery
    pub fn health_contradiction() -> FactBundle {
        ClaimBuilder::new()
            .with_document(
                DocumentBuilder::medical_certificate()
                    .with_text(StringFixtures::healthy_certificate_text()),
            )
            .build()
    }

    /// Covered peril, but the narrative names a general exclusion
    pub fn work_commitments() -> FactBundle {
        ClaimBuilder::new()
            .with_narrative(
                "I cancelled because of work commitments; my boss needed me in the office.",
            )
            .with_document(
                DocumentBuilder::other()
                    .with_text("Letter from employer")
                    .with_issue_date(TemporalFixtures::INCIDENT_DATE),
            )
            .build()
    }

    /// Nothing in the narrative maps to a covered event
    pub fn uncovered_event() -> FactBundle {
        ClaimBuilder::new()
            .with_narrative("The hotel did not look like the photos so we stayed home.")
            .with_document(
                DocumentBuilder::other()
                    .with_text("Hotel brochure")
                    .with_issue_date(TemporalFixtures::INCIDENT_DATE),
            )
            .build()
    }
}
