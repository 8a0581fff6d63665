//! Property-Based Test Generators
//!
//! Proptest strategies for documents, claims and indicator sets. Generated
//! bundles stay inside the realistic range: dates around the fixture
//! timeline, narratives drawn from covered, excluded and uncovered events.

use chrono::{Duration, NaiveDate};
use domain_claims::{
    AuthenticityProfile, ArtifactSource, Document, DocumentKind, DocumentQuality, FactBundle,
    IndicatorCode,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::{ClaimBuilder, DocumentBuilder};

const NARRATIVES: &[&str] = &[
    "I was admitted to hospital with acute appendicitis and needed emergency surgery.",
    "My father passed away and the funeral was held on the day of departure.",
    "I received a court summons to appear as a witness.",
    "My passport was stolen at the train station.",
    "The airline cancelled our flight because of a strike.",
    "A storm flooded the house and the apartment had water damage.",
    "I changed my mind about the trip.",
    "My visa was refused by the consulate.",
    "Work commitments came up at the last minute.",
    "We simply did not feel like travelling.",
    "I have a pre-existing condition that flared up and I was hospitalised.",
];

const PATIENT_NAMES: &[&str] = &["Marie Dupont", "M. Dupont", "Jean Martin"];

const DOCUMENT_TEXTS: &[&str] = &[
    "",
    "Patient admitted to hospital. Emergency surgery performed.",
    "The patient is in good health and fit to travel.",
    "Certificate of death",
    "Report of theft filed at the station",
    "Flight cancelled due to strike",
    "Court summons",
];

pub fn document_kind_strategy() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![
        Just(DocumentKind::MedicalCertificate),
        Just(DocumentKind::BookingRecord),
        Just(DocumentKind::PoliceReport),
        Just(DocumentKind::Receipt),
        Just(DocumentKind::Other),
    ]
}

pub fn artifact_source_strategy() -> impl Strategy<Value = ArtifactSource> {
    prop_oneof![
        4 => Just(ArtifactSource::Image),
        3 => Just(ArtifactSource::Pdf),
        1 => Just(ArtifactSource::Text),
        1 => Just(ArtifactSource::Structured),
    ]
}

pub fn quality_strategy() -> impl Strategy<Value = DocumentQuality> {
    prop_oneof![
        Just(DocumentQuality::High),
        Just(DocumentQuality::Medium),
        Just(DocumentQuality::Low),
        Just(DocumentQuality::Unreadable),
    ]
}

/// Profiles from clean to degraded, including failed extraction
pub fn authenticity_strategy() -> impl Strategy<Value = AuthenticityProfile> {
    let extracted = (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        quality_strategy(),
        prop::bool::weighted(0.1),
        prop::collection::vec(Just("mixed fonts".to_string()), 0..2),
    )
        .prop_map(
            |(signature, stamp, letterhead, quality, manipulated, formatting)| AuthenticityProfile {
                has_signature: signature,
                has_official_stamp: stamp,
                has_letterhead: letterhead,
                quality,
                manipulation_suspected: manipulated,
                formatting_issues: formatting,
                extraction_failed: false,
            },
        );

    prop_oneof![
        9 => extracted,
        1 => Just(AuthenticityProfile::extraction_failed()),
    ]
}

/// ISO date within a few weeks of the fixture incident date
pub fn iso_date_strategy() -> impl Strategy<Value = String> {
    (-20i64..40i64).prop_map(|offset| {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default();
        (base + Duration::days(offset)).format("%Y-%m-%d").to_string()
    })
}

pub fn document_strategy() -> impl Strategy<Value = Document> {
    (
        document_kind_strategy(),
        artifact_source_strategy(),
        authenticity_strategy(),
        prop::sample::select(DOCUMENT_TEXTS),
        prop::option::of(iso_date_strategy()),
        prop::option::of(prop::sample::select(PATIENT_NAMES)),
    )
        .prop_map(|(kind, source, authenticity, text, issued, patient)| {
            let mut builder = DocumentBuilder::new(kind)
                .with_source(source)
                .with_authenticity(authenticity)
                .with_text(text);
            if let Some(issued) = issued {
                builder = builder.with_issue_date(&issued);
            }
            if let Some(patient) = patient {
                builder = builder.with_patient_name(patient);
            }
            builder.build()
        })
}

/// Arbitrary but well-formed-looking fact bundles
pub fn bundle_strategy() -> impl Strategy<Value = FactBundle> {
    (
        prop::sample::select(NARRATIVES),
        prop::option::of(iso_date_strategy()),
        prop::collection::vec(iso_date_strategy(), 0..3),
        prop::collection::vec(document_strategy(), 0..4),
        (100i64..10_000i64).prop_map(|units| Decimal::new(units, 0)),
    )
        .prop_map(|(narrative, incident, travel, documents, amount)| {
            let travel: Vec<&str> = travel.iter().map(String::as_str).collect();
            let mut builder = ClaimBuilder::new()
                .with_narrative(narrative)
                .with_travel_dates(&travel)
                .with_claimed_amount(amount);
            builder = match incident {
                Some(date) => builder.with_incident_date(date),
                None => builder.without_incident_date(),
            };
            for document in documents {
                builder = builder.with_built_document(document);
            }
            builder.build()
        })
}

/// Tier 2 and Tier 3 indicator codes
pub fn non_tier1_code_strategy() -> impl Strategy<Value = IndicatorCode> {
    prop::sample::select(vec![
        IndicatorCode::MissingSignature,
        IndicatorCode::MissingOfficialMark,
        IndicatorCode::NameMismatch,
        IndicatorCode::VisualManipulation,
        IndicatorCode::UnverifiedFacility,
        IndicatorCode::DistantTravelDate,
        IndicatorCode::LowQualityScan,
        IndicatorCode::FormattingInconsistency,
    ])
}

/// Tier 1 indicator codes
pub fn tier1_code_strategy() -> impl Strategy<Value = IndicatorCode> {
    prop::sample::select(vec![
        IndicatorCode::FileTypeMismatch,
        IndicatorCode::DateInconsistency,
        IndicatorCode::HealthContradiction,
    ])
}
