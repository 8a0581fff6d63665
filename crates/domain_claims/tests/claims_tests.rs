//! Integration tests for domain_claims

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, DateInput, Money, Timezone};

use domain_claims::claim::{Claim, DeclaredDates};
use domain_claims::document::{
    fact_names, ArtifactSource, AuthenticityProfile, Document, DocumentKind, DocumentQuality,
    FactValue,
};
use domain_claims::bundle::FactBundle;
use domain_claims::fraud::{FraudRuleEngine, IndicatorCode, SeverityTier};
use domain_claims::timeline::{TimelineAnalyzer, TimelineVerdict};
use domain_claims::error::MissingRequirement;

fn certificate() -> Document {
    Document::new(DocumentKind::MedicalCertificate, ArtifactSource::Image, "certificate.jpg")
        .with_text("Patient admitted on 10 March 2024 with acute appendicitis.")
        .with_authenticity(AuthenticityProfile::verified())
        .with_fact(fact_names::ISSUE_DATE, FactValue::Date(DateInput::new("10 March 2024")))
        .with_fact(fact_names::PATIENT_NAME, FactValue::Name("Jane Doe".into()))
}

fn claim() -> Claim {
    Claim::new(
        "I was hospitalised for appendicitis and could not take my flight.",
        Utc.with_ymd_and_hms(2024, 3, 18, 9, 30, 0).unwrap(),
    )
    .with_claimant("Jane Doe")
    .with_claimed_amount(Money::new(dec!(1200), Currency::EUR))
    .with_declared_dates(DeclaredDates {
        incident: Some(DateInput::new("2024-03-10")),
        travel: vec![DateInput::new("2024-03-13")],
        coverage_start: Some(DateInput::new("2024-01-05")),
    })
}

// ============================================================================
// Fact Bundle Tests
// ============================================================================

mod bundle_tests {
    use super::*;

    #[test]
    fn test_bundle_round_trips_through_json() {
        let bundle = FactBundle::new(claim().with_document(certificate()))
            .with_jurisdiction(Timezone::parse("Europe/Paris").unwrap());

        let json = serde_json::to_string(&bundle).unwrap();
        let parsed: FactBundle = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, bundle);
    }

    #[test]
    fn test_bundle_from_external_json() {
        let json = r#"{
            "claim": {
                "id": "0190b5a2-7c4e-7d3a-9f12-3b4c5d6e7f80",
                "claimant_name": "Jane Doe",
                "narrative": "My father passed away the day before departure.",
                "declared_dates": { "incident": "2024-05-02", "travel": ["2024-05-03"] },
                "submitted_at": "2024-05-10T08:00:00Z",
                "claimed_amount": null,
                "documents": [{
                    "id": "0190b5a2-7c4e-7d3a-9f12-3b4c5d6e7f81",
                    "file_name": "death_certificate.pdf",
                    "kind": "other",
                    "source": "pdf",
                    "extracted_text": "Certificate of death",
                    "authenticity": {
                        "has_signature": true,
                        "has_official_stamp": true,
                        "has_letterhead": false,
                        "quality": "medium"
                    },
                    "structured_facts": {
                        "issue_date": { "type": "date", "value": "02.05.2024" }
                    }
                }]
            },
            "jurisdiction": "Europe/Berlin"
        }"#;

        let bundle: FactBundle = serde_json::from_str(json).unwrap();

        assert!(bundle.validate().is_ok());
        assert_eq!(bundle.documents()[0].authenticity.quality, DocumentQuality::Medium);
        assert_eq!(bundle.submission_date(), NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(
            TimelineAnalyzer::new().analyze(&bundle).verdict,
            TimelineVerdict::Consistent
        );
    }

    #[test]
    fn test_malformed_bundle_names_requirements() {
        let err = FactBundle::new(Claim::new("", Utc::now())).validate().unwrap_err();

        assert!(err.missing.contains(&MissingRequirement::Narrative));
        assert!(err.to_string().contains("at least one supporting document"));
    }
}

// ============================================================================
// Fraud Engine Tests
// ============================================================================

mod fraud_tests {
    use super::*;

    #[test]
    fn test_clean_claim_raises_nothing() {
        let bundle = FactBundle::new(claim().with_document(certificate()));
        assert!(FraudRuleEngine::default().evaluate(&bundle).is_empty());
    }

    #[test]
    fn test_incident_after_submission_is_tier_one() {
        let mut bundle = FactBundle::new(claim().with_document(certificate()));
        bundle.claim.declared_dates.incident = Some(DateInput::new("2024-03-25"));

        let assessment = FraudRuleEngine::default().evaluate(&bundle);

        assert_eq!(assessment.codes(), vec![IndicatorCode::DateInconsistency]);
        assert_eq!(assessment.max_severity, Some(SeverityTier::Tier1AutoDeny));
        assert!(assessment.indicators[0].evidence.document.is_none());
    }

    #[test]
    fn test_failed_extraction_is_conservative() {
        let doc = certificate().with_authenticity(AuthenticityProfile::extraction_failed());
        let bundle = FactBundle::new(claim().with_document(doc));

        let assessment = FraudRuleEngine::default().evaluate(&bundle);

        assert_eq!(
            assessment.codes(),
            vec![
                IndicatorCode::MissingSignature,
                IndicatorCode::MissingOfficialMark,
                IndicatorCode::LowQualityScan,
            ]
        );
        assert!(assessment.indicators[0]
            .evidence
            .description
            .contains("could not be extracted"));
    }

    #[test]
    fn test_police_report_requires_markers() {
        let report = Document::new(DocumentKind::PoliceReport, ArtifactSource::Text, "report.txt")
            .with_text("Theft of passport reported")
            .with_authenticity(AuthenticityProfile {
                has_signature: false,
                has_official_stamp: false,
                has_letterhead: false,
                ..AuthenticityProfile::verified()
            });
        let bundle = FactBundle::new(claim().with_document(certificate()).with_document(report));

        let codes = FraudRuleEngine::default().evaluate(&bundle).codes();

        // plain text is acceptable for police reports
        assert_eq!(
            codes,
            vec![IndicatorCode::MissingSignature, IndicatorCode::MissingOfficialMark]
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn quality() -> impl Strategy<Value = DocumentQuality> {
        prop_oneof![
            Just(DocumentQuality::High),
            Just(DocumentQuality::Medium),
            Just(DocumentQuality::Low),
            Just(DocumentQuality::Unreadable),
        ]
    }

    fn source() -> impl Strategy<Value = ArtifactSource> {
        prop_oneof![
            Just(ArtifactSource::Image),
            Just(ArtifactSource::Pdf),
            Just(ArtifactSource::Text),
            Just(ArtifactSource::Structured),
        ]
    }

    proptest! {
        #[test]
        fn indicators_are_sorted_by_tier(
            signature in any::<bool>(),
            stamp in any::<bool>(),
            manipulated in any::<bool>(),
            quality in quality(),
            source in source(),
        ) {
            let mut doc = certificate();
            doc.source = source;
            doc.authenticity.has_signature = signature;
            doc.authenticity.has_official_stamp = stamp;
            doc.authenticity.has_letterhead = false;
            doc.authenticity.manipulation_suspected = manipulated;
            doc.authenticity.quality = quality;
            let bundle = FactBundle::new(claim().with_document(doc));

            let engine = FraudRuleEngine::default();
            let first = engine.evaluate(&bundle);
            let second = engine.evaluate(&bundle);

            prop_assert_eq!(&first, &second);
            let tiers: Vec<_> = first.indicators.iter().map(|i| i.severity).collect();
            prop_assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(first.max_severity, tiers.first().copied());
        }

        #[test]
        fn image_derived_certificates_never_mismatch(source in source()) {
            let mut doc = certificate();
            doc.source = source;
            let bundle = FactBundle::new(claim().with_document(doc));

            let mismatch = FraudRuleEngine::default()
                .evaluate(&bundle)
                .codes()
                .contains(&IndicatorCode::FileTypeMismatch);

            prop_assert_eq!(mismatch, !source.is_image_derived());
        }
    }
}
