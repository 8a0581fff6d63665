//! Integration tests for domain_policy

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{Currency, DateInput, Money};
use domain_claims::{ArtifactSource, Claim, DeclaredDates, Document, DocumentKind, FactBundle};

use domain_policy::clause_set::PolicyClauseSet;
use domain_policy::matcher::{PolicyMatch, PolicyMatcher};
use domain_policy::payout::{FormulaPayoutCalculator, PayoutCalculator};
use domain_policy::error::PolicyError;

fn bundle(narrative: &str, kind: DocumentKind, text: &str) -> FactBundle {
    let claim = Claim::new(narrative, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        .with_claimed_amount(Money::new(dec!(2400), Currency::EUR))
        .with_declared_dates(DeclaredDates {
            incident: Some(DateInput::new("2024-05-20")),
            travel: vec![DateInput::new("2024-05-22")],
            coverage_start: Some(DateInput::new("2024-04-01")),
        })
        .with_document(Document::new(kind, ArtifactSource::Pdf, "evidence.pdf").with_text(text));
    FactBundle::new(claim)
}

fn matcher() -> PolicyMatcher {
    PolicyMatcher::new(Arc::new(PolicyClauseSet::cfsr_default().unwrap()))
}

// ============================================================================
// Clause Set Loading Tests
// ============================================================================

mod clause_set_tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("cfsr-clauses-{}.json", std::process::id()));
        let default = PolicyClauseSet::cfsr_default().unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(&default).unwrap()).unwrap();

        let loaded = PolicyClauseSet::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, default);
    }

    #[test]
    fn test_missing_file() {
        let err = PolicyClauseSet::from_file(std::path::Path::new("/nonexistent/clauses.json"))
            .unwrap_err();
        assert!(matches!(err, PolicyError::FileNotFound(_)));
        assert!(err.is_fatal());
    }
}

// ============================================================================
// Matching Tests
// ============================================================================

mod matching_tests {
    use super::*;

    #[test]
    fn test_bereavement_with_death_certificate() {
        let result = matcher().match_claim(&bundle(
            "My grandmother passed away and the funeral was held the day we were due to fly.",
            DocumentKind::Other,
            "Certificate of death",
        ));

        assert_eq!(result.section(), Some("3.2"));
        assert!(!result.is_excluded());
    }

    #[test]
    fn test_carrier_strike_with_booking() {
        let result = matcher().match_claim(&bundle(
            "The airline cancelled our flight because of a pilots' strike.",
            DocumentKind::BookingRecord,
            "Flight AF123 cancelled",
        ));

        assert_eq!(result.section(), Some("3.5"));
    }

    #[test]
    fn test_work_commitments_are_excluded_even_with_covered_event() {
        let result = matcher().match_claim(&bundle(
            "A storm was forecast but mostly I had work commitments.",
            DocumentKind::Other,
            "Weather bulletin",
        ));

        match result {
            PolicyMatch::Matched(m) => {
                assert_eq!(m.section, "3.5");
                assert_eq!(m.exclusion.unwrap().code, "work_commitments");
            }
            other => panic!("expected an excluded match, got {:?}", other),
        }
    }

    #[test]
    fn test_visa_refusal_is_excluded_not_unmatched() {
        let result = matcher().match_claim(&bundle(
            "My visa was refused by the consulate.",
            DocumentKind::Other,
            "Refusal letter",
        ));

        assert!(result.is_excluded());
        assert!(!result.is_no_match());
    }
}

// ============================================================================
// Payout Tests
// ============================================================================

mod payout_tests {
    use super::*;

    #[test]
    fn test_medical_payout_capped() {
        let b = bundle(
            "I was hospitalised after an accident.",
            DocumentKind::MedicalCertificate,
            "Admitted to emergency",
        );
        let result = matcher().match_claim(&b);
        let clause = result.matched().unwrap();

        let payout = FormulaPayoutCalculator.compute(clause, &b.claim).unwrap();

        assert_eq!(payout, Money::new(dec!(2400), Currency::EUR));
    }

    #[test]
    fn test_general_exclusion_has_no_payout() {
        let b = bundle("I changed my mind.", DocumentKind::Other, "Letter");
        let result = matcher().match_claim(&b);

        let err = FormulaPayoutCalculator
            .compute(result.matched().unwrap(), &b.claim)
            .unwrap_err();
        assert!(matches!(err, PolicyError::NoPayoutFormula(_)));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn matching_is_deterministic_and_strength_bounded(narrative in "[a-z ]{0,80}") {
            let b = bundle(&narrative, DocumentKind::Other, "");
            let m = matcher();

            let first = m.match_claim(&b);
            prop_assert_eq!(&first, &m.match_claim(&b));
            if let Some(clause) = first.matched() {
                prop_assert!(clause.strength > dec!(0) && clause.strength <= dec!(1));
            }
        }
    }
}
