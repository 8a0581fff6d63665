//! Fraud rule engine
//!
//! A fixed registry of independent, side-effect-free checks. Every check
//! sees the whole fact bundle and fires at most once; the engine always runs
//! the full registry so the explanation can cite every concern, even when a
//! Tier 1 indicator already settles the outcome.
//!
//! # Registry
//!
//! | Tier | Checks |
//! |------|--------|
//! | 1 (auto-deny) | file type mismatch, incident after submission, health contradiction |
//! | 2 (strong) | missing signature, missing stamp/letterhead, name mismatch, visual manipulation, unverified facility |
//! | 3 (weak) | distant travel date, low quality scan, formatting inconsistency |
//!
//! Output is ordered by tier, then by registration order.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use core_kernel::DocumentId;
use crate::bundle::FactBundle;
use crate::document::{fact_names, Document, DocumentKind};
use crate::error::ClaimError;
use crate::text::{self, HEALTHY_PHRASES, INCAPACITATION_PHRASES};
use crate::timeline;
use crate::verification::{FacilityCheck, FacilityVerifications};

/// Severity of a fraud indicator; lower tiers dominate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityTier {
    #[serde(rename = "TIER_1_AUTO_DENY")]
    Tier1AutoDeny,
    #[serde(rename = "TIER_2_STRONG")]
    Tier2Strong,
    #[serde(rename = "TIER_3_WEAK")]
    Tier3Weak,
}

impl SeverityTier {
    pub fn level(&self) -> u8 {
        match self {
            SeverityTier::Tier1AutoDeny => 1,
            SeverityTier::Tier2Strong => 2,
            SeverityTier::Tier3Weak => 3,
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeverityTier::Tier1AutoDeny => "Tier 1 (auto-deny)",
            SeverityTier::Tier2Strong => "Tier 2 (strong)",
            SeverityTier::Tier3Weak => "Tier 3 (weak)",
        };
        f.write_str(label)
    }
}

/// Stable identifier of a fraud check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCode {
    FileTypeMismatch,
    DateInconsistency,
    HealthContradiction,
    MissingSignature,
    MissingOfficialMark,
    NameMismatch,
    VisualManipulation,
    UnverifiedFacility,
    DistantTravelDate,
    LowQualityScan,
    FormattingInconsistency,
}

impl IndicatorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorCode::FileTypeMismatch => "file_type_mismatch",
            IndicatorCode::DateInconsistency => "date_inconsistency",
            IndicatorCode::HealthContradiction => "health_contradiction",
            IndicatorCode::MissingSignature => "missing_signature",
            IndicatorCode::MissingOfficialMark => "missing_official_mark",
            IndicatorCode::NameMismatch => "name_mismatch",
            IndicatorCode::VisualManipulation => "visual_manipulation",
            IndicatorCode::UnverifiedFacility => "unverified_facility",
            IndicatorCode::DistantTravelDate => "distant_travel_date",
            IndicatorCode::LowQualityScan => "low_quality_scan",
            IndicatorCode::FormattingInconsistency => "formatting_inconsistency",
        }
    }

    /// The tier every indicator with this code carries
    pub fn tier(&self) -> SeverityTier {
        match self {
            IndicatorCode::FileTypeMismatch
            | IndicatorCode::DateInconsistency
            | IndicatorCode::HealthContradiction => SeverityTier::Tier1AutoDeny,
            IndicatorCode::MissingSignature
            | IndicatorCode::MissingOfficialMark
            | IndicatorCode::NameMismatch
            | IndicatorCode::VisualManipulation
            | IndicatorCode::UnverifiedFacility => SeverityTier::Tier2Strong,
            IndicatorCode::DistantTravelDate
            | IndicatorCode::LowQualityScan
            | IndicatorCode::FormattingInconsistency => SeverityTier::Tier3Weak,
        }
    }
}

impl fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a check found and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Originating document; `None` when the concern is about the claim itself
    pub document: Option<DocumentId>,
    pub description: String,
}

impl Evidence {
    pub fn in_document(document: &Document, description: impl Into<String>) -> Self {
        Self {
            document: Some(document.id),
            description: description.into(),
        }
    }

    pub fn in_claim(description: impl Into<String>) -> Self {
        Self {
            document: None,
            description: description.into(),
        }
    }
}

/// A single detected concern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudIndicator {
    pub code: IndicatorCode,
    pub severity: SeverityTier,
    pub evidence: Evidence,
}

/// Inputs visible to every check
#[derive(Debug, Clone, Copy)]
pub struct EvidenceContext<'a> {
    pub bundle: &'a FactBundle,
    pub verifications: &'a FacilityVerifications,
}

/// One registered fraud check
pub trait FraudCheck: Send + Sync {
    fn code(&self) -> IndicatorCode;

    fn tier(&self) -> SeverityTier {
        self.code().tier()
    }

    /// Returns evidence when the check fires
    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence>;
}

/// Tunable thresholds for the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudRuleConfig {
    /// Travel this many days or more past submission is flagged as distant
    pub distant_travel_days: i64,
}

impl Default for FraudRuleConfig {
    fn default() -> Self {
        Self {
            distant_travel_days: 180,
        }
    }
}

/// Indicators produced for one bundle, most severe first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudAssessment {
    pub indicators: Vec<FraudIndicator>,
    pub max_severity: Option<SeverityTier>,
}

impl FraudAssessment {
    pub fn from_indicators(mut indicators: Vec<FraudIndicator>) -> Self {
        // stable: ties keep registration order
        indicators.sort_by_key(|indicator| indicator.severity);
        let max_severity = indicators.first().map(|indicator| indicator.severity);
        Self {
            indicators,
            max_severity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn has_tier(&self, tier: SeverityTier) -> bool {
        self.indicators.iter().any(|i| i.severity == tier)
    }

    pub fn count(&self, tier: SeverityTier) -> usize {
        self.indicators.iter().filter(|i| i.severity == tier).count()
    }

    pub fn codes(&self) -> Vec<IndicatorCode> {
        self.indicators.iter().map(|i| i.code).collect()
    }
}

/// Runs the registered checks against a fact bundle
pub struct FraudRuleEngine {
    checks: Vec<Box<dyn FraudCheck>>,
}

impl FraudRuleEngine {
    /// Builds the standard registry
    pub fn new(config: FraudRuleConfig) -> Result<Self, ClaimError> {
        if config.distant_travel_days <= 0 {
            return Err(ClaimError::InvalidRuleConfig(format!(
                "distant_travel_days must be positive, got {}",
                config.distant_travel_days
            )));
        }
        Ok(Self::with_checks(standard_checks(config)))
    }

    /// Builds an engine from an explicit registry, preserving its order
    pub fn with_checks(checks: Vec<Box<dyn FraudCheck>>) -> Self {
        Self { checks }
    }

    /// Registered codes in registration order
    pub fn registered(&self) -> Vec<IndicatorCode> {
        self.checks.iter().map(|check| check.code()).collect()
    }

    pub fn evaluate(&self, bundle: &FactBundle) -> FraudAssessment {
        self.evaluate_with(bundle, &FacilityVerifications::default())
    }

    /// Evaluates with facility answers gathered beforehand
    pub fn evaluate_with(
        &self,
        bundle: &FactBundle,
        verifications: &FacilityVerifications,
    ) -> FraudAssessment {
        let ctx = EvidenceContext {
            bundle,
            verifications,
        };

        let indicators = self
            .checks
            .iter()
            .filter_map(|check| {
                check.check(&ctx).map(|evidence| FraudIndicator {
                    code: check.code(),
                    severity: check.tier(),
                    evidence,
                })
            })
            .collect();

        let assessment = FraudAssessment::from_indicators(indicators);
        debug!(
            claim_id = %bundle.claim.id,
            indicators = assessment.indicators.len(),
            max_severity = ?assessment.max_severity,
            "fraud checks evaluated"
        );
        assessment
    }
}

impl Default for FraudRuleEngine {
    fn default() -> Self {
        Self::with_checks(standard_checks(FraudRuleConfig::default()))
    }
}

impl fmt::Debug for FraudRuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FraudRuleEngine")
            .field("checks", &self.registered())
            .finish()
    }
}

fn standard_checks(config: FraudRuleConfig) -> Vec<Box<dyn FraudCheck>> {
    vec![
        Box::new(FileTypeMismatch),
        Box::new(IncidentAfterSubmission),
        Box::new(HealthContradiction),
        Box::new(MissingSignature),
        Box::new(MissingOfficialMark),
        Box::new(NameMismatch),
        Box::new(VisualManipulation),
        Box::new(UnverifiedFacility),
        Box::new(DistantTravelDate {
            threshold: Duration::days(config.distant_travel_days),
        }),
        Box::new(LowQualityScan),
        Box::new(FormattingInconsistency),
    ]
}

fn first_document<'a>(
    ctx: &EvidenceContext<'a>,
    predicate: impl Fn(&Document) -> bool,
) -> Option<&'a Document> {
    ctx.bundle.documents().iter().find(|doc| predicate(doc))
}

// Tier 1

struct FileTypeMismatch;

impl FraudCheck for FileTypeMismatch {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::FileTypeMismatch
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let doc = first_document(ctx, |doc| {
            doc.kind.requires_image_artifact() && !doc.source.is_image_derived()
        })?;
        Some(Evidence::in_document(
            doc,
            format!(
                "{} was submitted as a {} file; this document kind is only accepted as a scan or photo",
                doc.label(),
                doc.source.as_str()
            ),
        ))
    }
}

struct IncidentAfterSubmission;

impl FraudCheck for IncidentAfterSubmission {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::DateInconsistency
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let submitted = ctx.bundle.submission_date();
        timeline::incident_dates(ctx.bundle)
            .into_iter()
            .find_map(|date| {
                let incident = date.resolved.ok().filter(|d| *d > submitted)?;
                Some(Evidence {
                    document: date.document,
                    description: format!(
                        "incident date {} is after the claim submission date {}",
                        incident, submitted
                    ),
                })
            })
    }
}

struct HealthContradiction;

impl FraudCheck for HealthContradiction {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::HealthContradiction
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let claimed = text::first_asserted(&ctx.bundle.claim.narrative, INCAPACITATION_PHRASES)?;
        ctx.bundle
            .documents()
            .iter()
            .filter(|doc| doc.kind == DocumentKind::MedicalCertificate)
            // a certificate that also records incapacitation does not declare the patient fit
            .filter(|doc| {
                text::first_asserted(&doc.extracted_text, INCAPACITATION_PHRASES).is_none()
            })
            .find_map(|doc| {
                let healthy = text::first_current(&doc.extracted_text, HEALTHY_PHRASES)?;
                Some(Evidence::in_document(
                    doc,
                    format!(
                        "{} states the patient is \"{}\" while the narrative claims \"{}\"",
                        doc.label(),
                        healthy,
                        claimed
                    ),
                ))
            })
    }
}

// Tier 2

struct MissingSignature;

impl FraudCheck for MissingSignature {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::MissingSignature
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let doc = first_document(ctx, |doc| {
            doc.kind.requires_signature() && !doc.authenticity.has_signature
        })?;
        Some(Evidence::in_document(
            doc,
            format!("{} carries no signature{}", doc.label(), unknown_suffix(doc)),
        ))
    }
}

struct MissingOfficialMark;

impl FraudCheck for MissingOfficialMark {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::MissingOfficialMark
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let doc = first_document(ctx, |doc| {
            doc.kind.requires_official_mark() && !doc.authenticity.has_official_mark()
        })?;
        Some(Evidence::in_document(
            doc,
            format!(
                "{} carries neither an official stamp nor a letterhead{}",
                doc.label(),
                unknown_suffix(doc)
            ),
        ))
    }
}

fn unknown_suffix(doc: &Document) -> &'static str {
    if doc.authenticity.extraction_failed {
        " (authenticity cues could not be extracted)"
    } else {
        ""
    }
}

struct NameMismatch;

impl FraudCheck for NameMismatch {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::NameMismatch
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let claimant = ctx.bundle.claim.claimant_name.as_deref()?;
        ctx.bundle.documents().iter().find_map(|doc| {
            let subject = doc.text_fact(fact_names::PATIENT_NAME)?;
            (!text::names_match(claimant, subject)).then(|| {
                Evidence::in_document(
                    doc,
                    format!(
                        "{} names \"{}\" but the claimant is \"{}\"",
                        doc.label(),
                        subject,
                        claimant
                    ),
                )
            })
        })
    }
}

struct VisualManipulation;

impl FraudCheck for VisualManipulation {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::VisualManipulation
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let doc = first_document(ctx, |doc| doc.authenticity.manipulation_suspected)?;
        Some(Evidence::in_document(
            doc,
            format!("{} shows signs of visual manipulation", doc.label()),
        ))
    }
}

struct UnverifiedFacility;

impl FraudCheck for UnverifiedFacility {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::UnverifiedFacility
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        ctx.bundle.documents().iter().find_map(|doc| {
            let FacilityCheck::Answered(answer) = ctx.verifications.get(&doc.id)? else {
                return None;
            };
            if !answer.is_confidently_unverified() {
                return None;
            }
            let facility = doc.text_fact(fact_names::FACILITY_NAME).unwrap_or("unnamed facility");
            Some(Evidence::in_document(
                doc,
                format!(
                    "issuing facility \"{}\" on {} could not be verified (confidence {})",
                    facility,
                    doc.label(),
                    answer.confidence
                ),
            ))
        })
    }
}

// Tier 3

struct DistantTravelDate {
    threshold: Duration,
}

impl FraudCheck for DistantTravelDate {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::DistantTravelDate
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let submitted = ctx.bundle.submission_date();
        let limit: NaiveDate = submitted.checked_add_signed(self.threshold)?;
        timeline::travel_dates(ctx.bundle)
            .into_iter()
            .filter_map(|date| date.resolved.ok().map(|d| (date.document, d)))
            .min_by_key(|(_, d)| *d)
            .filter(|(_, travel)| *travel >= limit)
            .map(|(document, travel)| Evidence {
                document,
                description: format!(
                    "first travel date {} is {} days after submission",
                    travel,
                    (travel - submitted).num_days()
                ),
            })
    }
}

struct LowQualityScan;

impl FraudCheck for LowQualityScan {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::LowQualityScan
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let doc = first_document(ctx, |doc| doc.authenticity.quality.is_degraded())?;
        Some(Evidence::in_document(
            doc,
            format!(
                "{} has {} scan quality",
                doc.label(),
                doc.authenticity.quality.as_str()
            ),
        ))
    }
}

struct FormattingInconsistency;

impl FraudCheck for FormattingInconsistency {
    fn code(&self) -> IndicatorCode {
        IndicatorCode::FormattingInconsistency
    }

    fn check(&self, ctx: &EvidenceContext<'_>) -> Option<Evidence> {
        let doc = first_document(ctx, |doc| !doc.authenticity.formatting_issues.is_empty())?;
        Some(Evidence::in_document(
            doc,
            format!(
                "{} has formatting inconsistencies: {}",
                doc.label(),
                doc.authenticity.formatting_issues.join("; ")
            ),
        ))
    }
}
