//! Claim Evidence Domain
//!
//! This crate models a submitted cancellation claim and the evidence that
//! comes with it, and derives the two evidence-only signals the decision
//! engine needs: fraud indicators and a timeline verdict.
//!
//! # Evaluation Inputs
//!
//! ```text
//! Claim + Documents -> FactBundle -> { FraudRuleEngine, TimelineAnalyzer }
//!                                            ▲
//!                     FacilityVerifications ─┘ (optional oracle answers)
//! ```

pub mod claim;
pub mod document;
pub mod bundle;
pub mod fraud;
pub mod timeline;
pub mod verification;
pub mod text;
pub mod error;

pub use claim::{Claim, DeclaredDates};
pub use document::{
    fact_names, ArtifactSource, AuthenticityProfile, Document, DocumentKind, DocumentQuality,
    FactValue,
};
pub use bundle::{FactBundle, TaggedFact};
pub use fraud::{
    Evidence, EvidenceContext, FraudAssessment, FraudCheck, FraudIndicator, FraudRuleConfig,
    FraudRuleEngine, IndicatorCode, SeverityTier,
};
pub use timeline::{TimelineAnalysis, TimelineAnalyzer, TimelineFinding, TimelineVerdict};
pub use verification::{
    facility_queries, EvidenceLink, FacilityCheck, FacilityQuery, FacilityVerification,
    FacilityVerifications, VerificationOracle,
};
pub use error::{ClaimError, MalformedFactBundle, MissingRequirement};
