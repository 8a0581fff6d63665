//! Supporting documents and their extracted facts
//!
//! Heterogeneous evidence (scanned certificates, booking confirmations,
//! receipts) is modeled as one `Document` type tagged with a `DocumentKind`
//! plus a uniform map of structured facts. New kinds extend the enum; checks
//! ask the kind what it requires instead of branching on file types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use core_kernel::{DateInput, DocumentId, Money};

/// Well-known structured fact names produced by the extraction collaborator
pub mod fact_names {
    pub const INCIDENT_DATE: &str = "incident_date";
    pub const TRAVEL_DATE: &str = "travel_date";
    pub const ISSUE_DATE: &str = "issue_date";
    pub const PATIENT_NAME: &str = "patient_name";
    pub const FACILITY_NAME: &str = "facility_name";
    pub const FACILITY_LOCATION: &str = "facility_location";
    pub const AMOUNT: &str = "amount";
}

/// Kind of supporting document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    MedicalCertificate,
    BookingRecord,
    PoliceReport,
    Receipt,
    Other,
}

impl DocumentKind {
    /// Kinds that are only trustworthy as a scan or photo of the original
    pub fn requires_image_artifact(&self) -> bool {
        matches!(self, DocumentKind::MedicalCertificate)
    }

    /// Kinds that must carry the issuer's signature
    pub fn requires_signature(&self) -> bool {
        matches!(self, DocumentKind::MedicalCertificate | DocumentKind::PoliceReport)
    }

    /// Kinds that must carry an official stamp or letterhead
    pub fn requires_official_mark(&self) -> bool {
        matches!(self, DocumentKind::MedicalCertificate | DocumentKind::PoliceReport)
    }

    /// Kinds that state what the trip cost
    pub fn is_cost_evidence(&self) -> bool {
        matches!(self, DocumentKind::Receipt | DocumentKind::BookingRecord)
    }

    /// Kinds that attest to the incident itself (as opposed to the trip or costs)
    pub fn is_evidential(&self) -> bool {
        matches!(
            self,
            DocumentKind::MedicalCertificate | DocumentKind::PoliceReport | DocumentKind::Other
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::MedicalCertificate => "medical_certificate",
            DocumentKind::BookingRecord => "booking_record",
            DocumentKind::PoliceReport => "police_report",
            DocumentKind::Receipt => "receipt",
            DocumentKind::Other => "other",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the artifact came from before extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSource {
    /// Photo or scan (png, jpg, webp)
    Image,
    /// Scanned or generated PDF
    Pdf,
    /// Plain text or markdown file
    Text,
    /// Machine-readable record (booking API export)
    Structured,
}

impl ArtifactSource {
    pub fn is_image_derived(&self) -> bool {
        matches!(self, ArtifactSource::Image | ArtifactSource::Pdf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactSource::Image => "image",
            ArtifactSource::Pdf => "pdf",
            ArtifactSource::Text => "text",
            ArtifactSource::Structured => "structured",
        }
    }
}

/// Scan quality as assessed by the extraction collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentQuality {
    High,
    Medium,
    Low,
    Unreadable,
}

impl DocumentQuality {
    pub fn is_degraded(&self) -> bool {
        matches!(self, DocumentQuality::Low | DocumentQuality::Unreadable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentQuality::High => "high",
            DocumentQuality::Medium => "medium",
            DocumentQuality::Low => "low",
            DocumentQuality::Unreadable => "unreadable",
        }
    }
}

/// Authenticity cues surfaced for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticityProfile {
    pub has_signature: bool,
    pub has_official_stamp: bool,
    pub has_letterhead: bool,
    pub quality: DocumentQuality,
    /// Visual-manipulation signal (edited regions, pasted text)
    #[serde(default)]
    pub manipulation_suspected: bool,
    /// Minor inconsistencies such as mixed fonts or misaligned fields
    #[serde(default)]
    pub formatting_issues: Vec<String>,
    /// Set when authenticity extraction failed and the profile is a placeholder
    #[serde(default)]
    pub extraction_failed: bool,
}

impl AuthenticityProfile {
    /// A clean, fully marked, high-quality profile
    pub fn verified() -> Self {
        Self {
            has_signature: true,
            has_official_stamp: true,
            has_letterhead: true,
            quality: DocumentQuality::High,
            manipulation_suspected: false,
            formatting_issues: Vec::new(),
            extraction_failed: false,
        }
    }

    /// Placeholder used when authenticity extraction failed or timed out
    pub fn extraction_failed() -> Self {
        Self {
            has_signature: false,
            has_official_stamp: false,
            has_letterhead: false,
            quality: DocumentQuality::Unreadable,
            manipulation_suspected: false,
            formatting_issues: Vec::new(),
            extraction_failed: true,
        }
    }

    /// Stamp or letterhead present
    pub fn has_official_mark(&self) -> bool {
        self.has_official_stamp || self.has_letterhead
    }
}

impl Default for AuthenticityProfile {
    fn default() -> Self {
        Self::extraction_failed()
    }
}

/// A single structured fact value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FactValue {
    Date(DateInput),
    Name(String),
    Amount(Money),
    Location(String),
    Text(String),
}

impl FactValue {
    pub fn as_date(&self) -> Option<&DateInput> {
        match self {
            FactValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<&Money> {
        match self {
            FactValue::Amount(m) => Some(m),
            _ => None,
        }
    }

    /// Text content of name, location and free-text facts
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Name(s) | FactValue::Location(s) | FactValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One supporting artifact submitted with a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub file_name: String,
    pub kind: DocumentKind,
    pub source: ArtifactSource,
    /// Extracted text; empty when extraction failed
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub authenticity: AuthenticityProfile,
    #[serde(default)]
    pub structured_facts: BTreeMap<String, FactValue>,
}

impl Document {
    /// Creates a document with no extracted content yet
    pub fn new(kind: DocumentKind, source: ArtifactSource, file_name: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            file_name: file_name.into(),
            kind,
            source,
            extracted_text: String::new(),
            authenticity: AuthenticityProfile::extraction_failed(),
            structured_facts: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.extracted_text = text.into();
        self
    }

    pub fn with_authenticity(mut self, authenticity: AuthenticityProfile) -> Self {
        self.authenticity = authenticity;
        self
    }

    pub fn with_fact(mut self, name: impl Into<String>, value: FactValue) -> Self {
        self.structured_facts.insert(name.into(), value);
        self
    }

    pub fn fact(&self, name: &str) -> Option<&FactValue> {
        self.structured_facts.get(name)
    }

    pub fn date_fact(&self, name: &str) -> Option<&DateInput> {
        self.fact(name).and_then(FactValue::as_date)
    }

    pub fn text_fact(&self, name: &str) -> Option<&str> {
        self.fact(name).and_then(FactValue::as_text)
    }

    /// True when nothing usable came out of extraction
    pub fn is_empty_extraction(&self) -> bool {
        self.extracted_text.trim().is_empty() && self.structured_facts.is_empty()
    }

    /// Short label used in evidence descriptions
    pub fn label(&self) -> String {
        format!("{} '{}'", self.kind, self.file_name)
    }
}
