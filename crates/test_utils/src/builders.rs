//! Test Data Builders
//!
//! Builder patterns for claims and documents with sensible defaults. Tests
//! only set the fields they care about; the defaults describe a clean,
//! well-documented medical-emergency claim.

use chrono::{DateTime, Utc};
use core_kernel::{Currency, DateInput, Money, Timezone};
use domain_claims::{
    fact_names, ArtifactSource, AuthenticityProfile, Claim, DeclaredDates, Document, DocumentKind,
    DocumentQuality, FactBundle, FactValue,
};
use rust_decimal::Decimal;

use crate::fixtures::{MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for supporting documents
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    kind: DocumentKind,
    source: ArtifactSource,
    file_name: String,
    text: String,
    authenticity: AuthenticityProfile,
    facts: Vec<(String, FactValue)>,
}

impl DocumentBuilder {
    /// A signed, stamped, high-quality scan with no facts
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            source: ArtifactSource::Image,
            file_name: format!("{}.jpg", kind.as_str()),
            text: String::new(),
            authenticity: AuthenticityProfile::verified(),
            facts: Vec::new(),
        }
    }

    /// Medical certificate issued on the default incident date
    pub fn medical_certificate() -> Self {
        Self::new(DocumentKind::MedicalCertificate)
            .with_text(StringFixtures::certificate_text())
            .with_issue_date(TemporalFixtures::INCIDENT_DATE)
            .with_patient_name(StringFixtures::claimant_name())
    }

    pub fn police_report() -> Self {
        Self::new(DocumentKind::PoliceReport).with_text("Report of theft filed at the station")
    }

    pub fn booking_record() -> Self {
        Self::new(DocumentKind::BookingRecord)
            .with_source(ArtifactSource::Structured)
            .with_file_name("booking.json")
            .with_text("Booking reference ABC123, flight departing Paris")
    }

    pub fn other() -> Self {
        Self::new(DocumentKind::Other)
    }

    pub fn with_source(mut self, source: ArtifactSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_authenticity(mut self, authenticity: AuthenticityProfile) -> Self {
        self.authenticity = authenticity;
        self
    }

    pub fn with_quality(mut self, quality: DocumentQuality) -> Self {
        self.authenticity.quality = quality;
        self
    }

    pub fn without_signature(mut self) -> Self {
        self.authenticity.has_signature = false;
        self
    }

    /// Removes both stamp and letterhead
    pub fn without_official_mark(mut self) -> Self {
        self.authenticity.has_official_stamp = false;
        self.authenticity.has_letterhead = false;
        self
    }

    pub fn with_manipulation(mut self) -> Self {
        self.authenticity.manipulation_suspected = true;
        self
    }

    pub fn with_formatting_issue(mut self, issue: impl Into<String>) -> Self {
        self.authenticity.formatting_issues.push(issue.into());
        self
    }

    /// Authenticity cues could not be extracted
    pub fn extraction_failed(mut self) -> Self {
        self.authenticity = AuthenticityProfile::extraction_failed();
        self
    }

    pub fn with_fact(mut self, name: impl Into<String>, value: FactValue) -> Self {
        self.facts.push((name.into(), value));
        self
    }

    pub fn with_issue_date(self, date: &str) -> Self {
        self.with_fact(fact_names::ISSUE_DATE, FactValue::Date(DateInput::new(date)))
    }

    pub fn with_incident_date(self, date: &str) -> Self {
        self.with_fact(fact_names::INCIDENT_DATE, FactValue::Date(DateInput::new(date)))
    }

    pub fn with_travel_date(self, date: &str) -> Self {
        self.with_fact(fact_names::TRAVEL_DATE, FactValue::Date(DateInput::new(date)))
    }

    pub fn with_patient_name(self, name: &str) -> Self {
        self.with_fact(fact_names::PATIENT_NAME, FactValue::Name(name.to_string()))
    }

    pub fn with_facility(self, name: &str, location: Option<&str>) -> Self {
        let builder = self.with_fact(fact_names::FACILITY_NAME, FactValue::Name(name.to_string()));
        match location {
            Some(location) => builder.with_fact(
                fact_names::FACILITY_LOCATION,
                FactValue::Location(location.to_string()),
            ),
            None => builder,
        }
    }

    pub fn build(self) -> Document {
        let mut document = Document::new(self.kind, self.source, self.file_name)
            .with_text(self.text)
            .with_authenticity(self.authenticity);
        for (name, value) in self.facts {
            document = document.with_fact(name, value);
        }
        document
    }
}

/// Builder for claims and their fact bundles
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    narrative: String,
    claimant_name: Option<String>,
    submitted_at: DateTime<Utc>,
    incident: Option<String>,
    travel: Vec<String>,
    coverage_start: Option<String>,
    claimed_amount: Option<Money>,
    documents: Vec<Document>,
    jurisdiction: Option<Timezone>,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// Medical-emergency narrative with consistent declared dates and no documents
    pub fn new() -> Self {
        Self {
            narrative: StringFixtures::medical_narrative().to_string(),
            claimant_name: Some(StringFixtures::claimant_name().to_string()),
            submitted_at: TemporalFixtures::submitted_at(),
            incident: Some(TemporalFixtures::INCIDENT_DATE.to_string()),
            travel: vec![TemporalFixtures::TRAVEL_DATE.to_string()],
            coverage_start: Some(TemporalFixtures::COVERAGE_START.to_string()),
            claimed_amount: Some(MoneyFixtures::eur_claimed()),
            documents: Vec::new(),
            jurisdiction: None,
        }
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = narrative.into();
        self
    }

    pub fn with_claimant(mut self, name: impl Into<String>) -> Self {
        self.claimant_name = Some(name.into());
        self
    }

    pub fn without_claimant(mut self) -> Self {
        self.claimant_name = None;
        self
    }

    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = at;
        self
    }

    pub fn with_incident_date(mut self, date: impl Into<String>) -> Self {
        self.incident = Some(date.into());
        self
    }

    pub fn without_incident_date(mut self) -> Self {
        self.incident = None;
        self
    }

    pub fn with_travel_dates(mut self, dates: &[&str]) -> Self {
        self.travel = dates.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_coverage_start(mut self, date: impl Into<String>) -> Self {
        self.coverage_start = Some(date.into());
        self
    }

    pub fn with_claimed_amount(mut self, amount: Decimal) -> Self {
        self.claimed_amount = Some(Money::new(amount, Currency::EUR));
        self
    }

    pub fn without_claimed_amount(mut self) -> Self {
        self.claimed_amount = None;
        self
    }

    pub fn with_document(mut self, document: DocumentBuilder) -> Self {
        self.documents.push(document.build());
        self
    }

    pub fn with_built_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Timezone) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }

    pub fn build_claim(self) -> Claim {
        self.build().claim
    }

    pub fn build(self) -> FactBundle {
        let mut claim = Claim::new(self.narrative, self.submitted_at).with_declared_dates(
            DeclaredDates {
                incident: self.incident.map(DateInput::new),
                travel: self.travel.into_iter().map(DateInput::new).collect(),
                coverage_start: self.coverage_start.map(DateInput::new),
            },
        );
        if let Some(name) = self.claimant_name {
            claim = claim.with_claimant(name);
        }
        if let Some(amount) = self.claimed_amount {
            claim = claim.with_claimed_amount(amount);
        }
        for document in self.documents {
            claim = claim.with_document(document);
        }

        let bundle = FactBundle::new(claim);
        match self.jurisdiction {
            Some(jurisdiction) => bundle.with_jurisdiction(jurisdiction),
            None => bundle,
        }
    }
}
