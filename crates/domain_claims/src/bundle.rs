//! The normalized fact bundle consumed by the decision engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentId, Timezone};
use crate::claim::Claim;
use crate::document::{Document, FactValue};
use crate::error::{MalformedFactBundle, MissingRequirement};

/// A fact together with the document it was extracted from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedFact<'a> {
    pub document: DocumentId,
    pub name: &'a str,
    pub value: &'a FactValue,
}

/// A claim and its pre-extracted evidence, fully populated before evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactBundle {
    pub claim: Claim,
    /// Timezone used to turn the submission instant into a calendar date
    #[serde(default)]
    pub jurisdiction: Timezone,
}

impl FactBundle {
    pub fn new(claim: Claim) -> Self {
        Self {
            claim,
            jurisdiction: Timezone::default(),
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Timezone) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    /// Documents in submission order
    pub fn documents(&self) -> &[Document] {
        &self.claim.documents
    }

    /// Local calendar date of submission
    pub fn submission_date(&self) -> NaiveDate {
        self.jurisdiction.local_date(self.claim.submitted_at)
    }

    /// All facts with the given name, in document order
    pub fn facts<'a>(&'a self, name: &'a str) -> impl Iterator<Item = TaggedFact<'a>> + 'a {
        self.documents().iter().filter_map(move |doc| {
            doc.structured_facts.get(name).map(|value| TaggedFact {
                document: doc.id,
                name,
                value,
            })
        })
    }

    /// Checks the structural requirements every claim must meet
    ///
    /// A failure here is a per-claim condition: the engine reports it as an
    /// uncertain outcome, never as an error.
    pub fn validate(&self) -> Result<(), MalformedFactBundle> {
        let mut missing = Vec::new();

        if self.claim.narrative.trim().is_empty() {
            missing.push(MissingRequirement::Narrative);
        }

        if self.documents().is_empty() {
            missing.push(MissingRequirement::SupportingDocument);
        } else if self.documents().iter().all(Document::is_empty_extraction) {
            missing.push(MissingRequirement::ReadableDocument);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MalformedFactBundle {
                claim_id: self.claim.id,
                missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::DateInput;
    use crate::document::{fact_names, ArtifactSource, DocumentKind};

    fn claim() -> Claim {
        Claim::new(
            "I was hospitalised two days before departure",
            Utc.with_ymd_and_hms(2024, 3, 20, 23, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_validate_reports_every_missing_requirement() {
        let mut bare = claim();
        bare.narrative = "   ".into();
        let err = FactBundle::new(bare).validate().unwrap_err();

        assert_eq!(
            err.missing,
            vec![MissingRequirement::Narrative, MissingRequirement::SupportingDocument]
        );
    }

    #[test]
    fn test_validate_rejects_only_unreadable_documents() {
        let bundle = FactBundle::new(claim().with_document(Document::new(
            DocumentKind::MedicalCertificate,
            ArtifactSource::Image,
            "blurry.jpg",
        )));

        let err = bundle.validate().unwrap_err();
        assert_eq!(err.missing, vec![MissingRequirement::ReadableDocument]);
    }

    #[test]
    fn test_facts_are_tagged_with_their_document() {
        let first = Document::new(DocumentKind::MedicalCertificate, ArtifactSource::Image, "a.jpg")
            .with_fact(fact_names::ISSUE_DATE, FactValue::Date(DateInput::new("2024-03-10")));
        let second = Document::new(DocumentKind::Receipt, ArtifactSource::Pdf, "b.pdf");
        let third = Document::new(DocumentKind::PoliceReport, ArtifactSource::Pdf, "c.pdf")
            .with_fact(fact_names::ISSUE_DATE, FactValue::Date(DateInput::new("2024-03-11")));
        let (first_id, third_id) = (first.id, third.id);

        let bundle = FactBundle::new(
            claim().with_document(first).with_document(second).with_document(third),
        );
        let tagged: Vec<_> = bundle.facts(fact_names::ISSUE_DATE).map(|f| f.document).collect();

        assert_eq!(tagged, vec![first_id, third_id]);
    }

    #[test]
    fn test_submission_date_uses_jurisdiction() {
        let bundle = FactBundle::new(claim())
            .with_jurisdiction(Timezone::parse("Europe/Paris").unwrap());

        assert_eq!(bundle.submission_date(), NaiveDate::from_ymd_opt(2024, 3, 21).unwrap());
    }
}
