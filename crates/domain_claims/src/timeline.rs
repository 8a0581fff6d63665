//! Timeline analysis
//!
//! Checks that the incident, the documentation and the travel dates line up:
//!
//! ```text
//! incident ≤ issue date(s) ≤ first travel date      incident ≤ submission
//! ```
//!
//! A contradiction among dates that could be resolved makes the timeline
//! inconsistent. Otherwise, any missing, ambiguous or conflicting date makes it
//! indeterminate; dates are never guessed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use core_kernel::{DateInput, DocumentId, TemporalError};
use crate::bundle::FactBundle;
use crate::document::fact_names;

/// Overall verdict on the claim's chronology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineVerdict {
    Consistent,
    Inconsistent,
    Indeterminate,
}

impl fmt::Display for TimelineVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TimelineVerdict::Consistent => "CONSISTENT",
            TimelineVerdict::Inconsistent => "INCONSISTENT",
            TimelineVerdict::Indeterminate => "INDETERMINATE",
        };
        f.write_str(text)
    }
}

/// A date asserted either by the claimant or by a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedDate {
    /// `None` for dates the claimant declared
    pub document: Option<DocumentId>,
    pub raw: DateInput,
    pub resolved: Result<NaiveDate, TemporalError>,
}

impl SourcedDate {
    fn new(document: Option<DocumentId>, raw: &DateInput) -> Self {
        Self {
            document,
            raw: raw.clone(),
            resolved: raw.resolve(),
        }
    }
}

/// Declared incident date followed by every document's `incident_date`
pub fn incident_dates(bundle: &FactBundle) -> Vec<SourcedDate> {
    let declared = bundle.claim.declared_dates.incident.iter();
    sourced(bundle, declared, fact_names::INCIDENT_DATE, |_| true)
}

/// Declared travel dates followed by every document's `travel_date`
pub fn travel_dates(bundle: &FactBundle) -> Vec<SourcedDate> {
    let declared = bundle.claim.declared_dates.travel.iter();
    sourced(bundle, declared, fact_names::TRAVEL_DATE, |_| true)
}

/// Issue dates of documents that attest to the incident
pub fn issue_dates(bundle: &FactBundle) -> Vec<SourcedDate> {
    sourced(bundle, std::iter::empty(), fact_names::ISSUE_DATE, |doc| {
        bundle
            .documents()
            .iter()
            .any(|d| d.id == doc && d.kind.is_evidential())
    })
}

fn sourced<'a>(
    bundle: &'a FactBundle,
    declared: impl Iterator<Item = &'a DateInput>,
    fact: &'a str,
    keep: impl Fn(DocumentId) -> bool,
) -> Vec<SourcedDate> {
    let mut dates: Vec<SourcedDate> = declared.map(|raw| SourcedDate::new(None, raw)).collect();
    dates.extend(
        bundle
            .facts(fact)
            .filter(|tagged| keep(tagged.document))
            .filter_map(|tagged| {
                tagged
                    .value
                    .as_date()
                    .map(|raw| SourcedDate::new(Some(tagged.document), raw))
            }),
    );
    dates
}

/// Resolves every asserted date, returning the distinct values in order
fn resolve_all(dates: &[SourcedDate]) -> Result<Vec<NaiveDate>, TemporalError> {
    let mut resolved = Vec::with_capacity(dates.len());
    for date in dates {
        let value = date.resolved.clone()?;
        if !resolved.contains(&value) {
            resolved.push(value);
        }
    }
    Ok(resolved)
}

/// The single incident date all sources agree on, if any was asserted
pub fn agreed_incident_date(bundle: &FactBundle) -> Result<Option<NaiveDate>, TemporalError> {
    match resolve_all(&incident_dates(bundle))?.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        [first, second, ..] => Err(TemporalError::Conflicting {
            fact: fact_names::INCIDENT_DATE.to_string(),
            first: *first,
            second: *second,
        }),
    }
}

/// The earliest affected travel date, if any was asserted
pub fn first_travel_date(bundle: &FactBundle) -> Result<Option<NaiveDate>, TemporalError> {
    resolve_all(&travel_dates(bundle)).map(|dates| dates.into_iter().min())
}

/// One observation made while analysing the timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum TimelineFinding {
    /// A required date is absent from both the claim and its documents
    MissingDate { fact: String },
    /// A date could not be resolved without guessing
    UnresolvedDate { fact: String, error: TemporalError },
    IncidentAfterTravel { incident: NaiveDate, travel: NaiveDate },
    IssuedBeforeIncident { document: DocumentId, issued: NaiveDate, incident: NaiveDate },
    IssuedAfterTravel { document: DocumentId, issued: NaiveDate, travel: NaiveDate },
    IncidentAfterSubmission { incident: NaiveDate, submitted: NaiveDate },
}

impl TimelineFinding {
    /// Findings that contradict the claim rather than leave it open
    pub fn is_contradiction(&self) -> bool {
        !matches!(
            self,
            TimelineFinding::MissingDate { .. } | TimelineFinding::UnresolvedDate { .. }
        )
    }
}

impl fmt::Display for TimelineFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineFinding::MissingDate { fact } => {
                write!(f, "no {} was declared or found in the documents", fact.replace('_', " "))
            }
            TimelineFinding::UnresolvedDate { fact, error } => {
                write!(f, "the {} could not be established ({})", fact.replace('_', " "), error)
            }
            TimelineFinding::IncidentAfterTravel { incident, travel } => write!(
                f,
                "the incident on {} happened after the first travel date {}",
                incident, travel
            ),
            TimelineFinding::IssuedBeforeIncident { document, issued, incident } => write!(
                f,
                "document {} was issued on {}, before the incident on {}",
                document, issued, incident
            ),
            TimelineFinding::IssuedAfterTravel { document, issued, travel } => write!(
                f,
                "document {} was issued on {}, after the travel date {}",
                document, issued, travel
            ),
            TimelineFinding::IncidentAfterSubmission { incident, submitted } => write!(
                f,
                "the incident on {} is dated after the claim was submitted on {}",
                incident, submitted
            ),
        }
    }
}

/// Result of analysing a bundle's chronology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineAnalysis {
    pub verdict: TimelineVerdict,
    pub incident_date: Option<NaiveDate>,
    pub first_travel_date: Option<NaiveDate>,
    pub submission_date: NaiveDate,
    pub findings: Vec<TimelineFinding>,
}

/// Compares incident, issuance, travel and submission dates
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineAnalyzer;

impl TimelineAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, bundle: &FactBundle) -> TimelineAnalysis {
        let submission_date = bundle.submission_date();
        let mut findings = Vec::new();

        let incident = settle(
            fact_names::INCIDENT_DATE,
            agreed_incident_date(bundle),
            &mut findings,
        );
        let travel = settle(fact_names::TRAVEL_DATE, first_travel_date(bundle), &mut findings);

        let issued = issue_dates(bundle);
        if issued.is_empty() {
            findings.push(TimelineFinding::MissingDate {
                fact: fact_names::ISSUE_DATE.to_string(),
            });
        }
        for date in &issued {
            if let Err(error) = &date.resolved {
                findings.push(TimelineFinding::UnresolvedDate {
                    fact: fact_names::ISSUE_DATE.to_string(),
                    error: error.clone(),
                });
            }
        }

        if let (Some(incident), Some(travel)) = (incident, travel) {
            if incident > travel {
                findings.push(TimelineFinding::IncidentAfterTravel { incident, travel });
            }
        }

        for date in &issued {
            let (Some(document), Ok(issued_on)) = (date.document, &date.resolved) else {
                continue;
            };
            if let Some(incident) = incident.filter(|incident| issued_on < incident) {
                findings.push(TimelineFinding::IssuedBeforeIncident {
                    document,
                    issued: *issued_on,
                    incident,
                });
            }
            if let Some(travel) = travel.filter(|travel| issued_on > travel) {
                findings.push(TimelineFinding::IssuedAfterTravel {
                    document,
                    issued: *issued_on,
                    travel,
                });
            }
        }

        if let Some(incident) = incident.filter(|incident| *incident > submission_date) {
            findings.push(TimelineFinding::IncidentAfterSubmission {
                incident,
                submitted: submission_date,
            });
        }

        let verdict = if findings.iter().any(TimelineFinding::is_contradiction) {
            TimelineVerdict::Inconsistent
        } else if findings.is_empty() {
            TimelineVerdict::Consistent
        } else {
            TimelineVerdict::Indeterminate
        };

        debug!(
            claim_id = %bundle.claim.id,
            %verdict,
            findings = findings.len(),
            "timeline analysed"
        );

        TimelineAnalysis {
            verdict,
            incident_date: incident,
            first_travel_date: travel,
            submission_date,
            findings,
        }
    }
}

fn settle(
    fact: &str,
    resolved: Result<Option<NaiveDate>, TemporalError>,
    findings: &mut Vec<TimelineFinding>,
) -> Option<NaiveDate> {
    match resolved {
        Ok(Some(date)) => Some(date),
        Ok(None) => {
            findings.push(TimelineFinding::MissingDate { fact: fact.to_string() });
            None
        }
        Err(error) => {
            findings.push(TimelineFinding::UnresolvedDate {
                fact: fact.to_string(),
                error,
            });
            None
        }
    }
}
