//! Policy matcher
//!
//! Classifies a claim against the clause set with keyword signals from the
//! narrative and document texts plus the document kinds submitted.
//!
//! The result is a trichotomy:
//! - covered: a clause's coverage predicate holds and no exclusion fires
//! - excluded: an exclusion fires (clause-specific or general)
//! - no match: no coverage predicate can be satisfied from the facts
//!
//! "No match" leans towards UNCERTAIN; "excluded" leans towards DENY.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use domain_claims::text;
use domain_claims::timeline::agreed_incident_date;
use domain_claims::{DocumentKind, FactBundle};
use crate::clause::{ClauseCategory, Exclusion, ExclusionTrigger, PayoutFormula, PolicyClause};
use crate::clause_set::PolicyClauseSet;

/// Keyword hits at which match strength saturates
const FULL_STRENGTH_HITS: usize = 3;

/// An exclusion that fired, with what triggered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredExclusion {
    pub code: String,
    pub description: String,
    /// Section the exclusion belongs to
    pub section: String,
    pub evidence: String,
}

/// A clause the claim was classified under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseMatch {
    pub section: String,
    pub title: String,
    /// `None` when only a general exclusion applied
    pub category: Option<ClauseCategory>,
    /// How strongly the facts point at this clause, in [0, 1]
    pub strength: Decimal,
    pub matched_keywords: Vec<String>,
    pub exclusion: Option<TriggeredExclusion>,
    pub payout: Option<PayoutFormula>,
}

impl ClauseMatch {
    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }

    /// `"3.1 Medical emergency"`
    pub fn reference(&self) -> String {
        format!("{} {}", self.section, self.title)
    }
}

/// Outcome of matching a claim against the clause set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PolicyMatch {
    Matched(ClauseMatch),
    NoMatch { reason: String },
}

impl PolicyMatch {
    pub fn matched(&self) -> Option<&ClauseMatch> {
        match self {
            PolicyMatch::Matched(m) => Some(m),
            PolicyMatch::NoMatch { .. } => None,
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.matched().is_some_and(ClauseMatch::is_excluded)
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, PolicyMatch::NoMatch { .. })
    }

    /// Section of the matched clause, if any
    pub fn section(&self) -> Option<&str> {
        self.matched().map(|m| m.section.as_str())
    }
}

/// Maps claims to coverage clauses
#[derive(Debug, Clone)]
pub struct PolicyMatcher {
    clause_set: Arc<PolicyClauseSet>,
}

impl PolicyMatcher {
    pub fn new(clause_set: Arc<PolicyClauseSet>) -> Self {
        Self { clause_set }
    }

    pub fn clause_set(&self) -> &PolicyClauseSet {
        &self.clause_set
    }

    /// Classifies the claim; ties between clauses go to the earlier one
    #[instrument(skip_all, fields(claim_id = %bundle.claim.id))]
    pub fn match_claim(&self, bundle: &FactBundle) -> PolicyMatch {
        let corpus = corpus(bundle);
        let kinds: HashSet<DocumentKind> = bundle.documents().iter().map(|d| d.kind).collect();

        let mut best: Option<(&PolicyClause, Vec<&str>)> = None;
        let mut lacking_documents: Option<&PolicyClause> = None;

        for clause in self.clause_set.clauses() {
            let hits = text::mentioned(&corpus, &clause.covers.keywords);
            if hits.len() < clause.covers.min_keyword_hits {
                continue;
            }
            let documented = clause.covers.document_kinds.is_empty()
                || clause.covers.document_kinds.iter().any(|kind| kinds.contains(kind));
            if !documented {
                lacking_documents.get_or_insert(clause);
                continue;
            }
            let better = best
                .as_ref()
                .map_or(true, |(_, best_hits)| hits.len() > best_hits.len());
            if better {
                best = Some((clause, hits));
            }
        }

        let general = &self.clause_set.general_exclusions;

        let result = match best {
            Some((clause, hits)) => {
                let exclusion = clause
                    .exclusions
                    .iter()
                    .map(|e| (e, clause.section.as_str()))
                    .chain(general.exclusions.iter().map(|e| (e, general.section.as_str())))
                    .find_map(|(exclusion, section)| {
                        triggered(exclusion, section, bundle, &corpus)
                    });

                PolicyMatch::Matched(ClauseMatch {
                    section: clause.section.clone(),
                    title: clause.title.clone(),
                    category: Some(clause.category),
                    strength: strength(hits.len()),
                    matched_keywords: hits.into_iter().map(str::to_string).collect(),
                    exclusion,
                    payout: clause.payout.clone(),
                })
            }
            None => {
                let exclusion = general
                    .exclusions
                    .iter()
                    .find_map(|exclusion| triggered(exclusion, &general.section, bundle, &corpus));

                match exclusion {
                    Some(exclusion) => {
                        let matched_keywords = exclusion_keywords(
                            general.exclusions.as_slice(),
                            &exclusion.code,
                            &corpus,
                        );
                        PolicyMatch::Matched(ClauseMatch {
                            section: general.section.clone(),
                            title: general.title.clone(),
                            category: None,
                            strength: strength(matched_keywords.len().max(1)),
                            matched_keywords,
                            exclusion: Some(exclusion),
                            payout: None,
                        })
                    }
                    None => PolicyMatch::NoMatch {
                        reason: no_match_reason(lacking_documents, &self.clause_set),
                    },
                }
            }
        };

        debug!(
            section = result.section().unwrap_or("none"),
            excluded = result.is_excluded(),
            "policy matched"
        );
        result
    }
}

/// Narrative followed by every document's extracted text
fn corpus(bundle: &FactBundle) -> String {
    let mut corpus = bundle.claim.narrative.clone();
    for doc in bundle.documents() {
        corpus.push('\n');
        corpus.push_str(&doc.extracted_text);
    }
    corpus
}

fn strength(hits: usize) -> Decimal {
    let capped = hits.min(FULL_STRENGTH_HITS);
    (Decimal::from(capped as u64) / Decimal::from(FULL_STRENGTH_HITS as u64)).round_dp(2)
}

fn triggered(
    exclusion: &Exclusion,
    section: &str,
    bundle: &FactBundle,
    corpus: &str,
) -> Option<TriggeredExclusion> {
    let evidence = match &exclusion.trigger {
        ExclusionTrigger::Keywords { keywords } => {
            let phrase = text::first_asserted(corpus, keywords)?;
            format!("the claim states \"{}\"", phrase)
        }
        ExclusionTrigger::IncidentBeforeCoverage => {
            let start = bundle
                .claim
                .declared_dates
                .coverage_start
                .as_ref()?
                .resolve()
                .ok()?;
            let incident = agreed_incident_date(bundle).ok()??;
            if incident >= start {
                return None;
            }
            format!("the incident on {} precedes the start of cover on {}", incident, start)
        }
    };

    Some(TriggeredExclusion {
        code: exclusion.code.clone(),
        description: exclusion.description.clone(),
        section: section.to_string(),
        evidence,
    })
}

fn exclusion_keywords(exclusions: &[Exclusion], code: &str, corpus: &str) -> Vec<String> {
    exclusions
        .iter()
        .filter(|exclusion| exclusion.code == code)
        .filter_map(|exclusion| match &exclusion.trigger {
            ExclusionTrigger::Keywords { keywords } => Some(text::asserted(corpus, keywords)),
            ExclusionTrigger::IncidentBeforeCoverage => None,
        })
        .flatten()
        .map(str::to_string)
        .collect()
}

fn no_match_reason(
    lacking_documents: Option<&PolicyClause>,
    clause_set: &PolicyClauseSet,
) -> String {
    match lacking_documents {
        Some(clause) => {
            let kinds = clause
                .covers
                .document_kinds
                .iter()
                .map(DocumentKind::as_str)
                .collect::<Vec<_>>()
                .join(" or ");
            format!(
                "the narrative suggests {} (section {}) but no {} was submitted",
                clause.category, clause.section, kinds
            )
        }
        None => format!(
            "the narrative does not describe any event covered by {}",
            clause_set.label()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::DateInput;
    use domain_claims::{ArtifactSource, Claim, DeclaredDates, Document};

    fn matcher() -> PolicyMatcher {
        PolicyMatcher::new(Arc::new(PolicyClauseSet::cfsr_default().unwrap()))
    }

    fn bundle(narrative: &str, documents: Vec<Document>) -> FactBundle {
        let mut claim = Claim::new(narrative, Utc.with_ymd_and_hms(2024, 3, 20, 10, 0, 0).unwrap())
            .with_declared_dates(DeclaredDates {
                incident: Some(DateInput::new("2024-03-10")),
                travel: vec![DateInput::new("2024-03-12")],
                coverage_start: Some(DateInput::new("2024-02-01")),
            });
        claim.documents = documents;
        FactBundle::new(claim)
    }

    fn doc(kind: DocumentKind, text: &str) -> Document {
        Document::new(kind, ArtifactSource::Image, "doc.jpg").with_text(text)
    }

    #[test]
    fn test_medical_emergency_matches() {
        let result = matcher().match_claim(&bundle(
            "I was hospitalised for emergency surgery after an accident.",
            vec![doc(DocumentKind::MedicalCertificate, "Admitted for appendicitis")],
        ));

        let matched = result.matched().unwrap();
        assert_eq!(matched.section, "3.1");
        assert_eq!(matched.category, Some(ClauseCategory::MedicalEmergency));
        assert_eq!(matched.strength, dec!(1));
        assert!(!result.is_excluded());
    }

    #[test]
    fn test_pre_existing_condition_excludes() {
        let result = matcher().match_claim(&bundle(
            "I was hospitalised two days before departure.",
            vec![doc(DocumentKind::MedicalCertificate, "Flare-up of a pre-existing condition.")],
        ));

        assert!(result.is_excluded());
        let exclusion = result.matched().unwrap().exclusion.as_ref().unwrap();
        assert_eq!(exclusion.code, "pre_existing_condition");
        assert_eq!(exclusion.section, "3.1");
    }

    #[test]
    fn test_negated_exclusion_does_not_fire() {
        let result = matcher().match_claim(&bundle(
            "I was hospitalised two days before departure.",
            vec![doc(DocumentKind::MedicalCertificate, "No history of pre-existing condition.")],
        ));

        assert!(!result.is_excluded());
    }

    #[test]
    fn test_incident_before_coverage_excludes() {
        let mut b = bundle(
            "I was hospitalised two days before departure.",
            vec![doc(DocumentKind::MedicalCertificate, "Admitted")],
        );
        b.claim.declared_dates.coverage_start = Some(DateInput::new("2024-03-11"));

        let result = matcher().match_claim(&b);

        let exclusion = result.matched().unwrap().exclusion.as_ref().unwrap();
        assert_eq!(exclusion.code, "incident_before_coverage");
        assert_eq!(exclusion.section, "4");
    }

    #[test]
    fn test_general_exclusion_without_covered_event() {
        let result = matcher().match_claim(&bundle(
            "I changed my mind and decided not to go.",
            vec![doc(DocumentKind::BookingRecord, "Booking reference ABC123")],
        ));

        let matched = result.matched().unwrap();
        assert!(matched.is_excluded());
        assert_eq!(matched.category, None);
        assert_eq!(matched.section, "4");
        assert_eq!(matched.strength, dec!(0.67));
    }

    #[test]
    fn test_missing_document_kind_is_no_match() {
        let result = matcher().match_claim(&bundle(
            "My passport was stolen at the station.",
            vec![doc(DocumentKind::BookingRecord, "Booking reference ABC123")],
        ));

        match result {
            PolicyMatch::NoMatch { reason } => assert!(reason.contains("police_report")),
            other => panic!("expected no match, got {:?}", other),
        }
    }

    #[test]
    fn test_unrelated_narrative_is_no_match() {
        let result = matcher().match_claim(&bundle(
            "Something came up.",
            vec![doc(DocumentKind::Other, "A letter")],
        ));

        assert!(result.is_no_match());
        assert_eq!(result.section(), None);
    }

    #[test]
    fn test_highest_keyword_score_wins() {
        // "burglary" is listed under both theft (3.4) and home damage (3.6)
        let result = matcher().match_claim(&bundle(
            "A burglary at home, the house was ransacked.",
            vec![doc(DocumentKind::PoliceReport, "Report filed")],
        ));

        assert_eq!(result.section(), Some("3.6"));
    }

    #[test]
    fn test_ties_go_to_earlier_clause() {
        let result = matcher().match_claim(&bundle(
            "A strike meant I could not attend court.",
            vec![doc(DocumentKind::Other, "Letter")],
        ));

        // one hit each for 3.3 and 3.5
        assert_eq!(result.section(), Some("3.3"));
        assert_eq!(result.matched().unwrap().strength, dec!(0.33));
    }

    #[test]
    fn test_min_keyword_hits_respected() {
        let result = matcher().match_claim(&bundle(
            "There was a robbery and a fire.",
            vec![doc(DocumentKind::PoliceReport, "Report filed")],
        ));

        // 3.6 needs two of its keywords
        assert_eq!(result.section(), Some("3.4"));
    }
}
