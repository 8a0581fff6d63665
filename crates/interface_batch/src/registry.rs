//! Facility registry oracle
//!
//! A [`VerificationOracle`] backed by a JSON list of known healthcare
//! facilities, scored as follows:
//!
//! | Registry hit | Answer |
//! |---|---|
//! | facility name found in an entry name | verified, 0.9 |
//! | found only in a description, or the location disagrees | verified, 0.7 |
//! | not found | not verified, 0.6 |
//! | empty registry | not verified, 0.8 |

use std::path::Path;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_claims::text::tokens;
use domain_claims::{FacilityVerification, VerificationOracle};
use crate::error::BatchError;

/// Evidence links attached to an answer
const MAX_EVIDENCE: usize = 3;

/// A known facility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityEntry {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl FacilityEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            description: None,
            uri: None,
        }
    }

    pub fn located_in(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    fn hit(&self, facility: &str, location: Option<&str>) -> Option<Hit> {
        let in_name = canonical(&self.name).contains(facility);
        let in_description = self
            .description
            .as_deref()
            .is_some_and(|d| canonical(d).contains(facility));

        if !in_name && !in_description {
            return None;
        }

        let location_agrees = match (location, self.location.as_deref()) {
            (Some(wanted), Some(known)) => {
                let (wanted, known) = (canonical(wanted), canonical(known));
                known.contains(&wanted) || wanted.contains(&known)
            }
            _ => true,
        };

        if in_name && location_agrees {
            Some(Hit::Strong)
        } else {
            Some(Hit::Partial)
        }
    }

    fn evidence_uri(&self) -> String {
        self.uri
            .clone()
            .unwrap_or_else(|| format!("registry:{}", canonical(&self.name).replace(' ', "-")))
    }
}

/// Normalized words joined by single spaces
fn canonical(text: &str) -> String {
    tokens(text).join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Hit {
    Strong,
    Partial,
}

/// Facility registry loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct RegistryOracle {
    entries: Vec<FacilityEntry>,
}

impl RegistryOracle {
    pub fn new(entries: Vec<FacilityEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_file(path: &Path) -> Result<Self, BatchError> {
        let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        let oracle = Self::from_json(&content).map_err(|e| BatchError::parse(path, e.to_string()))?;
        debug!(path = %path.display(), entries = oracle.len(), "facility registry loaded");
        Ok(oracle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scores a facility against the registry
    pub fn lookup(&self, facility: &str, location: Option<&str>) -> FacilityVerification {
        if self.entries.is_empty() {
            return FacilityVerification::not_verified(dec!(0.8));
        }

        let wanted = canonical(facility);
        if wanted.is_empty() {
            return FacilityVerification::unknown();
        }

        let mut hits: Vec<(Hit, &FacilityEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| entry.hit(&wanted, location).map(|hit| (hit, entry)))
            .collect();
        hits.sort_by_key(|(hit, _)| *hit);

        let mut answer = match hits.first() {
            Some((Hit::Strong, _)) => FacilityVerification::verified(dec!(0.9)),
            Some((Hit::Partial, _)) => FacilityVerification::verified(dec!(0.7)),
            None => return FacilityVerification::not_verified(dec!(0.6)),
        };
        for (_, entry) in hits.into_iter().take(MAX_EVIDENCE) {
            answer = answer.with_evidence(entry.name.clone(), entry.evidence_uri());
        }
        answer
    }
}

impl DomainPort for RegistryOracle {}

#[async_trait]
impl VerificationOracle for RegistryOracle {
    async fn verify(
        &self,
        facility: &str,
        location: Option<&str>,
    ) -> Result<FacilityVerification, PortError> {
        if canonical(facility).is_empty() {
            return Err(PortError::transformation(
                "facility registry",
                format!("'{}' has no searchable words", facility),
            ));
        }
        Ok(self.lookup(facility, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RegistryOracle {
        RegistryOracle::new(vec![
            FacilityEntry::new("Clinique Saint-Jean")
                .located_in("Lyon")
                .with_uri("https://example.org/saint-jean"),
            FacilityEntry::new("Hôpital Édouard Herriot")
                .located_in("Lyon")
                .described_as("University hospital, formerly Hopital de Grange Blanche"),
        ])
    }

    #[test]
    fn test_name_match_is_strong() {
        let answer = registry().lookup("clinique saint jean", Some("Lyon"));
        assert_eq!(answer.verified, Some(true));
        assert_eq!(answer.confidence, dec!(0.9));
        assert_eq!(answer.evidence[0].uri, "https://example.org/saint-jean");
    }

    #[test]
    fn test_diacritics_are_folded() {
        let answer = registry().lookup("Hopital Edouard Herriot", None);
        assert_eq!(answer.confidence, dec!(0.9));
        assert_eq!(answer.evidence[0].uri, "registry:hopital-edouard-herriot");
    }

    #[test]
    fn test_description_or_other_city_is_partial() {
        let by_description = registry().lookup("Hopital de Grange Blanche", None);
        assert_eq!(by_description.verified, Some(true));
        assert_eq!(by_description.confidence, dec!(0.7));

        let elsewhere = registry().lookup("Clinique Saint-Jean", Some("Marseille"));
        assert_eq!(elsewhere.confidence, dec!(0.7));
    }

    #[test]
    fn test_unknown_facility_is_not_verified() {
        let answer = registry().lookup("Clinique des Lilas", Some("Paris"));
        assert!(answer.is_confidently_unverified());
        assert_eq!(answer.confidence, dec!(0.6));
        assert!(answer.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_unsearchable_name_is_rejected() {
        let result = registry().verify("--", None).await;
        assert!(matches!(result, Err(PortError::Transformation { .. })));
        assert!(registry().verify("Clinique Saint-Jean", None).await.is_ok());
    }

    #[test]
    fn test_empty_registry() {
        let answer = RegistryOracle::default().lookup("Anything", None);
        assert_eq!(answer.verified, Some(false));
        assert_eq!(answer.confidence, dec!(0.8));
    }
}
