//! Claims domain errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::{ClaimId, TemporalError};

/// A structural requirement the fact bundle failed to meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRequirement {
    /// The claim has no narrative
    Narrative,
    /// No supporting document was submitted
    SupportingDocument,
    /// Every document failed extraction
    ReadableDocument,
}

impl fmt::Display for MissingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MissingRequirement::Narrative => "a narrative describing the incident",
            MissingRequirement::SupportingDocument => "at least one supporting document",
            MissingRequirement::ReadableDocument => "at least one document with readable content",
        };
        f.write_str(text)
    }
}

/// Required structural fields are absent from a fact bundle
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Malformed fact bundle for {claim_id}: missing {}", join(missing))]
pub struct MalformedFactBundle {
    pub claim_id: ClaimId,
    pub missing: Vec<MissingRequirement>,
}

fn join(missing: &[MissingRequirement]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Malformed(#[from] MalformedFactBundle),

    #[error("Date error: {0}")]
    Date(#[from] TemporalError),

    #[error("Invalid fraud rule configuration: {0}")]
    InvalidRuleConfig(String),
}
