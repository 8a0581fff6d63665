//! Case loading
//!
//! A benchmark directory holds one JSON file per claim:
//!
//! ```json
//! {
//!   "claim": { "id": "…", "narrative": "…", "submitted_at": "…", "documents": [] },
//!   "jurisdiction": "Europe/Paris",
//!   "expected_answer": { "decision": "APPROVE", "acceptable_decision": "UNCERTAIN" }
//! }
//! ```
//!
//! `jurisdiction` and `expected_answer` are optional. Files that cannot be
//! read or parsed are skipped with a warning so one bad case does not sink
//! the run.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use core_kernel::Timezone;
use domain_claims::{Claim, FactBundle};
use crate::error::BatchError;
use crate::grading::ExpectedAnswer;

/// One claim to evaluate, with its optional benchmark answer
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimCase {
    /// File stem the case was loaded from
    pub name: String,
    pub bundle: FactBundle,
    pub expected: Option<ExpectedAnswer>,
}

impl ClaimCase {
    pub fn new(name: impl Into<String>, bundle: FactBundle) -> Self {
        Self {
            name: name.into(),
            bundle,
            expected: None,
        }
    }

    pub fn with_expected(mut self, expected: ExpectedAnswer) -> Self {
        self.expected = Some(expected);
        self
    }
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    claim: Claim,
    #[serde(default)]
    jurisdiction: Option<Timezone>,
    #[serde(default)]
    expected_answer: Option<ExpectedAnswer>,
}

/// Reads case files, applying a default jurisdiction
#[derive(Debug, Clone, Default)]
pub struct CaseLoader {
    jurisdiction: Timezone,
}

impl CaseLoader {
    pub fn new(jurisdiction: Timezone) -> Self {
        Self { jurisdiction }
    }

    /// Parses a single case document
    pub fn parse(&self, name: &str, json: &str) -> Result<ClaimCase, serde_json::Error> {
        let file: CaseFile = serde_json::from_str(json)?;
        let jurisdiction = file.jurisdiction.unwrap_or(self.jurisdiction);
        Ok(ClaimCase {
            name: name.to_string(),
            bundle: FactBundle::new(file.claim).with_jurisdiction(jurisdiction),
            expected: file.expected_answer,
        })
    }

    /// Reads one case file
    pub fn load_file(&self, path: &Path) -> Result<ClaimCase, BatchError> {
        let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.parse(&name, &content)
            .map_err(|e| BatchError::parse(path, e.to_string()))
    }

    /// Reads every `*.json` file in a directory, ordered by file name
    ///
    /// Only an unreadable directory is an error.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<ClaimCase>, BatchError> {
        let entries = std::fs::read_dir(dir).map_err(|e| BatchError::io(dir, e))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "json")
            })
            .collect();
        paths.sort();

        let mut cases = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.load_file(path) {
                Ok(case) => cases.push(case),
                Err(e) => warn!(error = %e, "skipping case file"),
            }
        }

        info!(
            dir = %dir.display(),
            loaded = cases.len(),
            skipped = paths.len() - cases.len(),
            "claim cases loaded"
        );
        Ok(cases)
    }
}
