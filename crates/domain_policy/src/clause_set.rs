//! Versioned policy clause set
//!
//! The clause set is static configuration loaded once per process from a
//! JSON document:
//!
//! ```text
//! {
//!   "metadata": { "product_code", "product_name", "version", "effective_date", "currency" },
//!   "clauses": [ PolicyClause, ... ],          // table order breaks ties
//!   "general_exclusions": { "section", "title", "exclusions": [ Exclusion, ... ] }
//! }
//! ```
//!
//! An empty clause table is a startup error, never a per-claim condition.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use core_kernel::Currency;
use crate::clause::{Exclusion, ExclusionTrigger, PolicyClause};
use crate::error::PolicyError;

const CFSR_V1: &str = include_str!("../products/cfsr_v1.json");

/// Product metadata carried by a clause set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseSetMetadata {
    pub product_code: String,
    pub product_name: String,
    pub version: String,
    pub effective_date: NaiveDate,
    pub currency: Currency,
}

/// Exclusions that apply whichever clause matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralExclusions {
    pub section: String,
    pub title: String,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
}

impl Default for GeneralExclusions {
    fn default() -> Self {
        Self {
            section: "4".to_string(),
            title: "General exclusions".to_string(),
            exclusions: Vec::new(),
        }
    }
}

/// The read-only table of coverage clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyClauseSet {
    pub metadata: ClauseSetMetadata,
    pub clauses: Vec<PolicyClause>,
    #[serde(default)]
    pub general_exclusions: GeneralExclusions,
}

impl PolicyClauseSet {
    /// Parses and validates a clause set document
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let set: PolicyClauseSet =
            serde_json::from_str(json).map_err(|e| PolicyError::Parse(e.to_string()))?;
        set.validate()?;
        info!(
            product_code = %set.metadata.product_code,
            version = %set.metadata.version,
            clauses = set.clauses.len(),
            "policy clause set loaded"
        );
        Ok(set)
    }

    /// Reads a clause set document from disk
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PolicyError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// The clause set shipped with the crate (`CFSR` v1)
    pub fn cfsr_default() -> Result<Self, PolicyError> {
        Self::from_json(CFSR_V1)
    }

    /// Checks the table is usable
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.clauses.is_empty() {
            return Err(PolicyError::ClauseSetEmpty {
                product_code: self.metadata.product_code.clone(),
                version: self.metadata.version.clone(),
            });
        }

        let mut sections = HashSet::new();
        for clause in &self.clauses {
            if !sections.insert(clause.section.as_str()) {
                return Err(PolicyError::invalid(format!(
                    "duplicate section {}",
                    clause.section
                )));
            }
            if clause.covers.keywords.is_empty() || clause.covers.min_keyword_hits == 0 {
                return Err(PolicyError::invalid(format!(
                    "clause {} has an unsatisfiable or empty coverage predicate",
                    clause.section
                )));
            }
            if let Some(payout) = &clause.payout {
                let in_range = payout.reimbursement_percent.is_sign_positive()
                    && payout.reimbursement_percent <= dec!(100);
                if !in_range {
                    return Err(PolicyError::invalid(format!(
                        "clause {} reimburses {}%",
                        clause.section, payout.reimbursement_percent
                    )));
                }
            }
        }

        let exclusions = self
            .clauses
            .iter()
            .flat_map(|clause| clause.exclusions.iter())
            .chain(self.general_exclusions.exclusions.iter());
        for exclusion in exclusions {
            if let ExclusionTrigger::Keywords { keywords } = &exclusion.trigger {
                if keywords.is_empty() {
                    return Err(PolicyError::invalid(format!(
                        "exclusion {} has no keywords",
                        exclusion.code
                    )));
                }
            }
        }

        Ok(())
    }

    /// Looks up a clause by section reference
    pub fn clause(&self, section: &str) -> Option<&PolicyClause> {
        self.clauses.iter().find(|clause| clause.section == section)
    }

    /// Clauses in table order
    pub fn clauses(&self) -> &[PolicyClause] {
        &self.clauses
    }

    /// `"CFSR v1"`
    pub fn label(&self) -> String {
        format!("{} v{}", self.metadata.product_code, self.metadata.version)
    }
}
