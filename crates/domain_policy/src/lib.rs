//! Policy Coverage Domain
//!
//! This crate holds the coverage side of a claim decision: the versioned
//! table of CFSR policy clauses, the matcher that classifies a claim against
//! it, and the payout formulas used to compute compensation.
//!
//! # Matching
//!
//! ```text
//! FactBundle -> PolicyMatcher -> Matched { clause, exclusion? } | NoMatch
//!                     ▲
//!         PolicyClauseSet (loaded once, read-only)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_policy::{PolicyClauseSet, PolicyMatcher};
//!
//! let clauses = Arc::new(PolicyClauseSet::cfsr_default()?);
//! let matcher = PolicyMatcher::new(clauses);
//!
//! match matcher.match_claim(&bundle) {
//!     PolicyMatch::Matched(m) if m.is_excluded() => { /* lean deny */ }
//!     PolicyMatch::Matched(m) => { /* covered under m.section */ }
//!     PolicyMatch::NoMatch { reason } => { /* lean uncertain */ }
//! }
//! ```

pub mod clause;
pub mod clause_set;
pub mod matcher;
pub mod payout;
pub mod error;

pub use clause::{
    ClauseCategory, CoveragePredicate, Exclusion, ExclusionTrigger, PayoutFormula, PolicyClause,
};
pub use clause_set::{ClauseSetMetadata, GeneralExclusions, PolicyClauseSet};
pub use matcher::{ClauseMatch, PolicyMatch, PolicyMatcher, TriggeredExclusion};
pub use payout::{FormulaPayoutCalculator, PayoutCalculator};
pub use error::PolicyError;
