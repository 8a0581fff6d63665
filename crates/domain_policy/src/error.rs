//! Policy domain errors
//!
//! Clause-set problems are configuration errors and are fatal at startup;
//! payout problems are per-claim and are absorbed by the decision engine.

use thiserror::Error;

use core_kernel::MoneyError;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The clause set defines no coverage clauses
    #[error("Policy clause set {product_code} v{version} contains no clauses")]
    ClauseSetEmpty {
        product_code: String,
        version: String,
    },

    /// The clause set document could not be parsed
    #[error("Failed to parse policy clause set: {0}")]
    Parse(String),

    /// The clause set file could not be read
    #[error("Policy clause set not found: {0}")]
    FileNotFound(String),

    /// The clause set parsed but is not internally consistent
    #[error("Invalid policy clause set: {0}")]
    InvalidClauseSet(String),

    /// The matched clause has no payout formula
    #[error("Clause {0} defines no payout formula")]
    NoPayoutFormula(String),

    /// The claim does not state an amount to reimburse
    #[error("Claim does not state a claimed amount")]
    MissingClaimedAmount,

    /// Financial calculation error
    #[error("Financial error: {0}")]
    Financial(#[from] MoneyError),
}

impl PolicyError {
    /// Creates an invalid clause set error
    pub fn invalid(message: impl Into<String>) -> Self {
        PolicyError::InvalidClauseSet(message.into())
    }

    /// True for errors that must stop the process at startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PolicyError::ClauseSetEmpty { .. }
                | PolicyError::Parse(_)
                | PolicyError::FileNotFound(_)
                | PolicyError::InvalidClauseSet(_)
        )
    }
}
