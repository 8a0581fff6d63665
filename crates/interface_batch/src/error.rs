//! Batch error handling

use thiserror::Error;

use core_kernel::TemporalError;
use domain_claims::ClaimError;
use domain_policy::PolicyError;

/// Errors that stop a batch before or after the run
///
/// Per-claim problems never show up here; they end up in the decision.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid jurisdiction: {0}")]
    Jurisdiction(#[from] TemporalError),

    #[error("Invalid fraud rules: {0}")]
    Rules(#[from] ClaimError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write report: {0}")]
    Report(String),
}

impl BatchError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        BatchError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        BatchError::Parse {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}
