//! Ports and Adapters Infrastructure
//!
//! External collaborators (facility verification, payout calculation) are
//! reached through port traits defined in the domain crates. This module holds
//! the shared error vocabulary those ports return.
//!
//! ```text
//!       domain crate                       adapter crate
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │ trait VerificationOracle │◀─────│ RegistryOracle (file)    │
//! │   : DomainPort           │      │ test doubles             │
//! └──────────────────────────┘      └──────────────────────────┘
//! ```

use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The call did not answer within its time budget
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The collaborator refused the call because of its rate limit
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// The collaborator is down or not reachable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// The request or the answer could not be mapped between domain and collaborator
    #[error("Unreadable answer from {service}: {message}")]
    Transformation {
        service: String,
        message: String,
    },
}

impl PortError {
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        PortError::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::ServiceUnavailable {
            service: service.into(),
        }
    }

    pub fn transformation(service: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::Transformation {
            service: service.into(),
            message: message.into(),
        }
    }

    /// True when the same call might succeed later
    pub fn is_transient(&self) -> bool {
        !matches!(self, PortError::Transformation { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across worker tasks, so they must be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}
