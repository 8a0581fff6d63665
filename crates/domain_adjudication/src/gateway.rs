//! Verification gateway
//!
//! The only suspending step of a decision. Facility lookups go through the
//! optional [`VerificationOracle`] with a bounded timeout; a failed or slow
//! oracle degrades the facility signal to "unavailable" and the decision
//! goes ahead without it.
//!
//! ```text
//! FactBundle ──facility_queries──> oracle.verify (timeout) ──> FacilityVerifications
//!      │                                                              │
//!      └──────────────────────> DecisionEngine::decide_with <─────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use core_kernel::PortError;
use domain_claims::{
    facility_queries, FactBundle, FacilityCheck, FacilityVerifications, VerificationOracle,
};
use crate::decision::Decision;
use crate::engine::DecisionEngine;

/// Consults the verification oracle under a timeout
#[derive(Clone)]
pub struct VerificationGateway {
    oracle: Option<Arc<dyn VerificationOracle>>,
    timeout: Duration,
}

impl VerificationGateway {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(oracle: Arc<dyn VerificationOracle>, timeout: Duration) -> Self {
        Self {
            oracle: Some(oracle),
            timeout,
        }
    }

    /// A gateway with no oracle; facility checks are simply not performed
    pub fn disabled() -> Self {
        Self {
            oracle: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Verifies every facility the bundle asks about
    #[instrument(skip_all, fields(claim_id = %bundle.claim.id))]
    pub async fn gather(&self, bundle: &FactBundle) -> FacilityVerifications {
        let mut verifications = FacilityVerifications::new();
        let Some(oracle) = &self.oracle else {
            return verifications;
        };

        for query in facility_queries(bundle) {
            let call = oracle.verify(&query.facility, query.location.as_deref());
            let check = match tokio::time::timeout(self.timeout, call).await {
                Ok(Ok(answer)) => {
                    debug!(
                        facility = %query.facility,
                        verified = ?answer.verified,
                        confidence = %answer.confidence,
                        "facility verified"
                    );
                    FacilityCheck::Answered(answer)
                }
                Ok(Err(e)) => {
                    warn!(
                        facility = %query.facility,
                        error = %e,
                        transient = e.is_transient(),
                        "facility verification failed"
                    );
                    FacilityCheck::Unavailable {
                        reason: e.to_string(),
                    }
                }
                Err(_) => {
                    let e = PortError::timeout(
                        "facility verification",
                        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    );
                    warn!(
                        facility = %query.facility,
                        error = %e,
                        "facility verification timed out"
                    );
                    FacilityCheck::Unavailable {
                        reason: e.to_string(),
                    }
                }
            };
            verifications.record(query.document, check);
        }

        verifications
    }

    /// Gathers facility answers, then decides
    pub async fn decide(&self, engine: &DecisionEngine, bundle: &FactBundle) -> Decision {
        let verifications = self.gather(bundle).await;
        engine.decide_with(bundle, &verifications)
    }
}

impl std::fmt::Debug for VerificationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationGateway")
            .field("enabled", &self.is_enabled())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for VerificationGateway {
    fn default() -> Self {
        Self::disabled()
    }
}
