//! Verification Oracle Test Doubles

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};
use domain_claims::{FacilityVerification, VerificationOracle};

/// Returns the same answer for every facility and counts calls
#[derive(Debug)]
pub struct FixedOracle {
    answer: FacilityVerification,
    calls: AtomicUsize,
}

impl FixedOracle {
    pub fn new(answer: FacilityVerification) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for FixedOracle {}

#[async_trait]
impl VerificationOracle for FixedOracle {
    async fn verify(
        &self,
        _facility: &str,
        _location: Option<&str>,
    ) -> Result<FacilityVerification, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

/// Answers only after a delay, to exercise timeouts
#[derive(Debug)]
pub struct SlowOracle {
    pub delay: Duration,
}

impl DomainPort for SlowOracle {}

#[async_trait]
impl VerificationOracle for SlowOracle {
    async fn verify(
        &self,
        _facility: &str,
        _location: Option<&str>,
    ) -> Result<FacilityVerification, PortError> {
        tokio::time::sleep(self.delay).await;
        Ok(FacilityVerification::unknown())
    }
}

/// Always fails as if the search service were down
#[derive(Debug, Default)]
pub struct FailingOracle;

impl DomainPort for FailingOracle {}

#[async_trait]
impl VerificationOracle for FailingOracle {
    async fn verify(
        &self,
        _facility: &str,
        _location: Option<&str>,
    ) -> Result<FacilityVerification, PortError> {
        Err(PortError::unavailable("facility search"))
    }
}
