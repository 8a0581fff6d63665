//! Batch configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use core_kernel::Timezone;
use domain_adjudication::DecisionEngine;
use domain_claims::{FraudRuleConfig, FraudRuleEngine};
use domain_policy::PolicyClauseSet;
use crate::error::BatchError;

/// Batch configuration, read from `CLAIMS_*` environment variables
///
/// Every key has a default, so an empty environment yields a usable
/// configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory holding one JSON case file per claim
    pub input_dir: PathBuf,
    /// Where the JSON report is written
    pub output_path: PathBuf,
    /// Maximum number of claims evaluated at once
    #[validate(range(min = 1, max = 64))]
    pub concurrency: usize,
    /// Pause between two dispatches, in milliseconds
    #[validate(range(max = 600_000))]
    pub pacing_ms: u64,
    /// Upper bound on a single facility lookup, in milliseconds
    #[validate(range(min = 100, max = 60_000))]
    pub oracle_timeout_ms: u64,
    /// JSON list of known facilities; facility checks are skipped without it
    pub facility_registry_path: Option<PathBuf>,
    /// Clause set document; the embedded CFSR clause set is used without it
    pub clause_set_path: Option<PathBuf>,
    /// Travel this many days past submission raises a distant travel indicator
    #[validate(range(min = 1, max = 3650))]
    pub distant_travel_days: i64,
    /// IANA timezone for case files that do not name a jurisdiction
    #[validate(custom(function = "validate_timezone"))]
    pub timezone: String,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("claims"),
            output_path: PathBuf::from("results/decisions.json"),
            concurrency: 4,
            pacing_ms: 0,
            oracle_timeout_ms: 5_000,
            facility_registry_path: None,
            clause_set_path: None,
            distant_travel_days: FraudRuleConfig::default().distant_travel_days,
            timezone: "UTC".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl BatchConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("CLAIMS"))
            .build()?
            .try_deserialize()
    }

    /// Loads and validates configuration
    pub fn load() -> Result<Self, BatchError> {
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    pub fn fraud_rules(&self) -> FraudRuleConfig {
        FraudRuleConfig {
            distant_travel_days: self.distant_travel_days,
        }
    }

    /// Builds the decision engine with the configured fraud thresholds
    pub fn decision_engine(
        &self,
        clause_set: Arc<PolicyClauseSet>,
    ) -> Result<DecisionEngine, BatchError> {
        let fraud = FraudRuleEngine::new(self.fraud_rules())?;
        Ok(DecisionEngine::new(clause_set).with_fraud_engine(fraud))
    }

    /// The default jurisdiction for loaded cases
    pub fn jurisdiction(&self) -> Result<Timezone, BatchError> {
        Ok(Timezone::parse(&self.timezone)?)
    }
}

fn validate_timezone(value: &str) -> Result<(), ValidationError> {
    Timezone::parse(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_timezone"))
}
