//! Batch Evaluation Interface
//!
//! Runs claim cases from disk through the decision engine and grades the
//! decisions against expected answers when a benchmark provides them.
//!
//! # Components
//!
//! - [`config`] - `CLAIMS_*` environment configuration
//! - [`loader`] - JSON case files to fact bundles
//! - [`registry`] - facility registry behind the verification oracle port
//! - [`orchestrator`] - bounded worker pool with pacing and cancellation
//! - [`grading`] - exact / acceptable / mismatch accounting

pub mod config;
pub mod error;
pub mod loader;
pub mod registry;
pub mod grading;
pub mod orchestrator;

pub use crate::config::BatchConfig;
pub use crate::error::BatchError;
pub use crate::loader::{CaseLoader, ClaimCase};
pub use crate::registry::{FacilityEntry, RegistryOracle};
pub use crate::grading::{ExpectedAnswer, Grade, GradingSummary};
pub use crate::orchestrator::{BatchReport, BatchRunner, DecisionRecord};
