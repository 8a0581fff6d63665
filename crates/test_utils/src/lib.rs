//! Test Utilities Crate
//!
//! Shared test infrastructure for the claim decision engine test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built data and the reference claim scenarios
//! - `builders`: Builder patterns for claims and documents
//! - `oracles`: Verification oracle test doubles
//! - `assertions`: Custom assertion helpers for decisions
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod oracles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use oracles::*;
pub use assertions::*;
pub use generators::*;
