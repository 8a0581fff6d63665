//! Claim Adjudication Domain
//!
//! This crate turns the evidence signals of a claim into a decision: an
//! outcome with a confidence score, the fraud indicators behind it, the
//! matched policy section and a step-by-step justification.
//!
//! # Decision Flow
//!
//! ```text
//!                 ┌─> FraudRuleEngine ──┐
//! FactBundle ─────┼─> TimelineAnalyzer ─┼─> DecisionAggregator ─> ExplanationComposer ─> Decision
//!                 └─> PolicyMatcher ────┘
//! ```
//!
//! A Tier 1 fraud indicator short-circuits policy matching. The engine is
//! synchronous and pure; the [`VerificationGateway`] is the async wrapper
//! that consults the facility oracle first.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_adjudication::{DecisionEngine, Outcome};
//! use domain_policy::PolicyClauseSet;
//!
//! let engine = DecisionEngine::new(Arc::new(PolicyClauseSet::cfsr_default()?));
//! let decision = engine.decide(&bundle);
//!
//! if decision.outcome == Outcome::Approve {
//!     println!("pay {:?}", decision.compensation);
//! }
//! ```

pub mod decision;
pub mod aggregator;
pub mod explanation;
pub mod engine;
pub mod gateway;

pub use decision::{Confidence, Decision, DegradedSignal, Outcome, PrecedenceRule};
pub use aggregator::{DecisionAggregator, Verdict};
pub use explanation::{DecisionInputs, ExplanationComposer};
pub use engine::DecisionEngine;
pub use gateway::VerificationGateway;
