//! Core Kernel - Foundational types for the claim decision engine
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money types with precise decimal arithmetic
//! - Date resolution that refuses to guess ambiguous inputs
//! - Strongly-typed identifiers
//! - The port error vocabulary for external collaborators

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{DateInput, Timezone, TemporalError, parse_date};
pub use identifiers::{ClaimId, DocumentId, RunId};
pub use ports::{PortError, DomainPort};
