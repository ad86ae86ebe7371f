//! Pure scoring engine.
//!
//! # Responsibility
//! - Resolve the achieved level of one project objective from its ledger.
//! - Derive display status, quality indicator and commitment fulfilment.
//!
//! # Invariants
//! - Functions here never touch storage and never cache results.
//! - Level order is always taken from `Level::value`, not input order.

pub mod quality;
pub mod resolver;
