//! Use-case services over the dashboard repositories.
//!
//! # Responsibility
//! - Orchestrate repository calls and the pure engine into use cases.
//! - Keep callers (CLI, request handlers) free of SQL and propagation rules.

pub mod catalog_service;
pub mod ledger_service;
pub mod reconcile_service;
pub mod scoring_service;
pub mod snapshot_service;
