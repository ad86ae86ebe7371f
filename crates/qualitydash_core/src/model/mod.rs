//! Domain model for the quality dashboard.
//!
//! # Responsibility
//! - Define the measurement taxonomy (levels, objectives, conditions, cycles).
//! - Define projects and the join rows that record their progress.
//!
//! # Invariants
//! - Entities reference each other by id only; no entity embeds another.
//! - Every persisted entity has a non-nil UUID.

pub mod framework;
pub mod ledger;
pub mod project;

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Validation failure raised before an entity reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Entity id is the nil UUID.
    NilId { entity: &'static str },
    /// Display name is empty after trimming.
    BlankName { entity: &'static str },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId { entity } => write!(f, "{entity} id must not be nil"),
            Self::BlankName { entity } => write!(f, "{entity} name must not be blank"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn ensure_id(entity: &'static str, id: Uuid) -> Result<(), ModelValidationError> {
    if id.is_nil() {
        return Err(ModelValidationError::NilId { entity });
    }
    Ok(())
}

pub(crate) fn ensure_name(entity: &'static str, name: &str) -> Result<(), ModelValidationError> {
    if name.trim().is_empty() {
        return Err(ModelValidationError::BlankName { entity });
    }
    Ok(())
}
