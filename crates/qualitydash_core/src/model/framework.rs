//! Measurement taxonomy: levels, objectives, conditions and work cycles.
//!
//! # Invariants
//! - `Level::value` is unique within the store and defines level order.
//! - A `Condition` gates exactly one level of exactly one objective.
//! - At most one `WorkCycle` is flagged current.

use super::{ensure_id, ensure_name, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LevelId = Uuid;
pub type ReasonId = Uuid;
pub type ObjectiveGroupId = Uuid;
pub type ObjectiveId = Uuid;
pub type ConditionId = Uuid;
pub type WorkCycleId = Uuid;

/// Ordered maturity rank an objective can reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    /// Rank; higher is better. Also the multiplier in the quality indicator.
    pub value: i32,
}

impl Level {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("level", self.id)?;
        ensure_name("level", &self.name)
    }
}

/// Categorical explanation for why work on an objective has not started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub id: ReasonId,
    pub name: String,
    /// Ordering key only.
    pub value: i32,
}

impl Reason {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("reason", self.id)?;
        ensure_name("reason", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveGroup {
    pub id: ObjectiveGroupId,
    pub name: String,
}

impl ObjectiveGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("objective group", self.id)?;
        ensure_name("objective group", &self.name)
    }
}

/// A dimension in which quality is measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    pub name: String,
    pub description: Option<String>,
    pub group_id: Option<ObjectiveGroupId>,
    /// Contribution multiplier. Non-negative by convention only.
    pub weight: i32,
}

impl Objective {
    pub fn new(name: impl Into<String>, weight: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            group_id: None,
            weight,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("objective", self.id)?;
        ensure_name("objective", &self.name)
    }
}

/// Atomic checkable requirement gating one level of one objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: ConditionId,
    pub name: String,
    pub objective_id: ObjectiveId,
    pub level_id: LevelId,
}

impl Condition {
    pub fn new(objective_id: ObjectiveId, level_id: LevelId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            objective_id,
            level_id,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("condition", self.id)?;
        ensure_name("condition", &self.name)
    }
}

/// Named period against which commitments and snapshots are recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCycle {
    pub id: WorkCycleId,
    pub name: String,
    pub started_on: NaiveDate,
    pub is_current: bool,
}

impl WorkCycle {
    pub fn new(name: impl Into<String>, started_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            started_on,
            is_current: false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("work cycle", self.id)?;
        ensure_name("work cycle", &self.name)
    }
}
