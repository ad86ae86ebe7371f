//! Join rows recording per-project progress.
//!
//! # Responsibility
//! - Define the condition ledger status and its legacy encodings.
//! - Define project-objective, commitment and quality snapshot rows.
//!
//! # Invariants
//! - One row per unique key (see the table constraints in `0001_init.sql`).
//! - A ledger entry's `objective_id` equals its condition's objective.
//! - Achieved levels are never stored on these rows.

use super::framework::{ConditionId, LevelId, ObjectiveId, ReasonId, WorkCycleId};
use super::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectObjectiveId = Uuid;
pub type ConditionEntryId = Uuid;
pub type CommitmentId = Uuid;
pub type QualitySnapshotId = Uuid;

/// Completion state of one condition for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    #[default]
    Unset,
    Done,
    Candidate,
    NotApplicable,
}

impl ConditionStatus {
    /// Whether this status counts toward achieving the gated level.
    ///
    /// `NotApplicable` satisfies the condition; `Candidate` does not.
    pub fn is_satisfied(self) -> bool {
        matches!(self, Self::Done | Self::NotApplicable)
    }

    /// Storage code used in `project_objective_conditions.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Done => "done",
            Self::Candidate => "candidate",
            Self::NotApplicable => "not_applicable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unset" => Some(Self::Unset),
            "done" => Some(Self::Done),
            "candidate" => Some(Self::Candidate),
            "not_applicable" => Some(Self::NotApplicable),
            _ => None,
        }
    }

    /// Maps the old three-boolean encoding. `done` wins over
    /// `not_applicable`, which wins over `candidate`.
    pub fn from_legacy_flags(done: bool, not_applicable: bool, candidate: bool) -> Self {
        if done {
            Self::Done
        } else if not_applicable {
            Self::NotApplicable
        } else if candidate {
            Self::Candidate
        } else {
            Self::Unset
        }
    }

    /// Maps the two-letter status codes (`DO`, `NA`, `CA`, empty).
    pub fn from_legacy_code(code: &str) -> Option<Self> {
        match code.trim() {
            "" => Some(Self::Unset),
            "DO" => Some(Self::Done),
            "NA" => Some(Self::NotApplicable),
            "CA" => Some(Self::Candidate),
            _ => None,
        }
    }

    /// Status after a toggle request: asking for the current status clears it.
    pub fn toggled(self, requested: Self) -> Self {
        if self == requested {
            Self::Unset
        } else {
            requested
        }
    }
}

/// Project × objective join row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectObjective {
    pub id: ProjectObjectiveId,
    pub project_id: ProjectId,
    pub objective_id: ObjectiveId,
    /// Only shown while no level is achieved.
    pub unstarted_reason_id: Option<ReasonId>,
}

/// Project × objective × condition ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub id: ConditionEntryId,
    pub project_id: ProjectId,
    pub objective_id: ObjectiveId,
    pub condition_id: ConditionId,
    /// Level gated by the condition, joined from `conditions`.
    pub level_id: LevelId,
    pub status: ConditionStatus,
}

/// Promise to reach `level_id` of an objective within a work cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: CommitmentId,
    pub work_cycle_id: WorkCycleId,
    pub project_id: ProjectId,
    pub objective_id: ObjectiveId,
    pub level_id: LevelId,
    pub committed: bool,
}

/// Quality indicator of a project frozen for one work cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySnapshot {
    pub id: QualitySnapshotId,
    pub project_id: ProjectId,
    pub work_cycle_id: WorkCycleId,
    pub value: i64,
}
