//! Condition ledger and commitment toggles.
//!
//! # Responsibility
//! - Provide the single-row updates an outer request layer performs.
//!
//! # Invariants
//! - Each operation touches exactly one row.
//! - Toggling a condition to its current status clears it to `Unset`.

use crate::model::framework::{LevelId, ObjectiveId, ReasonId, WorkCycleId};
use crate::model::ledger::{
    CommitmentId, ConditionEntryId, ConditionStatus, ProjectObjectiveId,
};
use crate::model::project::ProjectId;
use crate::repo::framework_repo::FrameworkRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from ledger operations.
#[derive(Debug)]
pub enum LedgerError {
    ConditionEntryNotFound(ConditionEntryId),
    CommitmentNotFound(CommitmentId),
    /// No commitment row for the (cycle, project, objective, level) cell.
    CommitmentCellNotFound,
    ProjectObjectiveNotFound(ProjectObjectiveId),
    ReasonNotFound(ReasonId),
    Repo(RepoError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConditionEntryNotFound(id) => write!(f, "condition entry not found: {id}"),
            Self::CommitmentNotFound(id) => write!(f, "commitment not found: {id}"),
            Self::CommitmentCellNotFound => write!(f, "commitment not found for cell"),
            Self::ProjectObjectiveNotFound(id) => write!(f, "project objective not found: {id}"),
            Self::ReasonNotFound(id) => write!(f, "reason not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "condition entry",
                id,
            } => Self::ConditionEntryNotFound(id),
            RepoError::NotFound {
                entity: "commitment",
                id,
            } => Self::CommitmentNotFound(id),
            RepoError::NotFound {
                entity: "project objective",
                id,
            } => Self::ProjectObjectiveNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct LedgerService<F: FrameworkRepository, P: ProjectRepository> {
    framework: F,
    projects: P,
}

impl<F: FrameworkRepository, P: ProjectRepository> LedgerService<F, P> {
    pub fn new(framework: F, projects: P) -> Self {
        Self {
            framework,
            projects,
        }
    }

    /// Flips one condition toward `requested`, or back to `Unset` when it
    /// already has that status. Returns the stored status.
    pub fn toggle_condition_status(
        &self,
        entry_id: ConditionEntryId,
        requested: ConditionStatus,
    ) -> Result<ConditionStatus, LedgerError> {
        let entry = self
            .projects
            .get_condition_entry(entry_id)?
            .ok_or(LedgerError::ConditionEntryNotFound(entry_id))?;
        let next = entry.status.toggled(requested);
        self.projects.set_condition_status(entry_id, next)?;
        debug!(
            "event=condition_toggle module=service status=ok entry={entry_id} from={} to={}",
            entry.status.as_str(),
            next.as_str()
        );
        Ok(next)
    }

    pub fn set_condition_status(
        &self,
        entry_id: ConditionEntryId,
        status: ConditionStatus,
    ) -> Result<(), LedgerError> {
        self.projects
            .set_condition_status(entry_id, status)
            .map_err(Into::into)
    }

    /// Flips `committed` and returns the new value.
    pub fn toggle_commitment(&self, commitment_id: CommitmentId) -> Result<bool, LedgerError> {
        let commitment = self
            .projects
            .get_commitment(commitment_id)?
            .ok_or(LedgerError::CommitmentNotFound(commitment_id))?;
        let next = !commitment.committed;
        self.projects.set_committed(commitment_id, next)?;
        debug!(
            "event=commitment_toggle module=service status=ok commitment={commitment_id} committed={next}"
        );
        Ok(next)
    }

    /// `committed` flag of one cell of the commitment matrix.
    pub fn work_cycle_commitment(
        &self,
        work_cycle_id: WorkCycleId,
        project_id: ProjectId,
        objective_id: ObjectiveId,
        level_id: LevelId,
    ) -> Result<bool, LedgerError> {
        self.projects
            .find_commitment(work_cycle_id, project_id, objective_id, level_id)?
            .map(|commitment| commitment.committed)
            .ok_or(LedgerError::CommitmentCellNotFound)
    }

    /// Records why work has not started; `None` clears the reason.
    pub fn select_unstarted_reason(
        &self,
        project_objective_id: ProjectObjectiveId,
        reason_id: Option<ReasonId>,
    ) -> Result<(), LedgerError> {
        if let Some(reason_id) = reason_id {
            self.framework
                .get_reason(reason_id)?
                .ok_or(LedgerError::ReasonNotFound(reason_id))?;
        }
        self.projects
            .set_unstarted_reason(project_objective_id, reason_id)
            .map_err(Into::into)
    }
}
