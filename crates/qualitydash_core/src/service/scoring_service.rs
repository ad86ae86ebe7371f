//! Live scoring over the condition ledger.
//!
//! # Responsibility
//! - Load ledger rows and feed them to the pure engine.
//! - Expose achieved level, status, quality indicator and commitment checks.
//!
//! # Invariants
//! - Nothing computed here is written back; every read recomputes.
//! - A status that is a reason or absent contributes zero quality.

use crate::engine::quality::{self, ObjectiveStatus};
use crate::engine::resolver::resolve_achieved_level;
use crate::model::framework::{Level, Objective, ObjectiveId};
use crate::model::ledger::{CommitmentId, ProjectObjective, ProjectObjectiveId};
use crate::model::project::ProjectId;
use crate::repo::framework_repo::FrameworkRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::{RepoError, RepoResult};
use serde::Serialize;
use std::collections::HashMap;

/// Status of one objective of a project, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectiveStatusRow {
    pub project_objective: ProjectObjective,
    pub objective: Objective,
    pub status: Option<ObjectiveStatus>,
}

/// Achieved level of one project objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub project_id: ProjectId,
    pub objective_id: ObjectiveId,
    pub achieved_level: Option<Level>,
}

pub struct ScoringService<F: FrameworkRepository, P: ProjectRepository> {
    framework: F,
    projects: P,
}

impl<F: FrameworkRepository, P: ProjectRepository> ScoringService<F, P> {
    pub fn new(framework: F, projects: P) -> Self {
        Self {
            framework,
            projects,
        }
    }

    /// Highest level whose conditions, and all lower ones, are satisfied.
    pub fn achieved_level(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Option<Level>> {
        let levels = self.framework.list_levels()?;
        self.resolve_with(&levels, project_id, objective_id)
    }

    /// Achieved level, else unstarted reason, else `None`.
    pub fn status(
        &self,
        project_objective_id: ProjectObjectiveId,
    ) -> RepoResult<Option<ObjectiveStatus>> {
        let project_objective = self
            .projects
            .get_project_objective(project_objective_id)?
            .ok_or(RepoError::NotFound {
                entity: "project objective",
                id: project_objective_id,
            })?;
        let levels = self.framework.list_levels()?;
        self.status_with(&levels, &project_objective)
    }

    /// Status of every objective of the project, in objective order.
    pub fn objective_statuses(&self, project_id: ProjectId) -> RepoResult<Vec<ObjectiveStatusRow>> {
        let levels = self.framework.list_levels()?;
        let mut objectives: HashMap<ObjectiveId, Objective> = self
            .framework
            .list_objectives()?
            .into_iter()
            .map(|objective| (objective.id, objective))
            .collect();

        let mut rows = Vec::new();
        for project_objective in self.projects.list_project_objectives(project_id)? {
            let objective = objectives.remove(&project_objective.objective_id).ok_or(
                RepoError::NotFound {
                    entity: "objective",
                    id: project_objective.objective_id,
                },
            )?;
            let status = self.status_with(&levels, &project_objective)?;
            rows.push(ObjectiveStatusRow {
                project_objective,
                objective,
                status,
            });
        }
        Ok(rows)
    }

    /// Sum of `level.value * objective.weight` over achieved objectives.
    pub fn quality_indicator(&self, project_id: ProjectId) -> RepoResult<i64> {
        self.projects
            .get_project(project_id)?
            .ok_or(RepoError::NotFound {
                entity: "project",
                id: project_id,
            })?;

        let rows = self.objective_statuses(project_id)?;
        Ok(quality::quality_indicator(
            rows.iter()
                .map(|row| (row.objective.weight, row.status.as_ref())),
        ))
    }

    /// Whether current progress fulfils the commitment; `None` while the
    /// project objective has no achieved level.
    pub fn commitment_met(&self, commitment_id: CommitmentId) -> RepoResult<Option<bool>> {
        let commitment = self
            .projects
            .get_commitment(commitment_id)?
            .ok_or(RepoError::NotFound {
                entity: "commitment",
                id: commitment_id,
            })?;
        let levels = self.framework.list_levels()?;
        let committed_level = levels
            .iter()
            .find(|level| level.id == commitment.level_id)
            .ok_or(RepoError::NotFound {
                entity: "level",
                id: commitment.level_id,
            })?;

        let achieved =
            self.resolve_with(&levels, commitment.project_id, commitment.objective_id)?;
        Ok(quality::commitment_met(achieved.as_ref(), committed_level))
    }

    /// Resolves the achieved level of every project objective in the store.
    pub fn level_overview(&self) -> RepoResult<Vec<LevelSummary>> {
        let levels = self.framework.list_levels()?;
        let mut summaries = Vec::new();
        for project_objective in self.projects.list_all_project_objectives()? {
            let achieved_level = self.resolve_with(
                &levels,
                project_objective.project_id,
                project_objective.objective_id,
            )?;
            summaries.push(LevelSummary {
                project_id: project_objective.project_id,
                objective_id: project_objective.objective_id,
                achieved_level,
            });
        }
        Ok(summaries)
    }

    fn resolve_with(
        &self,
        levels: &[Level],
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Option<Level>> {
        let entries = self
            .projects
            .list_condition_entries(project_id, objective_id)?;
        Ok(resolve_achieved_level(levels, &entries).cloned())
    }

    fn status_with(
        &self,
        levels: &[Level],
        project_objective: &ProjectObjective,
    ) -> RepoResult<Option<ObjectiveStatus>> {
        let achieved = self.resolve_with(
            levels,
            project_objective.project_id,
            project_objective.objective_id,
        )?;
        let reason = match (achieved.is_some(), project_objective.unstarted_reason_id) {
            (false, Some(reason_id)) => self.framework.get_reason(reason_id)?,
            _ => None,
        };
        Ok(quality::resolve_status(achieved, reason))
    }
}
