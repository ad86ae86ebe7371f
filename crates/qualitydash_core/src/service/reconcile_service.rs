//! Reconciliation of the dense project matrix.
//!
//! # Responsibility
//! - Backfill project objectives, ledger entries, commitments and quality
//!   snapshots after a taxonomy entity or project is created.
//! - Repair a matrix left incomplete by an interrupted earlier run.
//!
//! # Invariants
//! - Every operation is get-or-create and safe to re-run.
//! - Existing rows keep their status, `committed` flag and snapshot value.
//! - Project objectives are ensured before any row that references them.

use crate::model::framework::{ConditionId, LevelId, ObjectiveId, WorkCycleId};
use crate::model::project::ProjectId;
use crate::repo::framework_repo::FrameworkRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use serde::Serialize;
use std::collections::HashSet;

/// Number of rows created by one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub project_objectives: usize,
    pub condition_entries: usize,
    pub commitments: usize,
    pub quality_snapshots: usize,
}

impl ReconcileReport {
    pub fn total(&self) -> usize {
        self.project_objectives + self.condition_entries + self.commitments + self.quality_snapshots
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn absorb(&mut self, other: ReconcileReport) {
        self.project_objectives += other.project_objectives;
        self.condition_entries += other.condition_entries;
        self.commitments += other.commitments;
        self.quality_snapshots += other.quality_snapshots;
    }
}

/// Explicit propagation rules invoked by the creation workflow.
pub struct ReconcileService<F: FrameworkRepository, P: ProjectRepository> {
    framework: F,
    projects: P,
}

impl<F: FrameworkRepository, P: ProjectRepository> ReconcileService<F, P> {
    pub fn new(framework: F, projects: P) -> Self {
        Self {
            framework,
            projects,
        }
    }

    /// Links a new objective to every project.
    ///
    /// Ensures one project objective per project, ledger entries for the
    /// objective's conditions, and a commitment for every
    /// (work cycle × level) pair of every project.
    pub fn reconcile_objective(&self, objective_id: ObjectiveId) -> RepoResult<ReconcileReport> {
        self.framework
            .get_objective(objective_id)?
            .ok_or(RepoError::NotFound {
                entity: "objective",
                id: objective_id,
            })?;

        let conditions = self.framework.list_conditions(Some(objective_id))?;
        let levels = self.framework.list_levels()?;
        let work_cycles = self.framework.list_work_cycles()?;

        let mut report = ReconcileReport::default();
        for project in self.projects.list_projects()? {
            report.project_objectives += usize::from(
                self.projects
                    .ensure_project_objective(project.id, objective_id)?,
            );
            for condition in &conditions {
                report.condition_entries += usize::from(
                    self.projects
                        .ensure_condition_entry(project.id, condition.id)?,
                );
            }
            for work_cycle in &work_cycles {
                for level in &levels {
                    report.commitments += usize::from(self.projects.ensure_commitment(
                        work_cycle.id,
                        project.id,
                        objective_id,
                        level.id,
                    )?);
                }
            }
        }

        log_report("objective", objective_id, &report);
        Ok(report)
    }

    /// Adds a ledger entry for the condition to every project objective of
    /// the condition's objective.
    pub fn reconcile_condition(&self, condition_id: ConditionId) -> RepoResult<ReconcileReport> {
        let condition = self
            .framework
            .get_condition(condition_id)?
            .ok_or(RepoError::NotFound {
                entity: "condition",
                id: condition_id,
            })?;

        let mut report = ReconcileReport::default();
        for project_objective in self
            .projects
            .list_all_project_objectives()?
            .into_iter()
            .filter(|item| item.objective_id == condition.objective_id)
        {
            report.condition_entries += usize::from(
                self.projects
                    .ensure_condition_entry(project_objective.project_id, condition_id)?,
            );
        }

        log_report("condition", condition_id, &report);
        Ok(report)
    }

    /// Builds the full matrix for one project.
    ///
    /// Ensures a project objective and ledger entries for every objective,
    /// plus a quality snapshot per work cycle and a commitment per
    /// (work cycle × objective × level).
    pub fn reconcile_project(&self, project_id: ProjectId) -> RepoResult<ReconcileReport> {
        self.projects
            .get_project(project_id)?
            .ok_or(RepoError::NotFound {
                entity: "project",
                id: project_id,
            })?;

        let objectives = self.framework.list_objectives()?;
        let conditions = self.framework.list_conditions(None)?;
        let levels = self.framework.list_levels()?;
        let work_cycles = self.framework.list_work_cycles()?;

        let mut report = ReconcileReport::default();
        for objective in &objectives {
            report.project_objectives += usize::from(
                self.projects
                    .ensure_project_objective(project_id, objective.id)?,
            );
            for condition in conditions
                .iter()
                .filter(|condition| condition.objective_id == objective.id)
            {
                report.condition_entries += usize::from(
                    self.projects
                        .ensure_condition_entry(project_id, condition.id)?,
                );
            }
        }

        for work_cycle in &work_cycles {
            report.quality_snapshots += usize::from(
                self.projects
                    .ensure_quality_snapshot(project_id, work_cycle.id)?,
            );
            for objective in &objectives {
                for level in &levels {
                    report.commitments += usize::from(self.projects.ensure_commitment(
                        work_cycle.id,
                        project_id,
                        objective.id,
                        level.id,
                    )?);
                }
            }
        }

        log_report("project", project_id, &report);
        Ok(report)
    }

    /// Prepares a new work cycle.
    ///
    /// A commitment is ensured per level only for project objectives whose
    /// objective has at least one condition at that level. Every project
    /// gets a quality snapshot row.
    pub fn reconcile_work_cycle(&self, work_cycle_id: WorkCycleId) -> RepoResult<ReconcileReport> {
        self.framework
            .get_work_cycle(work_cycle_id)?
            .ok_or(RepoError::NotFound {
                entity: "work cycle",
                id: work_cycle_id,
            })?;

        let gated: HashSet<(ObjectiveId, LevelId)> = self
            .framework
            .list_conditions(None)?
            .into_iter()
            .map(|condition| (condition.objective_id, condition.level_id))
            .collect();
        let project_objectives = self.projects.list_all_project_objectives()?;

        let mut report = ReconcileReport::default();
        for level in self.framework.list_levels()? {
            for project_objective in project_objectives
                .iter()
                .filter(|item| gated.contains(&(item.objective_id, level.id)))
            {
                report.commitments += usize::from(self.projects.ensure_commitment(
                    work_cycle_id,
                    project_objective.project_id,
                    project_objective.objective_id,
                    level.id,
                )?);
            }
        }

        for project in self.projects.list_projects()? {
            report.quality_snapshots += usize::from(
                self.projects
                    .ensure_quality_snapshot(project.id, work_cycle_id)?,
            );
        }

        log_report("work_cycle", work_cycle_id, &report);
        Ok(report)
    }

    /// Adds a commitment at the new level for every project objective and
    /// work cycle.
    pub fn reconcile_level(&self, level_id: LevelId) -> RepoResult<ReconcileReport> {
        self.framework
            .get_level(level_id)?
            .ok_or(RepoError::NotFound {
                entity: "level",
                id: level_id,
            })?;

        let work_cycles = self.framework.list_work_cycles()?;
        let mut report = ReconcileReport::default();
        for project_objective in self.projects.list_all_project_objectives()? {
            for work_cycle in &work_cycles {
                report.commitments += usize::from(self.projects.ensure_commitment(
                    work_cycle.id,
                    project_objective.project_id,
                    project_objective.objective_id,
                    level_id,
                )?);
            }
        }

        log_report("level", level_id, &report);
        Ok(report)
    }

    /// Re-runs project reconciliation for every project.
    pub fn reconcile_all(&self) -> RepoResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        for project in self.projects.list_projects()? {
            report.absorb(self.reconcile_project(project.id)?);
        }
        info!(
            "event=reconcile_all module=service status=ok created={}",
            report.total()
        );
        Ok(report)
    }
}

fn log_report(target: &str, id: uuid::Uuid, report: &ReconcileReport) {
    info!(
        "event=reconcile module=service status=ok target={target} id={id} project_objectives={} condition_entries={} commitments={} quality_snapshots={}",
        report.project_objectives,
        report.condition_entries,
        report.commitments,
        report.quality_snapshots
    );
}
