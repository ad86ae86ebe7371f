//! Creation workflow for taxonomy entities and projects.
//!
//! # Responsibility
//! - Validate and persist new entities.
//! - Run the matching reconciliation right after each insert.
//! - Delete entities and let the store cascade their join rows.
//!
//! # Invariants
//! - An entity is reconciled only after its own insert succeeded.
//! - Level values stay unique.
//! - A condition references an existing objective and level.

use super::reconcile_service::{ReconcileReport, ReconcileService};
use crate::model::framework::{
    Condition, ConditionId, Level, LevelId, Objective, ObjectiveGroup, ObjectiveId, Reason,
    WorkCycle, WorkCycleId,
};
use crate::model::project::{Project, ProjectGroup, ProjectId};
use crate::model::ModelValidationError;
use crate::repo::framework_repo::FrameworkRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from catalog operations.
#[derive(Debug)]
pub enum CatalogError {
    Validation(ModelValidationError),
    NotFound { entity: &'static str, id: Uuid },
    /// Another level already uses this value.
    DuplicateLevelValue(i32),
    Repo(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateLevelValue(value) => {
                write!(f, "a level with value {value} already exists")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<ModelValidationError> for CatalogError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

pub struct CatalogService<F: FrameworkRepository, P: ProjectRepository> {
    framework: F,
    projects: P,
}

impl<F: FrameworkRepository, P: ProjectRepository> CatalogService<F, P> {
    pub fn new(framework: F, projects: P) -> Self {
        Self {
            framework,
            projects,
        }
    }

    fn reconciler(&self) -> ReconcileService<&F, &P> {
        ReconcileService::new(&self.framework, &self.projects)
    }

    pub fn create_level(&self, level: &Level) -> Result<ReconcileReport, CatalogError> {
        level.validate()?;
        if self
            .framework
            .list_levels()?
            .iter()
            .any(|existing| existing.value == level.value)
        {
            return Err(CatalogError::DuplicateLevelValue(level.value));
        }
        self.framework.create_level(level)?;
        info!(
            "event=catalog_create module=service status=ok entity=level id={}",
            level.id
        );
        Ok(self.reconciler().reconcile_level(level.id)?)
    }

    pub fn create_reason(&self, reason: &Reason) -> Result<(), CatalogError> {
        self.framework.create_reason(reason)?;
        Ok(())
    }

    pub fn create_objective_group(&self, group: &ObjectiveGroup) -> Result<(), CatalogError> {
        self.framework.create_objective_group(group)?;
        Ok(())
    }

    pub fn create_project_group(&self, group: &ProjectGroup) -> Result<(), CatalogError> {
        self.projects.create_project_group(group)?;
        Ok(())
    }

    pub fn create_objective(&self, objective: &Objective) -> Result<ReconcileReport, CatalogError> {
        self.framework.create_objective(objective)?;
        info!(
            "event=catalog_create module=service status=ok entity=objective id={}",
            objective.id
        );
        Ok(self.reconciler().reconcile_objective(objective.id)?)
    }

    pub fn create_condition(&self, condition: &Condition) -> Result<ReconcileReport, CatalogError> {
        condition.validate()?;
        self.framework
            .get_objective(condition.objective_id)?
            .ok_or(CatalogError::NotFound {
                entity: "objective",
                id: condition.objective_id,
            })?;
        self.framework
            .get_level(condition.level_id)?
            .ok_or(CatalogError::NotFound {
                entity: "level",
                id: condition.level_id,
            })?;
        self.framework.create_condition(condition)?;
        info!(
            "event=catalog_create module=service status=ok entity=condition id={}",
            condition.id
        );
        Ok(self.reconciler().reconcile_condition(condition.id)?)
    }

    pub fn create_work_cycle(&self, work_cycle: &WorkCycle) -> Result<ReconcileReport, CatalogError> {
        self.framework.create_work_cycle(work_cycle)?;
        info!(
            "event=catalog_create module=service status=ok entity=work_cycle id={}",
            work_cycle.id
        );
        Ok(self.reconciler().reconcile_work_cycle(work_cycle.id)?)
    }

    pub fn create_project(&self, project: &Project) -> Result<ReconcileReport, CatalogError> {
        self.projects.create_project(project)?;
        info!(
            "event=catalog_create module=service status=ok entity=project id={}",
            project.id
        );
        Ok(self.reconciler().reconcile_project(project.id)?)
    }

    /// Replaces a project's editable fields. The matrix is left untouched.
    pub fn update_project(&self, project: &Project) -> Result<(), CatalogError> {
        self.projects.update_project(project)?;
        Ok(())
    }

    pub fn set_current_work_cycle(&self, id: WorkCycleId) -> Result<(), CatalogError> {
        self.framework.set_current_work_cycle(id)?;
        Ok(())
    }

    pub fn delete_project(&self, id: ProjectId) -> Result<(), CatalogError> {
        self.projects.delete_project(id)?;
        info!("event=catalog_delete module=service status=ok entity=project id={id}");
        Ok(())
    }

    pub fn delete_objective(&self, id: ObjectiveId) -> Result<(), CatalogError> {
        self.framework.delete_objective(id)?;
        info!("event=catalog_delete module=service status=ok entity=objective id={id}");
        Ok(())
    }

    pub fn delete_condition(&self, id: ConditionId) -> Result<(), CatalogError> {
        self.framework.delete_condition(id)?;
        info!("event=catalog_delete module=service status=ok entity=condition id={id}");
        Ok(())
    }

    pub fn delete_work_cycle(&self, id: WorkCycleId) -> Result<(), CatalogError> {
        self.framework.delete_work_cycle(id)?;
        info!("event=catalog_delete module=service status=ok entity=work_cycle id={id}");
        Ok(())
    }

    pub fn delete_level(&self, id: LevelId) -> Result<(), CatalogError> {
        self.framework.delete_level(id)?;
        info!("event=catalog_delete module=service status=ok entity=level id={id}");
        Ok(())
    }
}
