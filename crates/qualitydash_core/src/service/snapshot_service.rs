//! Quality indicator snapshots per work cycle.
//!
//! # Invariants
//! - Snapshot values change only through `apply_snapshot`.
//! - One apply writes every snapshot of the cycle in a single transaction.

use super::scoring_service::ScoringService;
use crate::model::framework::WorkCycleId;
use crate::model::ledger::QualitySnapshot;
use crate::model::project::ProjectId;
use crate::repo::framework_repo::FrameworkRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Message shown to operators after a successful apply.
pub const SNAPSHOT_APPLIED_MESSAGE: &str = "Copied current QI values.";

pub struct SnapshotService<F: FrameworkRepository, P: ProjectRepository> {
    framework: F,
    projects: P,
}

impl<F: FrameworkRepository, P: ProjectRepository> SnapshotService<F, P> {
    pub fn new(framework: F, projects: P) -> Self {
        Self {
            framework,
            projects,
        }
    }

    /// Copies every project's current quality indicator into its snapshot
    /// for `work_cycle_id`. Returns the number of snapshots written.
    pub fn apply_snapshot(&self, work_cycle_id: WorkCycleId) -> RepoResult<usize> {
        self.framework
            .get_work_cycle(work_cycle_id)?
            .ok_or(RepoError::NotFound {
                entity: "work cycle",
                id: work_cycle_id,
            })?;

        let scoring = ScoringService::new(&self.framework, &self.projects);
        let mut values = Vec::new();
        for snapshot in self.projects.list_quality_snapshots(work_cycle_id)? {
            values.push((snapshot.id, scoring.quality_indicator(snapshot.project_id)?));
        }

        let updated = self.projects.apply_quality_values(&values)?;
        info!(
            "event=snapshot_apply module=service status=ok work_cycle={work_cycle_id} updated={updated}"
        );
        Ok(updated)
    }

    /// Snapshots of one project ordered by work cycle start.
    pub fn quality_history(&self, project_id: ProjectId) -> RepoResult<Vec<QualitySnapshot>> {
        self.projects.quality_history(project_id)
    }
}
