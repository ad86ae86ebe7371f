//! Core domain logic for the quality dashboard.
//! Level resolution, quality scoring, matrix propagation and snapshots live
//! here; front ends only parse input and render results.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::quality::{commitment_met, quality_indicator, resolve_status, ObjectiveStatus};
pub use engine::resolver::resolve_achieved_level;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::framework::{
    Condition, ConditionId, Level, LevelId, Objective, ObjectiveGroup, ObjectiveGroupId,
    ObjectiveId, Reason, ReasonId, WorkCycle, WorkCycleId,
};
pub use model::ledger::{
    Commitment, CommitmentId, ConditionEntry, ConditionEntryId, ConditionStatus,
    ProjectObjective, ProjectObjectiveId, QualitySnapshot, QualitySnapshotId,
};
pub use model::project::{
    FreshnessPolicy, Project, ProjectGroup, ProjectGroupId, ProjectId, ReviewFreshness,
};
pub use model::ModelValidationError;
pub use repo::framework_repo::{FrameworkRepository, SqliteFrameworkRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{CatalogError, CatalogService};
pub use service::ledger_service::{LedgerError, LedgerService};
pub use service::reconcile_service::{ReconcileReport, ReconcileService};
pub use service::scoring_service::{LevelSummary, ObjectiveStatusRow, ScoringService};
pub use service::snapshot_service::{SnapshotService, SNAPSHOT_APPLIED_MESSAGE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
