//! Project repository: projects and the dense join matrix around them.
//!
//! # Responsibility
//! - Persist projects and their review metadata.
//! - Get-or-create project objectives, ledger entries, commitments and
//!   quality snapshots.
//! - Apply per-row toggles and the batched snapshot write.
//!
//! # Invariants
//! - `ensure_*` returns `true` only when a new row was inserted.
//! - A ledger entry's objective is always copied from its condition.
//! - `apply_quality_values` writes every value or none.

use super::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_optional_uuid, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::framework::{ConditionId, LevelId, ObjectiveId, ReasonId, WorkCycleId};
use crate::model::ledger::{
    Commitment, CommitmentId, ConditionEntry, ConditionEntryId, ConditionStatus,
    ProjectObjective, ProjectObjectiveId, QualitySnapshot, QualitySnapshotId,
};
use crate::model::project::{Project, ProjectGroup, ProjectId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.name AS name,
    p.url AS url,
    p.group_id AS group_id,
    p.owner AS owner,
    p.driver AS driver,
    p.last_review AS last_review,
    p.last_review_status AS last_review_status,
    p.agreement_status AS agreement_status
FROM projects p
LEFT JOIN project_groups g ON g.id = p.group_id";

const PROJECT_OBJECTIVE_SELECT_SQL: &str = "SELECT
    po.id AS id,
    po.project_id AS project_id,
    po.objective_id AS objective_id,
    po.unstarted_reason_id AS unstarted_reason_id
FROM project_objectives po
INNER JOIN objectives o ON o.id = po.objective_id
LEFT JOIN objective_groups g ON g.id = o.group_id";

const PROJECT_OBJECTIVE_ORDER_SQL: &str =
    "ORDER BY COALESCE(g.name, '') ASC, o.name ASC, o.id ASC, po.project_id ASC";

const CONDITION_ENTRY_SELECT_SQL: &str = "SELECT
    poc.id AS id,
    poc.project_id AS project_id,
    poc.objective_id AS objective_id,
    poc.condition_id AS condition_id,
    c.level_id AS level_id,
    poc.status AS status
FROM project_objective_conditions poc
INNER JOIN conditions c ON c.id = poc.condition_id
INNER JOIN levels l ON l.id = c.level_id";

const COMMITMENT_SELECT_SQL: &str = "SELECT
    cm.id AS id,
    cm.work_cycle_id AS work_cycle_id,
    cm.project_id AS project_id,
    cm.objective_id AS objective_id,
    cm.level_id AS level_id,
    cm.committed AS committed
FROM commitments cm
INNER JOIN objectives o ON o.id = cm.objective_id
INNER JOIN levels l ON l.id = cm.level_id
INNER JOIN work_cycles w ON w.id = cm.work_cycle_id";

const SNAPSHOT_SELECT_SQL: &str = "SELECT
    qs.id AS id,
    qs.project_id AS project_id,
    qs.work_cycle_id AS work_cycle_id,
    qs.value AS value
FROM quality_snapshots qs
INNER JOIN work_cycles w ON w.id = qs.work_cycle_id
INNER JOIN projects p ON p.id = qs.project_id";

/// Repository interface for projects and their join rows.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Lists projects by group name then name.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn create_project_group(&self, group: &ProjectGroup) -> RepoResult<()>;

    fn ensure_project_objective(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<bool>;
    fn get_project_objective(&self, id: ProjectObjectiveId)
        -> RepoResult<Option<ProjectObjective>>;
    fn find_project_objective(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Option<ProjectObjective>>;
    /// Lists one project's objectives in objective order.
    fn list_project_objectives(&self, project_id: ProjectId) -> RepoResult<Vec<ProjectObjective>>;
    fn list_all_project_objectives(&self) -> RepoResult<Vec<ProjectObjective>>;
    fn set_unstarted_reason(
        &self,
        id: ProjectObjectiveId,
        reason_id: Option<ReasonId>,
    ) -> RepoResult<()>;

    fn ensure_condition_entry(
        &self,
        project_id: ProjectId,
        condition_id: ConditionId,
    ) -> RepoResult<bool>;
    fn get_condition_entry(&self, id: ConditionEntryId) -> RepoResult<Option<ConditionEntry>>;
    /// Lists the ledger of one project objective by level value.
    fn list_condition_entries(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Vec<ConditionEntry>>;
    fn set_condition_status(&self, id: ConditionEntryId, status: ConditionStatus)
        -> RepoResult<()>;

    fn ensure_commitment(
        &self,
        work_cycle_id: WorkCycleId,
        project_id: ProjectId,
        objective_id: ObjectiveId,
        level_id: LevelId,
    ) -> RepoResult<bool>;
    fn get_commitment(&self, id: CommitmentId) -> RepoResult<Option<Commitment>>;
    fn find_commitment(
        &self,
        work_cycle_id: WorkCycleId,
        project_id: ProjectId,
        objective_id: ObjectiveId,
        level_id: LevelId,
    ) -> RepoResult<Option<Commitment>>;
    /// Lists a project's commitments by objective, level value, cycle start.
    fn list_commitments(&self, project_id: ProjectId) -> RepoResult<Vec<Commitment>>;
    fn set_committed(&self, id: CommitmentId, committed: bool) -> RepoResult<()>;

    fn ensure_quality_snapshot(
        &self,
        project_id: ProjectId,
        work_cycle_id: WorkCycleId,
    ) -> RepoResult<bool>;
    fn list_quality_snapshots(&self, work_cycle_id: WorkCycleId)
        -> RepoResult<Vec<QualitySnapshot>>;
    /// Lists one project's snapshots by cycle start date.
    fn quality_history(&self, project_id: ProjectId) -> RepoResult<Vec<QualitySnapshot>>;
    /// Writes all `(snapshot, value)` pairs in one transaction.
    fn apply_quality_values(&self, values: &[(QualitySnapshotId, i64)]) -> RepoResult<usize>;
}

impl<T: ProjectRepository + ?Sized> ProjectRepository for &T {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        (**self).create_project(project)
    }
    fn update_project(&self, project: &Project) -> RepoResult<()> {
        (**self).update_project(project)
    }
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        (**self).get_project(id)
    }
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        (**self).list_projects()
    }
    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        (**self).delete_project(id)
    }
    fn create_project_group(&self, group: &ProjectGroup) -> RepoResult<()> {
        (**self).create_project_group(group)
    }
    fn ensure_project_objective(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<bool> {
        (**self).ensure_project_objective(project_id, objective_id)
    }
    fn get_project_objective(
        &self,
        id: ProjectObjectiveId,
    ) -> RepoResult<Option<ProjectObjective>> {
        (**self).get_project_objective(id)
    }
    fn find_project_objective(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Option<ProjectObjective>> {
        (**self).find_project_objective(project_id, objective_id)
    }
    fn list_project_objectives(&self, project_id: ProjectId) -> RepoResult<Vec<ProjectObjective>> {
        (**self).list_project_objectives(project_id)
    }
    fn list_all_project_objectives(&self) -> RepoResult<Vec<ProjectObjective>> {
        (**self).list_all_project_objectives()
    }
    fn set_unstarted_reason(
        &self,
        id: ProjectObjectiveId,
        reason_id: Option<ReasonId>,
    ) -> RepoResult<()> {
        (**self).set_unstarted_reason(id, reason_id)
    }
    fn ensure_condition_entry(
        &self,
        project_id: ProjectId,
        condition_id: ConditionId,
    ) -> RepoResult<bool> {
        (**self).ensure_condition_entry(project_id, condition_id)
    }
    fn get_condition_entry(&self, id: ConditionEntryId) -> RepoResult<Option<ConditionEntry>> {
        (**self).get_condition_entry(id)
    }
    fn list_condition_entries(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Vec<ConditionEntry>> {
        (**self).list_condition_entries(project_id, objective_id)
    }
    fn set_condition_status(
        &self,
        id: ConditionEntryId,
        status: ConditionStatus,
    ) -> RepoResult<()> {
        (**self).set_condition_status(id, status)
    }
    fn ensure_commitment(
        &self,
        work_cycle_id: WorkCycleId,
        project_id: ProjectId,
        objective_id: ObjectiveId,
        level_id: LevelId,
    ) -> RepoResult<bool> {
        (**self).ensure_commitment(work_cycle_id, project_id, objective_id, level_id)
    }
    fn get_commitment(&self, id: CommitmentId) -> RepoResult<Option<Commitment>> {
        (**self).get_commitment(id)
    }
    fn find_commitment(
        &self,
        work_cycle_id: WorkCycleId,
        project_id: ProjectId,
        objective_id: ObjectiveId,
        level_id: LevelId,
    ) -> RepoResult<Option<Commitment>> {
        (**self).find_commitment(work_cycle_id, project_id, objective_id, level_id)
    }
    fn list_commitments(&self, project_id: ProjectId) -> RepoResult<Vec<Commitment>> {
        (**self).list_commitments(project_id)
    }
    fn set_committed(&self, id: CommitmentId, committed: bool) -> RepoResult<()> {
        (**self).set_committed(id, committed)
    }
    fn ensure_quality_snapshot(
        &self,
        project_id: ProjectId,
        work_cycle_id: WorkCycleId,
    ) -> RepoResult<bool> {
        (**self).ensure_quality_snapshot(project_id, work_cycle_id)
    }
    fn list_quality_snapshots(
        &self,
        work_cycle_id: WorkCycleId,
    ) -> RepoResult<Vec<QualitySnapshot>> {
        (**self).list_quality_snapshots(work_cycle_id)
    }
    fn quality_history(&self, project_id: ProjectId) -> RepoResult<Vec<QualitySnapshot>> {
        (**self).quality_history(project_id)
    }
    fn apply_quality_values(&self, values: &[(QualitySnapshotId, i64)]) -> RepoResult<usize> {
        (**self).apply_quality_values(values)
    }
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;
        self.conn.execute(
            "INSERT INTO projects (
                id,
                name,
                url,
                group_id,
                owner,
                driver,
                last_review,
                last_review_status,
                agreement_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                project.id.to_string(),
                project.name.trim(),
                project.url.as_str(),
                project.group_id.map(|value| value.to_string()),
                project.owner.as_deref(),
                project.driver.as_deref(),
                project.last_review,
                project.last_review_status.as_deref(),
                project.agreement_status.as_deref(),
            ],
        )?;
        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?2,
                url = ?3,
                group_id = ?4,
                owner = ?5,
                driver = ?6,
                last_review = ?7,
                last_review_status = ?8,
                agreement_status = ?9
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.name.trim(),
                project.url.as_str(),
                project.group_id.map(|value| value.to_string()),
                project.owner.as_deref(),
                project.driver.as_deref(),
                project.last_review,
                project.last_review_status.as_deref(),
                project.agreement_status.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id: project.id,
            });
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE p.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_project_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY COALESCE(g.name, '') ASC, p.name ASC, p.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }

    fn create_project_group(&self, group: &ProjectGroup) -> RepoResult<()> {
        group.validate()?;
        self.conn.execute(
            "INSERT INTO project_groups (id, name) VALUES (?1, ?2);",
            params![group.id.to_string(), group.name.trim()],
        )?;
        Ok(())
    }

    fn ensure_project_objective(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO project_objectives (id, project_id, objective_id)
             VALUES (?1, ?2, ?3);",
            params![
                Uuid::new_v4().to_string(),
                project_id.to_string(),
                objective_id.to_string(),
            ],
        )?;
        Ok(inserted > 0)
    }

    fn get_project_objective(
        &self,
        id: ProjectObjectiveId,
    ) -> RepoResult<Option<ProjectObjective>> {
        self.conn
            .query_row(
                &format!("{PROJECT_OBJECTIVE_SELECT_SQL} WHERE po.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_project_objective_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_project_objective(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Option<ProjectObjective>> {
        self.conn
            .query_row(
                &format!(
                    "{PROJECT_OBJECTIVE_SELECT_SQL} WHERE po.project_id = ?1 AND po.objective_id = ?2;"
                ),
                [project_id.to_string(), objective_id.to_string()],
                |row| Ok(parse_project_objective_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_project_objectives(&self, project_id: ProjectId) -> RepoResult<Vec<ProjectObjective>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_OBJECTIVE_SELECT_SQL} WHERE po.project_id = ?1 {PROJECT_OBJECTIVE_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_project_objective_row(row)?);
        }
        Ok(items)
    }

    fn list_all_project_objectives(&self) -> RepoResult<Vec<ProjectObjective>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_OBJECTIVE_SELECT_SQL} {PROJECT_OBJECTIVE_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_project_objective_row(row)?);
        }
        Ok(items)
    }

    fn set_unstarted_reason(
        &self,
        id: ProjectObjectiveId,
        reason_id: Option<ReasonId>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE project_objectives SET unstarted_reason_id = ?2 WHERE id = ?1;",
            params![id.to_string(), reason_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project objective",
                id,
            });
        }
        Ok(())
    }

    fn ensure_condition_entry(
        &self,
        project_id: ProjectId,
        condition_id: ConditionId,
    ) -> RepoResult<bool> {
        let objective_id: Option<String> = self
            .conn
            .query_row(
                "SELECT objective_id FROM conditions WHERE id = ?1;",
                [condition_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(objective_id) = objective_id else {
            return Err(RepoError::NotFound {
                entity: "condition",
                id: condition_id,
            });
        };

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO project_objective_conditions (
                id,
                project_id,
                objective_id,
                condition_id,
                status
            ) VALUES (?1, ?2, ?3, ?4, 'unset');",
            params![
                Uuid::new_v4().to_string(),
                project_id.to_string(),
                objective_id,
                condition_id.to_string(),
            ],
        )?;
        Ok(inserted > 0)
    }

    fn get_condition_entry(&self, id: ConditionEntryId) -> RepoResult<Option<ConditionEntry>> {
        self.conn
            .query_row(
                &format!("{CONDITION_ENTRY_SELECT_SQL} WHERE poc.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_condition_entry_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_condition_entries(
        &self,
        project_id: ProjectId,
        objective_id: ObjectiveId,
    ) -> RepoResult<Vec<ConditionEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONDITION_ENTRY_SELECT_SQL}
             WHERE poc.project_id = ?1
               AND poc.objective_id = ?2
             ORDER BY l.value ASC, c.name ASC, c.id ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string(), objective_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_condition_entry_row(row)?);
        }
        Ok(entries)
    }

    fn set_condition_status(
        &self,
        id: ConditionEntryId,
        status: ConditionStatus,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE project_objective_conditions SET status = ?2 WHERE id = ?1;",
            params![id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "condition entry",
                id,
            });
        }
        Ok(())
    }

    fn ensure_commitment(
        &self,
        work_cycle_id: WorkCycleId,
        project_id: ProjectId,
        objective_id: ObjectiveId,
        level_id: LevelId,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO commitments (
                id,
                work_cycle_id,
                project_id,
                objective_id,
                level_id,
                committed
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0);",
            params![
                Uuid::new_v4().to_string(),
                work_cycle_id.to_string(),
                project_id.to_string(),
                objective_id.to_string(),
                level_id.to_string(),
            ],
        )?;
        Ok(inserted > 0)
    }

    fn get_commitment(&self, id: CommitmentId) -> RepoResult<Option<Commitment>> {
        self.conn
            .query_row(
                &format!("{COMMITMENT_SELECT_SQL} WHERE cm.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_commitment_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_commitment(
        &self,
        work_cycle_id: WorkCycleId,
        project_id: ProjectId,
        objective_id: ObjectiveId,
        level_id: LevelId,
    ) -> RepoResult<Option<Commitment>> {
        self.conn
            .query_row(
                &format!(
                    "{COMMITMENT_SELECT_SQL}
                     WHERE cm.work_cycle_id = ?1
                       AND cm.project_id = ?2
                       AND cm.objective_id = ?3
                       AND cm.level_id = ?4;"
                ),
                [
                    work_cycle_id.to_string(),
                    project_id.to_string(),
                    objective_id.to_string(),
                    level_id.to_string(),
                ],
                |row| Ok(parse_commitment_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_commitments(&self, project_id: ProjectId) -> RepoResult<Vec<Commitment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMITMENT_SELECT_SQL}
             WHERE cm.project_id = ?1
             ORDER BY o.name ASC, o.id ASC, l.value ASC, w.started_on ASC, w.id ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut commitments = Vec::new();
        while let Some(row) = rows.next()? {
            commitments.push(parse_commitment_row(row)?);
        }
        Ok(commitments)
    }

    fn set_committed(&self, id: CommitmentId, committed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE commitments SET committed = ?2 WHERE id = ?1;",
            params![id.to_string(), bool_to_int(committed)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "commitment",
                id,
            });
        }
        Ok(())
    }

    fn ensure_quality_snapshot(
        &self,
        project_id: ProjectId,
        work_cycle_id: WorkCycleId,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO quality_snapshots (id, project_id, work_cycle_id, value)
             VALUES (?1, ?2, ?3, 0);",
            params![
                Uuid::new_v4().to_string(),
                project_id.to_string(),
                work_cycle_id.to_string(),
            ],
        )?;
        Ok(inserted > 0)
    }

    fn list_quality_snapshots(
        &self,
        work_cycle_id: WorkCycleId,
    ) -> RepoResult<Vec<QualitySnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SNAPSHOT_SELECT_SQL}
             WHERE qs.work_cycle_id = ?1
             ORDER BY p.name ASC, p.id ASC;"
        ))?;
        let mut rows = stmt.query([work_cycle_id.to_string()])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(parse_snapshot_row(row)?);
        }
        Ok(snapshots)
    }

    fn quality_history(&self, project_id: ProjectId) -> RepoResult<Vec<QualitySnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SNAPSHOT_SELECT_SQL}
             WHERE qs.project_id = ?1
             ORDER BY w.started_on ASC, w.id ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(parse_snapshot_row(row)?);
        }
        Ok(snapshots)
    }

    fn apply_quality_values(&self, values: &[(QualitySnapshotId, i64)]) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare("UPDATE quality_snapshots SET value = ?2 WHERE id = ?1;")?;
            for (id, value) in values {
                let changed = stmt.execute(params![id.to_string(), value])?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "quality snapshot",
                        id: *id,
                    });
                }
                updated += changed;
            }
        }
        tx.commit()?;
        Ok(updated)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id: String = row.get("id")?;
    Ok(Project {
        id: parse_uuid(&id, "projects.id")?,
        name: row.get("name")?,
        url: row.get("url")?,
        group_id: parse_optional_uuid(row.get("group_id")?, "projects.group_id")?,
        owner: row.get("owner")?,
        driver: row.get("driver")?,
        last_review: row.get("last_review")?,
        last_review_status: row.get("last_review_status")?,
        agreement_status: row.get("agreement_status")?,
    })
}

fn parse_project_objective_row(row: &Row<'_>) -> RepoResult<ProjectObjective> {
    let id: String = row.get("id")?;
    let project_id: String = row.get("project_id")?;
    let objective_id: String = row.get("objective_id")?;
    Ok(ProjectObjective {
        id: parse_uuid(&id, "project_objectives.id")?,
        project_id: parse_uuid(&project_id, "project_objectives.project_id")?,
        objective_id: parse_uuid(&objective_id, "project_objectives.objective_id")?,
        unstarted_reason_id: parse_optional_uuid(
            row.get("unstarted_reason_id")?,
            "project_objectives.unstarted_reason_id",
        )?,
    })
}

fn parse_condition_entry_row(row: &Row<'_>) -> RepoResult<ConditionEntry> {
    let id: String = row.get("id")?;
    let project_id: String = row.get("project_id")?;
    let objective_id: String = row.get("objective_id")?;
    let condition_id: String = row.get("condition_id")?;
    let level_id: String = row.get("level_id")?;
    let status_text: String = row.get("status")?;
    let status = ConditionStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in project_objective_conditions.status"
        ))
    })?;

    Ok(ConditionEntry {
        id: parse_uuid(&id, "project_objective_conditions.id")?,
        project_id: parse_uuid(&project_id, "project_objective_conditions.project_id")?,
        objective_id: parse_uuid(&objective_id, "project_objective_conditions.objective_id")?,
        condition_id: parse_uuid(&condition_id, "project_objective_conditions.condition_id")?,
        level_id: parse_uuid(&level_id, "conditions.level_id")?,
        status,
    })
}

fn parse_commitment_row(row: &Row<'_>) -> RepoResult<Commitment> {
    let id: String = row.get("id")?;
    let work_cycle_id: String = row.get("work_cycle_id")?;
    let project_id: String = row.get("project_id")?;
    let objective_id: String = row.get("objective_id")?;
    let level_id: String = row.get("level_id")?;
    Ok(Commitment {
        id: parse_uuid(&id, "commitments.id")?,
        work_cycle_id: parse_uuid(&work_cycle_id, "commitments.work_cycle_id")?,
        project_id: parse_uuid(&project_id, "commitments.project_id")?,
        objective_id: parse_uuid(&objective_id, "commitments.objective_id")?,
        level_id: parse_uuid(&level_id, "commitments.level_id")?,
        committed: parse_flag(row.get("committed")?, "commitments.committed")?,
    })
}

fn parse_snapshot_row(row: &Row<'_>) -> RepoResult<QualitySnapshot> {
    let id: String = row.get("id")?;
    let project_id: String = row.get("project_id")?;
    let work_cycle_id: String = row.get("work_cycle_id")?;
    Ok(QualitySnapshot {
        id: parse_uuid(&id, "quality_snapshots.id")?,
        project_id: parse_uuid(&project_id, "quality_snapshots.project_id")?,
        work_cycle_id: parse_uuid(&work_cycle_id, "quality_snapshots.work_cycle_id")?,
        value: row.get("value")?,
    })
}
