//! Taxonomy repository: levels, reasons, objectives, conditions, work cycles.
//!
//! # Responsibility
//! - Persist and list the reference data every project is measured against.
//! - Keep list ordering stable for rendering and reconciliation.
//!
//! # Invariants
//! - Levels list by `value ASC`; conditions by level value then name.
//! - Objectives list by group name then name; ungrouped objectives first.
//! - Work cycles list by `started_on ASC`.
//! - Marking a work cycle current clears the flag on every other cycle.

use super::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_optional_uuid, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::framework::{
    Condition, ConditionId, Level, LevelId, Objective, ObjectiveGroup, ObjectiveId, Reason,
    ReasonId, WorkCycle, WorkCycleId,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const OBJECTIVE_SELECT_SQL: &str = "SELECT
    o.id AS id,
    o.name AS name,
    o.description AS description,
    o.group_id AS group_id,
    o.weight AS weight
FROM objectives o
LEFT JOIN objective_groups g ON g.id = o.group_id";

const OBJECTIVE_ORDER_SQL: &str = "ORDER BY COALESCE(g.name, '') ASC, o.name ASC, o.id ASC";

const CONDITION_SELECT_SQL: &str = "SELECT
    c.id AS id,
    c.name AS name,
    c.objective_id AS objective_id,
    c.level_id AS level_id
FROM conditions c
INNER JOIN levels l ON l.id = c.level_id";

const WORK_CYCLE_SELECT_SQL: &str = "SELECT
    id,
    name,
    started_on,
    is_current
FROM work_cycles";

/// Repository interface for the measurement taxonomy.
pub trait FrameworkRepository {
    fn create_level(&self, level: &Level) -> RepoResult<LevelId>;
    fn get_level(&self, id: LevelId) -> RepoResult<Option<Level>>;
    /// Lists levels in ascending `value` order.
    fn list_levels(&self) -> RepoResult<Vec<Level>>;
    fn delete_level(&self, id: LevelId) -> RepoResult<()>;

    fn create_reason(&self, reason: &Reason) -> RepoResult<ReasonId>;
    fn get_reason(&self, id: ReasonId) -> RepoResult<Option<Reason>>;
    fn list_reasons(&self) -> RepoResult<Vec<Reason>>;

    fn create_objective_group(&self, group: &ObjectiveGroup) -> RepoResult<()>;
    fn list_objective_groups(&self) -> RepoResult<Vec<ObjectiveGroup>>;

    fn create_objective(&self, objective: &Objective) -> RepoResult<ObjectiveId>;
    fn get_objective(&self, id: ObjectiveId) -> RepoResult<Option<Objective>>;
    fn list_objectives(&self) -> RepoResult<Vec<Objective>>;
    fn delete_objective(&self, id: ObjectiveId) -> RepoResult<()>;

    fn create_condition(&self, condition: &Condition) -> RepoResult<ConditionId>;
    fn get_condition(&self, id: ConditionId) -> RepoResult<Option<Condition>>;
    /// Lists conditions, optionally restricted to one objective.
    fn list_conditions(&self, objective_id: Option<ObjectiveId>) -> RepoResult<Vec<Condition>>;
    fn delete_condition(&self, id: ConditionId) -> RepoResult<()>;

    fn create_work_cycle(&self, work_cycle: &WorkCycle) -> RepoResult<WorkCycleId>;
    fn get_work_cycle(&self, id: WorkCycleId) -> RepoResult<Option<WorkCycle>>;
    fn list_work_cycles(&self) -> RepoResult<Vec<WorkCycle>>;
    fn current_work_cycle(&self) -> RepoResult<Option<WorkCycle>>;
    fn set_current_work_cycle(&self, id: WorkCycleId) -> RepoResult<()>;
    fn delete_work_cycle(&self, id: WorkCycleId) -> RepoResult<()>;
}

impl<T: FrameworkRepository + ?Sized> FrameworkRepository for &T {
    fn create_level(&self, level: &Level) -> RepoResult<LevelId> {
        (**self).create_level(level)
    }
    fn get_level(&self, id: LevelId) -> RepoResult<Option<Level>> {
        (**self).get_level(id)
    }
    fn list_levels(&self) -> RepoResult<Vec<Level>> {
        (**self).list_levels()
    }
    fn delete_level(&self, id: LevelId) -> RepoResult<()> {
        (**self).delete_level(id)
    }
    fn create_reason(&self, reason: &Reason) -> RepoResult<ReasonId> {
        (**self).create_reason(reason)
    }
    fn get_reason(&self, id: ReasonId) -> RepoResult<Option<Reason>> {
        (**self).get_reason(id)
    }
    fn list_reasons(&self) -> RepoResult<Vec<Reason>> {
        (**self).list_reasons()
    }
    fn create_objective_group(&self, group: &ObjectiveGroup) -> RepoResult<()> {
        (**self).create_objective_group(group)
    }
    fn list_objective_groups(&self) -> RepoResult<Vec<ObjectiveGroup>> {
        (**self).list_objective_groups()
    }
    fn create_objective(&self, objective: &Objective) -> RepoResult<ObjectiveId> {
        (**self).create_objective(objective)
    }
    fn get_objective(&self, id: ObjectiveId) -> RepoResult<Option<Objective>> {
        (**self).get_objective(id)
    }
    fn list_objectives(&self) -> RepoResult<Vec<Objective>> {
        (**self).list_objectives()
    }
    fn delete_objective(&self, id: ObjectiveId) -> RepoResult<()> {
        (**self).delete_objective(id)
    }
    fn create_condition(&self, condition: &Condition) -> RepoResult<ConditionId> {
        (**self).create_condition(condition)
    }
    fn get_condition(&self, id: ConditionId) -> RepoResult<Option<Condition>> {
        (**self).get_condition(id)
    }
    fn list_conditions(&self, objective_id: Option<ObjectiveId>) -> RepoResult<Vec<Condition>> {
        (**self).list_conditions(objective_id)
    }
    fn delete_condition(&self, id: ConditionId) -> RepoResult<()> {
        (**self).delete_condition(id)
    }
    fn create_work_cycle(&self, work_cycle: &WorkCycle) -> RepoResult<WorkCycleId> {
        (**self).create_work_cycle(work_cycle)
    }
    fn get_work_cycle(&self, id: WorkCycleId) -> RepoResult<Option<WorkCycle>> {
        (**self).get_work_cycle(id)
    }
    fn list_work_cycles(&self) -> RepoResult<Vec<WorkCycle>> {
        (**self).list_work_cycles()
    }
    fn current_work_cycle(&self) -> RepoResult<Option<WorkCycle>> {
        (**self).current_work_cycle()
    }
    fn set_current_work_cycle(&self, id: WorkCycleId) -> RepoResult<()> {
        (**self).set_current_work_cycle(id)
    }
    fn delete_work_cycle(&self, id: WorkCycleId) -> RepoResult<()> {
        (**self).delete_work_cycle(id)
    }
}

/// SQLite-backed taxonomy repository.
pub struct SqliteFrameworkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFrameworkRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FrameworkRepository for SqliteFrameworkRepository<'_> {
    fn create_level(&self, level: &Level) -> RepoResult<LevelId> {
        level.validate()?;
        self.conn.execute(
            "INSERT INTO levels (id, name, value) VALUES (?1, ?2, ?3);",
            params![level.id.to_string(), level.name.trim(), level.value],
        )?;
        Ok(level.id)
    }

    fn get_level(&self, id: LevelId) -> RepoResult<Option<Level>> {
        self.conn
            .query_row(
                "SELECT id, name, value FROM levels WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(parse_level_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_levels(&self) -> RepoResult<Vec<Level>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, value FROM levels ORDER BY value ASC;")?;
        let mut rows = stmt.query([])?;
        let mut levels = Vec::new();
        while let Some(row) = rows.next()? {
            levels.push(parse_level_row(row)?);
        }
        Ok(levels)
    }

    fn delete_level(&self, id: LevelId) -> RepoResult<()> {
        delete_by_id(self.conn, "levels", "level", id)
    }

    fn create_reason(&self, reason: &Reason) -> RepoResult<ReasonId> {
        reason.validate()?;
        self.conn.execute(
            "INSERT INTO reasons (id, name, value) VALUES (?1, ?2, ?3);",
            params![reason.id.to_string(), reason.name.trim(), reason.value],
        )?;
        Ok(reason.id)
    }

    fn get_reason(&self, id: ReasonId) -> RepoResult<Option<Reason>> {
        self.conn
            .query_row(
                "SELECT id, name, value FROM reasons WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(parse_reason_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_reasons(&self) -> RepoResult<Vec<Reason>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, value FROM reasons ORDER BY value ASC, name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut reasons = Vec::new();
        while let Some(row) = rows.next()? {
            reasons.push(parse_reason_row(row)?);
        }
        Ok(reasons)
    }

    fn create_objective_group(&self, group: &ObjectiveGroup) -> RepoResult<()> {
        group.validate()?;
        self.conn.execute(
            "INSERT INTO objective_groups (id, name) VALUES (?1, ?2);",
            params![group.id.to_string(), group.name.trim()],
        )?;
        Ok(())
    }

    fn list_objective_groups(&self) -> RepoResult<Vec<ObjectiveGroup>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM objective_groups ORDER BY name ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("id")?;
            groups.push(ObjectiveGroup {
                id: parse_uuid(&id, "objective_groups.id")?,
                name: row.get("name")?,
            });
        }
        Ok(groups)
    }

    fn create_objective(&self, objective: &Objective) -> RepoResult<ObjectiveId> {
        objective.validate()?;
        self.conn.execute(
            "INSERT INTO objectives (id, name, description, group_id, weight)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                objective.id.to_string(),
                objective.name.trim(),
                objective.description.as_deref(),
                objective.group_id.map(|value| value.to_string()),
                objective.weight,
            ],
        )?;
        Ok(objective.id)
    }

    fn get_objective(&self, id: ObjectiveId) -> RepoResult<Option<Objective>> {
        self.conn
            .query_row(
                &format!("{OBJECTIVE_SELECT_SQL} WHERE o.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_objective_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_objectives(&self) -> RepoResult<Vec<Objective>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OBJECTIVE_SELECT_SQL} {OBJECTIVE_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut objectives = Vec::new();
        while let Some(row) = rows.next()? {
            objectives.push(parse_objective_row(row)?);
        }
        Ok(objectives)
    }

    fn delete_objective(&self, id: ObjectiveId) -> RepoResult<()> {
        delete_by_id(self.conn, "objectives", "objective", id)
    }

    fn create_condition(&self, condition: &Condition) -> RepoResult<ConditionId> {
        condition.validate()?;
        self.conn.execute(
            "INSERT INTO conditions (id, name, objective_id, level_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                condition.id.to_string(),
                condition.name.trim(),
                condition.objective_id.to_string(),
                condition.level_id.to_string(),
            ],
        )?;
        Ok(condition.id)
    }

    fn get_condition(&self, id: ConditionId) -> RepoResult<Option<Condition>> {
        self.conn
            .query_row(
                &format!("{CONDITION_SELECT_SQL} WHERE c.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_condition_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_conditions(&self, objective_id: Option<ObjectiveId>) -> RepoResult<Vec<Condition>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONDITION_SELECT_SQL}
             WHERE (?1 IS NULL OR c.objective_id = ?1)
             ORDER BY l.value ASC, c.name ASC, c.id ASC;"
        ))?;
        let mut rows = stmt.query([objective_id.map(|value| value.to_string())])?;
        let mut conditions = Vec::new();
        while let Some(row) = rows.next()? {
            conditions.push(parse_condition_row(row)?);
        }
        Ok(conditions)
    }

    fn delete_condition(&self, id: ConditionId) -> RepoResult<()> {
        delete_by_id(self.conn, "conditions", "condition", id)
    }

    fn create_work_cycle(&self, work_cycle: &WorkCycle) -> RepoResult<WorkCycleId> {
        work_cycle.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if work_cycle.is_current {
            tx.execute("UPDATE work_cycles SET is_current = 0;", [])?;
        }
        tx.execute(
            "INSERT INTO work_cycles (id, name, started_on, is_current)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                work_cycle.id.to_string(),
                work_cycle.name.trim(),
                work_cycle.started_on,
                bool_to_int(work_cycle.is_current),
            ],
        )?;
        tx.commit()?;
        Ok(work_cycle.id)
    }

    fn get_work_cycle(&self, id: WorkCycleId) -> RepoResult<Option<WorkCycle>> {
        self.conn
            .query_row(
                &format!("{WORK_CYCLE_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_work_cycle_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_work_cycles(&self) -> RepoResult<Vec<WorkCycle>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WORK_CYCLE_SELECT_SQL} ORDER BY started_on ASC, name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut cycles = Vec::new();
        while let Some(row) = rows.next()? {
            cycles.push(parse_work_cycle_row(row)?);
        }
        Ok(cycles)
    }

    fn current_work_cycle(&self) -> RepoResult<Option<WorkCycle>> {
        self.conn
            .query_row(
                &format!("{WORK_CYCLE_SELECT_SQL} WHERE is_current = 1 LIMIT 1;"),
                [],
                |row| Ok(parse_work_cycle_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn set_current_work_cycle(&self, id: WorkCycleId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE work_cycles SET is_current = 0 WHERE id <> ?1;",
            [id.to_string()],
        )?;
        let changed = tx.execute(
            "UPDATE work_cycles SET is_current = 1 WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            // Dropping the transaction rolls back the cleared flags.
            return Err(RepoError::NotFound {
                entity: "work cycle",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_work_cycle(&self, id: WorkCycleId) -> RepoResult<()> {
        delete_by_id(self.conn, "work_cycles", "work cycle", id)
    }
}

fn delete_by_id(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: uuid::Uuid,
) -> RepoResult<()> {
    let changed = conn.execute(
        &format!("DELETE FROM {table} WHERE id = ?1;"),
        [id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

fn parse_level_row(row: &Row<'_>) -> RepoResult<Level> {
    let id: String = row.get("id")?;
    Ok(Level {
        id: parse_uuid(&id, "levels.id")?,
        name: row.get("name")?,
        value: row.get("value")?,
    })
}

fn parse_reason_row(row: &Row<'_>) -> RepoResult<Reason> {
    let id: String = row.get("id")?;
    Ok(Reason {
        id: parse_uuid(&id, "reasons.id")?,
        name: row.get("name")?,
        value: row.get("value")?,
    })
}

fn parse_objective_row(row: &Row<'_>) -> RepoResult<Objective> {
    let id: String = row.get("id")?;
    Ok(Objective {
        id: parse_uuid(&id, "objectives.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        group_id: parse_optional_uuid(row.get("group_id")?, "objectives.group_id")?,
        weight: row.get("weight")?,
    })
}

fn parse_condition_row(row: &Row<'_>) -> RepoResult<Condition> {
    let id: String = row.get("id")?;
    let objective_id: String = row.get("objective_id")?;
    let level_id: String = row.get("level_id")?;
    Ok(Condition {
        id: parse_uuid(&id, "conditions.id")?,
        name: row.get("name")?,
        objective_id: parse_uuid(&objective_id, "conditions.objective_id")?,
        level_id: parse_uuid(&level_id, "conditions.level_id")?,
    })
}

fn parse_work_cycle_row(row: &Row<'_>) -> RepoResult<WorkCycle> {
    let id: String = row.get("id")?;
    Ok(WorkCycle {
        id: parse_uuid(&id, "work_cycles.id")?,
        name: row.get("name")?,
        started_on: row.get("started_on")?,
        is_current: parse_flag(row.get("is_current")?, "work_cycles.is_current")?,
    })
}
