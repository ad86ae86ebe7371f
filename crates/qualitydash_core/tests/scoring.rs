use chrono::NaiveDate;
use qualitydash_core::db::open_db_in_memory;
use qualitydash_core::{
    CatalogService, Condition, ConditionId, ConditionStatus, LedgerService, Level, Objective,
    ObjectiveId, ObjectiveStatus, Project, ProjectId, ProjectRepository, Reason, RepoError,
    ScoringService, SqliteFrameworkRepository, SqliteProjectRepository, WorkCycle,
};
use rusqlite::Connection;
use uuid::Uuid;

type Repos<'conn> = (SqliteFrameworkRepository<'conn>, SqliteProjectRepository<'conn>);

fn repos(conn: &Connection) -> Repos<'_> {
    (
        SqliteFrameworkRepository::try_new(conn).unwrap(),
        SqliteProjectRepository::try_new(conn).unwrap(),
    )
}

fn catalog(
    conn: &Connection,
) -> CatalogService<SqliteFrameworkRepository<'_>, SqliteProjectRepository<'_>> {
    let (framework, projects) = repos(conn);
    CatalogService::new(framework, projects)
}

fn scoring(
    conn: &Connection,
) -> ScoringService<SqliteFrameworkRepository<'_>, SqliteProjectRepository<'_>> {
    let (framework, projects) = repos(conn);
    ScoringService::new(framework, projects)
}

fn ledger(
    conn: &Connection,
) -> LedgerService<SqliteFrameworkRepository<'_>, SqliteProjectRepository<'_>> {
    let (framework, projects) = repos(conn);
    LedgerService::new(framework, projects)
}

/// Toggles the ledger entry of `condition_id` for `project_id`.
fn toggle(
    conn: &Connection,
    project_id: ProjectId,
    objective_id: ObjectiveId,
    condition_id: ConditionId,
    status: ConditionStatus,
) -> ConditionStatus {
    let (_, projects) = repos(conn);
    let entry = projects
        .list_condition_entries(project_id, objective_id)
        .unwrap()
        .into_iter()
        .find(|entry| entry.condition_id == condition_id)
        .unwrap();
    ledger(conn).toggle_condition_status(entry.id, status).unwrap()
}

#[test]
fn single_condition_drives_level_and_quality() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    let level = Level::new("Level 1", 1);
    let objective = Objective::new("Documentation", 1);
    let condition = Condition::new(objective.id, level.id, "README");
    let project = Project::new("Alpha");
    catalog.create_level(&level).unwrap();
    catalog.create_objective(&objective).unwrap();
    catalog.create_condition(&condition).unwrap();
    catalog.create_project(&project).unwrap();

    let scoring = scoring(&conn);
    assert_eq!(scoring.achieved_level(project.id, objective.id).unwrap(), None);
    assert_eq!(scoring.quality_indicator(project.id).unwrap(), 0);

    let stored = toggle(&conn, project.id, objective.id, condition.id, ConditionStatus::Done);
    assert_eq!(stored, ConditionStatus::Done);
    assert_eq!(
        scoring.achieved_level(project.id, objective.id).unwrap(),
        Some(level.clone())
    );
    assert_eq!(scoring.quality_indicator(project.id).unwrap(), 1);

    let stored = toggle(&conn, project.id, objective.id, condition.id, ConditionStatus::Done);
    assert_eq!(stored, ConditionStatus::Unset);
    assert_eq!(scoring.achieved_level(project.id, objective.id).unwrap(), None);
    assert_eq!(scoring.quality_indicator(project.id).unwrap(), 0);
}

#[test]
fn quality_indicator_weights_each_objective() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    let level_2 = Level::new("Level 2", 2);
    let level_4 = Level::new("Level 4", 4);
    let docs = Objective::new("Documentation", 10);
    let testing = Objective::new("Testing", 5);
    let docs_l2 = Condition::new(docs.id, level_2.id, "README");
    let docs_l4 = Condition::new(docs.id, level_4.id, "Tutorials");
    let testing_l2 = Condition::new(testing.id, level_2.id, "Unit tests");
    let testing_l4 = Condition::new(testing.id, level_4.id, "Integration tests");
    let alpha = Project::new("Alpha");
    let beta = Project::new("Beta");
    catalog.create_level(&level_2).unwrap();
    catalog.create_level(&level_4).unwrap();
    catalog.create_objective(&docs).unwrap();
    catalog.create_objective(&testing).unwrap();
    catalog.create_condition(&docs_l2).unwrap();
    catalog.create_condition(&docs_l4).unwrap();
    catalog.create_condition(&testing_l2).unwrap();
    catalog.create_condition(&testing_l4).unwrap();
    catalog.create_project(&alpha).unwrap();
    catalog.create_project(&beta).unwrap();

    toggle(&conn, alpha.id, docs.id, docs_l2.id, ConditionStatus::Done);
    toggle(&conn, alpha.id, testing.id, testing_l2.id, ConditionStatus::Done);
    toggle(&conn, alpha.id, testing.id, testing_l4.id, ConditionStatus::NotApplicable);

    let scoring = scoring(&conn);
    assert_eq!(scoring.quality_indicator(alpha.id).unwrap(), 10 * 2 + 5 * 4);
    assert_eq!(scoring.quality_indicator(beta.id).unwrap(), 0);

    toggle(&conn, beta.id, docs.id, docs_l2.id, ConditionStatus::Done);
    assert_eq!(scoring.quality_indicator(beta.id).unwrap(), 20);
    assert_eq!(scoring.quality_indicator(alpha.id).unwrap(), 40);
}

#[test]
fn ungated_levels_above_a_satisfied_one_are_achieved() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    let level_1 = Level::new("Level 1", 1);
    let level_2 = Level::new("Level 2", 2);
    let level_3 = Level::new("Level 3", 3);
    let objective = Objective::new("Documentation", 2);
    let readme = Condition::new(objective.id, level_1.id, "README");
    let project = Project::new("Alpha");
    catalog.create_level(&level_1).unwrap();
    catalog.create_level(&level_2).unwrap();
    catalog.create_level(&level_3).unwrap();
    catalog.create_objective(&objective).unwrap();
    catalog.create_condition(&readme).unwrap();
    catalog.create_project(&project).unwrap();

    let scoring = scoring(&conn);
    assert_eq!(scoring.achieved_level(project.id, objective.id).unwrap(), None);

    toggle(&conn, project.id, objective.id, readme.id, ConditionStatus::Done);
    assert_eq!(
        scoring.achieved_level(project.id, objective.id).unwrap(),
        Some(level_3)
    );
    assert_eq!(scoring.quality_indicator(project.id).unwrap(), 6);
}

#[test]
fn candidate_blocks_higher_levels() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    let level_1 = Level::new("Level 1", 1);
    let level_2 = Level::new("Level 2", 2);
    let objective = Objective::new("Documentation", 3);
    let basic = Condition::new(objective.id, level_1.id, "README");
    let advanced = Condition::new(objective.id, level_2.id, "API docs");
    let project = Project::new("Alpha");
    catalog.create_level(&level_1).unwrap();
    catalog.create_level(&level_2).unwrap();
    catalog.create_objective(&objective).unwrap();
    catalog.create_condition(&basic).unwrap();
    catalog.create_condition(&advanced).unwrap();
    catalog.create_project(&project).unwrap();

    toggle(&conn, project.id, objective.id, basic.id, ConditionStatus::Candidate);
    toggle(&conn, project.id, objective.id, advanced.id, ConditionStatus::Done);

    let scoring = scoring(&conn);
    assert_eq!(scoring.achieved_level(project.id, objective.id).unwrap(), None);

    toggle(&conn, project.id, objective.id, basic.id, ConditionStatus::Done);
    assert_eq!(
        scoring.achieved_level(project.id, objective.id).unwrap(),
        Some(level_2)
    );
    assert_eq!(scoring.quality_indicator(project.id).unwrap(), 6);
}

#[test]
fn status_falls_back_to_unstarted_reason() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let (_, projects) = repos(&conn);

    let level = Level::new("Level 1", 1);
    let objective = Objective::new("Documentation", 10);
    let condition = Condition::new(objective.id, level.id, "README");
    let reason = Reason::new("Not prioritized", 1);
    let project = Project::new("Alpha");
    catalog.create_level(&level).unwrap();
    catalog.create_reason(&reason).unwrap();
    catalog.create_objective(&objective).unwrap();
    catalog.create_condition(&condition).unwrap();
    catalog.create_project(&project).unwrap();

    let project_objective = projects
        .find_project_objective(project.id, objective.id)
        .unwrap()
        .unwrap();
    let scoring = scoring(&conn);
    assert_eq!(scoring.status(project_objective.id).unwrap(), None);

    ledger(&conn)
        .select_unstarted_reason(project_objective.id, Some(reason.id))
        .unwrap();
    assert_eq!(
        scoring.status(project_objective.id).unwrap(),
        Some(ObjectiveStatus::Reason(reason.clone()))
    );
    assert_eq!(scoring.quality_indicator(project.id).unwrap(), 0);

    toggle(&conn, project.id, objective.id, condition.id, ConditionStatus::Done);
    assert_eq!(
        scoring.status(project_objective.id).unwrap(),
        Some(ObjectiveStatus::Level(level))
    );

    let rows = scoring.objective_statuses(project.id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].objective.id, objective.id);
    assert_eq!(rows[0].status.as_ref().map(|status| status.name()), Some("Level 1"));
}

#[test]
fn commitment_met_tracks_achieved_level() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let (_, projects) = repos(&conn);

    let level_1 = Level::new("Level 1", 1);
    let level_2 = Level::new("Level 2", 2);
    let objective = Objective::new("Documentation", 10);
    let basic = Condition::new(objective.id, level_1.id, "README");
    let advanced = Condition::new(objective.id, level_2.id, "API docs");
    let work_cycle = WorkCycle::new("2024 Q1", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    let project = Project::new("Alpha");
    catalog.create_level(&level_1).unwrap();
    catalog.create_level(&level_2).unwrap();
    catalog.create_objective(&objective).unwrap();
    catalog.create_condition(&basic).unwrap();
    catalog.create_condition(&advanced).unwrap();
    catalog.create_work_cycle(&work_cycle).unwrap();
    catalog.create_project(&project).unwrap();

    let at_level_1 = projects
        .find_commitment(work_cycle.id, project.id, objective.id, level_1.id)
        .unwrap()
        .unwrap();
    let at_level_2 = projects
        .find_commitment(work_cycle.id, project.id, objective.id, level_2.id)
        .unwrap()
        .unwrap();

    let scoring = scoring(&conn);
    assert_eq!(scoring.commitment_met(at_level_1.id).unwrap(), None);

    toggle(&conn, project.id, objective.id, basic.id, ConditionStatus::Done);
    assert_eq!(scoring.commitment_met(at_level_1.id).unwrap(), Some(true));
    assert_eq!(scoring.commitment_met(at_level_2.id).unwrap(), Some(false));
}

#[test]
fn quality_indicator_of_unknown_project_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = scoring(&conn).quality_indicator(missing).unwrap_err();
    match err {
        RepoError::NotFound { entity, id } => {
            assert_eq!(entity, "project");
            assert_eq!(id, missing);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn level_overview_covers_every_project_objective() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    let level = Level::new("Level 1", 1);
    let docs = Objective::new("Documentation", 10);
    let testing = Objective::new("Testing", 5);
    let readme = Condition::new(docs.id, level.id, "README");
    let alpha = Project::new("Alpha");
    let beta = Project::new("Beta");
    catalog.create_level(&level).unwrap();
    catalog.create_objective(&docs).unwrap();
    catalog.create_objective(&testing).unwrap();
    catalog.create_condition(&readme).unwrap();
    catalog.create_project(&alpha).unwrap();
    catalog.create_project(&beta).unwrap();
    toggle(&conn, alpha.id, docs.id, readme.id, ConditionStatus::Done);

    let overview = scoring(&conn).level_overview().unwrap();
    assert_eq!(overview.len(), 4);
    let achieved: Vec<_> = overview
        .iter()
        .filter(|summary| summary.achieved_level.is_some())
        .collect();
    assert_eq!(achieved.len(), 1);
    assert_eq!(achieved[0].project_id, alpha.id);
    assert_eq!(achieved[0].objective_id, docs.id);
}
