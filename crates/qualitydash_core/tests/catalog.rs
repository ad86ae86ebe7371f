use chrono::NaiveDate;
use qualitydash_core::db::open_db_in_memory;
use qualitydash_core::{
    CatalogError, CatalogService, Condition, FrameworkRepository, Level, ModelValidationError,
    Objective, ObjectiveGroup, Project, ProjectRepository, SqliteFrameworkRepository,
    SqliteProjectRepository, WorkCycle,
};
use rusqlite::Connection;
use uuid::Uuid;

fn catalog(
    conn: &Connection,
) -> CatalogService<SqliteFrameworkRepository<'_>, SqliteProjectRepository<'_>> {
    CatalogService::new(
        SqliteFrameworkRepository::try_new(conn).unwrap(),
        SqliteProjectRepository::try_new(conn).unwrap(),
    )
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn duplicate_level_value_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    catalog.create_level(&Level::new("Level 1", 1)).unwrap();
    let err = catalog
        .create_level(&Level::new("Bronze", 1))
        .unwrap_err();

    assert!(matches!(err, CatalogError::DuplicateLevelValue(1)));
    assert_eq!(count(&conn, "levels"), 1);
}

#[test]
fn condition_requires_existing_objective_and_level() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let level = Level::new("Level 1", 1);
    let objective = Objective::new("Documentation", 10);
    catalog.create_level(&level).unwrap();
    catalog.create_objective(&objective).unwrap();

    let missing = Uuid::new_v4();
    let err = catalog
        .create_condition(&Condition::new(missing, level.id, "README"))
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound { entity: "objective", id } if id == missing
    ));

    let err = catalog
        .create_condition(&Condition::new(objective.id, missing, "README"))
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound { entity: "level", id } if id == missing
    ));
    assert_eq!(count(&conn, "conditions"), 0);
}

#[test]
fn blank_project_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();

    let err = catalog(&conn)
        .create_project(&Project::new("   "))
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::Validation(ModelValidationError::BlankName { entity: "project" })
    ));
}

#[test]
fn deleting_objective_cascades_join_rows() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let level = Level::new("Level 1", 1);
    let docs = Objective::new("Documentation", 10);
    let testing = Objective::new("Testing", 5);
    catalog.create_level(&level).unwrap();
    catalog.create_objective(&docs).unwrap();
    catalog.create_objective(&testing).unwrap();
    catalog
        .create_condition(&Condition::new(docs.id, level.id, "README"))
        .unwrap();
    catalog
        .create_work_cycle(&WorkCycle::new("2024 Q1", date(2024, 1, 1)))
        .unwrap();
    catalog.create_project(&Project::new("Alpha")).unwrap();
    assert_eq!(count(&conn, "project_objectives"), 2);
    assert_eq!(count(&conn, "commitments"), 2);

    catalog.delete_objective(docs.id).unwrap();

    assert_eq!(count(&conn, "conditions"), 0);
    assert_eq!(count(&conn, "project_objectives"), 1);
    assert_eq!(count(&conn, "project_objective_conditions"), 0);
    assert_eq!(count(&conn, "commitments"), 1);
    assert_eq!(count(&conn, "quality_snapshots"), 1);
}

#[test]
fn deleting_project_removes_its_matrix() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let level = Level::new("Level 1", 1);
    let objective = Objective::new("Documentation", 10);
    let project = Project::new("Alpha");
    catalog.create_level(&level).unwrap();
    catalog.create_objective(&objective).unwrap();
    catalog
        .create_condition(&Condition::new(objective.id, level.id, "README"))
        .unwrap();
    catalog
        .create_work_cycle(&WorkCycle::new("2024 Q1", date(2024, 1, 1)))
        .unwrap();
    catalog.create_project(&project).unwrap();

    catalog.delete_project(project.id).unwrap();

    for table in [
        "project_objectives",
        "project_objective_conditions",
        "commitments",
        "quality_snapshots",
    ] {
        assert_eq!(count(&conn, table), 0, "{table} kept rows");
    }
    let err = catalog.delete_project(project.id).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { entity: "project", .. }));
}

#[test]
fn only_one_work_cycle_is_current() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let framework = SqliteFrameworkRepository::try_new(&conn).unwrap();

    let mut q1 = WorkCycle::new("2024 Q1", date(2024, 1, 1));
    q1.is_current = true;
    let mut q2 = WorkCycle::new("2024 Q2", date(2024, 4, 1));
    q2.is_current = true;
    catalog.create_work_cycle(&q1).unwrap();
    catalog.create_work_cycle(&q2).unwrap();
    assert_eq!(framework.current_work_cycle().unwrap().unwrap().id, q2.id);

    catalog.set_current_work_cycle(q1.id).unwrap();
    assert_eq!(framework.current_work_cycle().unwrap().unwrap().id, q1.id);
    let current: Vec<_> = framework
        .list_work_cycles()
        .unwrap()
        .into_iter()
        .filter(|work_cycle| work_cycle.is_current)
        .collect();
    assert_eq!(current.len(), 1);

    let err = catalog.set_current_work_cycle(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
    assert_eq!(framework.current_work_cycle().unwrap().unwrap().id, q1.id);
}

#[test]
fn objectives_list_by_group_then_name() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let framework = SqliteFrameworkRepository::try_new(&conn).unwrap();

    let group = ObjectiveGroup::new("Engineering");
    catalog.create_objective_group(&group).unwrap();
    let mut grouped = Objective::new("Architecture", 3);
    grouped.group_id = Some(group.id);
    catalog.create_objective(&grouped).unwrap();
    catalog
        .create_objective(&Objective::new("Testing", 5))
        .unwrap();
    catalog
        .create_objective(&Objective::new("Documentation", 10))
        .unwrap();

    let names: Vec<_> = framework
        .list_objectives()
        .unwrap()
        .into_iter()
        .map(|objective| objective.name)
        .collect();
    assert_eq!(names, vec!["Documentation", "Testing", "Architecture"]);
}

#[test]
fn update_project_persists_review_metadata() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let projects = SqliteProjectRepository::try_new(&conn).unwrap();

    let mut project = Project::new("Alpha");
    catalog.create_project(&project).unwrap();
    project.url = "https://example.org/alpha".to_string();
    project.owner = Some("Platform team".to_string());
    project.last_review = Some(date(2024, 2, 15));
    project.last_review_status = Some("approved".to_string());
    catalog.update_project(&project).unwrap();

    let stored = projects.get_project(project.id).unwrap().unwrap();
    assert_eq!(stored, project);
}
